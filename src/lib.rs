//! Vessel track recording and GPX export.
//!
//! Position reports are filtered against speed and distance gates, buffered
//! in a persistent store, and flushed to GPX files at calendar-day or
//! voyage boundaries, optionally simplified and annotated with depth.

pub mod boundary;
pub mod config;
pub mod error;
pub mod files;
pub mod filter;
pub mod geo;
pub mod gpx;
pub mod position;
pub mod recorder;
pub mod simplify;
pub mod source;
pub mod store;

pub use boundary::{SegmentBoundaryDetector, SegmentMode};
pub use config::TrackConfig;
pub use error::{TrackError, TrackResult};
pub use filter::{FilterDecision, PositionFilter};
pub use position::{DepthReading, Position, PositionSample};
pub use recorder::{ExportRecord, TrackRecorder};
pub use store::{JsonlStore, MemoryStore, TrackStore, TrimMode};
