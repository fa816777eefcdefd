use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{TrackError, TrackResult};

/// A recorded track point destined for GPX output.
///
/// The `depth` field was added after the first persisted-buffer format
/// shipped; `#[serde(default)]` lets rows written without it load as `None`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub ts: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth: Option<f64>,
}

impl Position {
    pub fn new(ts: DateTime<Utc>, latitude: f64, longitude: f64) -> Self {
        Position {
            ts,
            latitude,
            longitude,
            depth: None,
        }
    }

    /// Coordinate sanity check. Some GPS units report a small non-zero
    /// lat/lon near (0, 0) when they lose fix, so that neighborhood is
    /// rejected along with out-of-range and non-finite values.
    pub fn is_valid(&self) -> bool {
        if !self.latitude.is_finite() || !self.longitude.is_finite() {
            return false;
        }
        if self.latitude.abs() > 90.0 || self.longitude.abs() > 180.0 {
            return false;
        }
        if self.latitude.abs() <= 0.01 && self.longitude.abs() <= 0.01 {
            return false;
        }
        true
    }

    /// Validate raw sample coordinates into a track point.
    pub fn validated(ts: DateTime<Utc>, latitude: f64, longitude: f64) -> TrackResult<Self> {
        let position = Position::new(ts, latitude, longitude);
        if position.is_valid() {
            Ok(position)
        } else {
            Err(TrackError::InvalidPosition {
                latitude,
                longitude,
            })
        }
    }
}

/// A raw position report as delivered by the host subscription.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PositionSample {
    pub source: String,
    pub ts: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
}

/// A depth-below-surface reading with its own timestamp.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct DepthReading {
    pub ts: DateTime<Utc>,
    pub meters: f64,
}
