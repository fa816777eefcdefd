use thiserror::Error;

/// Track recording error taxonomy.
#[derive(Error, Debug)]
pub enum TrackError {
    /// Malformed sample. Logged and dropped at ingestion, never fatal.
    #[error("invalid position ({latitude}, {longitude})")]
    InvalidPosition { latitude: f64, longitude: f64 },

    /// Export was attempted with nothing in the buffer.
    #[error("the local buffer is empty")]
    EmptyTrack,

    /// The buffer store failed; the operation was aborted with no
    /// partial mutation.
    #[error("storage error: {0}")]
    Storage(String),

    /// Folder creation or GPX file write failed. The buffer is left
    /// untouched so the segment can be retried.
    #[error("error writing gpx file: {0}")]
    FileWrite(String),

    /// Listing the GPX folder or reading a file from it failed.
    #[error("error reading gpx file: {0}")]
    FileRead(String),
}

pub type TrackResult<T> = Result<T, TrackError>;
