//! GPX file area: listing and download-by-name for a host UI.

use std::fs;
use std::path::Path;

use crate::error::{TrackError, TrackResult};

/// Listings are capped to the most recent files so a long-running install
/// does not hand the UI an unbounded payload.
const MAX_LISTED_FILES: usize = 100;

/// Names of the `.gpx` files in `dir`, sorted ascending (track names are
/// date-derived, so this is chronological), capped to the 100 most recent.
pub fn list_gpx_files(dir: &Path) -> TrackResult<Vec<String>> {
    let entries = fs::read_dir(dir)
        .map_err(|e| TrackError::FileRead(format!("read folder {}: {e}", dir.display())))?;

    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| name.ends_with(".gpx"))
        .collect();
    names.sort();

    if names.len() > MAX_LISTED_FILES {
        names.drain(..names.len() - MAX_LISTED_FILES);
    }
    Ok(names)
}

/// Read one GPX file by bare name. The name must be a plain file name;
/// anything resembling a path is refused.
pub fn read_gpx_file(dir: &Path, name: &str) -> TrackResult<Vec<u8>> {
    if name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(TrackError::FileRead(format!("invalid file name {name}")));
    }
    let path = dir.join(name);
    fs::read(&path).map_err(|e| TrackError::FileRead(format!("read {}: {e}", path.display())))
}
