//! Persistent track-point buffer.
//!
//! The buffer is an ordered, append-only sequence of positions that must
//! survive process restarts. `JsonlStore` persists one JSON row per line;
//! `MemoryStore` backs tests and throwaway sessions.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::{TrackError, TrackResult};
use crate::position::Position;

/// How to trim the buffer after a successful export.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrimMode {
    /// Delete everything; the next segment starts fresh.
    Full,
    /// Keep only the most recent point, so consecutive exported files share
    /// their connecting point and the track stays gapless.
    KeepLast,
}

pub trait TrackStore {
    /// Append one position. Rows arrive in timestamp order.
    fn append(&mut self, position: &Position) -> TrackResult<()>;

    /// All buffered positions, ordered by timestamp.
    fn load(&self) -> TrackResult<Vec<Position>>;

    fn count(&self) -> usize;

    /// Bulk delete per `mode`.
    fn trim(&mut self, mode: TrimMode) -> TrackResult<()>;
}

/// In-memory buffer with no persistence.
#[derive(Default)]
pub struct MemoryStore {
    rows: Vec<Position>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TrackStore for MemoryStore {
    fn append(&mut self, position: &Position) -> TrackResult<()> {
        self.rows.push(position.clone());
        Ok(())
    }

    fn load(&self) -> TrackResult<Vec<Position>> {
        let mut rows = self.rows.clone();
        rows.sort_by_key(|p| p.ts);
        Ok(rows)
    }

    fn count(&self) -> usize {
        self.rows.len()
    }

    fn trim(&mut self, mode: TrimMode) -> TrackResult<()> {
        match mode {
            TrimMode::Full => self.rows.clear(),
            TrimMode::KeepLast => {
                if let Some(last) = self.rows.pop() {
                    self.rows = vec![last];
                }
            }
        }
        Ok(())
    }
}

/// File-backed buffer: one JSON object per line, appended as positions are
/// recorded, rewritten on trim. Rows written by older versions without a
/// depth field deserialize with `depth = None`.
pub struct JsonlStore {
    path: PathBuf,
    rows: Vec<Position>,
}

impl JsonlStore {
    /// Open (or create) the buffer file and load any surviving rows.
    pub fn open(path: impl Into<PathBuf>) -> TrackResult<Self> {
        let path = path.into();
        let mut rows = Vec::new();

        if path.exists() {
            let file = File::open(&path)
                .map_err(|e| TrackError::Storage(format!("open {}: {e}", path.display())))?;
            for (lineno, line) in BufReader::new(file).lines().enumerate() {
                let line =
                    line.map_err(|e| TrackError::Storage(format!("read {}: {e}", path.display())))?;
                if line.trim().is_empty() {
                    continue;
                }
                match serde_json::from_str::<Position>(&line) {
                    Ok(row) => rows.push(row),
                    Err(e) => {
                        // tolerate a torn final line from an unclean shutdown
                        warn!("skipping unreadable buffer row {}: {e}", lineno + 1);
                    }
                }
            }
            rows.sort_by_key(|p| p.ts);
        }

        debug!("opened buffer {} with {} rows", path.display(), rows.len());
        Ok(JsonlStore { path, rows })
    }

    fn rewrite(&self) -> TrackResult<()> {
        let mut body = String::new();
        for row in &self.rows {
            let line = serde_json::to_string(row)
                .map_err(|e| TrackError::Storage(format!("encode row: {e}")))?;
            body.push_str(&line);
            body.push('\n');
        }
        fs::write(&self.path, body)
            .map_err(|e| TrackError::Storage(format!("rewrite {}: {e}", self.path.display())))
    }
}

impl TrackStore for JsonlStore {
    fn append(&mut self, position: &Position) -> TrackResult<()> {
        let line = serde_json::to_string(position)
            .map_err(|e| TrackError::Storage(format!("encode row: {e}")))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| TrackError::Storage(format!("open {}: {e}", self.path.display())))?;
        writeln!(file, "{line}")
            .map_err(|e| TrackError::Storage(format!("append {}: {e}", self.path.display())))?;
        self.rows.push(position.clone());
        Ok(())
    }

    fn load(&self) -> TrackResult<Vec<Position>> {
        Ok(self.rows.clone())
    }

    fn count(&self) -> usize {
        self.rows.len()
    }

    fn trim(&mut self, mode: TrimMode) -> TrackResult<()> {
        let kept = match mode {
            TrimMode::Full => Vec::new(),
            TrimMode::KeepLast => self.rows.last().cloned().into_iter().collect(),
        };
        let previous = std::mem::replace(&mut self.rows, kept);
        if let Err(e) = self.rewrite() {
            // file and cache must not diverge
            self.rows = previous;
            return Err(e);
        }
        Ok(())
    }
}

/// Convenience for stores living in a data directory that may not exist yet.
pub fn buffer_file_path(data_dir: &Path) -> PathBuf {
    data_dir.join("track-buffer.jsonl")
}
