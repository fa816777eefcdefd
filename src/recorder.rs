//! The track recording session.
//!
//! Owns the buffer, the retention filter, and the boundary detector, and
//! processes each incoming sample to completion: validate, filter, append,
//! evaluate the boundary, export, trim. Everything is sequential; a sample
//! is fully handled before the next one is looked at, and the manual
//! triggers share the same `&mut` session, so the buffer is never mutated
//! concurrently.

use std::fs;
use std::path::PathBuf;

use chrono::{FixedOffset, Local, Offset, Utc};
use log::{debug, error, info};

use crate::boundary::{timestamp_track_name, SegmentBoundaryDetector, SegmentMode};
use crate::config::{TrackConfig, MAX_DEPTH_AGE_MS};
use crate::error::{TrackError, TrackResult};
use crate::filter::PositionFilter;
use crate::gpx::render_gpx;
use crate::position::{DepthReading, Position, PositionSample};
use crate::simplify::simplify_track;
use crate::store::{TrackStore, TrimMode};

/// Outcome of a successful export. Immutable once created.
#[derive(Clone, Debug)]
pub struct ExportRecord {
    pub name: String,
    pub point_count: usize,
    pub file_path: PathBuf,
}

pub struct TrackRecorder<S: TrackStore> {
    config: TrackConfig,
    store: S,
    filter: PositionFilter,
    detector: SegmentBoundaryDetector,
    local_offset: FixedOffset,
    last_export: Option<ExportRecord>,
}

impl<S: TrackStore> TrackRecorder<S> {
    /// Build a session using the server-local UTC offset for calendar
    /// boundaries and track names.
    pub fn new(config: TrackConfig, store: S) -> Self {
        let offset = Local::now().offset().fix();
        Self::with_offset(config, store, offset)
    }

    /// Build a session with an explicit UTC offset.
    pub fn with_offset(config: TrackConfig, store: S, local_offset: FixedOffset) -> Self {
        let mode = if config.record_voyage {
            SegmentMode::Voyage
        } else {
            SegmentMode::Daily
        };
        let filter =
            PositionFilter::new(config.minimum_speed_knots, config.minimum_distance_meters);
        let detector =
            SegmentBoundaryDetector::new(mode, config.track_interval_minutes, local_offset);
        TrackRecorder {
            config,
            store,
            filter,
            detector,
            local_offset,
            last_export: None,
        }
    }

    /// Process one position sample to completion.
    ///
    /// Invalid samples are logged and dropped. Storage and file errors
    /// propagate to the caller but leave the session consistent, so
    /// ingestion of later samples continues unaffected; a failed export in
    /// particular keeps the whole segment buffered for retry.
    pub fn handle_sample(
        &mut self,
        sample: &PositionSample,
        sog_knots: f64,
        depth: Option<DepthReading>,
    ) -> TrackResult<()> {
        if let Some(wanted) = &self.config.gps_source {
            if &sample.source != wanted {
                debug!("skipping position from source {}", sample.source);
                return Ok(());
            }
        }

        let mut position =
            match Position::validated(sample.ts, sample.latitude, sample.longitude) {
                Ok(position) => position,
                Err(e) => {
                    error!("{e} from {}", sample.source);
                    return Ok(());
                }
            };

        if self.config.record_depth {
            if let Some(reading) = depth {
                let age_ms = sample.ts.signed_duration_since(reading.ts).num_milliseconds();
                if age_ms < MAX_DEPTH_AGE_MS {
                    position.depth = Some(reading.meters);
                } else {
                    debug!("dropping stale depth reading ({age_ms} ms old)");
                }
            }
        }

        // Boundary predicates compare against the reference point from
        // before this sample's own filter decision.
        let previous_reference = self.filter.last_recorded().cloned();

        let decision = self.filter.evaluate(&position, sog_knots);
        debug!(
            "buffer={} sog={:.2} decision={:?}",
            self.store.count(),
            sog_knots,
            decision
        );
        if decision.is_accepted() {
            self.store.append(&position)?;
            self.filter.record(&position);
        }

        let reference = match previous_reference {
            Some(reference) => reference,
            None => return Ok(()),
        };

        if let Some(boundary) = self.detector.evaluate(&position, &reference, self.store.count()) {
            if boundary.close_with_sample {
                // record the stopped position as the voyage's closing point
                self.store.append(&position)?;
                self.filter.record(&position);
            }
            info!(
                "segment boundary ({:?}): writing {}",
                self.detector.mode(),
                boundary.track_name
            );
            self.export(&boundary.track_name, Some(boundary.trim))?;
        }

        Ok(())
    }

    /// Write the current buffer to `<name>.gpx` immediately, without
    /// trimming.
    pub fn export_now(&mut self) -> TrackResult<ExportRecord> {
        let name = timestamp_track_name(Utc::now(), self.local_offset);
        self.export(&name, None)
    }

    /// Drop everything in the buffer.
    pub fn clear_buffer(&mut self) -> TrackResult<()> {
        debug!("clearing buffer");
        self.store.trim(TrimMode::Full)
    }

    pub fn buffer_count(&self) -> usize {
        self.store.count()
    }

    pub fn last_export(&self) -> Option<&ExportRecord> {
        self.last_export.as_ref()
    }

    /// Human-readable summary for the host's status line.
    pub fn status(&self) -> String {
        let count = self.store.count();
        let noun = if count == 1 { "entry" } else { "entries" };
        let mut message = format!("{count} {noun} in the local buffer.");
        if let Some(export) = &self.last_export {
            message.push_str(&format!(" Last GPX file saved {}.gpx", export.name));
        }
        message
    }

    /// Simplify, render, and write the buffered segment. The buffer is only
    /// trimmed after the file is safely on disk.
    fn export(&mut self, name: &str, trim: Option<TrimMode>) -> TrackResult<ExportRecord> {
        let points = self.store.load()?;
        if points.is_empty() {
            return Err(TrackError::EmptyTrack);
        }
        debug!("{} positions in buffer", points.len());

        let tolerance = self.config.simplification_tolerance_meters;
        let points = if tolerance > 0.0 {
            let simplified = simplify_track(&points, tolerance, true);
            debug!(
                "simplified track to {} positions with tolerance {tolerance}",
                simplified.len()
            );
            simplified
        } else {
            points
        };

        let gpx = render_gpx(&points, name, self.config.record_depth)?;

        fs::create_dir_all(&self.config.gpx_folder).map_err(|e| {
            TrackError::FileWrite(format!(
                "create folder {}: {e}",
                self.config.gpx_folder.display()
            ))
        })?;
        let file_path = self.config.gpx_folder.join(format!("{name}.gpx"));
        fs::write(&file_path, gpx)
            .map_err(|e| TrackError::FileWrite(format!("write {}: {e}", file_path.display())))?;
        info!("wrote {}", file_path.display());

        if let Some(mode) = trim {
            self.store.trim(mode)?;
        }

        let record = ExportRecord {
            name: name.to_string(),
            point_count: points.len(),
            file_path,
        };
        self.last_export = Some(record.clone());
        Ok(record)
    }
}

/// Convert a host speed-over-ground in m/s to knots.
pub fn m_per_s_to_knots(m_per_s: f64) -> f64 {
    m_per_s * crate::config::KNOTS_PER_M_PER_S
}
