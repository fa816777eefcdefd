//! Segment boundary detection.
//!
//! Decides, after each incoming sample, whether the buffered segment is
//! complete and should be written out. Two mutually exclusive modes: one
//! file per calendar day, or one file per voyage (a continuous period of
//! movement bounded by stationary periods).

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Utc};

use crate::position::Position;
use crate::store::TrimMode;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentMode {
    /// Close the segment when the calendar date rolls over. Consecutive
    /// files stay gapless: the last point is carried into the next segment.
    Daily,
    /// Close the segment when the vessel has been stationary for longer
    /// than three track intervals. Voyages are independent; the buffer is
    /// fully cleared.
    Voyage,
}

/// A fired boundary: how to name the export and how to trim afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct Boundary {
    pub track_name: String,
    pub trim: TrimMode,
    /// Voyage mode records the stopped sample as the closing point before
    /// exporting.
    pub close_with_sample: bool,
}

pub struct SegmentBoundaryDetector {
    mode: SegmentMode,
    track_interval_minutes: f64,
    local_offset: FixedOffset,
}

/// `YYYY-MM-DD`, e.g. 2025-03-17.
pub fn daily_track_name(date: NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

/// `YYYY-MM-DD-HHmm` in the given offset, e.g. 2025-03-17-1426.
pub fn timestamp_track_name(ts: DateTime<Utc>, offset: FixedOffset) -> String {
    ts.with_timezone(&offset).format("%Y-%m-%d-%H%M").to_string()
}

impl SegmentBoundaryDetector {
    pub fn new(mode: SegmentMode, track_interval_minutes: f64, local_offset: FixedOffset) -> Self {
        SegmentBoundaryDetector {
            mode,
            track_interval_minutes,
            local_offset,
        }
    }

    pub fn mode(&self) -> SegmentMode {
        self.mode
    }

    /// Evaluate the boundary predicates for one sample.
    ///
    /// `last_recorded` must be the reference point from before this
    /// sample's own filter decision, and `buffer_len` the current buffer
    /// size. A single-point buffer never exports.
    pub fn evaluate(
        &self,
        sample: &Position,
        last_recorded: &Position,
        buffer_len: usize,
    ) -> Option<Boundary> {
        if buffer_len <= 1 {
            return None;
        }

        match self.mode {
            SegmentMode::Daily => {
                let sample_date = sample.ts.with_timezone(&self.local_offset).date_naive();
                let last_date = last_recorded.ts.with_timezone(&self.local_offset).date_naive();
                if sample_date == last_date {
                    return None;
                }
                // name the file after the day that just ended
                let previous_day = sample_date.pred_opt()?;
                Some(Boundary {
                    track_name: daily_track_name(previous_day),
                    trim: TrimMode::KeepLast,
                    close_with_sample: false,
                })
            }
            SegmentMode::Voyage => {
                let stationary_after =
                    Duration::seconds((self.track_interval_minutes * 3.0 * 60.0) as i64);
                let idle = sample.ts.signed_duration_since(last_recorded.ts);
                if idle <= stationary_after {
                    return None;
                }
                Some(Boundary {
                    track_name: timestamp_track_name(sample.ts, self.local_offset),
                    trim: TrimMode::Full,
                    close_with_sample: true,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc_offset() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    fn pos(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> Position {
        Position::new(Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap(), 47.6, -122.3)
    }

    #[test]
    fn test_daily_fires_on_date_rollover() {
        let det = SegmentBoundaryDetector::new(SegmentMode::Daily, 1.0, utc_offset());
        let last = pos(2025, 3, 17, 23, 58);
        let sample = pos(2025, 3, 18, 0, 1);

        let boundary = det.evaluate(&sample, &last, 3).unwrap();
        assert_eq!(boundary.track_name, "2025-03-17");
        assert_eq!(boundary.trim, TrimMode::KeepLast);
        assert!(!boundary.close_with_sample);
    }

    #[test]
    fn test_daily_quiet_within_same_day() {
        let det = SegmentBoundaryDetector::new(SegmentMode::Daily, 1.0, utc_offset());
        let last = pos(2025, 3, 17, 8, 0);
        let sample = pos(2025, 3, 17, 23, 59);
        assert_eq!(det.evaluate(&sample, &last, 10), None);
    }

    #[test]
    fn test_single_point_buffer_never_exports() {
        let det = SegmentBoundaryDetector::new(SegmentMode::Daily, 1.0, utc_offset());
        let last = pos(2025, 3, 17, 23, 58);
        let sample = pos(2025, 3, 18, 0, 1);
        assert_eq!(det.evaluate(&sample, &last, 1), None);
        assert_eq!(det.evaluate(&sample, &last, 0), None);
    }

    #[test]
    fn test_daily_respects_local_offset() {
        // UTC-8: 07:30Z on the 18th is still 23:30 on the 17th locally
        let offset = FixedOffset::west_opt(8 * 3600).unwrap();
        let det = SegmentBoundaryDetector::new(SegmentMode::Daily, 1.0, offset);
        let last = pos(2025, 3, 18, 5, 0);
        let sample = pos(2025, 3, 18, 7, 30);
        assert_eq!(det.evaluate(&sample, &last, 5), None);

        // 08:30Z crosses local midnight
        let sample = pos(2025, 3, 18, 8, 30);
        let boundary = det.evaluate(&sample, &last, 5).unwrap();
        assert_eq!(boundary.track_name, "2025-03-17");
    }

    #[test]
    fn test_voyage_fires_after_three_intervals_idle() {
        let det = SegmentBoundaryDetector::new(SegmentMode::Voyage, 2.0, utc_offset());
        let last = pos(2025, 3, 17, 14, 0);

        // 5 minutes idle at a 2 minute interval: below the 6 minute cutoff
        assert_eq!(det.evaluate(&pos(2025, 3, 17, 14, 5), &last, 4), None);

        // 7 minutes idle: stationary
        let boundary = det.evaluate(&pos(2025, 3, 17, 14, 7), &last, 4).unwrap();
        assert_eq!(boundary.track_name, "2025-03-17-1407");
        assert_eq!(boundary.trim, TrimMode::Full);
        assert!(boundary.close_with_sample);
    }

    #[test]
    fn test_voyage_name_uses_local_offset() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let det = SegmentBoundaryDetector::new(SegmentMode::Voyage, 1.0, offset);
        let last = pos(2025, 3, 17, 14, 0);
        let boundary = det.evaluate(&pos(2025, 3, 17, 14, 26), &last, 2).unwrap();
        assert_eq!(boundary.track_name, "2025-03-17-1626");
    }
}
