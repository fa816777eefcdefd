use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Knots per meter-per-second; host speed values arrive in m/s.
pub const KNOTS_PER_M_PER_S: f64 = 1.94384;

/// Depth readings older than this (relative to the position sample) are
/// stale and omitted from the point.
pub const MAX_DEPTH_AGE_MS: i64 = 10_000;

/// Recording configuration. Field defaults match the upstream plugin's
/// schema defaults, so a missing or partial config file behaves the same
/// way a fresh install does.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    /// Accept position samples from this named source only; `None` accepts
    /// every source.
    pub gps_source: Option<String>,
    /// Minutes between recorded track positions.
    pub track_interval_minutes: f64,
    /// Minimum speed over ground (knots) to record a point. 0 disables the
    /// gate.
    pub minimum_speed_knots: f64,
    /// Minimum distance (meters) from the last recorded point. 0 disables
    /// the gate.
    pub minimum_distance_meters: f64,
    /// One file per voyage instead of one file per calendar day.
    pub record_voyage: bool,
    /// Track simplification tolerance in meters. 0 keeps the full recorded
    /// resolution.
    pub simplification_tolerance_meters: f64,
    /// Annotate points with depth below surface.
    pub record_depth: bool,
    /// Where GPX files are written and listed.
    pub gpx_folder: PathBuf,
}

impl Default for TrackConfig {
    fn default() -> Self {
        TrackConfig {
            gps_source: None,
            track_interval_minutes: 1.0,
            minimum_speed_knots: 0.5,
            minimum_distance_meters: 50.0,
            record_voyage: false,
            simplification_tolerance_meters: 10.0,
            record_depth: false,
            gpx_folder: PathBuf::from("gpx_tracks"),
        }
    }
}

impl TrackConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_plugin_schema() {
        let cfg = TrackConfig::default();
        assert_eq!(cfg.track_interval_minutes, 1.0);
        assert_eq!(cfg.minimum_speed_knots, 0.5);
        assert_eq!(cfg.minimum_distance_meters, 50.0);
        assert_eq!(cfg.simplification_tolerance_meters, 10.0);
        assert!(!cfg.record_voyage);
        assert!(!cfg.record_depth);
        assert_eq!(cfg.gps_source, None);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let cfg: TrackConfig =
            serde_json::from_str(r#"{"record_voyage":true,"minimum_speed_knots":0}"#).unwrap();
        assert!(cfg.record_voyage);
        assert_eq!(cfg.minimum_speed_knots, 0.0);
        assert_eq!(cfg.minimum_distance_meters, 50.0);
    }
}
