//! GPX 1.1 serialization.

use chrono::SecondsFormat;

use crate::error::{TrackError, TrackResult};
use crate::position::Position;

const LAT_LON_DECIMAL_PLACES: usize = 6;
const DEPTH_DECIMAL_PLACES: usize = 2;

const GPX_HEADER: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx xmlns="http://www.topografix.com/GPX/1/1"
version="1.1" creator="track_logger_rs"
xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
xmlns:gpxtpx="http://www.garmin.com/xmlschemas/TrackPointExtension/v1"
xsi:schemaLocation="http://www.topografix.com/GPX/1/1 http://www.topografix.com/GPX/1/1/gpx.xsd
http://www.garmin.com/xmlschemas/TrackPointExtension/v1 https://www8.garmin.com/xmlschemas/TrackPointExtensionv1.xsd">
"#;

/// Render an ordered point sequence as one GPX track with a single segment.
///
/// Depth, when enabled and present on a point, lands in the Garmin
/// track-point extension; points without a reading carry no extension.
pub fn render_gpx(points: &[Position], track_name: &str, include_depth: bool) -> TrackResult<String> {
    if points.is_empty() {
        return Err(TrackError::EmptyTrack);
    }

    let mut gpx = String::with_capacity(points.len() * 120 + GPX_HEADER.len());
    gpx.push_str(GPX_HEADER);
    gpx.push_str(&format!("<trk><name>{track_name}</name><trkseg>\n"));

    for point in points {
        gpx.push_str(&format!(
            "<trkpt lat=\"{:.lp$}\" lon=\"{:.lp$}\"><time>{}</time>",
            point.latitude,
            point.longitude,
            point.ts.to_rfc3339_opts(SecondsFormat::Millis, true),
            lp = LAT_LON_DECIMAL_PLACES,
        ));

        if include_depth {
            if let Some(depth) = point.depth {
                gpx.push_str(&format!(
                    "<extensions><gpxtpx:TrackPointExtension><gpxtpx:depth>{depth:.dp$}</gpxtpx:depth></gpxtpx:TrackPointExtension></extensions>",
                    dp = DEPTH_DECIMAL_PLACES,
                ));
            }
        }

        gpx.push_str("</trkpt>\n");
    }

    gpx.push_str("</trkseg></trk></gpx>");
    Ok(gpx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn points() -> Vec<Position> {
        let start = Utc.with_ymd_and_hms(2025, 3, 17, 14, 26, 0).unwrap();
        (0..3)
            .map(|i| {
                Position::new(
                    start + Duration::minutes(i),
                    47.6 + i as f64 * 0.001,
                    -122.3 - i as f64 * 0.002,
                )
            })
            .collect()
    }

    #[test]
    fn test_empty_track_is_an_error() {
        assert!(matches!(
            render_gpx(&[], "2025-03-17", false),
            Err(TrackError::EmptyTrack)
        ));
    }

    #[test]
    fn test_track_structure_and_name() {
        let gpx = render_gpx(&points(), "2025-03-17", false).unwrap();
        assert!(gpx.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(gpx.contains("<trk><name>2025-03-17</name><trkseg>"));
        assert!(gpx.ends_with("</trkseg></trk></gpx>"));
        assert_eq!(gpx.matches("<trkpt ").count(), 3);
    }

    #[test]
    fn test_coordinates_formatted_to_six_places() {
        let gpx = render_gpx(&points(), "t", false).unwrap();
        assert!(gpx.contains("lat=\"47.600000\" lon=\"-122.300000\""));
        assert!(gpx.contains("lat=\"47.601000\" lon=\"-122.302000\""));
        assert!(gpx.contains("lat=\"47.602000\" lon=\"-122.304000\""));
    }

    #[test]
    fn test_times_are_utc_iso8601_and_non_decreasing() {
        let gpx = render_gpx(&points(), "t", false).unwrap();
        let times: Vec<&str> = gpx
            .split("<time>")
            .skip(1)
            .map(|s| s.split("</time>").next().unwrap())
            .collect();
        assert_eq!(times.len(), 3);
        assert_eq!(times[0], "2025-03-17T14:26:00.000Z");
        for pair in times.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
    }

    #[test]
    fn test_depth_extension_present_only_when_carried() {
        let mut pts = points();
        pts[1].depth = Some(12.3456);

        let gpx = render_gpx(&pts, "t", true).unwrap();
        assert_eq!(gpx.matches("<gpxtpx:depth>").count(), 1);
        assert!(gpx.contains("<gpxtpx:depth>12.35</gpxtpx:depth>"));

        // depth recording disabled: no extensions even when a value exists
        let gpx = render_gpx(&pts, "t", false).unwrap();
        assert!(!gpx.contains("<extensions>"));
    }
}
