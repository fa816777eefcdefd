//! Spherical distance and planar projection helpers.

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Web Mercator latitude limit; the projection diverges at the poles.
const MAX_MERCATOR_LAT: f64 = 85.05113;

/// Great-circle distance in meters between two lat/lon pairs (haversine).
pub fn haversine_distance_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).max(0.0).sqrt());
    EARTH_RADIUS_M * c
}

/// Web Mercator easting in meters for a longitude in degrees.
pub fn mercator_x(lon: f64) -> f64 {
    EARTH_RADIUS_M * lon.to_radians()
}

/// Web Mercator northing in meters for a latitude in degrees, clamped to
/// the projection's ±85.05113° domain so polar inputs stay finite.
///
/// Only used to give the simplification tolerance a uniform meter scale;
/// points are never mapped back from this projection.
pub fn mercator_y(lat: f64) -> f64 {
    let phi = lat.clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT).to_radians();
    EARTH_RADIUS_M * (std::f64::consts::FRAC_PI_4 + phi / 2.0).tan().ln()
}
