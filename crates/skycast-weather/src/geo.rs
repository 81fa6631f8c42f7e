//! Great-circle distance between coordinates.

use crate::types::Coordinate;

/// Earth's mean radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two coordinates, in kilometers.
///
/// Works unchanged at the poles and across the antimeridian since only
/// angle differences enter the formula.
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);

    // Rounding can push h a hair past 1.0 for near-antipodal pairs.
    2.0 * EARTH_RADIUS_KM * h.min(1.0).sqrt().asin()
}
