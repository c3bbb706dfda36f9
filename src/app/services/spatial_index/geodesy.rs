//! Great-circle helpers shared by the spatial index

use crate::app::models::GeoPoint;
use crate::constants::EARTH_RADIUS_KM;
use std::f64::consts::PI;

/// Great-circle distance between two points using the haversine formula
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).max(0.0).sqrt());
    EARTH_RADIUS_KM * c
}

/// Position on the unit sphere; chord length grows monotonically with arc length
pub fn unit_vector(point: GeoPoint) -> [f64; 3] {
    let lat = point.latitude.to_radians();
    let lon = point.longitude.to_radians();
    [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()]
}

/// Squared unit-sphere chord covering a great-circle distance, padded for rounding
pub fn chord_2_for_distance_km(distance_km: f64) -> f64 {
    let angle = distance_km / EARTH_RADIUS_KM;
    if !angle.is_finite() || angle >= PI {
        // Whole sphere; the widest chord is the diameter
        return 4.0 + 1e-9;
    }
    let chord = 2.0 * (angle / 2.0).sin();
    chord * chord * (1.0 + 1e-9) + 1e-15
}
