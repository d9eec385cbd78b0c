//! Qibla bearing calculation.
//!
//! Computes the initial great-circle bearing from an observer toward the
//! Kaaba on a spherical earth (no ellipsoid correction). Results are degrees
//! clockwise from true north, normalized to [0, 360).
//!
//! # Known limitations
//!
//! At the poles and at the antipode of the Kaaba the bearing is
//! mathematically undefined; the formula still returns a finite number there,
//! but its value is not meaningful. Callers at those coordinates get no
//! special-casing.

use crate::models::Coordinate;

/// Coordinates of the Kaaba in Mecca (degrees).
pub const KAABA: (f64, f64) = (21.4225, 39.8262);

/// Normalize an angle in degrees to [0, 360).
///
/// Works for arbitrarily negative input, unlike a bare `%`.
pub fn normalize_degrees(deg: f64) -> f64 {
    ((deg % 360.0) + 360.0) % 360.0
}

/// Initial great-circle bearing from `from` toward the Kaaba, in [0, 360).
pub fn bearing_to_kaaba(from: Coordinate) -> f64 {
    let (kaaba_lat, kaaba_lon) = KAABA;
    let lat1 = from.latitude().to_radians();
    let lat2 = kaaba_lat.to_radians();
    let d_lon = (kaaba_lon - from.longitude()).to_radians();

    let y = d_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();

    normalize_degrees(y.atan2(x).to_degrees())
}

/// Bearing to display on a compass needle given the device's heading.
///
/// Both inputs are degrees clockwise from true north; the result follows the
/// same normalization rule as [`bearing_to_kaaba`].
pub fn relative_bearing(qibla_bearing: f64, device_heading: f64) -> f64 {
    normalize_degrees(qibla_bearing - device_heading)
}
