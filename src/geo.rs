//! Great-circle distance on a spherical Earth.
//!
//! The feeder only needs "which aircraft is closest", so the spherical
//! haversine formula is plenty; the ellipsoidal error is far below the
//! 0.1 km tie-break tolerance used by the selector.

use std::f64::consts::PI;

/// Degrees to radians conversion factor
const DTOR: f64 = PI / 180.0;

/// Mean Earth radius in km
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two lat/lon pairs, in km.
///
/// Inputs are degrees; valid over the full [-90, 90] x [-180, 180] range.
/// Non-finite inputs propagate to a non-finite result, which callers must
/// treat as "not a candidate" rather than an error.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1 * DTOR;
    let phi2 = lat2 * DTOR;
    let dphi = (lat2 - lat1) * DTOR;
    let dlambda = (lon2 - lon1) * DTOR;

    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}
