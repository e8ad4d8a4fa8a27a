//! Minimal geographic types required by the calculation pipeline.
//!
//! Only the pieces of geodesy that the rupture-surface contracts need live
//! here: a location value and the fast, flat-earth horizontal-distance and
//! azimuth approximations used for source filtering and local projection.
//! Full region and gridded-area support belongs to the model loader.

use serde::{Deserialize, Serialize};

/// Mean earth radius.
/// unit: km
pub const EARTH_RADIUS_MEAN: f64 = 6371.0072;

/// A geographic location.
///
/// Depth is positive-down and defaults to the surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// unit: decimal degrees
    pub lat: f64,
    /// unit: decimal degrees
    pub lon: f64,
    /// unit: km, positive down
    pub depth: f64,
}

impl Location {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            lat,
            lon,
            depth: 0.0,
        }
    }

    pub fn with_depth(lat: f64, lon: f64, depth: f64) -> Self {
        Self { lat, lon, depth }
    }
}

/// Fast horizontal distance between two locations.
///
/// Scales longitude by the cosine of the mean latitude rather than solving
/// the inverse geodetic problem. Adequate for the distances over which
/// ground motions are computed (a few hundred km).
/// unit: km
pub fn horz_distance(p: &Location, q: &Location) -> f64 {
    let d_lat = (q.lat - p.lat).to_radians();
    let mid_lat = 0.5 * (p.lat + q.lat).to_radians();
    let d_lon = (q.lon - p.lon).to_radians() * mid_lat.cos();
    EARTH_RADIUS_MEAN * (d_lat * d_lat + d_lon * d_lon).sqrt()
}

/// Offset of `q` relative to `p` in local (north, east) km.
pub(crate) fn local_offset(p: &Location, q: &Location) -> (f64, f64) {
    let north = (q.lat - p.lat).to_radians() * EARTH_RADIUS_MEAN;
    let mid_lat = 0.5 * (p.lat + q.lat).to_radians();
    let east = (q.lon - p.lon).to_radians() * mid_lat.cos() * EARTH_RADIUS_MEAN;
    (north, east)
}

/// Azimuth from `p` to `q`, clockwise from north.
/// unit: decimal degrees in [0, 360)
pub fn azimuth(p: &Location, q: &Location) -> f64 {
    let (north, east) = local_offset(p, q);
    let az = east.atan2(north).to_degrees();
    if az < 0.0 {
        az + 360.0
    } else {
        az
    }
}
