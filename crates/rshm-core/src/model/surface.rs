//! Rupture surfaces and the per-rupture geometry queries the pipeline
//! makes against them.
//!
//! A surface answers exactly four questions: the three source-site
//! distance metrics, and its dip, down-dip width, and top depth. Model
//! loaders may supply richer gridded surfaces through the same trait;
//! the planar and point implementations here cover fault, interface,
//! grid and area sources built programmatically.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geo::{self, Location};

/// The three source-site distance metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Distance {
    /// Joyner-Boore distance: shortest horizontal distance to the
    /// surface projection of the rupture.
    /// unit: km
    pub r_jb: f64,
    /// Shortest distance to the rupture plane.
    /// unit: km
    pub r_rup: f64,
    /// Horizontal distance from the top edge, measured perpendicular to
    /// strike; positive over the hanging wall.
    /// unit: km
    pub r_x: f64,
}

/// The geometric interface of a single rupture.
pub trait RuptureSurface: fmt::Debug + Send + Sync {
    /// Distance metrics from this surface to `loc`.
    fn distance_to(&self, loc: &Location) -> Distance;

    /// unit: decimal degrees in (0, 90]
    fn dip(&self) -> f64;

    /// Down-dip width.
    /// unit: km
    fn width(&self) -> f64;

    /// Depth to the top of the rupture.
    /// unit: km
    fn depth(&self) -> f64;
}

/// Hypocentral depth assuming a hypocenter centered down-dip.
///
/// Clamped to the bottom edge of the surface. A zero-width surface puts
/// the hypocenter at the top of the rupture; a vertical surface puts it
/// half the width below.
/// unit: km
pub fn hypocentral_depth(dip: f64, width: f64, z_top: f64) -> f64 {
    let sin_dip = dip.to_radians().sin();
    (z_top + sin_dip * width / 2.0).min(z_top + sin_dip * width)
}

/// A single-panel planar fault surface.
///
/// The panel is defined by the first point of its upper trace, a strike
/// direction, an along-strike length, and a down-dip extent. Distances
/// use a local flat-earth projection about the trace origin, which keeps
/// every metric analytic and is accurate over ground-motion distances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanarSurface {
    origin: Location,
    /// unit: decimal degrees clockwise from north
    strike: f64,
    /// unit: km
    length: f64,
    /// unit: decimal degrees
    dip: f64,
    /// unit: km
    width: f64,
    /// unit: km
    z_top: f64,
}

impl PlanarSurface {
    /// # Panics
    ///
    /// Panics on non-positive length, negative width, a dip outside
    /// (0, 90], or a negative top depth.
    pub fn new(origin: Location, strike: f64, length: f64, dip: f64, width: f64, z_top: f64) -> Self {
        assert!(length > 0.0, "length must be positive, got {}", length);
        assert!(width >= 0.0, "width may not be negative, got {}", width);
        assert!(dip > 0.0 && dip <= 90.0, "dip must be in (0, 90], got {}", dip);
        assert!(z_top >= 0.0, "z_top may not be negative, got {}", z_top);
        Self {
            origin,
            strike,
            length,
            dip,
            width,
            z_top,
        }
    }

    /// Site position in panel coordinates: x along strike from the
    /// origin, y perpendicular, positive on the hanging-wall side.
    fn site_coords(&self, loc: &Location) -> (f64, f64) {
        let (north, east) = geo::local_offset(&self.origin, loc);
        let az = self.strike.to_radians();
        let x = north * az.cos() + east * az.sin();
        let y = -north * az.sin() + east * az.cos();
        (x, y)
    }
}

impl RuptureSurface for PlanarSurface {
    fn distance_to(&self, loc: &Location) -> Distance {
        let (x, y) = self.site_coords(loc);
        let dip_rad = self.dip.to_radians();

        // Out-of-footprint offsets against the surface projection,
        // which spans [0, length] along strike and [0, width·cos(dip)]
        // on the hanging-wall side.
        let dx = (x.clamp(0.0, self.length) - x).abs();
        let w_horiz = self.width * dip_rad.cos();
        let dy = (y.clamp(0.0, w_horiz) - y).abs();
        let r_jb = (dx * dx + dy * dy).sqrt();

        // In the plane normal to strike the rupture is the segment from
        // (0, z_top) to (width·cos(dip), z_top + width·sin(dip)); the
        // site sits at (y, 0).
        let t = (y * dip_rad.cos() - self.z_top * dip_rad.sin()).clamp(0.0, self.width);
        let cy = t * dip_rad.cos();
        let cz = self.z_top + t * dip_rad.sin();
        let dyz = ((y - cy) * (y - cy) + cz * cz).sqrt();
        let r_rup = (dx * dx + dyz * dyz).sqrt();

        Distance {
            r_jb,
            r_rup,
            r_x: y,
        }
    }

    fn dip(&self) -> f64 {
        self.dip
    }

    fn width(&self) -> f64 {
        self.width
    }

    fn depth(&self) -> f64 {
        self.z_top
    }
}

/// The degenerate surface of a gridded point source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointSurface {
    location: Location,
    /// unit: km
    z_top: f64,
}

impl PointSurface {
    pub fn new(location: Location, z_top: f64) -> Self {
        assert!(z_top >= 0.0, "z_top may not be negative, got {}", z_top);
        Self { location, z_top }
    }
}

impl RuptureSurface for PointSurface {
    fn distance_to(&self, loc: &Location) -> Distance {
        let r = geo::horz_distance(&self.location, loc);
        Distance {
            r_jb: r,
            r_rup: (r * r + self.z_top * self.z_top).sqrt(),
            r_x: r,
        }
    }

    fn dip(&self) -> f64 {
        90.0
    }

    fn width(&self) -> f64 {
        0.0
    }

    fn depth(&self) -> f64 {
        self.z_top
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn hypocentral_depth_edge_cases() {
        // zero width
        assert_relative_eq!(hypocentral_depth(50.0, 0.0, 3.0), 3.0);
        // vertical dip
        assert_relative_eq!(hypocentral_depth(90.0, 12.0, 1.0), 7.0);
        // 30 degree dip: z_top + width/4
        assert_relative_eq!(hypocentral_depth(30.0, 8.0, 2.0), 4.0, max_relative = 1e-12);
    }

    fn vertical_surface() -> PlanarSurface {
        // 20 km vertical strike-slip panel striking due north from the
        // origin, reaching the free surface.
        PlanarSurface::new(Location::new(34.0, -118.0), 0.0, 20.0, 90.0, 10.0, 0.0)
    }

    #[test]
    fn vertical_surface_broadside() {
        let surface = vertical_surface();
        // Site due east of the panel midpoint (10 km up-strike).
        let site = Location::new(34.0899, -117.5);
        let d = surface.distance_to(&site);
        assert_relative_eq!(d.r_jb, d.r_rup, max_relative = 1e-12);
        assert_relative_eq!(d.r_x, d.r_jb, max_relative = 1e-9);
        assert!(d.r_jb > 0.0);
    }

    #[test]
    fn site_on_vertical_surface_trace() {
        let surface = vertical_surface();
        let d = surface.distance_to(&Location::new(34.0, -118.0));
        assert_relative_eq!(d.r_jb, 0.0);
        assert_relative_eq!(d.r_rup, 0.0);
    }

    #[test]
    fn dipping_surface_footwall() {
        // 45 degree panel dipping east, buried 1 km.
        let surface =
            PlanarSurface::new(Location::new(34.0, -118.0), 0.0, 30.0, 45.0, 10.0, 1.0);
        // Site on the trace: rJB is 0 (trace over the top edge), rRup is
        // the slant distance to the buried top edge.
        let d = surface.distance_to(&Location::new(34.05, -118.0));
        assert_relative_eq!(d.r_jb, 0.0, epsilon = 1e-9);
        assert_relative_eq!(d.r_rup, 1.0, max_relative = 1e-6);
        // Footwall site: rX negative.
        let west = surface.distance_to(&Location::new(34.05, -118.2));
        assert!(west.r_x < 0.0);
        assert!(west.r_jb > 0.0);
        assert!(west.r_rup >= west.r_jb);
    }

    #[test]
    fn point_surface_distances() {
        let surface = PointSurface::new(Location::new(36.0, -120.0), 5.0);
        let d = surface.distance_to(&Location::new(36.0, -120.0));
        assert_relative_eq!(d.r_jb, 0.0);
        assert_relative_eq!(d.r_rup, 5.0);
        assert_eq!(surface.dip(), 90.0);
        assert_eq!(surface.width(), 0.0);
    }
}
