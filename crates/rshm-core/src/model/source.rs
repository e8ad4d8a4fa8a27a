//! The closed source taxonomy and its rupture containers.

use std::sync::Arc;

use crate::geo::{self, Location};
use crate::model::surface::RuptureSurface;

/// One potential earthquake.
#[derive(Debug, Clone)]
pub struct Rupture {
    /// Annual rate of occurrence. For the magnitude variants of cluster
    /// segments this slot instead carries the variant weight.
    /// unit: 1/yr
    pub rate: f64,
    /// Moment magnitude.
    pub mag: f64,
    /// Slip sense.
    /// unit: decimal degrees
    pub rake: f64,
    pub surface: Arc<dyn RuptureSurface>,
}

impl Rupture {
    pub fn new(rate: f64, mag: f64, rake: f64, surface: Arc<dyn RuptureSurface>) -> Self {
        Self {
            rate,
            mag,
            rake,
            surface,
        }
    }
}

/// A crustal fault source.
#[derive(Debug, Clone)]
pub struct FaultSource {
    pub name: String,
    /// Upper trace of the fault; the endpoints seed the set-level
    /// distance pre-filter.
    pub trace: Vec<Location>,
    pub ruptures: Vec<Rupture>,
}

/// A subduction interface source.
#[derive(Debug, Clone)]
pub struct InterfaceSource {
    pub name: String,
    pub trace: Vec<Location>,
    pub lower_trace: Vec<Location>,
    pub ruptures: Vec<Rupture>,
}

/// A single cell of a gridded (smoothed) seismicity source.
#[derive(Debug, Clone)]
pub struct GridSource {
    pub name: String,
    pub location: Location,
    pub ruptures: Vec<Rupture>,
}

/// An areal source zone, pre-integrated over gridded sub-sources by the
/// model loader; ruptures enumerate (grid point × magnitude) in declared
/// order.
#[derive(Debug, Clone)]
pub struct AreaSource {
    pub name: String,
    pub border: Vec<Location>,
    pub ruptures: Vec<Rupture>,
}

/// A generator of ruptures.
///
/// The taxonomy is closed: the pipeline dispatches on the variant, and
/// each variant supplies its own distance-filter geometry. Cluster and
/// system sources are handled at the source-set level.
#[derive(Debug, Clone)]
pub enum Source {
    Fault(FaultSource),
    Interface(InterfaceSource),
    Grid(GridSource),
    Area(AreaSource),
}

impl Source {
    pub fn name(&self) -> &str {
        match self {
            Source::Fault(s) => &s.name,
            Source::Interface(s) => &s.name,
            Source::Grid(s) => &s.name,
            Source::Area(s) => &s.name,
        }
    }

    /// Ruptures in declared order.
    pub fn ruptures(&self) -> &[Rupture] {
        match self {
            Source::Fault(s) => &s.ruptures,
            Source::Interface(s) => &s.ruptures,
            Source::Grid(s) => &s.ruptures,
            Source::Area(s) => &s.ruptures,
        }
    }

    /// Coarse test of whether any part of this source lies within
    /// `distance` of `loc`; used only by the set-level pre-filter.
    pub(crate) fn within(&self, loc: &Location, distance: f64) -> bool {
        let near = |p: &Location| geo::horz_distance(p, loc) <= distance;
        match self {
            Source::Fault(s) => ends_within(&s.trace, loc, distance),
            Source::Interface(s) => {
                ends_within(&s.trace, loc, distance)
                    || ends_within(&s.lower_trace, loc, distance)
            }
            Source::Grid(s) => near(&s.location),
            Source::Area(s) => s.border.iter().any(near),
        }
    }
}

fn ends_within(trace: &[Location], loc: &Location, distance: f64) -> bool {
    let near = |p: Option<&Location>| {
        p.map(|p| geo::horz_distance(p, loc) <= distance)
            .unwrap_or(false)
    };
    near(trace.first()) || near(trace.last())
}
