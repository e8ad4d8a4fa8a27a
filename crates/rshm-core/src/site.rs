//! Sites of interest and their near-surface properties.

use serde::{Deserialize, Serialize};

use crate::geo::Location;

/// Default Vs30 when none is supplied (NEHRP B/C boundary).
/// unit: m/s
pub const DEFAULT_VS30: f64 = 760.0;

/// A site at which hazard is computed.
///
/// Sites are immutable values; all fields feed directly into ground
/// motion model inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub name: String,
    pub location: Location,
    /// Average shear-wave velocity over the upper 30 m.
    /// unit: m/s
    pub vs30: f64,
    /// Whether vs30 was inferred (true) or measured (false).
    pub vs_inferred: bool,
    /// Depth to a shear-wave velocity of 1.0 km/s, if known.
    /// unit: km
    pub z1p0: Option<f64>,
    /// Depth to a shear-wave velocity of 2.5 km/s, if known.
    /// unit: km
    pub z2p5: Option<f64>,
}

impl Site {
    pub fn builder() -> SiteBuilder {
        SiteBuilder::default()
    }
}

/// Builder of `Site`s.
///
/// Unlike the single-use builders of the calculation pipeline, a site
/// builder is reusable: site-set loaders stamp out one site per grid
/// location from a shared set of default properties.
#[derive(Debug, Clone)]
pub struct SiteBuilder {
    name: Option<String>,
    location: Option<Location>,
    vs30: f64,
    vs_inferred: bool,
    z1p0: Option<f64>,
    z2p5: Option<f64>,
}

impl Default for SiteBuilder {
    fn default() -> Self {
        Self {
            name: None,
            location: None,
            vs30: DEFAULT_VS30,
            vs_inferred: true,
            z1p0: None,
            z2p5: None,
        }
    }
}

impl SiteBuilder {
    pub fn name(&mut self, name: &str) -> &mut Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn location(&mut self, location: Location) -> &mut Self {
        self.location = Some(location);
        self
    }

    pub fn vs30(&mut self, vs30: f64) -> &mut Self {
        assert!(vs30 > 0.0, "vs30 must be positive, got {}", vs30);
        self.vs30 = vs30;
        self
    }

    pub fn vs_inferred(&mut self, inferred: bool) -> &mut Self {
        self.vs_inferred = inferred;
        self
    }

    pub fn z1p0(&mut self, z1p0: f64) -> &mut Self {
        self.z1p0 = Some(z1p0);
        self
    }

    pub fn z2p5(&mut self, z2p5: f64) -> &mut Self {
        self.z2p5 = Some(z2p5);
        self
    }

    /// Build a site from the current builder state.
    ///
    /// # Panics
    ///
    /// Panics if no location has been set. An unnamed site is named after
    /// its location.
    pub fn build(&self) -> Site {
        let location = self.location.expect("site location not set");
        let name = self
            .name
            .clone()
            .unwrap_or_else(|| format!("Site ({:.3}, {:.3})", location.lon, location.lat));
        Site {
            name,
            location,
            vs30: self.vs30,
            vs_inferred: self.vs_inferred,
            z1p0: self.z1p0,
            z2p5: self.z2p5,
        }
    }
}

/// An ordered, iterable group of sites.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteSet {
    sites: Vec<Site>,
}

impl SiteSet {
    pub fn new(sites: Vec<Site>) -> Self {
        Self { sites }
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Site> {
        self.sites.iter()
    }
}

impl IntoIterator for SiteSet {
    type Item = Site;
    type IntoIter = std::vec::IntoIter<Site>;

    fn into_iter(self) -> Self::IntoIter {
        self.sites.into_iter()
    }
}
