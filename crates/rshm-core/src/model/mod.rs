//! The earthquake-source model: a weighted, ordered collection of source
//! sets plus the calculation configuration and GMM registry they share.
//!
//! Models are assembled by loaders (or tests) through the single-use
//! [`HazardModelBuilder`]; once built they are immutable and safe to
//! share across calculation threads.

mod builder;
pub mod cluster;
pub mod source;
pub mod source_set;
pub mod surface;
pub mod system;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::calc::CalcConfig;
use crate::gmm::GmmProvider;

pub use builder::HazardModelBuilder;
pub use cluster::{ClusterSource, ClusterSourceSet};
pub use source::{AreaSource, FaultSource, GridSource, InterfaceSource, Rupture, Source};
pub use source_set::{GmmSet, SourceSet, WEIGHT_TOLERANCE};
pub use surface::{hypocentral_depth, Distance, PlanarSurface, PointSurface, RuptureSurface};
pub use system::{SystemRupture, SystemSourceSet};

/// The closed set of source categories.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum SourceType {
    Area,
    Cluster,
    Fault,
    Grid,
    Interface,
    System,
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SourceType::Area => "Area",
            SourceType::Cluster => "Cluster",
            SourceType::Fault => "Fault",
            SourceType::Grid => "Grid",
            SourceType::Interface => "Interface",
            SourceType::System => "System",
        };
        f.write_str(label)
    }
}

/// A source set of any category.
///
/// Standard sets fan out per source; cluster and system sets carry
/// their own calculation paths.
#[derive(Debug)]
pub enum SourceSetVariant {
    Standard(SourceSet),
    Cluster(ClusterSourceSet),
    System(SystemSourceSet),
}

impl SourceSetVariant {
    pub fn name(&self) -> &str {
        match self {
            SourceSetVariant::Standard(s) => s.name(),
            SourceSetVariant::Cluster(s) => s.name(),
            SourceSetVariant::System(s) => s.name(),
        }
    }

    pub fn weight(&self) -> f64 {
        match self {
            SourceSetVariant::Standard(s) => s.weight(),
            SourceSetVariant::Cluster(s) => s.weight(),
            SourceSetVariant::System(s) => s.weight(),
        }
    }

    pub fn gmm_set(&self) -> &GmmSet {
        match self {
            SourceSetVariant::Standard(s) => s.gmm_set(),
            SourceSetVariant::Cluster(s) => s.gmm_set(),
            SourceSetVariant::System(s) => s.gmm_set(),
        }
    }

    pub fn source_type(&self) -> SourceType {
        match self {
            SourceSetVariant::Standard(s) => s.source_type(),
            SourceSetVariant::Cluster(s) => s.source_type(),
            SourceSetVariant::System(s) => s.source_type(),
        }
    }
}

/// A sealed earthquake-source model.
#[derive(Debug)]
pub struct HazardModel {
    name: String,
    source_sets: Vec<SourceSetVariant>,
    config: CalcConfig,
    gmms: Arc<dyn GmmProvider>,
}

impl HazardModel {
    pub fn builder() -> HazardModelBuilder {
        HazardModelBuilder::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Source sets in declared order.
    pub fn source_sets(&self) -> &[SourceSetVariant] {
        &self.source_sets
    }

    /// The calculation configuration bundled with this model.
    pub fn config(&self) -> &CalcConfig {
        &self.config
    }

    pub fn gmm_provider(&self) -> &dyn GmmProvider {
        self.gmms.as_ref()
    }
}
