//! Single-use builder for hazard models.

use std::sync::Arc;

use crate::calc::CalcConfig;
use crate::gmm::GmmProvider;
use crate::model::cluster::ClusterSourceSet;
use crate::model::source_set::SourceSet;
use crate::model::system::SystemSourceSet;
use crate::model::{HazardModel, SourceSetVariant};

/// Builds a [`HazardModel`] from source sets, a config, and a GMM
/// registry. Sets are kept in the order they are added; that order fixes
/// consolidation order for the lifetime of the model.
#[derive(Default)]
pub struct HazardModelBuilder {
    name: Option<String>,
    source_sets: Vec<SourceSetVariant>,
    config: Option<CalcConfig>,
    gmms: Option<Arc<dyn GmmProvider>>,
    built: bool,
}

impl HazardModelBuilder {
    pub fn name(&mut self, name: &str) -> &mut Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn config(&mut self, config: CalcConfig) -> &mut Self {
        self.config = Some(config);
        self
    }

    pub fn gmm_provider(&mut self, gmms: Arc<dyn GmmProvider>) -> &mut Self {
        self.gmms = Some(gmms);
        self
    }

    pub fn source_set(&mut self, set: SourceSet) -> &mut Self {
        self.source_sets.push(SourceSetVariant::Standard(set));
        self
    }

    pub fn cluster_set(&mut self, set: ClusterSourceSet) -> &mut Self {
        self.source_sets.push(SourceSetVariant::Cluster(set));
        self
    }

    pub fn system_set(&mut self, set: SystemSourceSet) -> &mut Self {
        self.source_sets.push(SourceSetVariant::System(set));
        self
    }

    /// # Panics
    ///
    /// Panics if the builder has already been used, or if the name,
    /// config, GMM provider, or source sets are missing.
    pub fn build(&mut self) -> HazardModel {
        assert!(!self.built, "this builder has already been used");
        self.built = true;
        let name = self.name.take().expect("model name not set");
        let config = self.config.take().expect("model config not set");
        let gmms = self.gmms.take().expect("model gmm provider not set");
        assert!(!self.source_sets.is_empty(), "model {} has no source sets", name);
        HazardModel {
            name,
            source_sets: std::mem::take(&mut self.source_sets),
            config,
            gmms,
        }
    }
}
