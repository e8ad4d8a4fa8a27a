//! Cluster sources: groups of fault segments that rupture together as
//! independent events within one recurrence envelope.

use crate::geo::Location;
use crate::model::source::FaultSource;
use crate::model::source_set::GmmSet;
use crate::model::SourceType;

/// A cluster of fault segments.
///
/// Each segment carries its magnitude variants as ruptures whose rate
/// slot holds the variant weight; the cluster's own recurrence rate
/// scales the combined exceedance curve.
#[derive(Debug, Clone)]
pub struct ClusterSource {
    pub name: String,
    /// unit: 1/yr
    pub rate: f64,
    pub segments: Vec<FaultSource>,
}

impl ClusterSource {
    pub fn new(name: &str, rate: f64, segments: Vec<FaultSource>) -> Self {
        assert!(
            rate.is_finite() && rate >= 0.0,
            "cluster rate must be finite and non-negative, got {}",
            rate
        );
        assert!(!segments.is_empty(), "cluster {} has no segments", name);
        Self {
            name: name.to_string(),
            rate,
            segments,
        }
    }

    pub(crate) fn within(&self, loc: &Location, distance: f64) -> bool {
        self.segments.iter().any(|segment| {
            let near = |p: Option<&Location>| {
                p.map(|p| crate::geo::horz_distance(p, loc) <= distance)
                    .unwrap_or(false)
            };
            near(segment.trace.first()) || near(segment.trace.last())
        })
    }
}

/// Container of related cluster sources.
#[derive(Debug, Clone)]
pub struct ClusterSourceSet {
    name: String,
    id: u32,
    weight: f64,
    gmm_set: GmmSet,
    clusters: Vec<ClusterSource>,
}

impl ClusterSourceSet {
    pub fn builder() -> ClusterSourceSetBuilder {
        ClusterSourceSetBuilder::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn gmm_set(&self) -> &GmmSet {
        &self.gmm_set
    }

    pub fn source_type(&self) -> SourceType {
        SourceType::Cluster
    }

    pub fn clusters(&self) -> &[ClusterSource] {
        &self.clusters
    }

    /// Clusters within `max_distance` of `loc`, in declared order.
    pub fn iter_for<'a>(
        &'a self,
        loc: &'a Location,
        max_distance: f64,
    ) -> impl Iterator<Item = &'a ClusterSource> {
        self.clusters
            .iter()
            .filter(move |c| c.within(loc, max_distance))
    }
}

/// Single-use builder of [`ClusterSourceSet`]s.
#[derive(Debug, Default)]
pub struct ClusterSourceSetBuilder {
    name: Option<String>,
    id: u32,
    weight: Option<f64>,
    gmm_set: Option<GmmSet>,
    clusters: Vec<ClusterSource>,
    built: bool,
}

impl ClusterSourceSetBuilder {
    pub fn name(&mut self, name: &str) -> &mut Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn id(&mut self, id: u32) -> &mut Self {
        self.id = id;
        self
    }

    pub fn weight(&mut self, weight: f64) -> &mut Self {
        assert!(
            weight > 0.0 && weight <= 1.0,
            "set weight must be in (0, 1], got {}",
            weight
        );
        self.weight = Some(weight);
        self
    }

    pub fn gmms(&mut self, gmm_set: GmmSet) -> &mut Self {
        self.gmm_set = Some(gmm_set);
        self
    }

    pub fn cluster(&mut self, cluster: ClusterSource) -> &mut Self {
        self.clusters.push(cluster);
        self
    }

    /// # Panics
    ///
    /// Panics if the builder has already been used or is incomplete.
    pub fn build(&mut self) -> ClusterSourceSet {
        assert!(!self.built, "this builder has already been used");
        self.built = true;
        let name = self.name.take().expect("cluster set name not set");
        let gmm_set = self.gmm_set.take().expect("cluster set has no gmms");
        assert!(!self.clusters.is_empty(), "cluster set {} is empty", name);
        ClusterSourceSet {
            name,
            id: self.id,
            weight: self.weight.unwrap_or(1.0),
            gmm_set,
            clusters: std::mem::take(&mut self.clusters),
        }
    }
}
