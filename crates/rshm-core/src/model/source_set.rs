//! Source sets: logic-tree branches bundling sources with a GMM tree.

use std::collections::BTreeMap;

use crate::errors::{RSHMError, RSHMResult};
use crate::geo::Location;
use crate::gmm::Gmm;
use crate::model::source::Source;
use crate::model::SourceType;

/// Tolerance on the sum of the weights of one distance regime.
pub const WEIGHT_TOLERANCE: f64 = 1e-9;

/// The GMM logic tree of a source set.
///
/// Weights come in up to two distance regimes: a near-field map that
/// always exists and an optional far-field map that takes over beyond a
/// cutoff distance. An interpolation band centered on the cutoff blends
/// the two linearly; the band width is a property of the set, not a
/// global constant.
#[derive(Debug, Clone)]
pub struct GmmSet {
    near_weights: BTreeMap<Gmm, f64>,
    far_weights: Option<BTreeMap<Gmm, f64>>,
    /// unit: km
    cutoff_distance: f64,
    /// unit: km
    band_width: f64,
}

impl GmmSet {
    pub fn builder() -> GmmSetBuilder {
        GmmSetBuilder::default()
    }

    /// All gmms participating in either regime, in id order.
    pub fn gmms(&self) -> impl Iterator<Item = Gmm> + '_ {
        let far = self.far_weights.iter().flat_map(|m| m.keys());
        let mut ids: Vec<Gmm> = self.near_weights.keys().chain(far).copied().collect();
        ids.sort_unstable();
        ids.dedup();
        ids.into_iter()
    }

    /// Logic-tree weight of `gmm` for a source at `distance`.
    ///
    /// Sources at and below `cutoff − band/2` take the near-field
    /// weight, sources at and above `cutoff + band/2` the far-field
    /// weight, and sources inside the band a linear blend.
    pub fn weight(&self, gmm: Gmm, distance: f64) -> f64 {
        let near = self.near_weights.get(&gmm).copied().unwrap_or(0.0);
        let Some(far_map) = &self.far_weights else {
            return near;
        };
        let far = far_map.get(&gmm).copied().unwrap_or(0.0);
        let half = self.band_width / 2.0;
        if distance <= self.cutoff_distance - half {
            near
        } else if distance >= self.cutoff_distance + half {
            far
        } else {
            let t = (distance - self.cutoff_distance + half) / self.band_width;
            near + (far - near) * t
        }
    }
}

/// Single-use builder of [`GmmSet`]s.
#[derive(Debug, Default)]
pub struct GmmSetBuilder {
    near: BTreeMap<Gmm, f64>,
    far: Option<BTreeMap<Gmm, f64>>,
    cutoff_distance: f64,
    band_width: f64,
    built: bool,
}

impl GmmSetBuilder {
    /// Add a near-field (or only-regime) weight.
    pub fn near_weight(&mut self, gmm: Gmm, weight: f64) -> &mut Self {
        self.near.insert(gmm, weight);
        self
    }

    /// Add a far-field weight; the first call establishes the regime.
    pub fn far_weight(&mut self, gmm: Gmm, weight: f64) -> &mut Self {
        self.far.get_or_insert_with(BTreeMap::new).insert(gmm, weight);
        self
    }

    /// Set the regime cutoff distance and the interpolation band width
    /// centered on it. A zero band degenerates to a hard cutoff.
    pub fn cutoff(&mut self, distance: f64, band_width: f64) -> &mut Self {
        assert!(distance > 0.0, "cutoff distance must be positive");
        assert!(band_width >= 0.0, "band width may not be negative");
        self.cutoff_distance = distance;
        self.band_width = band_width;
        self
    }

    /// # Panics
    ///
    /// Panics if the builder has already been used, or if a far-field
    /// regime was supplied without a cutoff.
    pub fn build(&mut self) -> RSHMResult<GmmSet> {
        assert!(!self.built, "this builder has already been used");
        self.built = true;
        check_weights(&self.near, "near-field")?;
        if let Some(far) = &self.far {
            assert!(
                self.cutoff_distance > 0.0,
                "a far-field regime requires a cutoff distance"
            );
            check_weights(far, "far-field")?;
        }
        Ok(GmmSet {
            near_weights: std::mem::take(&mut self.near),
            far_weights: self.far.take(),
            cutoff_distance: self.cutoff_distance,
            band_width: self.band_width,
        })
    }
}

fn check_weights(weights: &BTreeMap<Gmm, f64>, regime: &'static str) -> RSHMResult<()> {
    if weights.is_empty() {
        return Err(RSHMError::Config(format!(
            "{} gmm weight map is empty",
            regime
        )));
    }
    let sum: f64 = weights.values().sum();
    if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
        return Err(RSHMError::GmmWeights { regime, sum });
    }
    Ok(())
}

/// A weighted bundle of sources sharing one GMM logic tree.
#[derive(Debug, Clone)]
pub struct SourceSet {
    name: String,
    id: u32,
    /// Logic-tree weight of this set, in (0, 1].
    weight: f64,
    gmm_set: GmmSet,
    source_type: SourceType,
    sources: Vec<Source>,
}

impl SourceSet {
    pub fn builder(source_type: SourceType) -> SourceSetBuilder {
        SourceSetBuilder::new(source_type)
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
        self.source_type
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Sources within `max_distance` of `loc`, in declared order.
    pub fn iter_for<'a>(
        &'a self,
        loc: &'a Location,
        max_distance: f64,
    ) -> impl Iterator<Item = &'a Source> {
        self.sources
            .iter()
            .filter(move |s| s.within(loc, max_distance))
    }
}

/// Single-use builder of [`SourceSet`]s.
#[derive(Debug)]
pub struct SourceSetBuilder {
    source_type: SourceType,
    name: Option<String>,
    id: u32,
    weight: f64,
    gmm_set: Option<GmmSet>,
    sources: Vec<Source>,
    built: bool,
}

impl SourceSetBuilder {
    fn new(source_type: SourceType) -> Self {
        assert!(
            !matches!(source_type, SourceType::Cluster | SourceType::System),
            "{} sets have dedicated containers",
            source_type
        );
        Self {
            source_type,
            name: None,
            id: 0,
            weight: 1.0,
            gmm_set: None,
            sources: Vec::new(),
            built: false,
        }
    }

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
        self.weight = weight;
        self
    }

    pub fn gmms(&mut self, gmm_set: GmmSet) -> &mut Self {
        self.gmm_set = Some(gmm_set);
        self
    }

    /// # Panics
    ///
    /// Panics if the source variant does not match the set type.
    pub fn source(&mut self, source: Source) -> &mut Self {
        let matches = matches!(
            (&source, self.source_type),
            (Source::Fault(_), SourceType::Fault)
                | (Source::Interface(_), SourceType::Interface)
                | (Source::Grid(_), SourceType::Grid)
                | (Source::Area(_), SourceType::Area)
        );
        assert!(
            matches,
            "source {} does not belong in a {} set",
            source.name(),
            self.source_type
        );
        self.sources.push(source);
        self
    }

    /// # Panics
    ///
    /// Panics if the builder has already been used or is missing its
    /// name, gmm set, or sources.
    pub fn build(&mut self) -> SourceSet {
        assert!(!self.built, "this builder has already been used");
        self.built = true;
        let name = self.name.take().expect("source set name not set");
        let gmm_set = self.gmm_set.take().expect("source set has no gmms");
        assert!(!self.sources.is_empty(), "source set {} is empty", name);
        SourceSet {
            name,
            id: self.id,
            weight: self.weight,
            gmm_set,
            source_type: self.source_type,
            sources: std::mem::take(&mut self.sources),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn two_regime_set() -> GmmSet {
        let mut builder = GmmSet::builder();
        builder
            .near_weight(Gmm::BooreAtkinson08, 0.6)
            .near_weight(Gmm::ChiouYoungs08, 0.4)
            .far_weight(Gmm::AtkinsonBoore06, 1.0)
            .cutoff(100.0, 40.0);
        builder.build().unwrap()
    }

    #[test]
    fn weight_sum_violation() {
        let mut builder = GmmSet::builder();
        builder
            .near_weight(Gmm::BooreAtkinson08, 0.6)
            .near_weight(Gmm::ChiouYoungs08, 0.5);
        match builder.build() {
            Err(RSHMError::GmmWeights { regime, sum }) => {
                assert_eq!(regime, "near-field");
                assert_relative_eq!(sum, 1.1, epsilon = 1e-12);
            }
            other => panic!("expected GmmWeights error, got {:?}", other),
        }
    }

    #[test]
    fn weights_within_tolerance_pass() {
        let mut builder = GmmSet::builder();
        builder
            .near_weight(Gmm::BooreAtkinson08, 0.5 + 4e-10)
            .near_weight(Gmm::ChiouYoungs08, 0.5);
        assert!(builder.build().is_ok());
    }

    #[test]
    fn regime_selection_and_blend() {
        let set = two_regime_set();
        // below the band
        assert_relative_eq!(set.weight(Gmm::BooreAtkinson08, 50.0), 0.6);
        assert_relative_eq!(set.weight(Gmm::AtkinsonBoore06, 50.0), 0.0);
        // above the band
        assert_relative_eq!(set.weight(Gmm::BooreAtkinson08, 150.0), 0.0);
        assert_relative_eq!(set.weight(Gmm::AtkinsonBoore06, 150.0), 1.0);
        // band edges match the regime maps bitwise
        assert_eq!(set.weight(Gmm::BooreAtkinson08, 80.0), 0.6);
        assert_eq!(set.weight(Gmm::BooreAtkinson08, 120.0), 0.0);
        // midpoint blends evenly
        assert_relative_eq!(set.weight(Gmm::BooreAtkinson08, 100.0), 0.3);
        assert_relative_eq!(set.weight(Gmm::AtkinsonBoore06, 100.0), 0.5);
        // weights still close at every distance
        for d in [50.0, 90.0, 100.0, 110.0, 150.0] {
            let total: f64 = set.gmms().map(|g| set.weight(g, d)).sum();
            assert_relative_eq!(total, 1.0, max_relative = 1e-12);
        }
    }

    #[test]
    #[should_panic(expected = "already been used")]
    fn gmm_builder_is_single_use() {
        let mut builder = GmmSet::builder();
        builder.near_weight(Gmm::Sadigh97, 1.0);
        let _ = builder.build();
        let _ = builder.build();
    }
}
