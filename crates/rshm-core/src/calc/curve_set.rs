//! Consolidation of per-source curves into a source-set result.

use std::collections::BTreeMap;

use crate::calc::curves::{ClusterCurves, CurveTable, HazardCurves};
use crate::data::XySequence;
use crate::gmm::Imt;
use crate::model::source_set::GmmSet;
use crate::model::SourceType;

/// The consolidated curves of one source set.
///
/// GMM logic-tree weights have been applied; the set's own weight has
/// not. It folds in exactly once, when the set is added to a hazard
/// result. Cluster sets additionally retain their per-cluster totals so
/// downstream disaggregation can trace individual clusters.
#[derive(Debug)]
pub struct HazardCurveSet {
    set_name: String,
    set_weight: f64,
    source_type: SourceType,
    curves: CurveTable,
    cluster_curves: BTreeMap<Imt, BTreeMap<String, XySequence>>,
    totals: BTreeMap<Imt, XySequence>,
}

impl HazardCurveSet {
    pub fn builder<'a>(
        set_name: &str,
        set_weight: f64,
        source_type: SourceType,
        gmm_set: &'a GmmSet,
        templates: &'a BTreeMap<Imt, XySequence>,
    ) -> HazardCurveSetBuilder<'a> {
        let mut curves = CurveTable::new();
        for (&imt, template) in templates {
            let by_gmm = curves.entry(imt).or_default();
            for gmm in gmm_set.gmms() {
                by_gmm.insert(gmm, XySequence::copy_of(template));
            }
        }
        HazardCurveSetBuilder {
            gmm_set,
            templates,
            set: HazardCurveSet {
                set_name: set_name.to_string(),
                set_weight,
                source_type,
                curves,
                cluster_curves: BTreeMap::new(),
                totals: BTreeMap::new(),
            },
        }
    }

    pub fn set_name(&self) -> &str {
        &self.set_name
    }

    pub fn set_weight(&self) -> f64 {
        self.set_weight
    }

    pub fn source_type(&self) -> SourceType {
        self.source_type
    }

    /// Weighted per-GMM aggregates.
    pub fn curves(&self) -> &CurveTable {
        &self.curves
    }

    /// Per-cluster totals; empty for non-cluster sets.
    pub fn cluster_curves(&self) -> &BTreeMap<Imt, BTreeMap<String, XySequence>> {
        &self.cluster_curves
    }

    /// Per-IMT totals over all GMMs, without the set weight.
    pub fn totals(&self) -> &BTreeMap<Imt, XySequence> {
        &self.totals
    }
}

/// Single-use builder accumulating the curves of one set's sources;
/// `build` consumes it.
#[derive(Debug)]
pub struct HazardCurveSetBuilder<'a> {
    gmm_set: &'a GmmSet,
    templates: &'a BTreeMap<Imt, XySequence>,
    set: HazardCurveSet,
}

impl<'a> HazardCurveSetBuilder<'a> {
    /// Fold in one source's curves, applying the GMM weight for the
    /// source's distance regime. The curves' transient back-references
    /// (ground motions, inputs) are dropped here.
    pub fn add_curves(&mut self, curves: HazardCurves) -> &mut Self {
        let distance = curves.min_distance();
        for (&imt, by_gmm) in curves.curves() {
            let aggregate = self.set.curves.get_mut(&imt).expect("unknown imt");
            for (&gmm, curve) in by_gmm {
                let weight = self.gmm_set.weight(gmm, distance);
                let mut weighted = XySequence::copy_of(curve);
                weighted.multiply(weight);
                aggregate.get_mut(&gmm).expect("unknown gmm").add(&weighted);
            }
        }
        self
    }

    /// Fold in one cluster's combined curves, also retaining the
    /// cluster's weighted total under its name.
    pub fn add_cluster_curves(&mut self, curves: ClusterCurves) -> &mut Self {
        let distance = curves.min_distance();
        for (&imt, by_gmm) in curves.curves() {
            let aggregate = self.set.curves.get_mut(&imt).expect("unknown imt");
            let mut cluster_total = XySequence::copy_of(&self.templates[&imt]);
            for (&gmm, curve) in by_gmm {
                let weight = self.gmm_set.weight(gmm, distance);
                let mut weighted = XySequence::copy_of(curve);
                weighted.multiply(weight);
                aggregate.get_mut(&gmm).expect("unknown gmm").add(&weighted);
                cluster_total.add(&weighted);
            }
            self.set
                .cluster_curves
                .entry(imt)
                .or_default()
                .insert(curves.cluster_name().to_string(), cluster_total);
        }
        self
    }

    /// Seal the set, totalling the per-GMM aggregates.
    pub fn build(self) -> HazardCurveSet {
        let mut set = self.set;
        let mut totals = BTreeMap::new();
        for (&imt, template) in self.templates {
            let mut total = XySequence::copy_of(template);
            if let Some(by_gmm) = set.curves.get(&imt) {
                for curve in by_gmm.values() {
                    total.add(curve);
                }
            }
            totals.insert(imt, total);
        }
        set.totals = totals;
        set
    }
}
