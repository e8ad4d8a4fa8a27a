//! The terminal hazard result for one site.

use std::collections::BTreeMap;
use std::sync::Arc;

use ndarray::Array1;
use serde::Serialize;

use crate::calc::config::CalcConfig;
use crate::calc::curve_set::HazardCurveSet;
use crate::data::{rate_to_probability, XySequence};
use crate::gmm::Imt;
use crate::model::SourceType;
use crate::site::Site;

/// Consolidated hazard at one site.
///
/// Carries each IMT's total curve in two forms: the log-amplitude,
/// annual-rate form the pipeline computed, and the linear-amplitude,
/// Poisson-probability form most consumers want. Per-source-type
/// roll-ups expose the fault/grid/cluster/... contributions.
#[derive(Debug, Serialize)]
pub struct HazardResult {
    site: Site,
    model_name: String,
    /// unit: yr
    timespan: f64,
    rate_curves: BTreeMap<Imt, XySequence>,
    probability_curves: BTreeMap<Imt, XySequence>,
    type_curves: BTreeMap<SourceType, BTreeMap<Imt, XySequence>>,
}

impl HazardResult {
    pub fn builder(config: &CalcConfig, site: &Site, model_name: &str) -> HazardResultBuilder {
        let totals = config
            .log_model_curves()
            .iter()
            .map(|(&imt, template)| (imt, XySequence::copy_of(template)))
            .collect();
        HazardResultBuilder {
            templates: config.log_model_curves().clone(),
            timespan: config.timespan(),
            site: site.clone(),
            model_name: model_name.to_string(),
            totals,
            type_totals: BTreeMap::new(),
        }
    }

    pub fn site(&self) -> &Site {
        &self.site
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// unit: yr
    pub fn timespan(&self) -> f64 {
        self.timespan
    }

    /// Total curves in the log-amplitude, annual-rate domain.
    pub fn curves(&self) -> &BTreeMap<Imt, XySequence> {
        &self.rate_curves
    }

    /// Total curves in linear amplitude with Poisson probabilities of
    /// exceedance over the configured timespan.
    pub fn probability_curves(&self) -> &BTreeMap<Imt, XySequence> {
        &self.probability_curves
    }

    /// Per-source-type roll-ups, log-amplitude annual rates.
    pub fn type_curves(&self) -> &BTreeMap<SourceType, BTreeMap<Imt, XySequence>> {
        &self.type_curves
    }
}

/// Single-use builder folding curve sets into a result; consumed by
/// `build`.
#[derive(Debug)]
pub struct HazardResultBuilder {
    templates: BTreeMap<Imt, XySequence>,
    timespan: f64,
    site: Site,
    model_name: String,
    totals: BTreeMap<Imt, XySequence>,
    type_totals: BTreeMap<SourceType, BTreeMap<Imt, XySequence>>,
}

impl HazardResultBuilder {
    /// Fold in one source set, applying its weight exactly once.
    pub fn add_curve_set(&mut self, set: &HazardCurveSet) -> &mut Self {
        let weight = set.set_weight();
        if !self.type_totals.contains_key(&set.source_type()) {
            let zeroed = self
                .templates
                .iter()
                .map(|(&imt, template)| (imt, XySequence::copy_of(template)))
                .collect();
            self.type_totals.insert(set.source_type(), zeroed);
        }
        let by_type = self
            .type_totals
            .get_mut(&set.source_type())
            .expect("just inserted");
        for (&imt, total) in set.totals() {
            let mut weighted = XySequence::copy_of(total);
            weighted.multiply(weight);
            self.totals
                .get_mut(&imt)
                .expect("unknown imt")
                .add(&weighted);
            by_type.get_mut(&imt).expect("unknown imt").add(&weighted);
        }
        self
    }

    /// Seal the result, materializing the linear-x probability form.
    pub fn build(self) -> HazardResult {
        let probability_curves = self
            .totals
            .iter()
            .map(|(&imt, rates)| {
                let xs: Array1<f64> = rates.xs().mapv(f64::exp);
                let ys = rates
                    .ys()
                    .mapv(|rate| rate_to_probability(rate, self.timespan));
                (imt, XySequence::new(Arc::new(xs), ys))
            })
            .collect();
        HazardResult {
            site: self.site,
            model_name: self.model_name,
            timespan: self.timespan,
            rate_curves: self.totals,
            probability_curves,
            type_curves: self.type_totals,
        }
    }
}
