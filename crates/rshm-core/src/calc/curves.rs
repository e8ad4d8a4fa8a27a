//! Per-source hazard curves.

use std::collections::BTreeMap;

use crate::calc::ground_motions::{ClusterGroundMotions, GroundMotions};
use crate::data::XySequence;
use crate::gmm::{Gmm, Imt};

pub(crate) type CurveTable = BTreeMap<Imt, BTreeMap<Gmm, XySequence>>;

/// The (IMT, GMM)-keyed exceedance-rate curves of one source.
///
/// Still in the log-amplitude domain; y-values are annual rates, not
/// probabilities. The ground motions (and through them the inputs) ride
/// along so consolidation can read the source's minimum distance, and
/// are dropped when the enclosing curve set seals.
#[derive(Debug)]
pub struct HazardCurves {
    ground_motions: GroundMotions,
    curves: CurveTable,
}

impl HazardCurves {
    pub fn builder(ground_motions: GroundMotions) -> HazardCurvesBuilder {
        HazardCurvesBuilder {
            ground_motions,
            curves: CurveTable::new(),
        }
    }

    pub fn curves(&self) -> &CurveTable {
        &self.curves
    }

    pub fn min_distance(&self) -> f64 {
        self.ground_motions.min_distance()
    }
}

/// Single-use builder; consumed by `build`.
#[derive(Debug)]
pub struct HazardCurvesBuilder {
    ground_motions: GroundMotions,
    curves: CurveTable,
}

impl HazardCurvesBuilder {
    pub fn add_curve(&mut self, imt: Imt, gmm: Gmm, curve: XySequence) -> &mut Self {
        self.curves.entry(imt).or_default().insert(gmm, curve);
        self
    }

    pub fn build(self) -> HazardCurves {
        HazardCurves {
            ground_motions: self.ground_motions,
            curves: self.curves,
        }
    }
}

/// The combined curves of one cluster source.
///
/// Y-values are already joint exceedance probabilities scaled by the
/// cluster rate, i.e. annual rates ready for Poisson addition with the
/// rest of the model.
#[derive(Debug)]
pub struct ClusterCurves {
    cluster_name: String,
    min_distance: f64,
    curves: CurveTable,
}

impl ClusterCurves {
    pub fn builder(ground_motions: &ClusterGroundMotions) -> ClusterCurvesBuilder {
        ClusterCurvesBuilder {
            curves: ClusterCurves {
                cluster_name: ground_motions.cluster_name.clone(),
                min_distance: ground_motions.min_distance(),
                curves: CurveTable::new(),
            },
        }
    }

    pub fn cluster_name(&self) -> &str {
        &self.cluster_name
    }

    pub fn curves(&self) -> &CurveTable {
        &self.curves
    }

    pub fn min_distance(&self) -> f64 {
        self.min_distance
    }
}

/// Single-use builder; consumed by `build`.
#[derive(Debug)]
pub struct ClusterCurvesBuilder {
    curves: ClusterCurves,
}

impl ClusterCurvesBuilder {
    pub fn add_curve(&mut self, imt: Imt, gmm: Gmm, curve: XySequence) -> &mut Self {
        self.curves.curves.entry(imt).or_default().insert(gmm, curve);
        self
    }

    pub fn build(self) -> ClusterCurves {
        self.curves
    }
}
