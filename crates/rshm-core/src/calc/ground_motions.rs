//! Tables of ground motions, aligned to the inputs that produced them.

use std::collections::BTreeMap;

use crate::calc::inputs::{ClusterInputs, InputList};
use crate::gmm::{Gmm, Imt, ScalarGroundMotion};

type Table = BTreeMap<Imt, BTreeMap<Gmm, Vec<f64>>>;

/// The (IMT, GMM)-keyed log-means and sigmas for every input of one
/// source. Owns its input list; the pair travels through the rest of
/// the pipeline together and is dropped when the enclosing curve set
/// seals.
#[derive(Debug)]
pub struct GroundMotions {
    inputs: InputList,
    means: Table,
    sigmas: Table,
}

impl GroundMotions {
    /// Start a builder with every (imt, gmm) slot pre-sized to the
    /// input count.
    pub fn builder(inputs: InputList, gmms: &[Gmm], imts: &[Imt]) -> GroundMotionsBuilder {
        let template: BTreeMap<Gmm, Vec<f64>> = gmms
            .iter()
            .map(|&g| (g, vec![f64::NAN; inputs.len()]))
            .collect();
        let means: Table = imts.iter().map(|&imt| (imt, template.clone())).collect();
        let sigmas = means.clone();
        let remaining = if inputs.is_empty() {
            0
        } else {
            gmms.len() * imts.len()
        };
        GroundMotionsBuilder {
            motions: GroundMotions {
                inputs,
                means,
                sigmas,
            },
            remaining,
        }
    }

    pub fn inputs(&self) -> &InputList {
        &self.inputs
    }

    pub fn means(&self, imt: Imt) -> &BTreeMap<Gmm, Vec<f64>> {
        &self.means[&imt]
    }

    pub fn sigmas(&self, imt: Imt) -> &BTreeMap<Gmm, Vec<f64>> {
        &self.sigmas[&imt]
    }

    pub fn min_distance(&self) -> f64 {
        self.inputs.min_distance()
    }
}

/// Single-use builder: `build` consumes it, and every (gmm, imt, input)
/// cell must have been filled in order.
#[derive(Debug)]
pub struct GroundMotionsBuilder {
    motions: GroundMotions,
    remaining: usize,
}

impl GroundMotionsBuilder {
    /// The inputs being evaluated.
    pub fn inputs(&self) -> &InputList {
        &self.motions.inputs
    }

    /// Record the motion of input `index` under (`gmm`, `imt`).
    pub fn add(&mut self, gmm: Gmm, imt: Imt, motion: ScalarGroundMotion, index: usize) {
        let means = self
            .motions
            .means
            .get_mut(&imt)
            .and_then(|m| m.get_mut(&gmm))
            .expect("unknown (gmm, imt) cell");
        means[index] = motion.mean;
        self.motions.sigmas.get_mut(&imt).unwrap().get_mut(&gmm).unwrap()[index] = motion.sigma;
        if index + 1 == self.motions.inputs.len() {
            self.remaining -= 1;
        }
    }

    /// # Panics
    ///
    /// Panics if any cell was left unfilled.
    pub fn build(self) -> GroundMotions {
        assert_eq!(
            self.remaining, 0,
            "ground motion table has unfilled cells"
        );
        self.motions
    }
}

/// The per-segment ground motions of one cluster source.
#[derive(Debug)]
pub struct ClusterGroundMotions {
    pub(crate) cluster_name: String,
    pub(crate) rate: f64,
    pub(crate) segments: Vec<GroundMotions>,
}

impl ClusterGroundMotions {
    pub fn new(inputs: &ClusterInputs) -> Self {
        Self {
            cluster_name: inputs.cluster_name.clone(),
            rate: inputs.rate,
            segments: Vec::new(),
        }
    }

    pub fn add(&mut self, motions: GroundMotions) {
        self.segments.push(motions);
    }

    pub fn min_distance(&self) -> f64 {
        self.segments
            .iter()
            .map(GroundMotions::min_distance)
            .fold(f64::INFINITY, f64::min)
    }
}
