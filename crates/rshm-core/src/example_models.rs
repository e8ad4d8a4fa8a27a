//! Example ground motion models and surfaces.
//!
//! These minimal implementations of the GMM and surface contracts back
//! the crate's own tests and doc examples. They are deliberately
//! analytic - fixed means, pure magnitude scaling, a single log-distance
//! attenuation term - so expected hazard values can be worked out by
//! hand. Real empirical models live outside this crate.

use serde::{Deserialize, Serialize};

use crate::calc::HazardInput;
use crate::gmm::{GroundMotionModel, ScalarGroundMotion};
use crate::model::surface::{Distance, RuptureSurface};

/// Returns the same (mean, sigma) for every input.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConstantGmm {
    /// unit: ln g
    pub mean: f64,
    /// unit: ln g
    pub sigma: f64,
}

impl GroundMotionModel for ConstantGmm {
    fn calc(&self, _input: &HazardInput) -> ScalarGroundMotion {
        ScalarGroundMotion::new(self.mean, self.sigma)
    }
}

/// Mean scales with magnitude only: `mean = c0 + c1 * mag`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MagScalingGmm {
    pub c0: f64,
    pub c1: f64,
    /// unit: ln g
    pub sigma: f64,
}

impl GroundMotionModel for MagScalingGmm {
    fn calc(&self, input: &HazardInput) -> ScalarGroundMotion {
        ScalarGroundMotion::new(self.c0 + self.c1 * input.mag, self.sigma)
    }
}

/// A compact attenuation form:
/// `mean = c0 + c1 * mag - c2 * ln(rJB + c3)`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AttenuatingGmm {
    pub c0: f64,
    pub c1: f64,
    pub c2: f64,
    /// unit: km
    pub c3: f64,
    /// unit: ln g
    pub sigma: f64,
}

impl GroundMotionModel for AttenuatingGmm {
    fn calc(&self, input: &HazardInput) -> ScalarGroundMotion {
        let mean = self.c0 + self.c1 * input.mag - self.c2 * (input.r_jb + self.c3).ln();
        ScalarGroundMotion::new(mean, self.sigma)
    }
}

/// A surface that reports preset distances regardless of site, with a
/// vertical, surface-reaching geometry.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FixedDistanceSurface {
    /// unit: km
    pub r_jb: f64,
    /// unit: km
    pub r_rup: f64,
    /// unit: km
    pub r_x: f64,
    /// unit: km
    pub width: f64,
}

impl FixedDistanceSurface {
    pub fn at(r: f64) -> Self {
        Self {
            r_jb: r,
            r_rup: r,
            r_x: r,
            width: 12.0,
        }
    }
}

impl RuptureSurface for FixedDistanceSurface {
    fn distance_to(&self, _loc: &crate::geo::Location) -> Distance {
        Distance {
            r_jb: self.r_jb,
            r_rup: self.r_rup,
            r_x: self.r_x,
        }
    }

    fn dip(&self) -> f64 {
        90.0
    }

    fn width(&self) -> f64 {
        self.width
    }

    fn depth(&self) -> f64 {
        0.0
    }
}
