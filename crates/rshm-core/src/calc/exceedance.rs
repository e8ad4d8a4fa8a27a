//! Truncated-normal exceedance models.
//!
//! A hazard curve integrates, at every amplitude level, the probability
//! that a log-normally distributed ground motion exceeds that level.
//! The model variants differ only in how the distribution's tails are
//! truncated; all operate on means and x-values in the same natural-log
//! domain.

use serde::{Deserialize, Serialize};

use crate::data::XySequence;
use crate::gmm::Imt;

const SQRT_2: f64 = std::f64::consts::SQRT_2;

/// The closed set of exceedance-model variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExceedanceModel {
    /// No truncation: the raw normal complementary CDF.
    None,
    /// Probabilities are zeroed above `mean + n·sigma` and renormalized.
    TruncationUpperOnly,
    /// Symmetric truncation at `mean ± n·sigma`.
    TruncationLowerUpper,
    /// Upper truncation plus the fixed maximum-intensity caps applied to
    /// models of the central and eastern US: PGA 3 g, short-period SA
    /// 6 g, PGV 400 cm/s.
    NshmCeusMaxIntensity,
}

impl ExceedanceModel {
    /// Probability of exceeding `x` for a log-normal ground motion with
    /// the supplied log-`mean` and `sigma`, truncated at `n` sigma.
    ///
    /// A zero sigma collapses the distribution to a delta at the mean:
    /// exceedance is a step function regardless of variant.
    pub fn exceedance(&self, mean: f64, sigma: f64, n: f64, imt: Imt, x: f64) -> f64 {
        if sigma == 0.0 {
            return if x < mean { 1.0 } else { 0.0 };
        }
        match self {
            ExceedanceModel::None => ccd(mean, sigma, x),
            ExceedanceModel::TruncationUpperOnly => {
                let p_hi = ccd(mean, sigma, mean + n * sigma);
                bounded(ccd(mean, sigma, x), p_hi, 1.0)
            }
            ExceedanceModel::TruncationLowerUpper => {
                let p_hi = ccd(mean, sigma, mean + n * sigma);
                let p_lo = ccd(mean, sigma, mean - n * sigma);
                bounded(ccd(mean, sigma, x), p_hi, p_lo)
            }
            ExceedanceModel::NshmCeusMaxIntensity => {
                let cap = max_intensity(imt).ln();
                let p_hi = ccd(mean, sigma, (mean + n * sigma).min(cap));
                bounded(ccd(mean, sigma, x), p_hi, 1.0)
            }
        }
    }

    /// Fill `curve` with exceedance probabilities at each of its
    /// x-values.
    pub fn fill(&self, mean: f64, sigma: f64, n: f64, imt: Imt, curve: &mut XySequence) {
        for i in 0..curve.len() {
            let p = self.exceedance(mean, sigma, n, imt, curve.x(i));
            curve.set_y(i, p);
        }
    }
}

/// Renormalize a raw exceedance probability against the truncated tail
/// masses, clamping into [0, 1].
fn bounded(p: f64, p_hi: f64, p_lo: f64) -> f64 {
    ((p - p_hi) / (p_lo - p_hi)).clamp(0.0, 1.0)
}

/// Normal complementary CDF.
fn ccd(mean: f64, sigma: f64, x: f64) -> f64 {
    0.5 * erfc((x - mean) / (sigma * SQRT_2))
}

fn erfc(x: f64) -> f64 {
    1.0 - erf(x)
}

/// Abramowitz & Stegun 7.1.26 rational approximation; max absolute
/// error 1.5e-7, far below any hazard-curve tolerance of interest.
fn erf(x: f64) -> f64 {
    if x < 0.0 {
        -erf_base(-x)
    } else {
        erf_base(x)
    }
}

const P: f64 = 0.3275911;
const A1: f64 = 0.254829592;
const A2: f64 = -0.284496736;
const A3: f64 = 1.421413741;
const A4: f64 = -1.453152027;
const A5: f64 = 1.061405429;

fn erf_base(x: f64) -> f64 {
    let t = 1.0 / (1.0 + P * x);
    1.0 - (A1 * t + A2 * t * t + A3 * t * t * t + A4 * t * t * t * t + A5 * t * t * t * t * t)
        * (-x * x).exp()
}

/// Model-imposed maximum intensity; unbounded where no cap applies.
/// unit: g, except PGV in cm/s
fn max_intensity(imt: Imt) -> f64 {
    match imt {
        Imt::Pga => 3.0,
        Imt::Pgv => 400.0,
        _ => match imt.period() {
            Some(period) if period < 0.75 => 6.0,
            _ => f64::INFINITY,
        },
    }
}
