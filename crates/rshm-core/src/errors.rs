use thiserror::Error;

use crate::gmm::{Gmm, Imt};

/// Error type for hazard calculations.
///
/// Configuration errors abort a calculation before any curves are built.
/// Model-data errors fail the enclosing source set and carry the identity
/// of the offending source. `Canceled` is the single distinguished kind
/// used for caller-driven cancellation and timeouts.
#[derive(Error, Debug)]
pub enum RSHMError {
    #[error("{0}")]
    Config(String),
    #[error("no model curve is defined for {0}")]
    MissingModelCurve(Imt),
    #[error("no {gmm} instance is registered for {imt}")]
    UnregisteredGmm { gmm: Gmm, imt: Imt },
    #[error("{gmm} produced a non-finite ground motion (mean={mean}, sigma={sigma}) for {imt}")]
    NonFiniteGroundMotion {
        gmm: Gmm,
        imt: Imt,
        mean: f64,
        sigma: f64,
    },
    #[error("{regime} gmm weights sum to {sum}, expected 1.0")]
    GmmWeights { regime: &'static str, sum: f64 },
    #[error("source {name} has no ruptures")]
    EmptySource { name: String },
    #[error("rupture {index} of source {name} has rate {rate}")]
    InvalidRate {
        name: String,
        index: usize,
        rate: f64,
    },
    #[error("rupture {index} of source {name} has magnitude {mag}")]
    InvalidMagnitude {
        name: String,
        index: usize,
        mag: f64,
    },
    #[error("source {name} produced a non-finite distance to site ({lat}, {lon})")]
    NonFiniteDistance { name: String, lat: f64, lon: f64 },
    #[error("hazard calculation was canceled")]
    Canceled,
}

/// Convenience type for `Result<T, RSHMError>`.
pub type RSHMResult<T> = Result<T, RSHMError>;
