//! The hazard calculation pipeline.
//!
//! A hazard calculation transforms each source of a model into
//! per-rupture inputs, evaluates every (GMM, IMT) pair on them,
//! integrates truncated-normal exceedance into per-source curves, and
//! consolidates those curves through source-set and model levels into a
//! single per-site [`HazardResult`]. See [`hazard`] for the entry
//! point.

mod config;
mod curve_set;
mod curves;
mod exceedance;
mod ground_motions;
mod inputs;
mod pipeline;
mod result;
mod transforms;

#[cfg(test)]
mod tests;

pub use config::{CalcConfig, CalcConfigBuilder, NSHM_DEFAULT_LEVELS};
pub use curve_set::{HazardCurveSet, HazardCurveSetBuilder};
pub use curves::{ClusterCurves, HazardCurves};
pub use exceedance::ExceedanceModel;
pub use ground_motions::{ClusterGroundMotions, GroundMotions};
pub use inputs::{ClusterInputs, HazardInput, InputList};
pub use pipeline::{hazard, CancelToken, Executor};
pub use result::{HazardResult, HazardResultBuilder};
