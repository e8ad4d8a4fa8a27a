//! Orchestration: sequential and parallel composition of the
//! per-source transforms into a whole-model hazard result.
//!
//! Both execution modes reduce curves in source declaration order, so
//! they produce bitwise-identical results. Parallel mode fans out one
//! task per source within a set and one task per set within the model,
//! collecting by input index rather than completion order.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::debug;

use crate::calc::config::CalcConfig;
use crate::calc::curve_set::HazardCurveSet;
use crate::calc::result::HazardResult;
use crate::calc::transforms;
use crate::errors::{RSHMError, RSHMResult};
use crate::gmm::{self, GmmTable};
use crate::model::cluster::ClusterSourceSet;
use crate::model::source_set::SourceSet;
use crate::model::system::SystemSourceSet;
use crate::model::{HazardModel, SourceSetVariant};
use crate::site::Site;

/// Execution mode of a hazard calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Executor {
    /// Straight-line execution on the calling thread.
    #[default]
    Sequential,
    /// Fan out over the rayon thread pool.
    Parallel,
}

/// Cooperative cancellation flag, checked at stage boundaries.
///
/// Cancellation (including caller-side timeouts) fails the whole
/// calculation with [`RSHMError::Canceled`]; partial results are
/// discarded.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_canceled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

fn checkpoint(cancel: Option<&CancelToken>) -> RSHMResult<()> {
    match cancel {
        Some(token) if token.is_canceled() => Err(RSHMError::Canceled),
        _ => Ok(()),
    }
}

/// Compute the hazard at `site` for a whole model.
///
/// The single entry point of the pipeline. `config` usually comes from
/// [`HazardModel::config`] but may be overridden by the caller.
pub fn hazard(
    model: &HazardModel,
    config: &CalcConfig,
    site: &Site,
    executor: Executor,
    cancel: Option<&CancelToken>,
) -> RSHMResult<HazardResult> {
    checkpoint(cancel)?;
    debug!(
        model = model.name(),
        site = site.name.as_str(),
        sets = model.source_sets().len(),
        ?executor,
        "computing hazard"
    );

    let curve_sets: Vec<HazardCurveSet> = match executor {
        Executor::Sequential => model
            .source_sets()
            .iter()
            .map(|set| set_to_curves(set, model, config, site, executor, cancel))
            .collect::<RSHMResult<_>>()?,
        Executor::Parallel => model
            .source_sets()
            .par_iter()
            .map(|set| set_to_curves(set, model, config, site, executor, cancel))
            .collect::<RSHMResult<_>>()?,
    };

    checkpoint(cancel)?;
    let mut builder = HazardResult::builder(config, site, model.name());
    for curve_set in &curve_sets {
        builder.add_curve_set(curve_set);
    }
    Ok(builder.build())
}

fn set_to_curves(
    set: &SourceSetVariant,
    model: &HazardModel,
    config: &CalcConfig,
    site: &Site,
    executor: Executor,
    cancel: Option<&CancelToken>,
) -> RSHMResult<HazardCurveSet> {
    checkpoint(cancel)?;
    let table = gmm::instance_table(
        model.gmm_provider(),
        set.gmm_set().gmms(),
        config.imts(),
    )?;
    match set {
        SourceSetVariant::Standard(set) => {
            sources_to_curves(set, &table, config, site, executor, cancel)
        }
        SourceSetVariant::Cluster(set) => {
            clusters_to_curves(set, &table, config, site, executor, cancel)
        }
        SourceSetVariant::System(set) => system_to_curves(set, &table, config, site, cancel),
    }
}

/// Compute and consolidate curves for one standard source set.
fn sources_to_curves(
    set: &SourceSet,
    table: &GmmTable,
    config: &CalcConfig,
    site: &Site,
    executor: Executor,
    cancel: Option<&CancelToken>,
) -> RSHMResult<HazardCurveSet> {
    let sources: Vec<_> = set.iter_for(&site.location, config.max_distance()).collect();
    debug!(
        set = set.name(),
        sources = sources.len(),
        of = set.len(),
        "source set in range"
    );

    let curves_list = match executor {
        Executor::Sequential => sources
            .iter()
            .map(|source| {
                checkpoint(cancel)?;
                transforms::source_to_curves(source, site, table, config)
            })
            .collect::<RSHMResult<Vec<_>>>()?,
        Executor::Parallel => sources
            .par_iter()
            .map(|source| {
                checkpoint(cancel)?;
                transforms::source_to_curves(source, site, table, config)
            })
            .collect::<RSHMResult<Vec<_>>>()?,
    };

    checkpoint(cancel)?;
    let mut builder = HazardCurveSet::builder(
        set.name(),
        set.weight(),
        set.source_type(),
        set.gmm_set(),
        config.log_model_curves(),
    );
    for curves in curves_list {
        builder.add_curves(curves);
    }
    Ok(builder.build())
}

/// Compute and consolidate curves for one cluster source set.
fn clusters_to_curves(
    set: &ClusterSourceSet,
    table: &GmmTable,
    config: &CalcConfig,
    site: &Site,
    executor: Executor,
    cancel: Option<&CancelToken>,
) -> RSHMResult<HazardCurveSet> {
    let clusters: Vec<_> = set.iter_for(&site.location, config.max_distance()).collect();

    let curves_list = match executor {
        Executor::Sequential => clusters
            .iter()
            .map(|cluster| {
                checkpoint(cancel)?;
                transforms::cluster_to_curves(cluster, site, table, config)
            })
            .collect::<RSHMResult<Vec<_>>>()?,
        Executor::Parallel => clusters
            .par_iter()
            .map(|cluster| {
                checkpoint(cancel)?;
                transforms::cluster_to_curves(cluster, site, table, config)
            })
            .collect::<RSHMResult<Vec<_>>>()?,
    };

    checkpoint(cancel)?;
    let mut builder = HazardCurveSet::builder(
        set.name(),
        set.weight(),
        set.source_type(),
        set.gmm_set(),
        config.log_model_curves(),
    );
    for curves in curves_list {
        builder.add_cluster_curves(curves);
    }
    Ok(builder.build())
}

/// Compute curves for one system source set; the bulk path has no
/// per-source fan-out, so both executors share it.
fn system_to_curves(
    set: &SystemSourceSet,
    table: &GmmTable,
    config: &CalcConfig,
    site: &Site,
    cancel: Option<&CancelToken>,
) -> RSHMResult<HazardCurveSet> {
    checkpoint(cancel)?;
    let curves = transforms::system_to_curves(set, site, table, config)?;
    checkpoint(cancel)?;
    let mut builder = HazardCurveSet::builder(
        set.name(),
        set.weight(),
        set.source_type(),
        set.gmm_set(),
        config.log_model_curves(),
    );
    builder.add_curves(curves);
    Ok(builder.build())
}
