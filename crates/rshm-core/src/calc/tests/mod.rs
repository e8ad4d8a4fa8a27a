//! Pipeline tests and shared fixtures.

mod system;

use std::sync::Arc;

use crate::calc::{CalcConfig, ExceedanceModel};
use crate::example_models::FixedDistanceSurface;
use crate::geo::Location;
use crate::gmm::{Gmm, GroundMotionModel, Imt, InstanceMap};
use crate::model::source::{FaultSource, GridSource, Rupture, Source};
use crate::model::source_set::{GmmSet, SourceSet};
use crate::model::{HazardModel, SourceType};
use crate::site::Site;

pub(crate) const LEVELS: [f64; 6] = [0.001, 0.005, 0.02, 0.08, 0.3, 1.0];

pub(crate) fn config() -> CalcConfig {
    let mut builder = CalcConfig::builder();
    builder
        .model_curve(Imt::Pga, &LEVELS)
        .exceedance_model(ExceedanceModel::TruncationUpperOnly);
    builder.build().unwrap()
}

pub(crate) fn site() -> Site {
    Site::builder()
        .name("test site")
        .location(Location::new(34.0, -118.0))
        .build()
}

pub(crate) fn single_gmm_set(gmm: Gmm) -> GmmSet {
    let mut builder = GmmSet::builder();
    builder.near_weight(gmm, 1.0);
    builder.build().unwrap()
}

pub(crate) fn provider(gmm: Gmm, model: Arc<dyn GroundMotionModel>) -> Arc<InstanceMap> {
    let mut map = InstanceMap::new();
    map.put(gmm, Imt::Pga, model);
    Arc::new(map)
}

/// A fault source whose ruptures all sit at fixed distance `r`.
pub(crate) fn fault_source(name: &str, ruptures: &[(f64, f64)], r: f64) -> Source {
    let surface = Arc::new(FixedDistanceSurface::at(r));
    Source::Fault(FaultSource {
        name: name.to_string(),
        trace: vec![Location::new(34.05, -118.0), Location::new(34.15, -118.0)],
        ruptures: ruptures
            .iter()
            .map(|&(rate, mag)| Rupture::new(rate, mag, 0.0, surface.clone()))
            .collect(),
    })
}

pub(crate) fn grid_source(name: &str, ruptures: &[(f64, f64)], r: f64) -> Source {
    let surface = Arc::new(FixedDistanceSurface::at(r));
    Source::Grid(GridSource {
        name: name.to_string(),
        location: Location::new(34.1, -118.0),
        ruptures: ruptures
            .iter()
            .map(|&(rate, mag)| Rupture::new(rate, mag, 0.0, surface.clone()))
            .collect(),
    })
}

pub(crate) fn fault_set(name: &str, sources: Vec<Source>, gmm: Gmm, weight: f64) -> SourceSet {
    let mut builder = SourceSet::builder(SourceType::Fault);
    builder
        .name(name)
        .weight(weight)
        .gmms(single_gmm_set(gmm));
    for source in sources {
        builder.source(source);
    }
    builder.build()
}

/// A one-set fault model evaluated with a single gmm.
pub(crate) fn fault_model(
    ruptures: &[(f64, f64)],
    gmm: Gmm,
    model: Arc<dyn GroundMotionModel>,
    weight: f64,
) -> HazardModel {
    let set = fault_set("fault set", vec![fault_source("fault", ruptures, 10.0)], gmm, weight);
    let mut builder = HazardModel::builder();
    builder
        .name("test model")
        .config(config())
        .gmm_provider(provider(gmm, model))
        .source_set(set);
    builder.build()
}
