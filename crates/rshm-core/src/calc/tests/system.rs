//! System (rupture-table) sets agree with their per-source equivalents.

use std::sync::Arc;

use fixedbitset::FixedBitSet;

use super::*;
use crate::calc::{hazard, Executor};
use crate::example_models::{FixedDistanceSurface, MagScalingGmm};
use crate::model::system::{SystemRupture, SystemSourceSet};

const RUPTURES: [(f64, f64); 4] = [(1e-3, 6.0), (5e-4, 6.5), (2.5e-4, 7.0), (1.25e-4, 7.5)];
const DISTANCE: f64 = 10.0;

fn gmm() -> Arc<dyn crate::gmm::GroundMotionModel> {
    Arc::new(MagScalingGmm {
        c0: -8.5,
        c1: 1.0,
        sigma: 0.55,
    })
}

/// The same ruptures laid out as a one-section rupture table.
fn system_model() -> HazardModel {
    let mut set = SystemSourceSet::builder();
    set.name("fault as table").gmms(single_gmm_set(Gmm::Sadigh97));
    let section = set.section(Arc::new(FixedDistanceSurface::at(DISTANCE)));
    for &(rate, mag) in &RUPTURES {
        let mut bits = FixedBitSet::with_capacity(1);
        bits.insert(section);
        set.rupture(SystemRupture {
            rate,
            mag,
            rake: 0.0,
            // geometry mirrors FixedDistanceSurface
            dip: 90.0,
            width: 12.0,
            z_top: 0.0,
            sections: bits,
        });
    }
    let set = set.build();

    let mut builder = HazardModel::builder();
    builder
        .name("system model")
        .config(config())
        .gmm_provider(provider(Gmm::Sadigh97, gmm()))
        .system_set(set);
    builder.build()
}

#[test]
fn rupture_table_matches_per_source_fan_out() {
    // The "fast" precomputed-table variant of a fault model must agree
    // with the source-by-source variant exactly.
    let system = system_model();
    let fault = fault_model(&RUPTURES, Gmm::Sadigh97, gmm(), 1.0);

    let system_result =
        hazard(&system, system.config(), &site(), Executor::Sequential, None).unwrap();
    let fault_result =
        hazard(&fault, fault.config(), &site(), Executor::Sequential, None).unwrap();

    let sc = &system_result.probability_curves()[&Imt::Pga];
    let fc = &fault_result.probability_curves()[&Imt::Pga];
    for i in 0..sc.len() {
        assert_eq!(sc.y(i).to_bits(), fc.y(i).to_bits());
    }
}

#[test]
fn system_type_rollup_is_reported() {
    let system = system_model();
    let result = hazard(&system, system.config(), &site(), Executor::Sequential, None).unwrap();
    assert!(result.type_curves().contains_key(&SourceType::System));
}

#[test]
fn out_of_range_table_yields_zero_curves() {
    let mut set = SystemSourceSet::builder();
    set.name("distant table").gmms(single_gmm_set(Gmm::Sadigh97));
    let section = set.section(Arc::new(FixedDistanceSurface::at(500.0)));
    let mut bits = FixedBitSet::with_capacity(1);
    bits.insert(section);
    set.rupture(SystemRupture {
        rate: 1e-3,
        mag: 7.0,
        rake: 0.0,
        dip: 90.0,
        width: 12.0,
        z_top: 0.0,
        sections: bits,
    });
    let set = set.build();

    let mut builder = HazardModel::builder();
    builder
        .name("distant system")
        .config(config())
        .gmm_provider(provider(Gmm::Sadigh97, gmm()))
        .system_set(set);
    let model = builder.build();

    let result = hazard(&model, model.config(), &site(), Executor::Sequential, None).unwrap();
    assert!(result.curves()[&Imt::Pga].ys().iter().all(|&y| y == 0.0));
}
