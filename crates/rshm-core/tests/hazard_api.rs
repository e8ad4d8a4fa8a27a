//! Public-surface behavior: multi-IMT configs, site sets, result export.

use std::sync::Arc;

use approx::assert_relative_eq;

use rshm_core::calc::{hazard, CalcConfig, Executor};
use rshm_core::example_models::{ConstantGmm, FixedDistanceSurface};
use rshm_core::geo::Location;
use rshm_core::gmm::{Gmm, Imt, InstanceMap};
use rshm_core::model::{FaultSource, GmmSet, HazardModel, Rupture, Source, SourceSet, SourceType};
use rshm_core::site::{Site, SiteSet};

fn two_imt_model() -> HazardModel {
    let mut config = CalcConfig::builder();
    config
        .imts(&[Imt::Pga, Imt::Sa1P0])
        .model_curve(Imt::Pga, &[0.01, 0.05, 0.2, 0.8])
        .model_curve(Imt::Sa1P0, &[0.005, 0.02, 0.1, 0.4]);
    let config = config.build().unwrap();

    let mut registry = InstanceMap::new();
    registry.put(
        Gmm::Sadigh97,
        Imt::Pga,
        Arc::new(ConstantGmm {
            mean: 0.1f64.ln(),
            sigma: 0.6,
        }),
    );
    registry.put(
        Gmm::Sadigh97,
        Imt::Sa1P0,
        Arc::new(ConstantGmm {
            mean: 0.04f64.ln(),
            sigma: 0.7,
        }),
    );

    let mut gmms = GmmSet::builder();
    gmms.near_weight(Gmm::Sadigh97, 1.0);
    let surface = Arc::new(FixedDistanceSurface::at(15.0));
    let mut set = SourceSet::builder(SourceType::Fault);
    set.name("fault")
        .gmms(gmms.build().unwrap())
        .source(Source::Fault(FaultSource {
            name: "fault".to_string(),
            trace: vec![Location::new(34.05, -118.0), Location::new(34.1, -118.0)],
            ruptures: vec![
                Rupture::new(2e-3, 6.2, 0.0, surface.clone()),
                Rupture::new(8e-4, 6.9, 0.0, surface),
            ],
        }));

    let mut builder = HazardModel::builder();
    builder
        .name("two imts")
        .config(config)
        .gmm_provider(Arc::new(registry))
        .source_set(set.build());
    builder.build()
}

fn test_site() -> Site {
    Site::builder()
        .name("api site")
        .location(Location::new(34.0, -118.0))
        .build()
}

#[test]
fn every_configured_imt_gets_a_curve() {
    let model = two_imt_model();
    let result = hazard(&model, model.config(), &test_site(), Executor::Sequential, None).unwrap();

    assert_eq!(result.curves().len(), 2);
    assert_eq!(result.probability_curves().len(), 2);
    for imt in [Imt::Pga, Imt::Sa1P0] {
        let curve = &result.curves()[&imt];
        assert_eq!(curve.len(), 4);
        assert!(curve.y(0) > 0.0);
        // curves carry their own x-axes
        let expected_x0 = model.config().model_curve(imt).unwrap()[0].ln();
        assert_relative_eq!(curve.x(0), expected_x0);
    }
}

#[test]
fn site_sets_iterate_in_order() {
    let mut builder = Site::builder();
    builder.vs30(520.0);
    let sites = SiteSet::new(vec![
        builder.name("one").location(Location::new(34.0, -118.0)).build(),
        builder.name("two").location(Location::new(34.5, -118.0)).build(),
    ]);
    assert_eq!(sites.len(), 2);

    let model = two_imt_model();
    let mut names = Vec::new();
    for site in sites.iter() {
        let result =
            hazard(&model, model.config(), site, Executor::Sequential, None).unwrap();
        names.push(result.site().name.clone());
        assert_eq!(result.site().vs30, 520.0);
    }
    assert_eq!(names, ["one", "two"]);
}

#[test]
fn exposure_window_scales_poisson_probabilities() {
    let mut config = CalcConfig::builder();
    config
        .model_curve(Imt::Pga, &[0.01, 0.05, 0.2, 0.8])
        .timespan(50.0);
    let config = config.build().unwrap();

    let model = two_imt_model();
    let result = hazard(&model, &config, &test_site(), Executor::Sequential, None).unwrap();

    let rates = &result.curves()[&Imt::Pga];
    let probs = &result.probability_curves()[&Imt::Pga];
    for i in 0..rates.len() {
        let expected = 1.0 - (-rates.y(i) * 50.0).exp();
        assert_relative_eq!(probs.y(i), expected, max_relative = 1e-12);
    }
    assert_eq!(result.timespan(), 50.0);
}

#[test]
fn results_serialize_for_export() {
    let model = two_imt_model();
    let result = hazard(&model, model.config(), &test_site(), Executor::Sequential, None).unwrap();

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["site"]["name"], "api site");
    assert_eq!(json["model_name"], "two imts");
    assert!(json["probability_curves"].get("Pga").is_some());
    assert!(json["rate_curves"].get("Sa1P0").is_some());
}
