//! Shared harness for the expected-curve test suite.
//!
//! Expected files are CSV: one header line, then one row per site,
//! `<name>, <lon>, <lat>, v1;v2;...;vN`, where the semicolon list holds
//! Poisson probabilities of exceedance at the model's PGA levels.

use std::fs;
use std::path::PathBuf;

use rshm_core::calc::{hazard, CalcConfig, Executor, HazardResult};
use rshm_core::geo::Location;
use rshm_core::gmm::Imt;
use rshm_core::model::HazardModel;
use rshm_core::site::Site;

pub struct ExpectedRow {
    pub name: String,
    pub lon: f64,
    pub lat: f64,
    pub values: Vec<f64>,
}

pub fn load_expected(file: &str) -> Vec<ExpectedRow> {
    let path: PathBuf = [env!("CARGO_MANIFEST_DIR"), "tests", "data", file]
        .iter()
        .collect();
    let text = fs::read_to_string(&path).unwrap_or_else(|e| panic!("{}: {}", path.display(), e));
    text.lines()
        .skip(1)
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let fields: Vec<&str> = line.splitn(4, ',').collect();
            assert_eq!(fields.len(), 4, "malformed row: {}", line);
            ExpectedRow {
                name: fields[0].trim().to_string(),
                lon: fields[1].trim().parse().unwrap(),
                lat: fields[2].trim().parse().unwrap(),
                values: fields[3]
                    .trim()
                    .split(';')
                    .map(|v| v.trim().parse().unwrap())
                    .collect(),
            }
        })
        .collect()
}

pub fn site_of(row: &ExpectedRow) -> Site {
    Site::builder()
        .name(&row.name)
        .location(Location::new(row.lat, row.lon))
        .build()
}

/// `|actual - expected| / expected < tolerance`, or bitwise equality.
pub fn matches(expected: f64, actual: f64, tolerance: f64) -> bool {
    (actual - expected).abs() / expected < tolerance || actual == expected
}

pub fn assert_result_matches(result: &HazardResult, row: &ExpectedRow, tolerance: f64) {
    let curve = &result.probability_curves()[&Imt::Pga];
    assert_eq!(
        curve.len(),
        row.values.len(),
        "level count mismatch for {}",
        row.name
    );
    for (i, &expected) in row.values.iter().enumerate() {
        let actual = curve.y(i);
        assert!(
            matches(expected, actual, tolerance),
            "{} [{}]: expected {}, got {}",
            row.name,
            i,
            expected,
            actual
        );
    }
}

/// Run every row of an expected file against `model`.
pub fn run_case(model: &HazardModel, config: &CalcConfig, file: &str, tolerance: f64) {
    let rows = load_expected(file);
    assert!(!rows.is_empty(), "{} has no rows", file);
    for row in &rows {
        let site = site_of(row);
        let result = hazard(model, config, &site, Executor::Sequential, None).unwrap();
        assert_result_matches(&result, row, tolerance);
    }
}
