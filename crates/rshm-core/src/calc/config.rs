//! Calculation configuration.

use std::collections::BTreeMap;
use std::sync::Arc;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::calc::exceedance::ExceedanceModel;
use crate::data::XySequence;
use crate::errors::{RSHMError, RSHMResult};
use crate::gmm::Imt;

/// The default amplitude levels of the national model PGA curve.
/// unit: g
pub const NSHM_DEFAULT_LEVELS: [f64; 20] = [
    0.0025, 0.0045, 0.0075, 0.0113, 0.0169, 0.0253, 0.0380, 0.0570, 0.0854, 0.128, 0.192, 0.288,
    0.432, 0.649, 0.973, 1.46, 2.19, 3.28, 4.92, 7.38,
];

/// Immutable calculation settings.
///
/// The per-IMT model curves are supplied in linear amplitude; the log-x
/// zero-y templates every hazard curve is built from are derived once at
/// construction and shared by reference thereafter.
#[derive(Debug, Clone, Serialize)]
pub struct CalcConfig {
    imts: Vec<Imt>,
    model_curves: BTreeMap<Imt, Vec<f64>>,
    exceedance_model: ExceedanceModel,
    truncation_level: f64,
    max_distance: f64,
    timespan: f64,
    #[serde(skip)]
    log_curves: BTreeMap<Imt, XySequence>,
}

impl CalcConfig {
    pub fn builder() -> CalcConfigBuilder {
        CalcConfigBuilder::default()
    }

    /// IMTs of interest, in declared order.
    pub fn imts(&self) -> &[Imt] {
        &self.imts
    }

    /// The linear-amplitude levels of the model curve for `imt`.
    pub fn model_curve(&self, imt: Imt) -> RSHMResult<&[f64]> {
        self.model_curves
            .get(&imt)
            .map(Vec::as_slice)
            .ok_or(RSHMError::MissingModelCurve(imt))
    }

    /// Zero-y log-x curve templates, one per configured IMT.
    pub fn log_model_curves(&self) -> &BTreeMap<Imt, XySequence> {
        &self.log_curves
    }

    pub fn exceedance_model(&self) -> ExceedanceModel {
        self.exceedance_model
    }

    /// Truncation level in units of sigma.
    pub fn truncation_level(&self) -> f64 {
        self.truncation_level
    }

    /// Source-site distance beyond which sources are skipped.
    /// unit: km
    pub fn max_distance(&self) -> f64 {
        self.max_distance
    }

    /// Exposure window of the Poisson probability conversion.
    /// unit: yr
    pub fn timespan(&self) -> f64 {
        self.timespan
    }
}

/// Builder of [`CalcConfig`]s; deserializable with defaults so model
/// loaders can overlay partial config files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalcConfigBuilder {
    pub imts: Vec<Imt>,
    pub model_curves: BTreeMap<Imt, Vec<f64>>,
    pub exceedance_model: ExceedanceModel,
    pub truncation_level: f64,
    pub max_distance: f64,
    pub timespan: f64,
}

impl Default for CalcConfigBuilder {
    fn default() -> Self {
        let mut model_curves = BTreeMap::new();
        model_curves.insert(Imt::Pga, NSHM_DEFAULT_LEVELS.to_vec());
        Self {
            imts: vec![Imt::Pga],
            model_curves,
            exceedance_model: ExceedanceModel::TruncationUpperOnly,
            truncation_level: 3.0,
            max_distance: 300.0,
            timespan: 1.0,
        }
    }
}

impl CalcConfigBuilder {
    pub fn imts(&mut self, imts: &[Imt]) -> &mut Self {
        self.imts = imts.to_vec();
        self
    }

    pub fn model_curve(&mut self, imt: Imt, levels: &[f64]) -> &mut Self {
        self.model_curves.insert(imt, levels.to_vec());
        self
    }

    pub fn exceedance_model(&mut self, model: ExceedanceModel) -> &mut Self {
        self.exceedance_model = model;
        self
    }

    pub fn truncation_level(&mut self, level: f64) -> &mut Self {
        self.truncation_level = level;
        self
    }

    pub fn max_distance(&mut self, distance: f64) -> &mut Self {
        self.max_distance = distance;
        self
    }

    pub fn timespan(&mut self, timespan: f64) -> &mut Self {
        self.timespan = timespan;
        self
    }

    /// Validate the settings and derive the log-x curve templates.
    pub fn build(&self) -> RSHMResult<CalcConfig> {
        if self.imts.is_empty() {
            return Err(RSHMError::Config("no imts configured".to_string()));
        }
        if self.truncation_level < 0.0 {
            return Err(RSHMError::Config(format!(
                "truncation level may not be negative, got {}",
                self.truncation_level
            )));
        }
        if !(self.max_distance > 0.0) {
            return Err(RSHMError::Config(format!(
                "max distance must be positive, got {}",
                self.max_distance
            )));
        }
        if !(self.timespan > 0.0) {
            return Err(RSHMError::Config(format!(
                "timespan must be positive, got {}",
                self.timespan
            )));
        }

        let mut log_curves = BTreeMap::new();
        for &imt in &self.imts {
            let levels = self
                .model_curves
                .get(&imt)
                .ok_or(RSHMError::MissingModelCurve(imt))?;
            validate_levels(imt, levels)?;
            let xs: Array1<f64> = levels.iter().map(|v| v.ln()).collect();
            log_curves.insert(imt, XySequence::zeroed(Arc::new(xs)));
        }

        Ok(CalcConfig {
            imts: self.imts.clone(),
            model_curves: self.model_curves.clone(),
            exceedance_model: self.exceedance_model,
            truncation_level: self.truncation_level,
            max_distance: self.max_distance,
            timespan: self.timespan,
            log_curves,
        })
    }
}

fn validate_levels(imt: Imt, levels: &[f64]) -> RSHMResult<()> {
    if levels.len() < 2 {
        return Err(RSHMError::Config(format!(
            "model curve for {} needs at least 2 levels",
            imt
        )));
    }
    let increasing = levels.windows(2).all(|w| w[0] < w[1]);
    if !increasing || levels[0] <= 0.0 {
        return Err(RSHMError::Config(format!(
            "model curve levels for {} must be positive and strictly increasing",
            imt
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn defaults() {
        let config = CalcConfig::builder().build().unwrap();
        assert_eq!(config.imts(), &[Imt::Pga]);
        assert_eq!(config.model_curve(Imt::Pga).unwrap().len(), 20);
        assert_eq!(config.truncation_level(), 3.0);
        assert_eq!(config.timespan(), 1.0);
        let template = &config.log_model_curves()[&Imt::Pga];
        assert_relative_eq!(template.x(0), 0.0025f64.ln());
        assert!(template.ys().iter().all(|&y| y == 0.0));
    }

    #[test]
    fn missing_curve_for_configured_imt() {
        let mut builder = CalcConfig::builder();
        builder.imts(&[Imt::Pga, Imt::Sa1P0]);
        assert!(matches!(
            builder.build(),
            Err(RSHMError::MissingModelCurve(Imt::Sa1P0))
        ));
    }

    #[test]
    fn rejects_unsorted_levels() {
        let mut builder = CalcConfig::builder();
        builder.model_curve(Imt::Pga, &[0.1, 0.05, 0.2]);
        assert!(matches!(builder.build(), Err(RSHMError::Config(_))));
    }

    #[test]
    fn builder_deserializes_with_defaults() {
        let builder: CalcConfigBuilder = toml::from_str(
            r#"
            truncation_level = 2.0
            max_distance = 200.0
            "#,
        )
        .unwrap();
        let config = builder.build().unwrap();
        assert_eq!(config.truncation_level(), 2.0);
        assert_eq!(config.max_distance(), 200.0);
        assert_eq!(config.imts(), &[Imt::Pga]);
    }
}
