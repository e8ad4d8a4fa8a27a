//! Ground motion model interface contracts.
//!
//! The empirical equations themselves live outside this crate; the
//! pipeline sees them only as [`GroundMotionModel`] trait objects keyed
//! by a [`Gmm`] identifier and an [`Imt`]. A [`GmmProvider`] registered
//! on the hazard model supplies instances on demand; the pipeline
//! assembles a dense (Gmm × Imt) table per source set and treats any gap
//! as a configuration error.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::calc::HazardInput;
use crate::errors::{RSHMError, RSHMResult};

/// Intensity measure types supported by the calculation pipeline.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Imt {
    Pga,
    Pgv,
    Sa0P1,
    Sa0P2,
    Sa0P3,
    Sa0P5,
    Sa0P75,
    Sa1P0,
    Sa2P0,
    Sa3P0,
}

impl Imt {
    /// Spectral period of an SA intensity measure.
    /// unit: s
    pub fn period(&self) -> Option<f64> {
        match self {
            Imt::Pga | Imt::Pgv => None,
            Imt::Sa0P1 => Some(0.1),
            Imt::Sa0P2 => Some(0.2),
            Imt::Sa0P3 => Some(0.3),
            Imt::Sa0P5 => Some(0.5),
            Imt::Sa0P75 => Some(0.75),
            Imt::Sa1P0 => Some(1.0),
            Imt::Sa2P0 => Some(2.0),
            Imt::Sa3P0 => Some(3.0),
        }
    }

    pub fn is_sa(&self) -> bool {
        self.period().is_some()
    }
}

impl fmt::Display for Imt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.period() {
            Some(period) => write!(f, "SA({}s)", period),
            None => match self {
                Imt::Pga => write!(f, "PGA"),
                Imt::Pgv => write!(f, "PGV"),
                _ => unreachable!(),
            },
        }
    }
}

/// Ground motion model identifiers.
///
/// These name the epistemic branches of a GMM logic tree; the equations
/// they resolve to are supplied by a [`GmmProvider`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Gmm {
    AtkinsonBoore06,
    BooreAtkinson08,
    CampbellBozorgnia08,
    ChiouYoungs08,
    Sadigh97,
    ToroEtAl97,
    ZhaoEtAl06,
}

impl fmt::Display for Gmm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Gmm::AtkinsonBoore06 => "AB06",
            Gmm::BooreAtkinson08 => "BA08",
            Gmm::CampbellBozorgnia08 => "CB08",
            Gmm::ChiouYoungs08 => "CY08",
            Gmm::Sadigh97 => "SADIGH_97",
            Gmm::ToroEtAl97 => "TORO_97",
            Gmm::ZhaoEtAl06 => "ZHAO_06",
        };
        f.write_str(label)
    }
}

/// The (log-mean, sigma) pair a ground motion model produces.
///
/// Both values are in natural-log units of g.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalarGroundMotion {
    pub mean: f64,
    pub sigma: f64,
}

impl ScalarGroundMotion {
    pub fn new(mean: f64, sigma: f64) -> Self {
        Self { mean, sigma }
    }
}

/// A ground motion model instance for one intensity measure.
pub trait GroundMotionModel: fmt::Debug + Send + Sync {
    /// Compute the log-mean and sigma of ground motion for `input`.
    fn calc(&self, input: &HazardInput) -> ScalarGroundMotion;
}

/// Supplier of ground motion model instances.
///
/// Implemented by the external GMM library (or a test registry); `None`
/// for a (gmm, imt) the pipeline requires is a configuration error.
pub trait GmmProvider: fmt::Debug + Send + Sync {
    fn instance(&self, gmm: Gmm, imt: Imt) -> Option<Arc<dyn GroundMotionModel>>;
}

/// A map-backed [`GmmProvider`].
#[derive(Debug, Default)]
pub struct InstanceMap {
    map: BTreeMap<(Gmm, Imt), Arc<dyn GroundMotionModel>>,
}

impl InstanceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, gmm: Gmm, imt: Imt, model: Arc<dyn GroundMotionModel>) -> &mut Self {
        self.map.insert((gmm, imt), model);
        self
    }

    /// Register one model instance for every supplied imt.
    pub fn put_all(
        &mut self,
        gmm: Gmm,
        imts: &[Imt],
        model: Arc<dyn GroundMotionModel>,
    ) -> &mut Self {
        for &imt in imts {
            self.map.insert((gmm, imt), Arc::clone(&model));
        }
        self
    }
}

impl GmmProvider for InstanceMap {
    fn instance(&self, gmm: Gmm, imt: Imt) -> Option<Arc<dyn GroundMotionModel>> {
        self.map.get(&(gmm, imt)).cloned()
    }
}

/// Dense per-source-set table of model instances.
pub(crate) type GmmTable = BTreeMap<Gmm, BTreeMap<Imt, Arc<dyn GroundMotionModel>>>;

/// Assemble the dense (Gmm × Imt) instance table for one source set.
pub(crate) fn instance_table(
    provider: &dyn GmmProvider,
    gmms: impl Iterator<Item = Gmm>,
    imts: &[Imt],
) -> RSHMResult<GmmTable> {
    let mut table = GmmTable::new();
    for gmm in gmms {
        let row = table.entry(gmm).or_default();
        for &imt in imts {
            let instance = provider
                .instance(gmm, imt)
                .ok_or(RSHMError::UnregisteredGmm { gmm, imt })?;
            row.insert(imt, instance);
        }
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn imt_display() {
        assert_eq!(Imt::Pga.to_string(), "PGA");
        assert_eq!(Imt::Sa0P2.to_string(), "SA(0.2s)");
        assert_eq!(Imt::Sa1P0.to_string(), "SA(1s)");
    }

    #[test]
    fn imt_periods() {
        assert_eq!(Imt::Pga.period(), None);
        assert_eq!(Imt::Sa0P75.period(), Some(0.75));
        assert!(Imt::Sa3P0.is_sa());
        assert!(!Imt::Pgv.is_sa());
    }

    #[test]
    fn missing_instance_is_an_error() {
        let provider = InstanceMap::new();
        let result = instance_table(&provider, [Gmm::Sadigh97].into_iter(), &[Imt::Pga]);
        assert!(matches!(
            result,
            Err(RSHMError::UnregisteredGmm {
                gmm: Gmm::Sadigh97,
                imt: Imt::Pga
            })
        ));
    }
}
