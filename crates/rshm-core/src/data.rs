//! Curve data: an xy-sequence over a shared x-axis, plus the probability
//! conversions used when consolidating curves.
//!
//! All hazard curves computed against one model curve share a single
//! x-axis allocation. Curves are combined by y-addition only; the x-axis
//! of an operand must be the very same axis (or bitwise equal values),
//! anything else is a programmer error and fails fast.

use std::sync::Arc;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Alias for the float type used throughout.
pub type FloatValue = f64;

/// A sequence of (x, y) pairs with a shared, immutable x-axis.
///
/// During hazard integration x-values are natural logs of ground-motion
/// amplitude and y-values are annual rates of exceedance. The same type
/// carries the linear-amplitude, Poisson-probability form of a final
/// result; only the interpretation changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XySequence {
    xs: Arc<Array1<FloatValue>>,
    ys: Array1<FloatValue>,
}

impl XySequence {
    /// Create a sequence from an axis and matching y-values.
    ///
    /// # Panics
    ///
    /// Panics if the lengths differ.
    pub fn new(xs: Arc<Array1<FloatValue>>, ys: Array1<FloatValue>) -> Self {
        assert_eq!(xs.len(), ys.len(), "x and y lengths differ");
        assert!(!xs.is_empty(), "sequence may not be empty");
        Self { xs, ys }
    }

    /// Create a zero-y sequence over the supplied axis.
    pub fn zeroed(xs: Arc<Array1<FloatValue>>) -> Self {
        let ys = Array1::zeros(xs.len());
        Self::new(xs, ys)
    }

    /// Copy of `other` sharing its x-axis allocation.
    pub fn copy_of(other: &XySequence) -> Self {
        Self {
            xs: Arc::clone(&other.xs),
            ys: other.ys.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    pub fn xs(&self) -> &Array1<FloatValue> {
        &self.xs
    }

    pub fn ys(&self) -> &Array1<FloatValue> {
        &self.ys
    }

    /// The shared x-axis handle.
    pub fn x_axis(&self) -> Arc<Array1<FloatValue>> {
        Arc::clone(&self.xs)
    }

    pub fn x(&self, index: usize) -> FloatValue {
        self.xs[index]
    }

    pub fn y(&self, index: usize) -> FloatValue {
        self.ys[index]
    }

    pub fn set_y(&mut self, index: usize, value: FloatValue) {
        self.ys[index] = value;
    }

    fn same_axis(&self, other: &XySequence) -> bool {
        Arc::ptr_eq(&self.xs, &other.xs) || self.xs == other.xs
    }

    /// Add the y-values of `other` into this sequence.
    ///
    /// # Panics
    ///
    /// Panics if the sequences are not defined over the same x-axis.
    pub fn add(&mut self, other: &XySequence) -> &mut Self {
        assert!(self.same_axis(other), "x-axes differ");
        self.ys += &other.ys;
        self
    }

    /// Scale all y-values.
    pub fn multiply(&mut self, scale: FloatValue) -> &mut Self {
        self.ys *= scale;
        self
    }
}

/// Joint exceedance probability of a group of independent events.
///
/// `P(exceed) = 1 − Π(1 − Pᵢ(exceed))` at every x, the combination rule
/// for the segments of a cluster source. A single curve is returned
/// unchanged in value.
///
/// # Panics
///
/// Panics if `curves` is empty or the x-axes differ.
pub fn cluster_exceedance(curves: &[XySequence]) -> XySequence {
    let first = curves.first().expect("no curves to combine");
    let mut combined = XySequence::copy_of(first);
    combined.ys.mapv_inplace(|p| 1.0 - p);
    for curve in &curves[1..] {
        assert!(combined.same_axis(curve), "x-axes differ");
        azip_multiply_complement(&mut combined.ys, curve.ys());
    }
    combined.ys.mapv_inplace(|p| 1.0 - p);
    combined
}

fn azip_multiply_complement(acc: &mut Array1<FloatValue>, ps: &Array1<FloatValue>) {
    ndarray::azip!((a in &mut *acc, &p in ps) *a *= 1.0 - p);
}

/// Annual rate → Poisson probability of at least one exceedance in `time`.
pub fn rate_to_probability(rate: FloatValue, time: FloatValue) -> FloatValue {
    1.0 - (-rate * time).exp()
}

/// Poisson probability → annual rate over `time`.
pub fn probability_to_rate(probability: FloatValue, time: FloatValue) -> FloatValue {
    -(1.0 - probability).ln() / time
}
