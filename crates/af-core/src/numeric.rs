use crate::{AfError, AfResult};

/// Sample value type of every series.
pub type Real = f64;

/// Closeness thresholds for comparing series samples.
///
/// Two values are close when their difference is within `abs`, or within `rel`
/// of the larger magnitude.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Tolerances {
    /// Float noise left behind by solver output and JSON round trips.
    pub const SAMPLE: Tolerances = Tolerances {
        abs: 1e-12,
        rel: 1e-9,
    };

    pub fn close(&self, a: Real, b: Real) -> bool {
        let diff = (a - b).abs();
        diff <= self.abs || diff <= self.rel * a.abs().max(b.abs())
    }

    /// `v` is indistinguishable from zero at the absolute threshold.
    pub fn is_zero(&self, v: Real) -> bool {
        v.abs() <= self.abs
    }
}

impl Default for Tolerances {
    fn default() -> Self {
        Self::SAMPLE
    }
}

pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    tol.close(a, b)
}

pub fn ensure_finite(v: Real, what: &'static str) -> AfResult<Real> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(AfError::NonFinite { what, value: v })
    }
}

/// Check that two aligned sequences have the same length.
pub fn ensure_same_len(left: usize, right: usize, what: &'static str) -> AfResult<()> {
    if left == right {
        Ok(())
    } else {
        Err(AfError::LengthMismatch { what, left, right })
    }
}
