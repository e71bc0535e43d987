//! Exponential moving average filters.
//!
//! `EmaFilter` smooths a scalar stream; `VectorEmaFilter` applies the same
//! rule independently to each component of a fixed-arity sample (cursor
//! coordinates, for example).

use crate::error::{PipelineError, Result};

/// Smallest coefficient accepted; anything lower saturates to this.
const MIN_ALPHA: f64 = 1e-6;

fn saturate_alpha(alpha: f64) -> f64 {
    if alpha.is_nan() {
        return 1.0;
    }
    alpha.clamp(MIN_ALPHA, 1.0)
}

// ── Scalar filter ──────────────────────────────────────────

/// Scalar EMA: `y = α·x + (1-α)·y_prev`, seeded by the first sample.
#[derive(Debug, Clone)]
pub struct EmaFilter {
    alpha: f64,
    value: Option<f64>,
}

impl EmaFilter {
    /// Create a filter.  `alpha` saturates into (0, 1].
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha: saturate_alpha(alpha),
            value: None,
        }
    }

    /// Feed a sample and return the filtered value.
    pub fn update(&mut self, sample: f64) -> f64 {
        let next = match self.value {
            None => sample,
            Some(prev) => self.alpha * sample + (1.0 - self.alpha) * prev,
        };
        self.value = Some(next);
        next
    }

    /// Current filtered value, `None` before the first sample.
    pub fn value(&self) -> Option<f64> {
        self.value
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Change the coefficient without touching the stored value.
    pub fn set_alpha(&mut self, alpha: f64) {
        self.alpha = saturate_alpha(alpha);
    }

    /// Forget the stored value; the next sample seeds again.
    pub fn reset(&mut self) {
        self.value = None;
    }
}

// ── Vector filter ──────────────────────────────────────────

/// Per-component EMA over samples of a fixed arity.
#[derive(Debug, Clone)]
pub struct VectorEmaFilter {
    alpha: f64,
    dims: usize,
    values: Option<Vec<f64>>,
}

impl VectorEmaFilter {
    pub fn new(alpha: f64, dims: usize) -> Self {
        Self {
            alpha: saturate_alpha(alpha),
            dims,
            values: None,
        }
    }

    /// Feed a sample.  Fails if `sample.len()` differs from the configured
    /// dimensionality; the stored state is left untouched in that case.
    pub fn update(&mut self, sample: &[f64]) -> Result<Vec<f64>> {
        if sample.len() != self.dims {
            return Err(PipelineError::DimensionMismatch {
                expected: self.dims,
                got: sample.len(),
            });
        }

        let next: Vec<f64> = match &self.values {
            None => sample.to_vec(),
            Some(prev) => sample
                .iter()
                .zip(prev)
                .map(|(x, p)| self.alpha * x + (1.0 - self.alpha) * p)
                .collect(),
        };
        self.values = Some(next.clone());
        Ok(next)
    }

    pub fn values(&self) -> Option<&[f64]> {
        self.values.as_deref()
    }

    pub fn dims(&self) -> usize {
        self.dims
    }

    pub fn set_alpha(&mut self, alpha: f64) {
        self.alpha = saturate_alpha(alpha);
    }

    pub fn reset(&mut self) {
        self.values = None;
    }
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_sample_passes_through() {
        let mut f = EmaFilter::new(0.3);
        assert_eq!(f.value(), None);
        assert_eq!(f.update(42.0), 42.0);
        assert_eq!(f.value(), Some(42.0));
    }

    #[test]
    fn test_constant_input_is_fixed_point() {
        let mut f = EmaFilter::new(0.5);
        for _ in 0..20 {
            assert_eq!(f.update(7.5), 7.5);
        }
    }

    #[test]
    fn test_alternating_extremes_stay_bounded() {
        let mut f = EmaFilter::new(0.5);
        f.update(0.0);
        for i in 0..50 {
            let sample = if i % 2 == 0 { 100.0 } else { 0.0 };
            let out = f.update(sample);
            assert!(out > 0.0 && out < 100.0, "output {} escaped (0, 100)", out);
        }
    }

    #[test]
    fn test_recurrence() {
        let mut f = EmaFilter::new(0.25);
        f.update(0.0);
        let out = f.update(100.0);
        assert!((out - 25.0).abs() < 1e-12);
    }

    #[test]
    fn test_reset_reseeds() {
        let mut f = EmaFilter::new(0.5);
        f.update(10.0);
        f.update(20.0);
        f.reset();
        assert_eq!(f.value(), None);
        assert_eq!(f.update(3.0), 3.0);
    }

    #[test]
    fn test_set_alpha_keeps_value() {
        let mut f = EmaFilter::new(0.5);
        f.update(10.0);
        f.set_alpha(1.0);
        assert_eq!(f.value(), Some(10.0));
        assert_eq!(f.update(50.0), 50.0);
    }

    #[test]
    fn test_alpha_saturates() {
        assert_eq!(EmaFilter::new(3.0).alpha(), 1.0);
        assert!(EmaFilter::new(-1.0).alpha() > 0.0);
    }

    #[test]
    fn test_vector_per_component() {
        let mut f = VectorEmaFilter::new(0.5, 2);
        assert_eq!(f.update(&[0.0, 10.0]).unwrap(), vec![0.0, 10.0]);
        assert_eq!(f.update(&[10.0, 10.0]).unwrap(), vec![5.0, 10.0]);
    }

    #[test]
    fn test_vector_dimension_mismatch() {
        let mut f = VectorEmaFilter::new(0.5, 2);
        f.update(&[1.0, 2.0]).unwrap();
        let err = f.update(&[1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(
            err,
            PipelineError::DimensionMismatch {
                expected: 2,
                got: 3
            }
        );
        // State is untouched by the rejected sample.
        assert_eq!(f.values(), Some(&[1.0, 2.0][..]));
    }

    #[test]
    fn test_vector_reset() {
        let mut f = VectorEmaFilter::new(0.5, 3);
        f.update(&[1.0, 2.0, 3.0]).unwrap();
        f.reset();
        assert!(f.values().is_none());
    }
}
