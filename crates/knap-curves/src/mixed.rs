//! A channel whose response is the sum of several curves.
//!
//! Sums of concave curves stay concave, so a mix of concave parts is safe to
//! allocate over. Mixing S-shaped parts can produce a marginal return with
//! several peaks, which the allocator reports as a domain violation.

use knap_core::error::CurveError;
use knap_core::traits::{check_spend, ResponseFunction};

/// Sum of component curves acting as one channel.
#[derive(Debug, Clone, PartialEq)]
pub struct MixedCurve<F> {
    parts: Vec<F>,
}

impl<F: ResponseFunction> MixedCurve<F> {
    pub fn new(parts: Vec<F>) -> Result<Self, CurveError> {
        if parts.is_empty() {
            return Err(CurveError::EmptyMix);
        }
        Ok(Self { parts })
    }

    pub fn parts(&self) -> &[F] {
        &self.parts
    }
}

impl<F: ResponseFunction> ResponseFunction for MixedCurve<F> {
    fn evaluate(&self, spend: f64) -> Result<f64, CurveError> {
        let x = check_spend(spend)?;
        self.parts.iter().map(|p| p.evaluate(x)).sum()
    }

    fn derivative(&self, spend: f64) -> Result<f64, CurveError> {
        let x = check_spend(spend)?;
        self.parts.iter().map(|p| p.derivative(x)).sum()
    }

    fn capacity(&self) -> f64 {
        self.parts.iter().map(|p| p.capacity()).sum()
    }
}
