//! Trait interfaces for knap.
//!
//! [`ResponseFunction`] is the only contract between the curves and the
//! allocator: a value-vs-spend curve, its first derivative, and its
//! saturation ceiling.

use std::sync::Arc;

use crate::error::CurveError;

/// One channel's response to spend.
///
/// Implementations must be non-decreasing on `[0, ∞)` with `evaluate(0) = 0`,
/// bounded above by [`capacity`](Self::capacity), and have a non-negative
/// derivative that is non-increasing past the inflection point. The
/// allocator only ever reads a response function, so `Send + Sync` lets
/// the same curves back concurrent solves.
pub trait ResponseFunction: Send + Sync {
    /// Response value at `spend`.
    ///
    /// Fails with [`CurveError::NegativeSpend`] for negative spend.
    fn evaluate(&self, spend: f64) -> Result<f64, CurveError>;

    /// Marginal return at `spend`.
    ///
    /// Must be finite at `spend = 0`. Same input constraint as
    /// [`evaluate`](Self::evaluate).
    fn derivative(&self, spend: f64) -> Result<f64, CurveError>;

    /// Saturation ceiling: the limit of `evaluate(spend)` as spend grows.
    fn capacity(&self) -> f64;

    /// Average return `evaluate(spend) / spend`, or the marginal return at 0.
    fn average_return(&self, spend: f64) -> Result<f64, CurveError> {
        if check_spend(spend)? == 0.0 {
            return self.derivative(0.0);
        }
        Ok(self.evaluate(spend)? / spend)
    }
}

/// Reject negative and non-finite spend, passing valid spend through.
///
/// `-0.0` is accepted and normalized to `0.0`.
pub fn check_spend(spend: f64) -> Result<f64, CurveError> {
    if spend.is_nan() || spend.is_infinite() {
        return Err(CurveError::NonFiniteSpend(spend));
    }
    if spend < 0.0 {
        return Err(CurveError::NegativeSpend(spend));
    }
    Ok(spend + 0.0)
}

impl<T: ResponseFunction + ?Sized> ResponseFunction for &T {
    fn evaluate(&self, spend: f64) -> Result<f64, CurveError> {
        (**self).evaluate(spend)
    }

    fn derivative(&self, spend: f64) -> Result<f64, CurveError> {
        (**self).derivative(spend)
    }

    fn capacity(&self) -> f64 {
        (**self).capacity()
    }
}

impl<T: ResponseFunction + ?Sized> ResponseFunction for Box<T> {
    fn evaluate(&self, spend: f64) -> Result<f64, CurveError> {
        (**self).evaluate(spend)
    }

    fn derivative(&self, spend: f64) -> Result<f64, CurveError> {
        (**self).derivative(spend)
    }

    fn capacity(&self) -> f64 {
        (**self).capacity()
    }
}

impl<T: ResponseFunction + ?Sized> ResponseFunction for Arc<T> {
    fn evaluate(&self, spend: f64) -> Result<f64, CurveError> {
        (**self).evaluate(spend)
    }

    fn derivative(&self, spend: f64) -> Result<f64, CurveError> {
        (**self).derivative(spend)
    }

    fn capacity(&self) -> f64 {
        (**self).capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `f(x) = x` up to 4, flat afterwards.
    struct Ramp;

    impl ResponseFunction for Ramp {
        fn evaluate(&self, spend: f64) -> Result<f64, CurveError> {
            Ok(check_spend(spend)?.min(4.0))
        }

        fn derivative(&self, spend: f64) -> Result<f64, CurveError> {
            Ok(if check_spend(spend)? < 4.0 { 1.0 } else { 0.0 })
        }

        fn capacity(&self) -> f64 {
            4.0
        }
    }

    #[test]
    fn check_spend_rejects_negative() {
        assert_eq!(check_spend(-1.0), Err(CurveError::NegativeSpend(-1.0)));
    }

    #[test]
    fn check_spend_rejects_non_finite() {
        assert!(matches!(check_spend(f64::NAN), Err(CurveError::NonFiniteSpend(_))));
        assert!(matches!(
            check_spend(f64::INFINITY),
            Err(CurveError::NonFiniteSpend(_))
        ));
    }

    #[test]
    fn check_spend_normalizes_negative_zero() {
        let z = check_spend(-0.0).unwrap();
        assert!(z.is_sign_positive());
    }

    #[test]
    fn average_return_at_zero_is_marginal() {
        assert_eq!(Ramp.average_return(0.0).unwrap(), 1.0);
        assert_eq!(Ramp.average_return(8.0).unwrap(), 0.5);
    }

    #[test]
    fn smart_pointers_forward() {
        let boxed: Box<dyn ResponseFunction> = Box::new(Ramp);
        assert_eq!(boxed.evaluate(2.0).unwrap(), 2.0);
        let shared: Arc<dyn ResponseFunction> = Arc::new(Ramp);
        assert_eq!(shared.capacity(), 4.0);
        let by_ref = &Ramp;
        assert_eq!(by_ref.derivative(5.0).unwrap(), 0.0);
    }

    #[test]
    fn trait_is_object_safe() {
        let dyn_f: &dyn ResponseFunction = &Ramp;
        assert!(dyn_f.evaluate(-1.0).is_err());
    }
}
