//! Logistic (exponential sigmoid) response curve.
//!
//! With `z(x) = steep * (x / (price * cap) - ec50)`:
//!
//! `value(x) = multiplier * cap * (sigmoid(z(x)) - sigmoid(z(0)))`
//!
//! The shift by `sigmoid(z(0))` pins `value(0) = 0`. The inflection sits at
//! `x = price * cap * ec50`; `ec50 = 0` gives a fully concave curve.

use knap_core::error::CurveError;
use knap_core::traits::{check_spend, ResponseFunction};
use serde::{Deserialize, Serialize};

fn one() -> f64 {
    1.0
}

pub(crate) fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// `sigmoid'(z) = sigmoid(z) * (1 - sigmoid(z))`, without cancellation.
pub(crate) fn sigmoid_slope(z: f64) -> f64 {
    let e = (-z.abs()).exp();
    e / ((1.0 + e) * (1.0 + e))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogisticCurve {
    pub cap: f64,
    /// Inflection point as a fraction of the price-scaled cap.
    pub ec50: f64,
    pub steep: f64,
    #[serde(default = "one")]
    pub price: f64,
    #[serde(default = "one")]
    pub multiplier: f64,
}

impl LogisticCurve {
    pub fn new(cap: f64, ec50: f64, steep: f64) -> Result<Self, CurveError> {
        let curve = Self {
            cap,
            ec50,
            steep,
            price: 1.0,
            multiplier: 1.0,
        };
        curve.validate()?;
        Ok(curve)
    }

    pub fn with_price(self, price: f64) -> Result<Self, CurveError> {
        let curve = Self { price, ..self };
        curve.validate()?;
        Ok(curve)
    }

    pub fn with_multiplier(self, multiplier: f64) -> Result<Self, CurveError> {
        let curve = Self { multiplier, ..self };
        curve.validate()?;
        Ok(curve)
    }

    pub fn validate(&self) -> Result<(), CurveError> {
        let checks = [
            ("cap", self.cap, self.cap >= 0.0),
            ("ec50", self.ec50, self.ec50 >= 0.0),
            ("steep", self.steep, self.steep > 0.0),
            ("price", self.price, self.price > 0.0),
            ("multiplier", self.multiplier, self.multiplier >= 0.0),
        ];
        for (name, value, ok) in checks {
            if !(ok && value.is_finite()) {
                return Err(CurveError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }

    /// Spend at which marginal return peaks.
    pub fn inflection_spend(&self) -> f64 {
        self.price * self.cap * self.ec50
    }

    fn z(&self, spend: f64) -> f64 {
        self.steep * (spend / (self.price * self.cap) - self.ec50)
    }
}

impl ResponseFunction for LogisticCurve {
    fn evaluate(&self, spend: f64) -> Result<f64, CurveError> {
        let x = check_spend(spend)?;
        if x == 0.0 || self.capacity() == 0.0 {
            return Ok(0.0);
        }
        let value = self.multiplier * self.cap * (sigmoid(self.z(x)) - sigmoid(self.z(0.0)));
        Ok(value.max(0.0))
    }

    fn derivative(&self, spend: f64) -> Result<f64, CurveError> {
        let x = check_spend(spend)?;
        if self.capacity() == 0.0 {
            return Ok(0.0);
        }
        Ok(self.multiplier * self.steep / self.price * sigmoid_slope(self.z(x)))
    }

    fn capacity(&self) -> f64 {
        self.multiplier * self.cap * sigmoid(self.steep * self.ec50)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve(ec50: f64) -> LogisticCurve {
        LogisticCurve::new(10.0, ec50, 4.0).unwrap()
    }

    #[test]
    fn sigmoid_is_symmetric() {
        for z in [0.0, 0.7, 3.0, 40.0] {
            assert!((sigmoid(z) + sigmoid(-z) - 1.0).abs() < 1e-15);
        }
        assert_eq!(sigmoid(0.0), 0.5);
        assert_eq!(sigmoid_slope(0.0), 0.25);
    }

    #[test]
    fn sigmoid_handles_extremes() {
        assert_eq!(sigmoid(1000.0), 1.0);
        assert_eq!(sigmoid(-1000.0), 0.0);
        assert_eq!(sigmoid_slope(-1000.0), 0.0);
    }

    #[test]
    fn zero_spend_is_zero_response() {
        assert_eq!(curve(0.5).evaluate(0.0).unwrap(), 0.0);
        assert_eq!(curve(0.0).evaluate(0.0).unwrap(), 0.0);
    }

    #[test]
    fn approaches_capacity() {
        let c = curve(0.5);
        let v = c.evaluate(1e6).unwrap();
        assert!((v - c.capacity()).abs() < 1e-9, "{v} vs {}", c.capacity());
    }

    #[test]
    fn capacity_excludes_the_shift() {
        // ec50 = 0: value(x) = cap * (sigmoid(z) - 1/2), capacity = cap / 2
        assert!((curve(0.0).capacity() - 5.0).abs() < 1e-12);
    }

    #[test]
    fn marginal_peaks_at_inflection() {
        let c = curve(0.5);
        let x = c.inflection_spend();
        assert_eq!(x, 5.0);
        let peak = c.derivative(x).unwrap();
        assert!((peak - 4.0 * 0.25).abs() < 1e-12);
        assert!(c.derivative(0.0).unwrap() < peak);
        assert!(c.derivative(9.0).unwrap() < peak);
    }

    #[test]
    fn concave_without_offset() {
        let c = curve(0.0);
        let mut prev = c.derivative(0.0).unwrap();
        for i in 1..50 {
            let d = c.derivative(i as f64 * 0.5).unwrap();
            assert!(d <= prev);
            prev = d;
        }
    }

    #[test]
    fn derivative_matches_finite_difference() {
        let c = curve(0.5).with_price(2.0).unwrap();
        let h = 1e-5;
        for x in [1.0, 7.5, 10.0, 22.0] {
            let numeric = (c.evaluate(x + h).unwrap() - c.evaluate(x - h).unwrap()) / (2.0 * h);
            let analytic = c.derivative(x).unwrap();
            assert!((numeric - analytic).abs() < 1e-7, "at {x}: {analytic} vs {numeric}");
        }
    }

    #[test]
    fn negative_spend_rejected() {
        assert!(matches!(curve(0.5).evaluate(-2.0), Err(CurveError::NegativeSpend(_))));
    }

    #[test]
    fn rejects_negative_ec50() {
        assert!(LogisticCurve::new(10.0, -0.1, 1.0).is_err());
    }
}
