//! Double-exponential saturation curve.
//!
//! With `u(x) = a * exp(-a * x / b)`:
//!
//! `value(x) = multiplier * 100 * (1 / (1 + e^u(x)) - 1 / (1 + e^a))`
//!
//! `u(0) = a`, so `value(0) = 0`, and `u` decays to zero as spend grows,
//! giving the capacity `multiplier * 100 * (sigmoid(a) - 1/2)`. `b` scales
//! spend. For small `a` (below about 1.543) the curve is concave; larger
//! `a` gives a convex toe before the marginal return peaks.

use knap_core::error::CurveError;
use knap_core::traits::{check_spend, ResponseFunction};
use serde::{Deserialize, Serialize};

use crate::logistic::{sigmoid, sigmoid_slope};

/// Response ceiling before the multiplier.
const SCALE: f64 = 100.0;

fn one() -> f64 {
    1.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArtCurve {
    /// Shape coefficient; also the decay rate of `u` per `b` of spend.
    pub a: f64,
    /// Spend scale.
    pub b: f64,
    #[serde(default = "one")]
    pub multiplier: f64,
}

impl ArtCurve {
    pub fn new(a: f64, b: f64) -> Result<Self, CurveError> {
        let curve = Self {
            a,
            b,
            multiplier: 1.0,
        };
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
            ("a", self.a, self.a > 0.0),
            ("b", self.b, self.b > 0.0),
            ("multiplier", self.multiplier, self.multiplier >= 0.0),
        ];
        for (name, value, ok) in checks {
            if !(ok && value.is_finite()) {
                return Err(CurveError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }

    fn u(&self, x: f64) -> f64 {
        self.a * (-self.a * x / self.b).exp()
    }

    fn scale(&self) -> f64 {
        SCALE * self.multiplier
    }
}

impl ResponseFunction for ArtCurve {
    fn evaluate(&self, spend: f64) -> Result<f64, CurveError> {
        let x = check_spend(spend)?;
        if x == 0.0 {
            return Ok(0.0);
        }
        let v = self.scale() * (sigmoid(-self.u(x)) - sigmoid(-self.a));
        Ok(v.max(0.0))
    }

    fn derivative(&self, spend: f64) -> Result<f64, CurveError> {
        let x = check_spend(spend)?;
        // d/dx sigmoid(-u) = sigmoid'(u) * u * a / b
        let u = self.u(x);
        Ok(self.scale() * sigmoid_slope(u) * u * self.a / self.b)
    }

    fn capacity(&self) -> f64 {
        self.scale() * (sigmoid(self.a) - 0.5)
    }
}
