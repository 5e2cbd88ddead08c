//! Hill-type saturation curve.
//!
//! `value(x) = multiplier * cap / (1 + (x / (price * cap * ec50))^(-steep))`
//!
//! `price * cap * ec50` is the half-saturation spend: the spend at which the
//! curve reaches half of its capacity. With `steep <= 1` the curve is concave
//! on the whole positive axis; with `steep > 1` it is convex up to its
//! inflection point and concave after it.
//!
//! The formula is singular at `x = 0`, so zero spend is special-cased:
//! `value(0) = 0`, and the derivative below a tiny probe spend is reported
//! as its value at the probe (finite for every steepness).

use knap_core::constants::ORIGIN_PROBE_FRACTION;
use knap_core::error::CurveError;
use knap_core::traits::{check_spend, ResponseFunction};
use serde::{Deserialize, Serialize};

fn one() -> f64 {
    1.0
}

/// Hill saturation curve with optional unit price and model multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HillCurve {
    /// Maximum response level before the multiplier.
    pub cap: f64,
    /// Half-saturation point as a fraction of the price-scaled cap.
    pub ec50: f64,
    /// Slope coefficient.
    pub steep: f64,
    /// Spend per unit of exposure.
    #[serde(default = "one")]
    pub price: f64,
    /// Model coefficient applied to the whole curve.
    #[serde(default = "one")]
    pub multiplier: f64,
}

impl HillCurve {
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

    /// Check every parameter; needed after deserializing.
    pub fn validate(&self) -> Result<(), CurveError> {
        let checks = [
            ("cap", self.cap, self.cap >= 0.0),
            ("ec50", self.ec50, self.ec50 > 0.0),
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

    /// Spend at which the curve reaches half of its capacity.
    pub fn half_saturation_spend(&self) -> f64 {
        self.price * self.cap * self.ec50
    }

    pub fn is_concave(&self) -> bool {
        self.steep <= 1.0
    }

    /// Spend at which marginal return peaks; zero for concave curves.
    pub fn inflection_spend(&self) -> f64 {
        if self.is_concave() {
            return 0.0;
        }
        let s = self.steep;
        self.half_saturation_spend() * ((s - 1.0) / (s + 1.0)).powf(s.recip())
    }

    fn scale(&self) -> f64 {
        self.cap * self.multiplier
    }
}

impl ResponseFunction for HillCurve {
    fn evaluate(&self, spend: f64) -> Result<f64, CurveError> {
        let x = check_spend(spend)?;
        let scale = self.scale();
        if x == 0.0 || scale == 0.0 {
            return Ok(0.0);
        }
        // r^(-s) underflows to 0 when saturated and overflows to inf near 0;
        // both ends give the right limit.
        let r = x / self.half_saturation_spend();
        Ok(scale / (1.0 + r.powf(-self.steep)))
    }

    fn derivative(&self, spend: f64) -> Result<f64, CurveError> {
        let x = check_spend(spend)?;
        let scale = self.scale();
        if scale == 0.0 {
            return Ok(0.0);
        }
        let k = self.half_saturation_spend();
        let x = x.max(k * ORIGIN_PROBE_FRACTION);
        let rs = (x / k).powf(self.steep);
        // rs / (1 + rs)^2 is symmetric under rs -> 1/rs; evaluate on the side
        // that cannot overflow.
        let q = if rs <= 1.0 {
            rs / ((1.0 + rs) * (1.0 + rs))
        } else {
            let t = rs.recip();
            t / ((1.0 + t) * (1.0 + t))
        };
        Ok(scale * self.steep / x * q)
    }

    fn capacity(&self) -> f64 {
        self.scale()
    }
}
