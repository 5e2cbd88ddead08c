//! Serializable description of any reference curve.
//!
//! ```
//! use knap_core::traits::ResponseFunction;
//! use knap_curves::CurveSpec;
//!
//! let spec: CurveSpec = serde_json::from_str(
//!     r#"{"kind": "hill", "cap": 100.0, "ec50": 0.5, "steep": 1.0}"#,
//! ).unwrap();
//! spec.validate().unwrap();
//! assert_eq!(spec.evaluate(50.0).unwrap(), 50.0);
//! ```

use knap_core::error::CurveError;
use knap_core::traits::ResponseFunction;
use serde::{Deserialize, Serialize};

use crate::art::ArtCurve;
use crate::hill::HillCurve;
use crate::logistic::LogisticCurve;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CurveSpec {
    Hill(HillCurve),
    Logistic(LogisticCurve),
    Art(ArtCurve),
    Mixed { parts: Vec<CurveSpec> },
}

impl CurveSpec {
    /// Validate parameters, recursing into mixed parts.
    pub fn validate(&self) -> Result<(), CurveError> {
        match self {
            Self::Hill(c) => c.validate(),
            Self::Logistic(c) => c.validate(),
            Self::Art(c) => c.validate(),
            Self::Mixed { parts } => {
                if parts.is_empty() {
                    return Err(CurveError::EmptyMix);
                }
                parts.iter().try_for_each(CurveSpec::validate)
            }
        }
    }
}

impl From<HillCurve> for CurveSpec {
    fn from(c: HillCurve) -> Self {
        Self::Hill(c)
    }
}

impl From<LogisticCurve> for CurveSpec {
    fn from(c: LogisticCurve) -> Self {
        Self::Logistic(c)
    }
}

impl From<ArtCurve> for CurveSpec {
    fn from(c: ArtCurve) -> Self {
        Self::Art(c)
    }
}

impl ResponseFunction for CurveSpec {
    fn evaluate(&self, spend: f64) -> Result<f64, CurveError> {
        match self {
            Self::Hill(c) => c.evaluate(spend),
            Self::Logistic(c) => c.evaluate(spend),
            Self::Art(c) => c.evaluate(spend),
            Self::Mixed { parts } => parts.iter().map(|p| p.evaluate(spend)).sum(),
        }
    }

    fn derivative(&self, spend: f64) -> Result<f64, CurveError> {
        match self {
            Self::Hill(c) => c.derivative(spend),
            Self::Logistic(c) => c.derivative(spend),
            Self::Art(c) => c.derivative(spend),
            Self::Mixed { parts } => parts.iter().map(|p| p.derivative(spend)).sum(),
        }
    }

    fn capacity(&self) -> f64 {
        match self {
            Self::Hill(c) => c.capacity(),
            Self::Logistic(c) => c.capacity(),
            Self::Art(c) => c.capacity(),
            Self::Mixed { parts } => parts.iter().map(ResponseFunction::capacity).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hill_defaults_price_and_multiplier() {
        let spec: CurveSpec =
            serde_json::from_str(r#"{"kind": "hill", "cap": 10.0, "ec50": 0.5, "steep": 2.0}"#)
                .unwrap();
        match spec {
            CurveSpec::Hill(c) => {
                assert_eq!(c.price, 1.0);
                assert_eq!(c.multiplier, 1.0);
            }
            other => panic!("expected hill, got {other:?}"),
        }
    }

    #[test]
    fn nested_mix_parses_and_sums() {
        let json = r#"{
            "kind": "mixed",
            "parts": [
                {"kind": "hill", "cap": 10.0, "ec50": 0.5, "steep": 1.0},
                {"kind": "logistic", "cap": 4.0, "ec50": 0.0, "steep": 1.0, "multiplier": 2.0}
            ]
        }"#;
        let spec: CurveSpec = serde_json::from_str(json).unwrap();
        spec.validate().unwrap();
        assert!((spec.capacity() - 14.0).abs() < 1e-12);
        assert!((spec.evaluate(5.0).unwrap() - (5.0 + 8.0 * (1.0 / (1.0 + (-1.25f64).exp()) - 0.5))).abs() < 1e-12);
    }

    #[test]
    fn validate_catches_bad_parameters() {
        let spec: CurveSpec =
            serde_json::from_str(r#"{"kind": "hill", "cap": 10.0, "ec50": -1.0, "steep": 2.0}"#)
                .unwrap();
        assert!(matches!(
            spec.validate(),
            Err(CurveError::InvalidParameter { name: "ec50", .. })
        ));
        let empty = CurveSpec::Mixed { parts: vec![] };
        assert_eq!(empty.validate(), Err(CurveError::EmptyMix));
    }

    #[test]
    fn art_parses_and_validates() {
        let spec: CurveSpec =
            serde_json::from_str(r#"{"kind": "art", "a": 1.0, "b": 10.0, "multiplier": 0.5}"#)
                .unwrap();
        spec.validate().unwrap();
        assert_eq!(spec, CurveSpec::from(ArtCurve::new(1.0, 10.0).unwrap().with_multiplier(0.5).unwrap()));
        assert_eq!(spec.evaluate(0.0).unwrap(), 0.0);
        assert!(spec.derivative(0.0).unwrap() > 0.0);

        let bad: CurveSpec = serde_json::from_str(r#"{"kind": "art", "a": 1.0, "b": 0.0}"#).unwrap();
        assert!(matches!(
            bad.validate(),
            Err(CurveError::InvalidParameter { name: "b", .. })
        ));
    }

    #[test]
    fn unknown_kind_rejected() {
        let res: Result<CurveSpec, _> = serde_json::from_str(r#"{"kind": "cubic", "a": 1.0}"#);
        assert!(res.is_err());
    }
}
