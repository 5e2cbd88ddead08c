//! Shared fixtures for the integration tests.

use std::sync::Once;

use knap_core::error::CurveError;
use knap_core::traits::{check_spend, ResponseFunction};
use knap_curves::HillCurve;

/// Total budget of the reference media plan.
pub const MEDIA_BUDGET: f64 = 70_874_156.0;

/// Per-channel spend cap of the reference media plan.
pub const MEDIA_MAX_SPEND: f64 = 70_000_000.0;

/// Minimum spends the media planners asked for, in channel order.
pub const MEDIA_MIN_SPENDS: [f64; 7] = [
    10_600_000.0,
    5_700_000.0,
    1_923_077.0,
    8_307_692.0,
    3_246_154.0,
    9_791_667.0,
    15_786_389.0,
];

/// Best total response a general-purpose SQP solver found for the plan.
pub const MEDIA_SQP_RESPONSE: f64 = 1.077_943_070_941_746_8;

/// The plan the media team used before any optimizer was involved.
pub const MEDIA_MANUAL_PLAN: [f64; 7] = [
    10_900_000.0,
    4_120_000.0,
    8_300_000.0,
    3_246_000.0,
    14_300_000.0,
    14_100_000.0,
    16_000_000.0,
];

static TRACING: Once = Once::new();

/// Route solver logs to the test harness. Honors `RUST_LOG`; silent otherwise.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("off")),
            )
            .with_test_writer()
            .try_init();
    });
}

/// Seven fitted Hill curves: TV, OOH, radio, press, digital, cinema, OLV.
pub fn media_plan() -> Vec<HillCurve> {
    [
        (397_650.0, 0.508_521_7, 0.92, 9.168_728e-6 / 87.985_09),
        (1_336_580.0, 0.941_772, 0.996_416_7, 7.202_334e-7),
        (5.509_022, 5_000.0, 0.99, 2.982_394e-4 / 219.0),
        (3_191.663, 10_000.0, 0.75, 1.353_697e-3 / 65.0),
        (237_349.3, 0.995_435_4, 0.7, 9.501_362e-6 / 12.476_45),
        (2_961.220_9, 100.0, 0.5, 3.669_801e-3 / 87.985_09),
        (664_196.7, 0.662_257, 0.92, 1.275_716e-6 / 87.985_09),
    ]
    .into_iter()
    .map(|(cap, ec50, steep, multiplier)| {
        HillCurve::new(cap, ec50, steep)
            .and_then(|c| c.with_multiplier(multiplier))
            .expect("media plan parameters are valid")
    })
    .collect()
}

/// `f(x) = c * (1 - exp(-x / s))`, opening at marginal `c / s`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpSaturation {
    pub c: f64,
    pub s: f64,
}

impl ResponseFunction for ExpSaturation {
    fn evaluate(&self, spend: f64) -> Result<f64, CurveError> {
        Ok(self.c * -(-check_spend(spend)? / self.s).exp_m1())
    }

    fn derivative(&self, spend: f64) -> Result<f64, CurveError> {
        Ok(self.c / self.s * (-check_spend(spend)? / self.s).exp())
    }

    fn capacity(&self) -> f64 {
        self.c
    }
}

/// Slope `a` up to `x_max`, flat afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearCapped {
    pub a: f64,
    pub x_max: f64,
}

impl ResponseFunction for LinearCapped {
    fn evaluate(&self, spend: f64) -> Result<f64, CurveError> {
        Ok(self.a * check_spend(spend)?.min(self.x_max))
    }

    fn derivative(&self, spend: f64) -> Result<f64, CurveError> {
        Ok(if check_spend(spend)? < self.x_max { self.a } else { 0.0 })
    }

    fn capacity(&self) -> f64 {
        self.a * self.x_max
    }
}

/// Marginal return `|x - 5| + 0.1`: falls until spend 5, then climbs again.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rebound;

impl ResponseFunction for Rebound {
    fn evaluate(&self, spend: f64) -> Result<f64, CurveError> {
        let x = check_spend(spend)?;
        Ok(if x <= 5.0 {
            5.1 * x - 0.5 * x * x
        } else {
            let t = x - 5.0;
            13.0 + 0.1 * t + 0.5 * t * t
        })
    }

    fn derivative(&self, spend: f64) -> Result<f64, CurveError> {
        Ok((check_spend(spend)? - 5.0).abs() + 0.1)
    }

    fn capacity(&self) -> f64 {
        1e9
    }
}
