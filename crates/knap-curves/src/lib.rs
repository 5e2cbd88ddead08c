//! # knap-curves: Reference saturating response curves.
//!
//! Concrete [`ResponseFunction`](knap_core::traits::ResponseFunction)
//! implementations:
//! - **Hill curve**: `capacity / (1 + (spend / half_saturation_spend)^(-steepness))`,
//!   fully concave for steepness ≤ 1 and S-shaped above.
//! - **Logistic curve**: an exponential sigmoid shifted so that `value(0) = 0`.
//! - **Art curve**: a double-exponential saturation curve scaled to 100.
//! - **Mixed curve**: several curves summed into one channel.
//!
//! [`CurveSpec`] is the serde-tagged union of all of them, for loading curves
//! from configuration.

pub mod art;
pub mod hill;
pub mod logistic;
pub mod mixed;
pub mod spec;

pub use art::ArtCurve;
pub use hill::HillCurve;
pub use logistic::LogisticCurve;
pub use mixed::MixedCurve;
pub use spec::CurveSpec;
