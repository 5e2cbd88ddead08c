//! Numerical constants shared by the curves and the allocator.

/// Default absolute stop criterion on `|total_spend(λ) - budget|`.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Default bound on the number of bisection steps over the marginal price λ.
pub const DEFAULT_MAX_ITERATIONS: usize = 200;

/// Default saturation gap, as a fraction of a channel's capacity.
///
/// A channel counts as saturated once its response is within
/// `saturation_gap * capacity` of its capacity. It is never funded past that
/// point, so budget beyond every channel's saturation spend stays unspent.
pub const DEFAULT_SATURATION_GAP: f64 = 1e-6;

/// Channels with a capacity at or below this value are never funded.
pub const NEGLIGIBLE_CAPACITY: f64 = 1e-12;

/// Bound on bisection steps for a single channel's root search.
///
/// Bisection over an `f64` interval stops earlier once the midpoint
/// coincides with an endpoint, which takes at most ~1100 halvings and in
/// practice fewer than 100.
pub const ROOT_SEARCH_MAX_ITERATIONS: usize = 200;

/// Relative slack when checking that a marginal return is non-increasing.
pub const MONOTONE_SLACK: f64 = 1e-9;

/// Fraction of a channel's reach used to probe its curvature near zero.
pub const ENTRY_PROBE_FRACTION: f64 = 1e-9;

/// Smallest spend, as a fraction of the half-saturation spend, at which
/// reference curves evaluate their derivative.
///
/// Below this point the derivative is reported as its value at the probe,
/// which keeps `derivative(0)` finite for steepness below one.
pub const ORIGIN_PROBE_FRACTION: f64 = 1e-12;
