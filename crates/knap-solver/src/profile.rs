//! Per-channel search state for the water-filling allocator.
//!
//! A [`ChannelProfile`] pins down where a channel can be funded:
//! - `reach`: the largest spend worth searching: `min(budget, max_spend)`,
//!   cut back to the channel's saturation spend, where its response comes
//!   within the saturation gap of its capacity.
//! - `entry`: the spend at which the channel opens. Zero for concave curves;
//!   for S-shaped curves, the spend maximizing average return, past which
//!   the marginal return is non-increasing.
//! - `opening_marginal`: the marginal price above which the channel stays
//!   unfunded. `derivative(0)` for concave curves, the peak average return
//!   for S-shaped ones.
//! - `floor_marginal`: a marginal price low enough that the channel takes
//!   its whole reach.
//!
//! Root searches are pure bisections over the curve; they never allocate.

use knap_core::constants::{
    ENTRY_PROBE_FRACTION, MONOTONE_SLACK, NEGLIGIBLE_CAPACITY, ROOT_SEARCH_MAX_ITERATIONS,
};
use knap_core::error::AllocationError;
use knap_core::traits::ResponseFunction;
use knap_core::types::ChannelBounds;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ChannelProfile {
    channel: usize,
    min_spend: f64,
    reach: f64,
    entry: f64,
    opening_marginal: f64,
    floor_marginal: f64,
    inert: bool,
}

/// Marginal return at `spend`, rejecting negative or non-finite values.
fn marginal<F: ResponseFunction + ?Sized>(
    f: &F,
    channel: usize,
    spend: f64,
) -> Result<f64, AllocationError> {
    let d = f
        .derivative(spend)
        .map_err(|source| AllocationError::Curve { channel, source })?;
    if !(d.is_finite() && d >= 0.0) {
        return Err(AllocationError::DomainViolation {
            channel,
            spend,
            reason: "marginal return is negative or non-finite",
        });
    }
    Ok(d)
}

fn value<F: ResponseFunction + ?Sized>(
    f: &F,
    channel: usize,
    spend: f64,
) -> Result<f64, AllocationError> {
    f.evaluate(spend)
        .map_err(|source| AllocationError::Curve { channel, source })
}

fn average<F: ResponseFunction + ?Sized>(
    f: &F,
    channel: usize,
    spend: f64,
) -> Result<f64, AllocationError> {
    f.average_return(spend)
        .map_err(|source| AllocationError::Curve { channel, source })
}

/// `derivative(x) - evaluate(x) / x`: positive while the curve is still
/// convex enough that average return keeps rising.
fn envelope_gap<F: ResponseFunction + ?Sized>(
    f: &F,
    channel: usize,
    spend: f64,
) -> Result<f64, AllocationError> {
    Ok(marginal(f, channel, spend)? - average(f, channel, spend)?)
}

impl ChannelProfile {
    pub(crate) fn build<F: ResponseFunction + ?Sized>(
        f: &F,
        channel: usize,
        bounds: ChannelBounds,
        budget: f64,
        saturation_gap: Option<f64>,
    ) -> Result<Self, AllocationError> {
        let mut profile = Self {
            channel,
            min_spend: bounds.min_spend,
            reach: bounds.max_spend.min(budget),
            entry: 0.0,
            opening_marginal: 0.0,
            floor_marginal: 0.0,
            inert: true,
        };

        let capacity = f.capacity();
        if !(capacity.is_finite() && capacity >= 0.0) {
            return Err(AllocationError::DomainViolation {
                channel,
                spend: 0.0,
                reason: "capacity is negative or non-finite",
            });
        }
        if capacity <= NEGLIGIBLE_CAPACITY || profile.reach <= 0.0 {
            return Ok(profile);
        }
        let reach = match saturation_gap {
            Some(gap) => Self::saturation_spend(f, channel, capacity, profile.reach, gap)?
                .max(profile.min_spend),
            None => profile.reach,
        };
        profile.reach = reach;
        if reach <= 0.0 {
            return Ok(profile);
        }

        let d0 = marginal(f, channel, 0.0)?;
        let probe = reach * ENTRY_PROBE_FRACTION;
        if envelope_gap(f, channel, probe)? <= MONOTONE_SLACK * d0 {
            profile.opening_marginal = d0;
        } else {
            profile.entry = Self::envelope_entry(f, channel, probe, reach)?;
            profile.opening_marginal = average(f, channel, profile.entry)?;
        }
        profile.floor_marginal = marginal(f, channel, reach)?.min(profile.opening_marginal);
        profile.inert = profile.opening_marginal <= 0.0;
        Ok(profile)
    }

    /// Smallest spend in `[0, reach]` at which the channel counts as
    /// saturated, or `reach` if it never does.
    ///
    /// A curve that goes flat within reach saturates exactly where it
    /// attains its capacity; an asymptotic one where it comes within
    /// `gap * capacity` of it.
    fn saturation_spend<F: ResponseFunction + ?Sized>(
        f: &F,
        channel: usize,
        capacity: f64,
        reach: f64,
        gap: f64,
    ) -> Result<f64, AllocationError> {
        let at_reach = value(f, channel, reach)?;
        if at_reach >= capacity {
            let full = Self::first_reaching(f, channel, capacity, reach)?;
            if marginal(f, channel, full)? == 0.0 {
                return Ok(full);
            }
        }
        let target = capacity * (1.0 - gap);
        if at_reach < target {
            return Ok(reach);
        }
        Self::first_reaching(f, channel, target, reach)
    }

    /// Smallest spend in `[0, reach]` whose value reaches `target`, given
    /// `evaluate(reach) >= target`.
    fn first_reaching<F: ResponseFunction + ?Sized>(
        f: &F,
        channel: usize,
        target: f64,
        reach: f64,
    ) -> Result<f64, AllocationError> {
        let (mut lo, mut hi) = (0.0, reach);
        for _ in 0..ROOT_SEARCH_MAX_ITERATIONS {
            let mid = lo + 0.5 * (hi - lo);
            if mid <= lo || mid >= hi {
                break;
            }
            if value(f, channel, mid)? >= target {
                hi = mid;
            } else {
                lo = mid;
            }
        }
        Ok(hi)
    }

    /// Tangent point of the concave envelope: first spend in `[lo, hi]`
    /// where marginal return no longer exceeds average return.
    fn envelope_entry<F: ResponseFunction + ?Sized>(
        f: &F,
        channel: usize,
        mut lo: f64,
        mut hi: f64,
    ) -> Result<f64, AllocationError> {
        if envelope_gap(f, channel, hi)? > 0.0 {
            // Still convex across the whole reach: all or nothing.
            return Ok(hi);
        }
        for _ in 0..ROOT_SEARCH_MAX_ITERATIONS {
            let mid = lo + 0.5 * (hi - lo);
            if mid <= lo || mid >= hi {
                break;
            }
            if envelope_gap(f, channel, mid)? > 0.0 {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        Ok(hi)
    }

    pub(crate) fn opening_marginal(&self) -> f64 {
        if self.inert { 0.0 } else { self.opening_marginal }
    }

    /// Marginal return at the channel's reach, capped by its opening
    /// marginal. Any price below it funds the whole reach.
    pub(crate) fn floor_marginal(&self) -> f64 {
        self.floor_marginal
    }

    pub(crate) fn is_inert(&self) -> bool {
        self.inert
    }

    pub(crate) fn min_spend(&self) -> f64 {
        self.min_spend
    }

    /// Spend this channel takes at marginal price `lambda`, within its bounds.
    pub(crate) fn spend_at<F: ResponseFunction + ?Sized>(
        &self,
        f: &F,
        lambda: f64,
    ) -> Result<f64, AllocationError> {
        if self.inert || lambda >= self.opening_marginal {
            return Ok(self.min_spend);
        }
        let raw = self.root(f, lambda)?;
        Ok(raw.max(self.min_spend).min(self.reach))
    }

    /// Spend on `[entry, reach]` where the marginal return crosses `lambda`.
    ///
    /// The marginal return must be non-increasing on that range; every probe
    /// is checked against the bracket so a rising marginal surfaces as a
    /// domain violation instead of a wrong root.
    fn root<F: ResponseFunction + ?Sized>(&self, f: &F, lambda: f64) -> Result<f64, AllocationError> {
        let channel = self.channel;
        let (mut lo, mut hi) = (self.entry, self.reach);
        let mut d_lo = marginal(f, channel, lo)?;
        if d_lo <= lambda {
            return Ok(lo);
        }
        let mut d_hi = marginal(f, channel, hi)?;
        if d_hi > d_lo * (1.0 + MONOTONE_SLACK) {
            return Err(AllocationError::DomainViolation {
                channel,
                spend: hi,
                reason: "marginal return rises across the search range",
            });
        }
        if d_hi >= lambda {
            return Ok(hi);
        }

        for _ in 0..ROOT_SEARCH_MAX_ITERATIONS {
            let mid = lo + 0.5 * (hi - lo);
            if mid <= lo || mid >= hi {
                break;
            }
            let d = marginal(f, channel, mid)?;
            if d > d_lo * (1.0 + MONOTONE_SLACK) || d < d_hi * (1.0 - MONOTONE_SLACK) {
                return Err(AllocationError::DomainViolation {
                    channel,
                    spend: mid,
                    reason: "marginal return is not monotone",
                });
            }
            if d > lambda {
                lo = mid;
                d_lo = d;
            } else {
                hi = mid;
                d_hi = d;
            }
        }
        Ok(lo + 0.5 * (hi - lo))
    }
}
