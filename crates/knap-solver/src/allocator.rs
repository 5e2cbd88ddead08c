//! Water-filling allocator.
//!
//! At the optimum of a separable concave maximization under one budget
//! constraint, every funded channel has the same marginal return λ and every
//! unfunded channel opens at a marginal return of at most λ. The allocator
//! bisects λ (geometrically, since it spans many orders of magnitude) until
//! the spends it implies add up to the budget.
//!
//! The bracket runs from the highest opening marginal return down to the
//! lowest marginal return at any channel's reach. A channel's reach stops
//! at its saturation spend, so budget is left unspent only when every
//! channel saturates (or hits its `max_spend`) before the budget runs out.

use knap_core::constants::MONOTONE_SLACK;
use knap_core::error::{AllocationError, ConfigError, KnapError};
use knap_core::traits::ResponseFunction;
use knap_core::types::{Allocation, ChannelBounds, SolveOptions};
use tracing::{debug, trace, warn};

use crate::config::options_from_env;
use crate::profile::ChannelProfile;

/// Budget allocator over any slice of [`ResponseFunction`]s.
///
/// Stateless apart from its options: one allocator can serve any number of
/// solves, concurrently.
#[derive(Debug, Clone, Default)]
pub struct Allocator {
    options: SolveOptions,
}

fn check_budget(budget: f64) -> Result<f64, AllocationError> {
    if !budget.is_finite() {
        return Err(AllocationError::NonFiniteBudget(budget));
    }
    if budget < 0.0 {
        return Err(AllocationError::NegativeBudget(budget));
    }
    Ok(budget + 0.0)
}

/// Spend a single curve takes at marginal price `marginal`, searching `[0, reach]`.
///
/// Zero when the curve's opening marginal return is at or below `marginal`.
pub fn spend_at_marginal<F: ResponseFunction + ?Sized>(
    f: &F,
    marginal: f64,
    reach: f64,
) -> Result<f64, AllocationError> {
    let reach = check_budget(reach)?;
    ChannelProfile::build(f, 0, ChannelBounds::UNBOUNDED, reach, None)?.spend_at(f, marginal)
}

impl Allocator {
    pub fn new(options: SolveOptions) -> Result<Self, AllocationError> {
        options.validate()?;
        Ok(Self { options })
    }

    /// Allocator configured from `KNAP_*` environment variables.
    pub fn from_env() -> Result<Self, KnapError> {
        let options = options_from_env()?;
        Self::new(options)
            .map_err(|e| KnapError::Config(ConfigError::InvalidOptions(e.to_string())))
    }

    pub fn options(&self) -> &SolveOptions {
        &self.options
    }

    /// Split `total_budget` across `functions` to maximize total response.
    ///
    /// Spends come back in input order and sum to at most `total_budget`;
    /// they fall short only when every channel saturates first.
    pub fn solve<F: ResponseFunction>(
        &self,
        functions: &[F],
        total_budget: f64,
    ) -> Result<Allocation, AllocationError> {
        let bounds = vec![ChannelBounds::UNBOUNDED; functions.len()];
        self.solve_with_bounds(functions, &bounds, total_budget)
    }

    /// [`solve`](Self::solve) with a minimum and maximum spend per channel.
    pub fn solve_with_bounds<F: ResponseFunction>(
        &self,
        functions: &[F],
        bounds: &[ChannelBounds],
        total_budget: f64,
    ) -> Result<Allocation, AllocationError> {
        let budget = check_budget(total_budget)?;
        if functions.is_empty() {
            if budget == 0.0 {
                return Ok(Allocation::empty(budget));
            }
            return Err(AllocationError::NoChannels);
        }
        let profiles = self.profiles(functions, bounds, budget)?;

        let required: f64 = profiles.iter().map(ChannelProfile::min_spend).sum();
        if required > budget {
            return Err(AllocationError::InfeasibleBounds { required, budget });
        }

        debug!(channels = functions.len(), budget, required, "allocator: solving");

        let ceiling = profiles
            .iter()
            .map(ChannelProfile::opening_marginal)
            .fold(0.0, f64::max);
        let mut spends = vec![0.0; functions.len()];
        if required == budget || ceiling <= 0.0 {
            fill_spends(functions, &profiles, f64::INFINITY, &mut spends)?;
            return self.finish(functions, spends, budget, ceiling, 0, true);
        }

        // Below the lowest marginal return at any channel's reach, every
        // channel takes its whole reach.
        let floor = profiles
            .iter()
            .filter(|p| !p.is_inert())
            .map(ChannelProfile::floor_marginal)
            .fold(f64::INFINITY, f64::min);
        let floor = (floor * (1.0 - MONOTONE_SLACK)).max(f64::MIN_POSITIVE);
        let saturated = fill_spends(functions, &profiles, floor, &mut spends)?;
        if saturated <= budget {
            debug!(spent = saturated, budget, "allocator: every channel saturates within budget");
            return self.finish(functions, spends, budget, floor, 0, true);
        }

        let tolerance = self.options.tolerance;
        let (mut lo, mut hi) = (floor, ceiling);
        let mut iterations = 0;
        while iterations < self.options.max_iterations {
            let mid = lo.sqrt() * hi.sqrt();
            if !(mid > lo && mid < hi) {
                return self.bridge(functions, &profiles, budget, lo, hi, iterations);
            }
            iterations += 1;

            let spent = fill_spends(functions, &profiles, mid, &mut spends)?;
            trace!(iteration = iterations, marginal = mid, spent, "allocator: bisection step");
            if spent <= budget && budget - spent <= tolerance {
                return self.finish(functions, spends, budget, mid, iterations, true);
            }
            if spent > budget {
                lo = mid;
            } else {
                hi = mid;
            }
        }

        // `hi` always prices a feasible allocation.
        let spent = fill_spends(functions, &profiles, hi, &mut spends)?;
        let residual = budget - spent;
        if self.options.allow_approximate {
            warn!(iterations, residual, "allocator: returning unconverged allocation");
            return self.finish(functions, spends, budget, hi, iterations, false);
        }
        Err(AllocationError::NonConvergence { iterations, residual })
    }

    /// Total spend implied by marginal price `marginal` with no spend bounds.
    pub fn total_spend<F: ResponseFunction>(
        &self,
        functions: &[F],
        marginal: f64,
        total_budget: f64,
    ) -> Result<f64, AllocationError> {
        let budget = check_budget(total_budget)?;
        let bounds = vec![ChannelBounds::UNBOUNDED; functions.len()];
        let profiles = self.profiles(functions, &bounds, budget)?;
        let mut spends = vec![0.0; functions.len()];
        fill_spends(functions, &profiles, marginal, &mut spends)
    }

    /// Sum of `functions[i].evaluate(spends[i])`.
    pub fn total_response<F: ResponseFunction>(
        functions: &[F],
        spends: &[f64],
    ) -> Result<f64, AllocationError> {
        if spends.len() != functions.len() {
            return Err(AllocationError::SpendsMismatch {
                spends: spends.len(),
                channels: functions.len(),
            });
        }
        functions
            .iter()
            .zip(spends)
            .enumerate()
            .map(|(channel, (f, &spend))| {
                f.evaluate(spend)
                    .map_err(|source| AllocationError::Curve { channel, source })
            })
            .sum()
    }

    fn profiles<F: ResponseFunction>(
        &self,
        functions: &[F],
        bounds: &[ChannelBounds],
        budget: f64,
    ) -> Result<Vec<ChannelProfile>, AllocationError> {
        if bounds.len() != functions.len() {
            return Err(AllocationError::BoundsMismatch {
                bounds: bounds.len(),
                channels: functions.len(),
            });
        }
        functions
            .iter()
            .zip(bounds)
            .enumerate()
            .map(|(channel, (f, b))| {
                b.validate(channel)?;
                ChannelProfile::build(f, channel, *b, budget, Some(self.options.saturation_gap))
            })
            .collect()
    }

    /// Total spend jumps across `(lo, hi)`, which has shrunk to adjacent
    /// floats: an S-shaped channel opening or a flat stretch of marginal
    /// return. Start from the spends at `hi` and hand the leftover budget to
    /// the channels that would grow at `lo`, in input order.
    fn bridge<F: ResponseFunction>(
        &self,
        functions: &[F],
        profiles: &[ChannelProfile],
        budget: f64,
        lo: f64,
        hi: f64,
        iterations: usize,
    ) -> Result<Allocation, AllocationError> {
        let mut spends = vec![0.0; functions.len()];
        let mut upper = vec![0.0; functions.len()];
        let spent = fill_spends(functions, profiles, hi, &mut spends)?;
        fill_spends(functions, profiles, lo, &mut upper)?;

        let mut left = budget - spent;
        for (s, u) in spends.iter_mut().zip(&upper) {
            if left <= 0.0 {
                break;
            }
            let take = (u - *s).max(0.0).min(left);
            *s += take;
            left -= take;
        }
        debug!(marginal = hi, iterations, "allocator: bridged jump in total spend");
        self.finish(functions, spends, budget, hi, iterations, true)
    }

    fn finish<F: ResponseFunction>(
        &self,
        functions: &[F],
        spends: Vec<f64>,
        budget: f64,
        marginal: f64,
        iterations: usize,
        converged: bool,
    ) -> Result<Allocation, AllocationError> {
        let total_response = Self::total_response(functions, &spends)?;
        debug!(marginal, iterations, total_response, converged, "allocator: done");
        Ok(Allocation {
            spends,
            budget,
            marginal,
            total_response,
            iterations,
            converged,
        })
    }
}

/// Write each channel's spend at `marginal` into `spends`; return their sum.
fn fill_spends<F: ResponseFunction>(
    functions: &[F],
    profiles: &[ChannelProfile],
    marginal: f64,
    spends: &mut [f64],
) -> Result<f64, AllocationError> {
    let mut total = 0.0;
    for ((f, p), s) in functions.iter().zip(profiles).zip(spends.iter_mut()) {
        *s = p.spend_at(f, marginal)?;
        total += *s;
    }
    Ok(total)
}
