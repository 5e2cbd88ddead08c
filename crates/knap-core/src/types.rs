//! Value types shared between the allocator and its callers.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MAX_ITERATIONS, DEFAULT_SATURATION_GAP, DEFAULT_TOLERANCE};
use crate::error::AllocationError;

/// Stop criteria and failure policy for one solve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolveOptions {
    /// Absolute stop criterion on `|total_spend(λ) - budget|`.
    pub tolerance: f64,
    /// Bound on bisection steps over the marginal price λ.
    pub max_iterations: usize,
    /// Fraction of capacity a channel may leave unreached and still count
    /// as saturated.
    pub saturation_gap: f64,
    /// Return the best feasible allocation, flagged unconverged, instead of
    /// failing with `NonConvergence`.
    pub allow_approximate: bool,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            saturation_gap: DEFAULT_SATURATION_GAP,
            allow_approximate: false,
        }
    }
}

impl SolveOptions {
    /// Preset for interactive what-if runs: looser tolerance, best-effort results.
    pub fn exploratory() -> Self {
        Self {
            tolerance: 1e-3,
            max_iterations: 64,
            allow_approximate: true,
            ..Self::default()
        }
    }

    /// Builder-style tolerance override.
    pub fn with_tolerance(self, tolerance: f64) -> Self {
        Self { tolerance, ..self }
    }

    /// Builder-style iteration bound override.
    pub fn with_max_iterations(self, max_iterations: usize) -> Self {
        Self { max_iterations, ..self }
    }

    pub fn validate(&self) -> Result<(), AllocationError> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(AllocationError::InvalidOptions(format!(
                "tolerance must be positive, got {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(AllocationError::InvalidOptions(
                "max_iterations must be non-zero".into(),
            ));
        }
        if !(self.saturation_gap >= 0.0 && self.saturation_gap < 1.0) {
            return Err(AllocationError::InvalidOptions(format!(
                "saturation_gap must lie in [0, 1), got {}",
                self.saturation_gap
            )));
        }
        Ok(())
    }
}

/// Minimum and maximum spend for one channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelBounds {
    pub min_spend: f64,
    pub max_spend: f64,
}

impl Default for ChannelBounds {
    fn default() -> Self {
        Self::UNBOUNDED
    }
}

impl ChannelBounds {
    /// No floor, no ceiling.
    pub const UNBOUNDED: Self = Self {
        min_spend: 0.0,
        max_spend: f64::INFINITY,
    };

    pub fn new(min_spend: f64, max_spend: f64) -> Self {
        Self { min_spend, max_spend }
    }

    /// Only a ceiling.
    pub fn at_most(max_spend: f64) -> Self {
        Self {
            max_spend,
            ..Self::UNBOUNDED
        }
    }

    /// Only a floor.
    pub fn at_least(min_spend: f64) -> Self {
        Self {
            min_spend,
            ..Self::UNBOUNDED
        }
    }

    /// Validate the bounds of channel `channel`.
    pub fn validate(&self, channel: usize) -> Result<(), AllocationError> {
        let ok = self.min_spend.is_finite()
            && self.min_spend >= 0.0
            && !self.max_spend.is_nan()
            && self.max_spend >= self.min_spend;
        if ok {
            Ok(())
        } else {
            Err(AllocationError::InvalidBounds {
                channel,
                min_spend: self.min_spend,
                max_spend: self.max_spend,
            })
        }
    }

    pub fn clamp(&self, spend: f64) -> f64 {
        spend.max(self.min_spend).min(self.max_spend)
    }
}

/// Result of one solve: spends in input channel order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    /// Spend per channel, in the same order as the input curves.
    pub spends: Vec<f64>,
    /// The budget the allocation was solved for.
    pub budget: f64,
    /// Common marginal return λ* shared by the funded channels.
    pub marginal: f64,
    /// Sum of the response of every channel at its spend.
    pub total_response: f64,
    /// Bisection steps taken over λ.
    pub iterations: usize,
    /// False only for best-effort results returned under `allow_approximate`.
    pub converged: bool,
}

impl Allocation {
    /// Empty allocation for an empty channel set.
    pub fn empty(budget: f64) -> Self {
        Self {
            spends: Vec::new(),
            budget,
            marginal: 0.0,
            total_response: 0.0,
            iterations: 0,
            converged: true,
        }
    }

    pub fn len(&self) -> usize {
        self.spends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spends.is_empty()
    }

    pub fn spend(&self, channel: usize) -> Option<f64> {
        self.spends.get(channel).copied()
    }

    pub fn total_spend(&self) -> f64 {
        self.spends.iter().sum()
    }

    /// Budget left unspent, e.g. because every channel saturated first.
    pub fn unspent(&self) -> f64 {
        (self.budget - self.total_spend()).max(0.0)
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = f64> + ExactSizeIterator + '_ {
        self.spends.iter().copied()
    }
}
