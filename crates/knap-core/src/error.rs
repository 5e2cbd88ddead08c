//! Error types for knap.
use thiserror::Error;

/// Coarse classification of every knap error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The caller passed something the contract rejects.
    InvalidInput,
    /// A response function broke the monotonicity the allocator relies on.
    DomainViolation,
    /// The marginal-price search ran out of iterations.
    NonConvergence,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CurveError {
    #[error("negative spend: {0}")] NegativeSpend(f64),
    #[error("non-finite spend: {0}")] NonFiniteSpend(f64),
    #[error("invalid curve parameter {name}: {value}")] InvalidParameter { name: &'static str, value: f64 },
    #[error("mixed curve has no components")] EmptyMix,
}

impl CurveError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidInput
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AllocationError {
    #[error("negative budget: {0}")] NegativeBudget(f64),
    #[error("non-finite budget: {0}")] NonFiniteBudget(f64),
    #[error("no channels to allocate across")] NoChannels,
    #[error("got {bounds} bounds for {channels} channels")] BoundsMismatch { bounds: usize, channels: usize },
    #[error("got {spends} spends for {channels} channels")] SpendsMismatch { spends: usize, channels: usize },
    #[error("invalid bounds on channel {channel}: [{min_spend}, {max_spend}]")] InvalidBounds { channel: usize, min_spend: f64, max_spend: f64 },
    #[error("minimum spends {required} exceed budget {budget}")] InfeasibleBounds { required: f64, budget: f64 },
    #[error("invalid options: {0}")] InvalidOptions(String),
    #[error("channel {channel}: {source}")] Curve { channel: usize, source: CurveError },
    #[error("channel {channel}: {reason} at spend {spend}")] DomainViolation { channel: usize, spend: f64, reason: &'static str },
    #[error("no convergence after {iterations} iterations: residual {residual}")] NonConvergence { iterations: usize, residual: f64 },
}

impl AllocationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DomainViolation { .. } => ErrorKind::DomainViolation,
            Self::NonConvergence { .. } => ErrorKind::NonConvergence,
            _ => ErrorKind::InvalidInput,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")] InvalidValue { key: String, value: String },
    #[error("invalid options: {0}")] InvalidOptions(String),
}

#[derive(Error, Debug)]
pub enum KnapError {
    #[error(transparent)] Curve(#[from] CurveError),
    #[error(transparent)] Allocation(#[from] AllocationError),
    #[error(transparent)] Config(#[from] ConfigError),
}

impl KnapError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Curve(e) => e.kind(),
            Self::Allocation(e) => e.kind(),
            Self::Config(_) => ErrorKind::InvalidInput,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocation_kinds() {
        assert_eq!(AllocationError::NegativeBudget(-1.0).kind(), ErrorKind::InvalidInput);
        assert_eq!(AllocationError::NoChannels.kind(), ErrorKind::InvalidInput);
        assert_eq!(
            AllocationError::DomainViolation { channel: 0, spend: 1.0, reason: "rising marginal" }
                .kind(),
            ErrorKind::DomainViolation
        );
        assert_eq!(
            AllocationError::NonConvergence { iterations: 3, residual: 0.5 }.kind(),
            ErrorKind::NonConvergence
        );
    }

    #[test]
    fn curve_errors_surface_as_invalid_input() {
        let e = AllocationError::Curve { channel: 2, source: CurveError::NegativeSpend(-3.0) };
        assert_eq!(e.kind(), ErrorKind::InvalidInput);
        assert_eq!(e.to_string(), "channel 2: negative spend: -3");
    }

    #[test]
    fn umbrella_preserves_kind() {
        let e: KnapError = AllocationError::NonConvergence { iterations: 1, residual: 1.0 }.into();
        assert_eq!(e.kind(), ErrorKind::NonConvergence);
        let e: KnapError = CurveError::EmptyMix.into();
        assert_eq!(e.kind(), ErrorKind::InvalidInput);
    }
}
