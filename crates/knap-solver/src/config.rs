//! Solver options loaded from environment variables.
//!
//! | variable                  | field               |
//! |---------------------------|---------------------|
//! | `KNAP_TOLERANCE`          | `tolerance`         |
//! | `KNAP_MAX_ITERATIONS`     | `max_iterations`    |
//! | `KNAP_SATURATION_GAP`     | `saturation_gap`    |
//! | `KNAP_ALLOW_APPROXIMATE`  | `allow_approximate` |
//!
//! Unset variables keep their [`SolveOptions::default`] value.

use std::str::FromStr;

use knap_core::error::ConfigError;
use knap_core::types::SolveOptions;

pub const ENV_TOLERANCE: &str = "KNAP_TOLERANCE";
pub const ENV_MAX_ITERATIONS: &str = "KNAP_MAX_ITERATIONS";
pub const ENV_SATURATION_GAP: &str = "KNAP_SATURATION_GAP";
pub const ENV_ALLOW_APPROXIMATE: &str = "KNAP_ALLOW_APPROXIMATE";

/// Load options from the process environment.
pub fn options_from_env() -> Result<SolveOptions, ConfigError> {
    options_from_lookup(|key| std::env::var(key).ok())
}

/// Load options through an arbitrary key lookup.
pub fn options_from_lookup<L>(lookup: L) -> Result<SolveOptions, ConfigError>
where
    L: Fn(&str) -> Option<String>,
{
    let mut options = SolveOptions::default();
    if let Some(v) = lookup(ENV_TOLERANCE) {
        options.tolerance = parse(ENV_TOLERANCE, &v)?;
    }
    if let Some(v) = lookup(ENV_MAX_ITERATIONS) {
        options.max_iterations = parse(ENV_MAX_ITERATIONS, &v)?;
    }
    if let Some(v) = lookup(ENV_SATURATION_GAP) {
        options.saturation_gap = parse(ENV_SATURATION_GAP, &v)?;
    }
    if let Some(v) = lookup(ENV_ALLOW_APPROXIMATE) {
        options.allow_approximate = parse_flag(ENV_ALLOW_APPROXIMATE, &v)?;
    }
    options
        .validate()
        .map_err(|e| ConfigError::InvalidOptions(e.to_string()))?;
    Ok(options)
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn parse<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| invalid(key, value))
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, value)),
    }
}
