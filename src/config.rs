//! Engine tuning parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use crate::consts::{COMMIT_EPSILON, HANDLE_RADIUS_PX, MIN_ELEMENT_SIZE, SNAP_THRESHOLD};
use crate::error::ConfigError;

pub const ENV_SNAP_THRESHOLD: &str = "LAYOUT_SNAP_THRESHOLD";
pub const ENV_MIN_SIZE: &str = "LAYOUT_MIN_SIZE";
pub const ENV_COMMIT_EPSILON: &str = "LAYOUT_COMMIT_EPSILON";
pub const ENV_HANDLE_RADIUS_PX: &str = "LAYOUT_HANDLE_RADIUS_PX";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Snap distance in logical units.
    pub snap_threshold: f64,
    /// Minimum element width and height in logical units.
    pub min_size: f64,
    /// Geometry deltas at or below this are not committed.
    pub commit_epsilon: f64,
    /// Resize-handle hit slop in screen pixels.
    pub handle_radius_px: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            snap_threshold: SNAP_THRESHOLD,
            min_size: MIN_ELEMENT_SIZE,
            commit_epsilon: COMMIT_EPSILON,
            handle_radius_px: HANDLE_RADIUS_PX,
        }
    }
}

impl EngineConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `LAYOUT_SNAP_THRESHOLD`: default 5
    /// - `LAYOUT_MIN_SIZE`: default 10, never lower
    /// - `LAYOUT_COMMIT_EPSILON`: default 0.01
    /// - `LAYOUT_HANDLE_RADIUS_PX`: default 8
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a set variable is not a finite positive number,
    /// or when the minimum size is below 10.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_lookup)
    }

    /// Build config from an arbitrary key lookup; unset keys keep their default.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when a present value is not a finite positive number,
    /// or when the minimum size is below 10.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let min_size = parse_positive(&lookup, ENV_MIN_SIZE, defaults.min_size)?;
        if min_size < MIN_ELEMENT_SIZE {
            return Err(ConfigError::BelowMinimum {
                key: ENV_MIN_SIZE.to_string(),
                value: min_size,
                min: MIN_ELEMENT_SIZE,
            });
        }
        Ok(Self {
            snap_threshold: parse_positive(&lookup, ENV_SNAP_THRESHOLD, defaults.snap_threshold)?,
            min_size,
            commit_epsilon: parse_positive(&lookup, ENV_COMMIT_EPSILON, defaults.commit_epsilon)?,
            handle_radius_px: parse_positive(&lookup, ENV_HANDLE_RADIUS_PX, defaults.handle_radius_px)?,
        })
    }
}

fn env_lookup(key: &str) -> Option<String> {
    match std::env::var(key) {
        Ok(value) => Some(value),
        Err(std::env::VarError::NotPresent) => None,
        Err(std::env::VarError::NotUnicode(_)) => {
            tracing::warn!(%key, "ignoring non-unicode config value");
            None
        }
    }
}

fn parse_positive<F>(lookup: &F, key: &str, default: f64) -> Result<f64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|_| ConfigError::NotANumber { key: key.to_string(), value: raw.clone() })?;
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::OutOfRange { key: key.to_string(), value });
    }
    Ok(value)
}
