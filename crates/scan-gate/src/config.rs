//! # Scan Gate Configuration

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Default minimum gap between two accepted decode events.
pub const DEFAULT_DEBOUNCE_MS: u64 = 2000;
/// Default bound on one decision, store round-trip included.
pub const DEFAULT_DECISION_TIMEOUT_MS: u64 = 5000;
/// Default history page size.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A decision could never finish.
    #[error("decision_timeout_ms must be greater than zero")]
    ZeroDecisionTimeout,

    /// History would always be empty.
    #[error("history_limit must be greater than zero")]
    ZeroHistoryLimit,
}

/// Scan gate configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanGateConfig {
    /// Minimum gap between accepted decode events, in milliseconds.
    pub debounce_window_ms: u64,

    /// Bound on one decision, in milliseconds. Expiry surfaces as an error.
    pub decision_timeout_ms: u64,

    /// Records shown by the history view.
    pub history_limit: usize,
}

impl Default for ScanGateConfig {
    fn default() -> Self {
        Self {
            debounce_window_ms: DEFAULT_DEBOUNCE_MS,
            decision_timeout_ms: DEFAULT_DECISION_TIMEOUT_MS,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

impl ScanGateConfig {
    /// Create a config for testing (smaller values).
    pub fn for_testing() -> Self {
        Self {
            debounce_window_ms: 2000,
            decision_timeout_ms: 500,
            history_limit: 10,
        }
    }

    /// Defaults overridden by environment variables.
    ///
    /// - `SG_DEBOUNCE_MS`
    /// - `SG_DECISION_TIMEOUT_MS`
    /// - `SG_HISTORY_LIMIT`
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            debounce_window_ms: env_or("SG_DEBOUNCE_MS", defaults.debounce_window_ms),
            decision_timeout_ms: env_or("SG_DECISION_TIMEOUT_MS", defaults.decision_timeout_ms),
            history_limit: env_or("SG_HISTORY_LIMIT", defaults.history_limit),
        }
    }

    /// Reject configurations that cannot work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.decision_timeout_ms == 0 {
            return Err(ConfigError::ZeroDecisionTimeout);
        }
        if self.history_limit == 0 {
            return Err(ConfigError::ZeroHistoryLimit);
        }
        Ok(())
    }

    /// Debounce window as a `Duration`.
    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.debounce_window_ms)
    }

    /// Decision timeout as a `Duration`.
    pub fn decision_timeout(&self) -> Duration {
        Duration::from_millis(self.decision_timeout_ms)
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
