//! # Runtime Configuration
//!
//! File locations plus the scan gate tunables, all overridable from the
//! environment.

use std::env;
use std::path::PathBuf;

use scan_gate::{ConfigError, ScanGateConfig};

/// Default allow-list location.
pub const DEFAULT_ALLOW_LIST_PATH: &str = "data/valid_uids.json";
/// Default scan log location.
pub const DEFAULT_STORE_PATH: &str = "data/scans.jsonl";

/// Complete station configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// JSON file of the form `{"uids": [...]}`.
    pub allow_list_path: PathBuf,
    /// Append-only scan log.
    pub store_path: PathBuf,
    /// Decision and session tunables.
    pub gate: ScanGateConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            allow_list_path: PathBuf::from(DEFAULT_ALLOW_LIST_PATH),
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            gate: ScanGateConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Defaults overridden by `SG_ALLOW_LIST`, `SG_STORE_PATH` and the
    /// `SG_*` gate variables.
    pub fn from_env() -> Self {
        let mut config = Self {
            gate: ScanGateConfig::from_env(),
            ..Self::default()
        };

        if let Ok(path) = env::var("SG_ALLOW_LIST") {
            if !path.trim().is_empty() {
                config.allow_list_path = PathBuf::from(path);
            }
        }
        if let Ok(path) = env::var("SG_STORE_PATH") {
            if !path.trim().is_empty() {
                config.store_path = PathBuf::from(path);
            }
        }

        config
    }

    /// Reject configurations the station cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.gate.validate()
    }
}
