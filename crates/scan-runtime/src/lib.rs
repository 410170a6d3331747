//! # Scan Station Runtime
//!
//! Composition root for one scan station.
//!
//! ## Startup Sequence
//!
//! 1. Initialize telemetry (logging + metrics)
//! 2. Load configuration from the environment and validate it
//! 3. Load the allow-list
//! 4. Open the scan log (exclusive lock, replay)
//! 5. Wire engine, session controller and history reader
//! 6. Run the operator console until `quit` or end of input
//!
//! ## Modules
//!
//! - `config/` - `RuntimeConfig` (file locations + gate tunables)
//! - `console/` - line-oriented operator console

pub mod config;
pub mod console;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use scan_gate::{
    AllowList, FileScanStore, HistoryReader, ScanDecisionEngine, ScanSessionController, ScanStore,
};
use scan_telemetry::GRANTED_IDENTIFIERS;

pub use config::RuntimeConfig;
pub use console::{Command, ScanConsole};

/// Build a console over the files named in `config`.
pub fn build_console(config: &RuntimeConfig) -> Result<ScanConsole> {
    config.validate().context("invalid scan gate configuration")?;

    let allow_list = AllowList::from_json_file(&config.allow_list_path).with_context(|| {
        format!(
            "failed to load allow-list from {}",
            config.allow_list_path.display()
        )
    })?;

    let store = FileScanStore::open(&config.store_path).with_context(|| {
        format!("failed to open scan log {}", config.store_path.display())
    })?;
    GRANTED_IDENTIFIERS.set(store.granted_identifiers() as f64);
    let store: Arc<dyn ScanStore> = Arc::new(store);

    let engine = ScanDecisionEngine::new(Arc::new(allow_list), store.clone(), &config.gate);
    let controller = ScanSessionController::new(Arc::new(engine), &config.gate);

    info!(
        session = %controller.session_id(),
        allow_list = %config.allow_list_path.display(),
        store = %config.store_path.display(),
        "[scan-gate] Station ready"
    );

    Ok(ScanConsole::new(
        controller,
        HistoryReader::new(store),
        config.gate.history_limit,
    ))
}
