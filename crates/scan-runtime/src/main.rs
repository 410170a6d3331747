//! # Scan Station
//!
//! Reads decoded codes from stdin and prints access decisions.

use anyhow::{Context, Result};
use tokio::io::BufReader;

use scan_runtime::{build_console, RuntimeConfig};
use scan_telemetry::{init_telemetry, TelemetryConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry =
        init_telemetry(TelemetryConfig::from_env()).context("failed to initialize telemetry")?;

    let config = RuntimeConfig::from_env();
    let console = build_console(&config)?;

    console
        .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await
}
