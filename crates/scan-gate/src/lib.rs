//! # Scan Gate
//!
//! Access decisions for scanned badges and tickets.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! A code is granted once if and only if it is on the allow-list and has never
//! been granted before. Unknown codes, already-used codes and storage faults
//! are denied and explained. A history view lists the latest outcomes, newest
//! first.
//!
//! ## Decision Flow
//!
//! ```text
//! camera ──DecodeEvent──→ ScanSessionController ──(debounce, phase)──→ ScanDecisionEngine
//!                                 ↑                                         │
//!                                 │                          commit_if_not_granted (atomic)
//!                          SessionView (watch)                              ↓
//!                                                                       ScanStore ←── HistoryReader
//! ```
//!
//! ## Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | At most one `Granted` record per identifier | `ScanStore::commit_if_not_granted`, one lock per store |
//! | Faults are never persisted | engine maps `StoreError` to `ScanOutcome::Error` |
//! | Non-decreasing timestamps | `ScanLedger` clamps clock readings |
//! | One engine call per accepted event | `SessionState::try_accept` |
//!
//! ## Module Structure
//!
//! ```text
//! scan-gate/
//! ├── domain/          # AllowList, ScanRecord, ScanLedger, SessionState, errors
//! ├── ports/           # ScanDecisionApi, HistoryApi (inbound) + ScanStore, TimeSource (outbound)
//! ├── adapters/        # InMemoryScanStore, FileScanStore, FaultInjectingStore, clocks
//! ├── application/     # ScanDecisionEngine, ScanSessionController, HistoryReader
//! └── config.rs        # ScanGateConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::{
    FaultInjectingStore, FileScanStore, InMemoryScanStore, ManualTimeSource, SystemTimeSource,
};
pub use application::{
    HistoryReader, HistoryView, ScanDecisionEngine, ScanSessionController, MSG_HISTORY_FAILED,
};
pub use config::{ConfigError, ScanGateConfig};
pub use domain::{
    Admission, AllowList, AllowListError, CommitResult, Decision, DecodeEvent, DisplayedResult,
    Identifier, RecordId, RecordOutcome, ScanError, ScanLedger, ScanOutcome, ScanRecord,
    SessionPhase, SessionState, SessionView, StoreError, MSG_DUPLICATE, MSG_ERROR, MSG_GRANTED,
    MSG_INVALID,
};
pub use ports::{HistoryApi, ScanDecisionApi, ScanStore, TimeSource};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
