//! # Inbound Ports
//!
//! APIs the scan gate exposes to the presentation layer.

use async_trait::async_trait;

use crate::domain::{Decision, ScanRecord, StoreError};

/// Scan decision API.
///
/// Implemented by [`ScanDecisionEngine`](crate::application::ScanDecisionEngine).
/// The session controller depends on this trait, not on the engine type.
#[async_trait]
pub trait ScanDecisionApi: Send + Sync {
    /// Decide one decoded identifier and persist the outcome.
    ///
    /// Never fails: storage faults and malformed input come back as
    /// [`ScanOutcome::Error`](crate::domain::ScanOutcome::Error).
    async fn decide(&self, raw_identifier: &str) -> Decision;
}

/// Read-only history API.
#[async_trait]
pub trait HistoryApi: Send + Sync {
    /// Latest `max_count` records, newest first.
    async fn list(&self, max_count: usize) -> Result<Vec<ScanRecord>, StoreError>;
}
