//! # Scan Decision Engine
//!
//! Decides Granted / DeniedDuplicate / DeniedInvalid / Error for one decoded
//! identifier and persists the outcome through a single atomic store call.
//!
//! ## Algorithm
//!
//! 1. Empty input → `Error`, no store interaction.
//! 2. Candidate = `Granted` if allow-listed, else `DeniedInvalid`.
//! 3. `commit_if_not_granted(identifier, candidate)`, bounded by the decision
//!    timeout:
//!    - `AlreadyGranted` → `DeniedDuplicate` (audit record already written)
//!    - `Committed` → the candidate
//! 4. Any store fault → `Error`, nothing counted.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::ScanGateConfig;
use crate::domain::{
    AllowList, CommitResult, Decision, Identifier, RecordOutcome, ScanError, StoreError,
};
use crate::ports::{ScanDecisionApi, ScanStore};

/// Scan decision engine.
pub struct ScanDecisionEngine<S: ScanStore + ?Sized> {
    allow_list: Arc<AllowList>,
    store: Arc<S>,
    decision_timeout: Duration,
}

impl<S: ScanStore + ?Sized> ScanDecisionEngine<S> {
    /// Create an engine over a shared allow-list and store.
    pub fn new(allow_list: Arc<AllowList>, store: Arc<S>, config: &ScanGateConfig) -> Self {
        Self {
            allow_list,
            store,
            decision_timeout: config.decision_timeout(),
        }
    }

    /// Backing store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Allow-list in use.
    pub fn allow_list(&self) -> &AllowList {
        &self.allow_list
    }

    /// Decide, surfacing faults as errors instead of an `Error` decision.
    pub async fn try_decide(&self, raw_identifier: &str) -> Result<Decision, ScanError> {
        let identifier = Identifier::parse(raw_identifier)?;

        let candidate = if self.allow_list.contains(&identifier) {
            RecordOutcome::Granted
        } else {
            RecordOutcome::DeniedInvalid
        };

        let result = tokio::time::timeout(
            self.decision_timeout,
            self.store.commit_if_not_granted(&identifier, candidate),
        )
        .await
        .map_err(|_| StoreError::Timeout {
            operation: "commit_if_not_granted".to_string(),
            after_ms: self.decision_timeout.as_millis() as u64,
        })??;

        if let CommitResult::AlreadyGranted { prior, .. } = &result {
            info!(
                "[scan-gate] {} already granted at {} (record {})",
                identifier, prior.timestamp, prior.record_id
            );
        }

        let decision = Decision::recorded(result.into_record());
        info!(
            "[scan-gate] Decided {} -> {}",
            identifier, decision.outcome
        );
        Ok(decision)
    }
}

#[async_trait]
impl<S: ScanStore + ?Sized + 'static> ScanDecisionApi for ScanDecisionEngine<S> {
    async fn decide(&self, raw_identifier: &str) -> Decision {
        match self.try_decide(raw_identifier).await {
            Ok(decision) => decision,
            Err(e) => {
                warn!("[scan-gate] Decision failed, nothing recorded: {}", e);
                Decision::error(Identifier::parse(raw_identifier).ok())
            }
        }
    }
}
