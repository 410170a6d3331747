//! # Outbound Ports
//!
//! Dependencies the scan gate needs from the outside world: a scan store and a
//! clock.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{CommitResult, Identifier, RecordOutcome, ScanRecord, StoreError};

/// Durable, append-mostly record of scan outcomes.
///
/// Implementations must serialize [`commit_if_not_granted`] per identifier:
/// the grant check and the write are one atomic step. Two concurrent calls for
/// the same identifier never both observe "not granted".
///
/// [`commit_if_not_granted`]: ScanStore::commit_if_not_granted
#[async_trait]
pub trait ScanStore: Send + Sync {
    /// Whether a granted record exists for `identifier`.
    async fn has_granted_record(&self, identifier: &Identifier) -> Result<bool, StoreError>;

    /// Append a record unconditionally.
    ///
    /// A second `Granted` for the same identifier is refused with
    /// [`StoreError::GrantConflict`].
    async fn commit(
        &self,
        identifier: &Identifier,
        outcome: RecordOutcome,
    ) -> Result<ScanRecord, StoreError>;

    /// Atomic conditional commit.
    ///
    /// With no prior grant, appends `proposed` and returns
    /// [`CommitResult::Committed`]. Otherwise appends a `DeniedDuplicate`
    /// audit record in the same critical section and returns
    /// [`CommitResult::AlreadyGranted`].
    async fn commit_if_not_granted(
        &self,
        identifier: &Identifier,
        proposed: RecordOutcome,
    ) -> Result<CommitResult, StoreError>;

    /// Up to `max_count` records, newest first, ties broken by newest record
    /// id. `max_count == 0` yields an empty vector.
    async fn recent(&self, max_count: usize) -> Result<Vec<ScanRecord>, StoreError>;
}

/// Wall clock used to stamp records (abstracted for tests).
pub trait TimeSource: Send + Sync {
    /// Current time.
    fn now(&self) -> DateTime<Utc>;
}
