//! In-memory scan store.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

use crate::adapters::clock::SystemTimeSource;
use crate::domain::{CommitResult, Identifier, RecordOutcome, ScanLedger, ScanRecord, StoreError};
use crate::ports::{ScanStore, TimeSource};

/// Volatile scan store.
///
/// One mutex guards the whole ledger, so it is a single-writer serialization
/// point: check-and-commit for any identifier never interleaves with another
/// commit. The lock is never held across an `.await`.
pub struct InMemoryScanStore {
    ledger: Mutex<ScanLedger>,
    clock: Arc<dyn TimeSource>,
}

impl InMemoryScanStore {
    /// Empty store stamped with system time.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemTimeSource))
    }

    /// Empty store with a custom clock.
    pub fn with_clock(clock: Arc<dyn TimeSource>) -> Self {
        Self {
            ledger: Mutex::new(ScanLedger::new()),
            clock,
        }
    }

    /// Number of records held.
    pub fn len(&self) -> usize {
        self.ledger.lock().len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.ledger.lock().is_empty()
    }

    /// Granted records for `identifier`. Never more than one.
    pub fn granted_count(&self, identifier: &Identifier) -> usize {
        self.ledger.lock().granted_count(identifier)
    }
}

impl Default for InMemoryScanStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ScanStore for InMemoryScanStore {
    async fn has_granted_record(&self, identifier: &Identifier) -> Result<bool, StoreError> {
        Ok(self.ledger.lock().has_granted(identifier))
    }

    async fn commit(
        &self,
        identifier: &Identifier,
        outcome: RecordOutcome,
    ) -> Result<ScanRecord, StoreError> {
        let mut ledger = self.ledger.lock();
        let record = ledger.prepare_unconditional(identifier, outcome, self.clock.now())?;
        ledger.apply(record.clone());
        Ok(record)
    }

    async fn commit_if_not_granted(
        &self,
        identifier: &Identifier,
        proposed: RecordOutcome,
    ) -> Result<CommitResult, StoreError> {
        let result = self
            .ledger
            .lock()
            .commit_if_not_granted(identifier, proposed, self.clock.now());
        debug!(
            "[scan-gate] memory store committed {} as {}",
            identifier,
            result.record().outcome
        );
        Ok(result)
    }

    async fn recent(&self, max_count: usize) -> Result<Vec<ScanRecord>, StoreError> {
        Ok(self.ledger.lock().recent(max_count))
    }
}
