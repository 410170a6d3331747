//! Fault-injecting store wrapper for tests and drills.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use tracing::warn;

use crate::domain::{CommitResult, Identifier, RecordOutcome, ScanRecord, StoreError};
use crate::ports::ScanStore;

/// Wraps a store and fails or stalls its operations on demand.
///
/// Also counts calls so tests can check how many store round-trips a
/// decision made.
pub struct FaultInjectingStore<S> {
    inner: S,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    stall_ms: AtomicU64,
    read_calls: AtomicUsize,
    write_calls: AtomicUsize,
}

impl<S: ScanStore> FaultInjectingStore<S> {
    /// Healthy wrapper around `inner`.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            stall_ms: AtomicU64::new(0),
            read_calls: AtomicUsize::new(0),
            write_calls: AtomicUsize::new(0),
        }
    }

    /// Wrapped store.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Make every read fail with `Unavailable`.
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every write fail with `Unavailable`.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Delay every operation by `stall` before it runs.
    pub fn set_stall(&self, stall: Duration) {
        self.stall_ms.store(stall.as_millis() as u64, Ordering::SeqCst);
    }

    /// Restore normal behaviour.
    pub fn heal(&self) {
        self.set_fail_reads(false);
        self.set_fail_writes(false);
        self.set_stall(Duration::ZERO);
    }

    /// Read operations attempted so far.
    pub fn read_calls(&self) -> usize {
        self.read_calls.load(Ordering::SeqCst)
    }

    /// Write operations attempted so far.
    pub fn write_calls(&self) -> usize {
        self.write_calls.load(Ordering::SeqCst)
    }

    async fn before_read(&self, operation: &str) -> Result<(), StoreError> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        self.stall().await;
        if self.fail_reads.load(Ordering::SeqCst) {
            warn!("[scan-gate] injected read fault in {}", operation);
            return Err(StoreError::unavailable(format!("injected fault: {}", operation)));
        }
        Ok(())
    }

    async fn before_write(&self, operation: &str) -> Result<(), StoreError> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        self.stall().await;
        if self.fail_writes.load(Ordering::SeqCst) {
            warn!("[scan-gate] injected write fault in {}", operation);
            return Err(StoreError::unavailable(format!("injected fault: {}", operation)));
        }
        Ok(())
    }

    async fn stall(&self) {
        let ms = self.stall_ms.load(Ordering::SeqCst);
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }
}

#[async_trait]
impl<S: ScanStore> ScanStore for FaultInjectingStore<S> {
    async fn has_granted_record(&self, identifier: &Identifier) -> Result<bool, StoreError> {
        self.before_read("has_granted_record").await?;
        self.inner.has_granted_record(identifier).await
    }

    async fn commit(
        &self,
        identifier: &Identifier,
        outcome: RecordOutcome,
    ) -> Result<ScanRecord, StoreError> {
        self.before_write("commit").await?;
        self.inner.commit(identifier, outcome).await
    }

    async fn commit_if_not_granted(
        &self,
        identifier: &Identifier,
        proposed: RecordOutcome,
    ) -> Result<CommitResult, StoreError> {
        self.before_write("commit_if_not_granted").await?;
        self.inner.commit_if_not_granted(identifier, proposed).await
    }

    async fn recent(&self, max_count: usize) -> Result<Vec<ScanRecord>, StoreError> {
        self.before_read("recent").await?;
        self.inner.recent(max_count).await
    }
}
