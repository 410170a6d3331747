//! # History Reader
//!
//! Read-only recency query over the scan store.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

use crate::domain::{ScanRecord, StoreError};
use crate::ports::{HistoryApi, ScanStore};

/// Message shown when history cannot be loaded.
pub const MSG_HISTORY_FAILED: &str = "Failed to load scan history";

/// What the history screen renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryView {
    /// Records, newest first.
    Loaded(Vec<ScanRecord>),
    /// Nothing scanned yet.
    Empty,
    /// Store fault.
    Failed {
        /// Operator-facing message.
        message: &'static str,
    },
}

/// History reader.
pub struct HistoryReader<S: ScanStore + ?Sized> {
    store: Arc<S>,
}

impl<S: ScanStore + ?Sized> HistoryReader<S> {
    /// Reader over a shared store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Latest `max_count` records for display, with faults folded into
    /// [`HistoryView::Failed`].
    pub async fn load(&self, max_count: usize) -> HistoryView {
        match self.store.recent(max_count).await {
            Ok(records) if records.is_empty() => HistoryView::Empty,
            Ok(records) => HistoryView::Loaded(records),
            Err(e) => {
                warn!("[scan-gate] History query failed: {}", e);
                HistoryView::Failed {
                    message: MSG_HISTORY_FAILED,
                }
            }
        }
    }
}

#[async_trait]
impl<S: ScanStore + ?Sized + 'static> HistoryApi for HistoryReader<S> {
    async fn list(&self, max_count: usize) -> Result<Vec<ScanRecord>, StoreError> {
        self.store.recent(max_count).await
    }
}
