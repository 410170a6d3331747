//! # Scan Ledger
//!
//! In-memory index of scan records shared by every store adapter.
//!
//! The ledger is pure: adapters own the lock around it and decide when a
//! prepared record becomes durable. Preparing and applying are split so a
//! durable adapter can write the record out before the index sees it.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::HashMap;

use super::entities::ScanRecord;
use super::errors::StoreError;
use super::value_objects::{Identifier, RecordId, RecordOutcome};

/// Result of an atomic conditional commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitResult {
    /// No prior grant existed; the proposed outcome was recorded.
    Committed(ScanRecord),
    /// A prior grant exists. A `DeniedDuplicate` audit record was written in
    /// the same critical section.
    AlreadyGranted {
        /// The existing granted record.
        prior: ScanRecord,
        /// The audit record written for this attempt.
        recorded: ScanRecord,
    },
}

impl CommitResult {
    /// Record written by this call.
    pub fn record(&self) -> &ScanRecord {
        match self {
            CommitResult::Committed(record) => record,
            CommitResult::AlreadyGranted { recorded, .. } => recorded,
        }
    }

    /// Take the record written by this call.
    pub fn into_record(self) -> ScanRecord {
        match self {
            CommitResult::Committed(record) => record,
            CommitResult::AlreadyGranted { recorded, .. } => recorded,
        }
    }
}

/// Record prepared but not yet applied to the ledger.
#[derive(Debug, Clone)]
pub struct PendingCommit {
    /// Record to persist.
    pub record: ScanRecord,
    /// Conflicting grant, when the proposal was downgraded to a duplicate.
    pub prior: Option<ScanRecord>,
}

impl PendingCommit {
    /// Convert into the caller-facing result.
    pub fn into_result(self) -> CommitResult {
        match self.prior {
            None => CommitResult::Committed(self.record),
            Some(prior) => CommitResult::AlreadyGranted {
                prior,
                recorded: self.record,
            },
        }
    }
}

/// Append-only record index.
#[derive(Debug, Default)]
pub struct ScanLedger {
    /// Oldest first in recency order. Live commits always land at the end.
    records: Vec<ScanRecord>,
    /// identifier -> its granted record.
    granted: HashMap<Identifier, ScanRecord>,
    next_id: u64,
    last_timestamp: Option<DateTime<Utc>>,
}

impl ScanLedger {
    /// Empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the ledger holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The granted record for `identifier`, if any.
    pub fn granted_record(&self, identifier: &Identifier) -> Option<&ScanRecord> {
        self.granted.get(identifier)
    }

    /// Whether `identifier` already holds a grant.
    pub fn has_granted(&self, identifier: &Identifier) -> bool {
        self.granted.contains_key(identifier)
    }

    /// Clamp a clock reading so timestamps never go backwards.
    fn stamp(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self.last_timestamp {
            Some(last) if last > now => last,
            _ => now,
        }
    }

    fn build(&self, identifier: &Identifier, outcome: RecordOutcome, now: DateTime<Utc>) -> ScanRecord {
        ScanRecord {
            record_id: RecordId(self.next_id),
            identifier: identifier.clone(),
            timestamp: self.stamp(now),
            outcome,
        }
    }

    /// Prepare a conditional commit.
    ///
    /// If `identifier` is already granted the proposal is replaced by a
    /// `DeniedDuplicate` record, whatever the proposed outcome was.
    pub fn prepare_conditional(
        &self,
        identifier: &Identifier,
        proposed: RecordOutcome,
        now: DateTime<Utc>,
    ) -> PendingCommit {
        match self.granted_record(identifier) {
            Some(prior) => PendingCommit {
                record: self.build(identifier, RecordOutcome::DeniedDuplicate, now),
                prior: Some(prior.clone()),
            },
            None => PendingCommit {
                record: self.build(identifier, proposed, now),
                prior: None,
            },
        }
    }

    /// Prepare an unconditional append. A second grant is refused.
    pub fn prepare_unconditional(
        &self,
        identifier: &Identifier,
        outcome: RecordOutcome,
        now: DateTime<Utc>,
    ) -> Result<ScanRecord, StoreError> {
        if outcome.is_granted() && self.has_granted(identifier) {
            return Err(StoreError::GrantConflict {
                identifier: identifier.to_string(),
            });
        }
        Ok(self.build(identifier, outcome, now))
    }

    /// Add a record to the index.
    ///
    /// Also used when replaying a log, so ids and timestamps coming from disk
    /// advance the counters rather than being reassigned. A second grant for
    /// the same identifier in a replayed log keeps the first one indexed.
    pub fn apply(&mut self, record: ScanRecord) -> bool {
        self.next_id = self.next_id.max(record.record_id.0 + 1);
        self.last_timestamp = Some(self.stamp(record.timestamp));

        let mut indexed = true;
        if record.outcome.is_granted() {
            if self.granted.contains_key(&record.identifier) {
                indexed = false;
            } else {
                self.granted
                    .insert(record.identifier.clone(), record.clone());
            }
        }

        // Out-of-order records only come from replaying an edited log.
        let in_order = self
            .records
            .last()
            .map_or(true, |last| last.recency_cmp(&record) == Ordering::Greater);
        if in_order {
            self.records.push(record);
        } else {
            let pos = self
                .records
                .partition_point(|r| r.recency_cmp(&record) == Ordering::Greater);
            self.records.insert(pos, record);
        }
        indexed
    }

    /// Prepare and apply in one step.
    pub fn commit_if_not_granted(
        &mut self,
        identifier: &Identifier,
        proposed: RecordOutcome,
        now: DateTime<Utc>,
    ) -> CommitResult {
        let pending = self.prepare_conditional(identifier, proposed, now);
        self.apply(pending.record.clone());
        pending.into_result()
    }

    /// Up to `max_count` records, newest first.
    pub fn recent(&self, max_count: usize) -> Vec<ScanRecord> {
        if max_count == 0 {
            return Vec::new();
        }
        self.records
            .iter()
            .rev()
            .take(max_count)
            .cloned()
            .collect()
    }

    /// Count of granted records for `identifier`. Used by invariant checks.
    pub fn granted_count(&self, identifier: &Identifier) -> usize {
        self.records
            .iter()
            .filter(|r| r.outcome.is_granted() && &r.identifier == identifier)
            .count()
    }

    /// Distinct identifiers holding a grant.
    pub fn granted_identifiers(&self) -> usize {
        self.granted.len()
    }
}
