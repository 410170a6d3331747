//! # Domain Entities
//!
//! Scan records, decode events and decisions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::value_objects::{Identifier, RecordId, RecordOutcome, ScanOutcome};

/// One persisted scan attempt.
///
/// Created exactly once when the store commits a decision; never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRecord {
    /// Store-assigned id, used for enumeration and tie-breaking only.
    pub record_id: RecordId,
    /// Scanned identifier.
    pub identifier: Identifier,
    /// Commit time. Non-decreasing in commit order.
    pub timestamp: DateTime<Utc>,
    /// Persisted outcome.
    pub outcome: RecordOutcome,
}

impl ScanRecord {
    /// Total recency order: newest first, ties broken by newest record id.
    pub fn recency_cmp(&self, other: &Self) -> std::cmp::Ordering {
        other
            .timestamp
            .cmp(&self.timestamp)
            .then_with(|| other.record_id.cmp(&self.record_id))
    }
}

/// Raw event from the decoder: one per detected code.
#[derive(Debug, Clone)]
pub struct DecodeEvent {
    /// Decoded string, exactly as produced by the decoder.
    pub identifier: String,
    /// When the decoder saw the code.
    pub event_time: Instant,
}

impl DecodeEvent {
    /// Build an event.
    pub fn new(identifier: impl Into<String>, event_time: Instant) -> Self {
        Self {
            identifier: identifier.into(),
            event_time,
        }
    }

    /// Build an event stamped with the current instant.
    pub fn now(identifier: impl Into<String>) -> Self {
        Self::new(identifier, Instant::now())
    }
}

/// Result of one call to the decision engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// Parsed identifier. `None` when the input was malformed.
    pub identifier: Option<Identifier>,
    /// Terminal outcome.
    pub outcome: ScanOutcome,
    /// Persisted record, absent for `Error`.
    pub record: Option<ScanRecord>,
}

impl Decision {
    /// Decision backed by a committed record.
    pub fn recorded(record: ScanRecord) -> Self {
        Self {
            identifier: Some(record.identifier.clone()),
            outcome: record.outcome.into(),
            record: Some(record),
        }
    }

    /// Non-persisted `Error` decision.
    pub fn error(identifier: Option<Identifier>) -> Self {
        Self {
            identifier,
            outcome: ScanOutcome::Error,
            record: None,
        }
    }

    /// Operator-facing message.
    pub fn message(&self) -> &'static str {
        self.outcome.message()
    }

    /// Identifier to display. Errors never claim an identifier.
    pub fn display_identifier(&self) -> Option<&Identifier> {
        match self.outcome {
            ScanOutcome::Error => None,
            _ => self.identifier.as_ref(),
        }
    }

    /// Commit time to display.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.record.as_ref().map(|r| r.timestamp)
    }
}
