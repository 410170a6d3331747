//! # Domain Errors
//!
//! Error types for the scan gate.
//!
//! Business outcomes (granted, duplicate, invalid) are never errors; they are
//! returned as [`ScanOutcome`](super::ScanOutcome) values. The types here are
//! faults and contract violations only.

use thiserror::Error;

/// Storage backend faults.
///
/// Every variant is retry-safe from the engine's point of view: an attempt that
/// fails with a `StoreError` is not counted.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Backend could not be reached or refused the operation.
    #[error("Storage unavailable: {message}")]
    Unavailable {
        /// Backend-provided detail.
        message: String,
    },

    /// Operation did not finish within the operational timeout.
    #[error("Storage operation '{operation}' timed out after {after_ms}ms")]
    Timeout {
        /// Operation name.
        operation: String,
        /// Elapsed budget in milliseconds.
        after_ms: u64,
    },

    /// Unconditional commit of a second `Granted` record was refused.
    #[error("Identifier already holds a granted record: {identifier}")]
    GrantConflict {
        /// Identifier that is already granted.
        identifier: String,
    },
}

impl StoreError {
    /// Shorthand for [`StoreError::Unavailable`].
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::unavailable(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::unavailable(format!("serialization: {}", e))
    }
}

/// Errors raised while deciding a scan.
///
/// The engine recovers all of these into
/// [`ScanOutcome::Error`](super::ScanOutcome::Error); they are exposed so the
/// reason can be logged and inspected in tests.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ScanError {
    /// Empty input reached the engine.
    #[error("Malformed identifier: {reason}")]
    MalformedIdentifier {
        /// Why the input was rejected.
        reason: &'static str,
    },

    /// Storage fault during the decision.
    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Errors loading an allow-list document.
#[derive(Debug, Error)]
pub enum AllowListError {
    /// Reading the file failed.
    #[error("Failed to read allow-list {path}: {source}")]
    Io {
        /// File path.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Document is not a valid `{ "uids": [...] }` object.
    #[error("Invalid allow-list document: {0}")]
    Parse(#[from] serde_json::Error),
}
