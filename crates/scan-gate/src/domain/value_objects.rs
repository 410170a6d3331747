//! # Value Objects
//!
//! Identifiers, outcomes and the operator-facing messages attached to them.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::errors::ScanError;

/// Message shown for a first valid use.
pub const MSG_GRANTED: &str = "Access Granted";
/// Message shown when a valid code was already used.
pub const MSG_DUPLICATE: &str = "This code has already been scanned!";
/// Message shown for a code that is not on the allow-list.
pub const MSG_INVALID: &str = "Invalid code";
/// Generic retry message for faults. Makes no claim about the identifier.
pub const MSG_ERROR: &str = "Error processing code. Please try again.";

/// Decoded payload of a scanned code.
///
/// Equality is exact string equality. No trimming or case folding happens
/// here; whatever the decoder produced is the identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(String);

impl Identifier {
    /// Validate raw decoder output.
    pub fn parse(raw: impl Into<String>) -> Result<Self, ScanError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(ScanError::MalformedIdentifier {
                reason: "identifier is empty",
            });
        }
        Ok(Self(raw))
    }

    /// Borrow the underlying string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for Identifier {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Store-assigned record id. Strictly increasing in commit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08}", self.0)
    }
}

/// Outcome of a persisted scan record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordOutcome {
    /// First valid use.
    Granted,
    /// Valid code, already granted before.
    DeniedDuplicate,
    /// Code not on the allow-list.
    DeniedInvalid,
}

impl RecordOutcome {
    /// Whether the record grants access.
    pub fn is_granted(self) -> bool {
        matches!(self, RecordOutcome::Granted)
    }
}

impl fmt::Display for RecordOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        ScanOutcome::from(*self).fmt(f)
    }
}

/// Terminal outcome of one scan attempt, as shown to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanOutcome {
    /// First valid use.
    Granted,
    /// Valid code, already granted before.
    DeniedDuplicate,
    /// Code not on the allow-list.
    DeniedInvalid,
    /// Backend could not complete the decision. Never persisted.
    Error,
}

impl ScanOutcome {
    /// Operator-facing message.
    pub fn message(self) -> &'static str {
        match self {
            ScanOutcome::Granted => MSG_GRANTED,
            ScanOutcome::DeniedDuplicate => MSG_DUPLICATE,
            ScanOutcome::DeniedInvalid => MSG_INVALID,
            ScanOutcome::Error => MSG_ERROR,
        }
    }

    /// Stable label for logs and metrics.
    pub fn label(self) -> &'static str {
        match self {
            ScanOutcome::Granted => "granted",
            ScanOutcome::DeniedDuplicate => "denied_duplicate",
            ScanOutcome::DeniedInvalid => "denied_invalid",
            ScanOutcome::Error => "error",
        }
    }

    /// Whether access is granted.
    pub fn is_granted(self) -> bool {
        matches!(self, ScanOutcome::Granted)
    }
}

impl From<RecordOutcome> for ScanOutcome {
    fn from(outcome: RecordOutcome) -> Self {
        match outcome {
            RecordOutcome::Granted => ScanOutcome::Granted,
            RecordOutcome::DeniedDuplicate => ScanOutcome::DeniedDuplicate,
            RecordOutcome::DeniedInvalid => ScanOutcome::DeniedInvalid,
        }
    }
}

impl fmt::Display for ScanOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
