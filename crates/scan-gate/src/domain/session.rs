//! # Scan Session State Machine
//!
//! ```text
//!            decode (debounce ok)            decision resolves
//!   Idle ───────────────────────→ Processing ─────────────────→ ShowingResult
//!    ↑                                                               │
//!    └────────────────────────── dismiss ────────────────────────────┘
//! ```
//!
//! Pure state: no clocks, no I/O. The controller feeds in event times and
//! decisions.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::time::{Duration, Instant};

use super::entities::Decision;
use super::value_objects::{Identifier, ScanOutcome};

/// Session phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Waiting for a code.
    Idle,
    /// A decision is in flight.
    Processing,
    /// A result is on screen until dismissed.
    ShowingResult,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionPhase::Idle => write!(f, "idle"),
            SessionPhase::Processing => write!(f, "processing"),
            SessionPhase::ShowingResult => write!(f, "showing_result"),
        }
    }
}

/// Gate verdict for one decode event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Event accepted; the decision for `attempt` is starting.
    Accepted {
        /// Attempt sequence number.
        attempt: u64,
    },
    /// Event arrived inside the debounce window.
    Debounced {
        /// Time left until the window reopens.
        remaining: Duration,
    },
    /// Session is not idle.
    Busy {
        /// Current phase.
        phase: SessionPhase,
    },
}

impl Admission {
    /// Whether the event reaches the engine.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Admission::Accepted { .. })
    }

    /// Stable label for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Admission::Accepted { .. } => "accepted",
            Admission::Debounced { .. } => "debounced",
            Admission::Busy { .. } => "busy",
        }
    }
}

/// What the operator sees after a decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayedResult {
    /// Terminal outcome.
    pub outcome: ScanOutcome,
    /// Identifier, omitted for errors.
    pub identifier: Option<Identifier>,
    /// Commit time, omitted for errors.
    pub timestamp: Option<DateTime<Utc>>,
    /// Operator-facing message.
    pub message: &'static str,
}

impl From<&Decision> for DisplayedResult {
    fn from(decision: &Decision) -> Self {
        Self {
            outcome: decision.outcome,
            identifier: decision.display_identifier().cloned(),
            timestamp: decision.timestamp(),
            message: decision.message(),
        }
    }
}

/// Snapshot published to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    /// Current phase.
    pub phase: SessionPhase,
    /// Result on screen, present only in `ShowingResult`.
    pub result: Option<DisplayedResult>,
    /// Latest accepted attempt number.
    pub attempt: u64,
}

impl SessionView {
    /// "Processing" flag for the presentation layer.
    pub fn is_processing(&self) -> bool {
        self.phase == SessionPhase::Processing
    }
}

/// Ephemeral per-operator session state.
#[derive(Debug, Clone)]
pub struct SessionState {
    phase: SessionPhase,
    last_accepted: Option<Instant>,
    result: Option<DisplayedResult>,
    attempt: u64,
    debounce_window: Duration,
}

impl SessionState {
    /// Fresh idle session.
    pub fn new(debounce_window: Duration) -> Self {
        Self {
            phase: SessionPhase::Idle,
            last_accepted: None,
            result: None,
            attempt: 0,
            debounce_window,
        }
    }

    /// Current phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Gate a decode event.
    ///
    /// Rejections leave the state untouched, including `last_accepted`.
    pub fn try_accept(&mut self, event_time: Instant) -> Admission {
        if self.phase != SessionPhase::Idle {
            return Admission::Busy { phase: self.phase };
        }

        if let Some(last) = self.last_accepted {
            // Out-of-order events saturate to zero and land inside the window.
            let elapsed = event_time.saturating_duration_since(last);
            if elapsed < self.debounce_window {
                return Admission::Debounced {
                    remaining: self.debounce_window - elapsed,
                };
            }
        }

        self.last_accepted = Some(event_time);
        self.attempt += 1;
        self.phase = SessionPhase::Processing;
        self.result = None;
        Admission::Accepted {
            attempt: self.attempt,
        }
    }

    /// Record the decision for `attempt`.
    ///
    /// Returns `false` if the attempt is stale or the session is not
    /// processing.
    pub fn resolve(&mut self, attempt: u64, decision: &Decision) -> bool {
        if self.phase != SessionPhase::Processing || attempt != self.attempt {
            return false;
        }
        self.phase = SessionPhase::ShowingResult;
        self.result = Some(DisplayedResult::from(decision));
        true
    }

    /// Operator dismissed the result ("scan again").
    pub fn dismiss(&mut self) -> bool {
        if self.phase != SessionPhase::ShowingResult {
            return false;
        }
        self.phase = SessionPhase::Idle;
        self.result = None;
        true
    }

    /// Snapshot for the presentation layer.
    pub fn view(&self) -> SessionView {
        SessionView {
            phase: self.phase,
            result: self.result.clone(),
            attempt: self.attempt,
        }
    }
}
