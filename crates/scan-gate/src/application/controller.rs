//! # Scan Session Controller
//!
//! Consumes the raw decode stream, gates it (phase + debounce), runs accepted
//! events through the decision API on the tokio runtime, and publishes the
//! UI-facing [`SessionView`] on a watch channel.
//!
//! `submit` never waits for a decision, so a bursty camera feed is never
//! blocked by storage latency.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::ScanGateConfig;
use crate::domain::{
    Admission, Decision, DecodeEvent, DisplayedResult, Identifier, SessionPhase, SessionState,
    SessionView,
};
use crate::ports::ScanDecisionApi;

struct Shared {
    state: Mutex<SessionState>,
    views: watch::Sender<SessionView>,
}

impl Shared {
    /// Publish while still holding the state lock so views arrive in order.
    fn publish(&self, state: &SessionState) {
        self.views.send_replace(state.view());
    }
}

/// Operator-facing scan session.
pub struct ScanSessionController {
    engine: Arc<dyn ScanDecisionApi>,
    shared: Arc<Shared>,
    decision_timeout: Duration,
    session_id: Uuid,
}

impl ScanSessionController {
    /// New idle session.
    pub fn new(engine: Arc<dyn ScanDecisionApi>, config: &ScanGateConfig) -> Self {
        let state = SessionState::new(config.debounce_window());
        let (views, _) = watch::channel(state.view());
        let session_id = Uuid::new_v4();
        debug!("[scan-gate] Session {} started", session_id);
        Self {
            engine,
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                views,
            }),
            decision_timeout: config.decision_timeout(),
            session_id,
        }
    }

    /// Session correlation id used in logs.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Feed one decode event.
    ///
    /// Accepted events start a decision in the background. Must be called
    /// from within a tokio runtime.
    pub fn submit(&self, event: DecodeEvent) -> Admission {
        let admission = {
            let mut state = self.shared.state.lock();
            let admission = state.try_accept(event.event_time);
            if admission.is_accepted() {
                self.shared.publish(&state);
            }
            admission
        };

        match admission {
            Admission::Accepted { attempt } => {
                info!(
                    session = %self.session_id,
                    attempt,
                    "[scan-gate] Accepted scan {:?}",
                    event.identifier
                );
                self.spawn_decision(attempt, event.identifier);
            }
            Admission::Debounced { remaining } => {
                debug!(
                    session = %self.session_id,
                    "[scan-gate] Debounced scan ({}ms left in window)",
                    remaining.as_millis()
                );
            }
            Admission::Busy { phase } => {
                debug!(
                    session = %self.session_id,
                    "[scan-gate] Ignored scan while {}",
                    phase
                );
            }
        }

        admission
    }

    fn spawn_decision(&self, attempt: u64, identifier: String) {
        let engine = self.engine.clone();
        let shared = self.shared.clone();
        let timeout = self.decision_timeout;
        let session_id = self.session_id;

        tokio::spawn(async move {
            let decision = match tokio::time::timeout(timeout, engine.decide(&identifier)).await {
                Ok(decision) => decision,
                Err(_) => {
                    warn!(
                        session = %session_id,
                        attempt,
                        "[scan-gate] Decision timed out after {}ms",
                        timeout.as_millis()
                    );
                    Decision::error(Identifier::parse(identifier.as_str()).ok())
                }
            };

            let mut state = shared.state.lock();
            if state.resolve(attempt, &decision) {
                shared.publish(&state);
                info!(
                    session = %session_id,
                    attempt,
                    "[scan-gate] Showing result: {}",
                    decision.outcome
                );
            } else {
                debug!(
                    session = %session_id,
                    attempt,
                    "[scan-gate] Dropped stale resolution"
                );
            }
        });
    }

    /// Operator pressed "scan again". Returns `false` unless a result was
    /// showing.
    pub fn dismiss(&self) -> bool {
        let mut state = self.shared.state.lock();
        let dismissed = state.dismiss();
        if dismissed {
            self.shared.publish(&state);
        }
        dismissed
    }

    /// Current snapshot.
    pub fn view(&self) -> SessionView {
        self.shared.state.lock().view()
    }

    /// Current phase.
    pub fn phase(&self) -> SessionPhase {
        self.shared.state.lock().phase()
    }

    /// The "processing" flag.
    pub fn is_processing(&self) -> bool {
        self.phase() == SessionPhase::Processing
    }

    /// Watch every state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionView> {
        self.shared.views.subscribe()
    }

    /// Wait until a result is showing and return it.
    pub async fn wait_for_result(&self) -> Option<DisplayedResult> {
        let mut views = self.subscribe();
        let view = views
            .wait_for(|v| v.phase == SessionPhase::ShowingResult)
            .await
            .ok()?;
        view.result.clone()
    }
}
