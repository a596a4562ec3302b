//! Server-held verification flows, one per client session.
//!
//! Each session owns a `VerificationFlow`. Submitting runs the search on a
//! background task through `Verifier::run`, so the configured latency
//! applies; the result lands through `VerificationFlow::complete` and is
//! dropped if the session was reset, resubmitted, or removed meanwhile.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use serde::Serialize;
use thiserror::Error;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::{
    AppointmentView, PendingSearch, RequestToken, SearchOutcome, VerificationFlow,
    VerificationState, Verifier,
};

const DEFAULT_MAX_SESSIONS: usize = 1_000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Verification session not found: {0}")]
    NotFound(String),

    #[error("Session table lock poisoned")]
    LockPoisoned,
}

/// Client-facing view of one session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowSnapshot {
    pub id: String,
    pub phone: String,
    pub card_number: String,
    pub can_submit: bool,
    #[serde(flatten)]
    pub state: VerificationState,
    pub appointment: Option<AppointmentView>,
}

impl FlowSnapshot {
    fn of(id: &str, flow: &VerificationFlow) -> Self {
        Self {
            id: id.to_string(),
            phone: flow.phone().to_string(),
            card_number: flow.card_number().to_string(),
            can_submit: flow.can_submit(),
            state: flow.state().clone(),
            appointment: flow.view(),
        }
    }
}

struct Session {
    flow: VerificationFlow,
    touched: Instant,
}

/// Bounded table of verification sessions keyed by a random id.
pub struct FlowSessions {
    sessions: Mutex<HashMap<String, Session>>,
    max_sessions: usize,
}

impl FlowSessions {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            max_sessions: max_sessions.max(1),
        }
    }

    /// Open a new idle session. Evicts the least recently used session
    /// when the table is full.
    pub fn create(&self) -> Result<FlowSnapshot, SessionError> {
        let mut sessions = self.lock()?;
        if sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, s)| s.touched)
                .map(|(id, _)| id.clone());
            if let Some(id) = oldest {
                tracing::debug!(session = %id, "Session table full, evicting oldest");
                sessions.remove(&id);
            }
        }

        let id = Uuid::new_v4().to_string();
        let session = Session {
            flow: VerificationFlow::new(),
            touched: Instant::now(),
        };
        let snapshot = FlowSnapshot::of(&id, &session.flow);
        sessions.insert(id, session);
        Ok(snapshot)
    }

    pub fn snapshot(&self, id: &str) -> Result<FlowSnapshot, SessionError> {
        self.with_flow(id, |_| ())
            .map(|(snapshot, ())| snapshot)
    }

    /// Replace the given inputs. `None` leaves a field unchanged.
    pub fn update_inputs(
        &self,
        id: &str,
        phone: Option<String>,
        card_number: Option<String>,
    ) -> Result<FlowSnapshot, SessionError> {
        self.with_flow(id, |flow| {
            if let Some(phone) = phone {
                flow.set_phone(phone);
            }
            if let Some(card_number) = card_number {
                flow.set_card_number(card_number);
            }
        })
        .map(|(snapshot, ())| snapshot)
    }

    /// Submit the session's inputs and run the search in the background.
    ///
    /// The returned snapshot shows `searching` when a search started. The
    /// handle is `None` when submit was disabled or the inputs were invalid.
    pub fn submit(
        self: &Arc<Self>,
        id: &str,
        verifier: &Verifier,
    ) -> Result<(FlowSnapshot, Option<JoinHandle<()>>), SessionError> {
        let (snapshot, search) = self.with_flow(id, VerificationFlow::submit)?;
        let handle = search.map(|search| self.spawn_search(id, verifier.clone(), search));
        Ok((snapshot, handle))
    }

    /// Clear inputs and result. Any search in flight is discarded.
    pub fn reset(&self, id: &str) -> Result<FlowSnapshot, SessionError> {
        self.with_flow(id, VerificationFlow::reset)
            .map(|(snapshot, ())| snapshot)
    }

    pub fn remove(&self, id: &str) -> Result<(), SessionError> {
        self.lock()?
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| SessionError::NotFound(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.lock().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Apply a finished search. Returns `false` when the result is stale or
    /// the session no longer exists.
    fn complete(&self, id: &str, token: RequestToken, outcome: SearchOutcome) -> bool {
        match self.with_flow(id, |flow| flow.complete(token, outcome)) {
            Ok((_, applied)) => applied,
            Err(e) => {
                tracing::debug!(session = %id, error = %e, "Dropping verification result");
                false
            }
        }
    }

    fn spawn_search(
        self: &Arc<Self>,
        id: &str,
        verifier: Verifier,
        search: PendingSearch,
    ) -> JoinHandle<()> {
        let sessions = Arc::clone(self);
        let id = id.to_string();
        tokio::spawn(async move {
            let outcome = verifier.run(&search).await;
            sessions.complete(&id, search.token, outcome);
        })
    }

    fn with_flow<T>(
        &self,
        id: &str,
        f: impl FnOnce(&mut VerificationFlow) -> T,
    ) -> Result<(FlowSnapshot, T), SessionError> {
        let mut sessions = self.lock()?;
        let session = sessions
            .get_mut(id)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;
        session.touched = Instant::now();
        let out = f(&mut session.flow);
        Ok((FlowSnapshot::of(id, &session.flow), out))
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Session>>, SessionError> {
        self.sessions.lock().map_err(|_| SessionError::LockPoisoned)
    }
}

impl Default for FlowSessions {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SESSIONS)
    }
}
