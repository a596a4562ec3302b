//! Appointment verification flow.
//!
//! `VerificationFlow` is the state behind the verify page:
//!
//! ```text
//! Idle ──submit──▶ Searching ──match──▶ Found
//!   ▲                 │  └────no match──▶ NotFound
//!   │                 └────store error──▶ Failed
//!   └──────────── reset (from any state)
//! ```
//!
//! Each submit hands out a fresh `RequestToken`. A result is applied only
//! when its token is still the current one, so a search that was reset or
//! superseded by a newer submit can never overwrite later state.

pub mod sessions;
pub mod verifier;
pub mod view;

use serde::Serialize;

use crate::lookup::LookupQuery;
use crate::models::AppointmentRecord;

pub use sessions::{FlowSessions, FlowSnapshot, SessionError};
pub use verifier::{SearchError, Verifier};
pub use view::AppointmentView;

/// Message shown when no appointment matches the entered details.
pub const NOT_FOUND_MESSAGE: &str =
    "No appointment found with the provided information. Please check and try again.";

/// Identifies one submitted search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RequestToken(u64);

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum VerificationState {
    Idle,
    Searching { token: RequestToken },
    Found { record: AppointmentRecord },
    NotFound { message: String },
    Failed { message: String },
}

/// A submitted search waiting for its result.
#[derive(Debug, Clone)]
pub struct PendingSearch {
    pub token: RequestToken,
    pub query: LookupQuery,
}

/// Outcome handed back to `VerificationFlow::complete`.
pub type SearchOutcome = Result<Option<AppointmentRecord>, SearchError>;

#[derive(Debug)]
pub struct VerificationFlow {
    phone: String,
    card_number: String,
    state: VerificationState,
    next_token: u64,
}

impl VerificationFlow {
    pub fn new() -> Self {
        Self {
            phone: String::new(),
            card_number: String::new(),
            state: VerificationState::Idle,
            next_token: 0,
        }
    }

    pub fn phone(&self) -> &str {
        &self.phone
    }

    pub fn card_number(&self) -> &str {
        &self.card_number
    }

    pub fn state(&self) -> &VerificationState {
        &self.state
    }

    pub fn set_phone(&mut self, phone: impl Into<String>) {
        self.phone = phone.into();
    }

    pub fn set_card_number(&mut self, card_number: impl Into<String>) {
        self.card_number = card_number.into();
    }

    pub fn is_searching(&self) -> bool {
        matches!(self.state, VerificationState::Searching { .. })
    }

    /// Submit is disabled while both inputs are empty strings.
    pub fn can_submit(&self) -> bool {
        !(self.phone.is_empty() && self.card_number.is_empty())
    }

    /// Start a search for the current inputs.
    ///
    /// Returns `None` without touching state when submit is disabled. Inputs
    /// that fail validation move the flow to `Failed` and also return `None`.
    /// Submitting while a search is in flight supersedes that search.
    pub fn submit(&mut self) -> Option<PendingSearch> {
        if !self.can_submit() {
            return None;
        }

        let token = self.issue_token();
        match LookupQuery::new(&self.phone, &self.card_number) {
            Ok(query) => {
                tracing::debug!(?token, "Verification search submitted");
                self.state = VerificationState::Searching { token };
                Some(PendingSearch { token, query })
            }
            Err(e) => {
                self.state = VerificationState::Failed {
                    message: e.to_string(),
                };
                None
            }
        }
    }

    /// Apply the outcome of the search identified by `token`.
    ///
    /// Returns `false` and leaves state untouched when `token` is stale.
    pub fn complete(&mut self, token: RequestToken, outcome: SearchOutcome) -> bool {
        match self.state {
            VerificationState::Searching { token: current } if current == token => {}
            _ => {
                tracing::debug!(?token, "Discarding stale verification result");
                return false;
            }
        }

        self.state = match outcome {
            Ok(Some(record)) => VerificationState::Found { record },
            Ok(None) => VerificationState::NotFound {
                message: NOT_FOUND_MESSAGE.to_string(),
            },
            Err(e) => {
                tracing::warn!(error = %e, "Verification search failed");
                VerificationState::Failed {
                    message: e.to_string(),
                }
            }
        };
        true
    }

    /// Clear inputs and any result, back to `Idle`. In-flight searches are
    /// invalidated.
    pub fn reset(&mut self) {
        self.phone.clear();
        self.card_number.clear();
        self.state = VerificationState::Idle;
        self.next_token += 1;
    }

    /// The found record, if any.
    pub fn result(&self) -> Option<&AppointmentRecord> {
        match &self.state {
            VerificationState::Found { record } => Some(record),
            _ => None,
        }
    }

    /// Inline error message for `NotFound` and `Failed`.
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            VerificationState::NotFound { message } | VerificationState::Failed { message } => {
                Some(message)
            }
            _ => None,
        }
    }

    /// Detail view of the found record.
    pub fn view(&self) -> Option<AppointmentView> {
        self.result().map(AppointmentView::from_record)
    }

    fn issue_token(&mut self) -> RequestToken {
        self.next_token += 1;
        RequestToken(self.next_token)
    }
}

impl Default for VerificationFlow {
    fn default() -> Self {
        Self::new()
    }
}
