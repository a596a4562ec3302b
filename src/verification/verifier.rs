//! Async search driver for the verification flow.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use super::{PendingSearch, SearchOutcome, VerificationFlow};
use crate::lookup::LookupQuery;
use crate::store::{AppointmentStore, StoreError};

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Appointment lookup failed: {0}")]
    Store(#[from] StoreError),

    #[error("Lookup task failed: {0}")]
    Join(String),
}

/// Runs submitted searches against a store.
///
/// `latency` is a presentation delay applied before every lookup; it does
/// not affect which record is returned. Zero disables it.
#[derive(Clone)]
pub struct Verifier {
    store: Arc<dyn AppointmentStore>,
    latency: Duration,
}

impl Verifier {
    pub fn new(store: Arc<dyn AppointmentStore>, latency: Duration) -> Self {
        Self { store, latency }
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    pub fn store(&self) -> &Arc<dyn AppointmentStore> {
        &self.store
    }

    /// Wait out the latency, then look the query up.
    pub async fn run(&self, search: &PendingSearch) -> SearchOutcome {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let record = self.lookup(search.query.clone()).await?;
        tracing::info!(
            token = ?search.token,
            found = record.is_some(),
            "Verification search finished"
        );
        Ok(record)
    }

    /// Look `query` up on a blocking thread, without the latency.
    pub async fn lookup(&self, query: LookupQuery) -> SearchOutcome {
        let store = Arc::clone(&self.store);
        let record = tokio::task::spawn_blocking(move || store.find_by_phone_or_card(&query))
            .await
            .map_err(|e| SearchError::Join(e.to_string()))??;
        tracing::debug!(
            backend = self.store.backend(),
            found = record.is_some(),
            "Appointment lookup"
        );
        Ok(record)
    }

    /// Submit the flow's current inputs and apply the result.
    ///
    /// Returns `false` when submit was disabled or rejected.
    pub async fn verify(&self, flow: &mut VerificationFlow) -> bool {
        let Some(search) = flow.submit() else {
            return false;
        };
        let outcome = self.run(&search).await;
        flow.complete(search.token, outcome)
    }
}
