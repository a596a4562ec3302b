//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub store: &'static str,
    pub records: usize,
}

/// `GET /api/health`: liveness plus store summary.
pub async fn check(State(ctx): State<ApiContext>) -> Result<Json<HealthResponse>, ApiError> {
    let store = ctx.verifier.store().clone();
    let records = tokio::task::spawn_blocking(move || store.count())
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    Ok(Json(HealthResponse {
        status: "ok",
        version: crate::config::APP_VERSION,
        store: ctx.verifier.store().backend(),
        records,
    }))
}
