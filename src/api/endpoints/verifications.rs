//! Verification session endpoints.
//!
//! A session mirrors the verify page: the client edits the two inputs,
//! submits, and polls until the state leaves `searching`.
//!
//! - `POST   /api/verifications`             open a session (201)
//! - `GET    /api/verifications/:id`         current snapshot
//! - `PUT    /api/verifications/:id/inputs`  replace phone and/or card
//! - `POST   /api/verifications/:id/submit`  start a search (202 when started)
//! - `POST   /api/verifications/:id/reset`   back to idle
//! - `DELETE /api/verifications/:id`         close the session (204)

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::verification::FlowSnapshot;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputsRequest {
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub card_number: Option<String>,
}

pub async fn create(
    State(ctx): State<ApiContext>,
) -> Result<(StatusCode, Json<FlowSnapshot>), ApiError> {
    let snapshot = ctx.sessions.create()?;
    tracing::debug!(session = %snapshot.id, "Verification session opened");
    Ok((StatusCode::CREATED, Json(snapshot)))
}

pub async fn get(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<FlowSnapshot>, ApiError> {
    Ok(Json(ctx.sessions.snapshot(&id)?))
}

pub async fn update_inputs(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
    Json(body): Json<InputsRequest>,
) -> Result<Json<FlowSnapshot>, ApiError> {
    Ok(Json(ctx.sessions.update_inputs(
        &id,
        body.phone,
        body.card_number,
    )?))
}

/// Start a search for the session's inputs. The result arrives after the
/// configured search latency; poll `GET` to observe it.
pub async fn submit(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<FlowSnapshot>), ApiError> {
    let (snapshot, started) = ctx.sessions.submit(&id, &ctx.verifier)?;
    let status = if started.is_some() {
        StatusCode::ACCEPTED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(snapshot)))
}

pub async fn reset(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<Json<FlowSnapshot>, ApiError> {
    Ok(Json(ctx.sessions.reset(&id)?))
}

pub async fn close(
    State(ctx): State<ApiContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    ctx.sessions.remove(&id)?;
    Ok(StatusCode::NO_CONTENT)
}
