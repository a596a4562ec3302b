//! Appointment search endpoint.
//!
//! `GET /api/appointments/search?phone=&card=`. Both parameters optional,
//! at least one must be non-empty. Returns the first matching appointment
//! or a 404 carrying the verify page's not-found message.
//!
//! Query values are form-decoded, so a literal `+` arrives as a space.
//! International numbers must be sent with the plus encoded as `%2B`
//! (`?phone=%2B1234567890`); `?phone=+1234567890` searches for
//! `" 1234567890"` and finds nothing.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::lookup::LookupQuery;
use crate::models::AppointmentRecord;
use crate::verification::{AppointmentView, NOT_FOUND_MESSAGE};

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub card: String,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub appointment: AppointmentView,
    pub record: AppointmentRecord,
}

/// `GET /api/appointments/search`: find an appointment by phone or card.
pub async fn search(
    State(ctx): State<ApiContext>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ApiError> {
    let query = LookupQuery::new(&params.phone, &params.card)?;

    let record = ctx
        .verifier
        .lookup(query)
        .await?
        .ok_or_else(|| ApiError::NotFound(NOT_FOUND_MESSAGE.into()))?;

    Ok(Json(SearchResponse {
        appointment: AppointmentView::from_record(&record),
        record,
    }))
}
