//! Intake Route
//!
//! - POST /api/v1/intake - Public admission form, no sign-in

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::IntakeResponse;
use crate::api::error::{ApiError, ApiResult};
use crate::api::routes::leads::store_new_lead;
use crate::api::state::AppState;
use crate::marketing::IntakeForm;

/// POST /api/v1/intake
pub async fn submit_intake(
    State(state): State<Arc<AppState>>,
    Json(form): Json<IntakeForm>,
) -> ApiResult<(StatusCode, Json<IntakeResponse>)> {
    let lead = form.into_lead().map_err(ApiError::Validation)?;
    store_new_lead(&state, &lead)?;

    tracing::info!(lead_id = %lead.id, class = %lead.class, "Admission form received");
    Ok((
        StatusCode::CREATED,
        Json(IntakeResponse {
            id: lead.id,
            message: "Your admission request has been received".to_string(),
        }),
    ))
}
