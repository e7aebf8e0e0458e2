//! Lead Routes
//!
//! Administrator-only marketing desk.
//!
//! - GET /api/v1/leads - Filtered page of leads with book-wide statistics
//! - POST /api/v1/leads - Create a lead
//! - GET /api/v1/leads/:id - One lead
//! - PUT /api/v1/leads/:id - Replace a lead's fields
//! - DELETE /api/v1/leads/:id - Remove a lead
//! - GET /api/v1/leads/report - Filtered leads, unpaginated
//! - GET /api/v1/leads/report/print - Printable HTML report
//! - GET /api/v1/leads/export - Filtered leads as CSV

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, Response},
    Json,
};
use chrono::Utc;
use std::sync::Arc;

use crate::api::dto::{LeadListParams, LeadListResponse, LeadReportResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::AdminUser;
use crate::api::routes::csv_attachment;
use crate::api::state::AppState;
use crate::directory::{paginate, visible_pages, LeadFilter, MAX_VISIBLE_PAGES};
use crate::marketing::{LeadDraft, MarketingStats};
use crate::reports::{leads_csv, leads_filename, leads_report_html};
use crate::storage::{Lead, LeadSource, Role, StorageError};

const DUPLICATE_NUMBER: &str = "Phone number already exists";

fn load_lead(state: &AppState, id: &str) -> ApiResult<Lead> {
    state
        .db
        .get_lead(id)?
        .ok_or_else(|| ApiError::NotFound(format!("Lead {} not found", id)))
}

fn filter_from(params: &LeadListParams) -> ApiResult<LeadFilter> {
    LeadFilter::from_params(&params.filter_params()).map_err(ApiError::Validation)
}

/// Reject a number already used by another lead
fn ensure_number_free(state: &AppState, number: &str, own_id: Option<&str>) -> ApiResult<()> {
    match state.db.find_lead_by_number(number)? {
        Some(existing) if Some(existing.id.as_str()) != own_id => {
            Err(ApiError::Conflict(DUPLICATE_NUMBER.to_string()))
        }
        _ => Ok(()),
    }
}

/// A linked account must exist and belong to a student
fn ensure_student_link(state: &AppState, lead: &Lead) -> ApiResult<()> {
    let Some(student_id) = lead.student_id.as_deref() else {
        return Ok(());
    };

    match state.db.get_user(student_id)? {
        Some(user) if user.role == Role::Student => Ok(()),
        Some(_) => Err(ApiError::Validation(format!(
            "User {} is not a student",
            student_id
        ))),
        None => Err(ApiError::Validation(format!(
            "Student {} not found",
            student_id
        ))),
    }
}

fn duplicate_as_conflict(err: StorageError) -> ApiError {
    match err {
        StorageError::Duplicate(_) => ApiError::Conflict(DUPLICATE_NUMBER.to_string()),
        other => ApiError::Storage(other),
    }
}

/// Validate uniqueness and store a new lead
pub(crate) fn store_new_lead(state: &AppState, lead: &Lead) -> ApiResult<()> {
    ensure_number_free(state, &lead.number, None)?;
    ensure_student_link(state, lead)?;
    state.db.insert_lead(lead).map_err(duplicate_as_conflict)
}

/// GET /api/v1/leads
pub async fn list_leads(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Query(params): Query<LeadListParams>,
) -> ApiResult<Json<LeadListResponse>> {
    let filter = filter_from(&params)?;
    let all = state.db.list_leads()?;
    let students = state.db.list_users_by_role(Role::Student)?;
    let stats = MarketingStats::compute(&all, &students);

    let page = paginate(filter.apply(all), params.page_request());
    let pages = visible_pages(page.page, page.total_pages, MAX_VISIBLE_PAGES);

    Ok(Json(LeadListResponse {
        leads: page,
        stats,
        visible_pages: pages,
    }))
}

/// GET /api/v1/leads/:id
pub async fn get_lead(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Lead>> {
    Ok(Json(load_lead(&state, &id)?))
}

/// POST /api/v1/leads
pub async fn create_lead(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Json(draft): Json<LeadDraft>,
) -> ApiResult<(StatusCode, Json<Lead>)> {
    let lead = draft
        .into_lead(LeadSource::Manual)
        .map_err(ApiError::Validation)?;
    store_new_lead(&state, &lead)?;

    tracing::info!(lead_id = %lead.id, admin_id = %admin.id, "Created lead");
    Ok((StatusCode::CREATED, Json(lead)))
}

/// PUT /api/v1/leads/:id
pub async fn update_lead(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
    Json(draft): Json<LeadDraft>,
) -> ApiResult<Json<Lead>> {
    let mut lead = load_lead(&state, &id)?;
    draft.apply_to(&mut lead).map_err(ApiError::Validation)?;

    ensure_number_free(&state, &lead.number, Some(&lead.id))?;
    ensure_student_link(&state, &lead)?;

    if !state.db.update_lead(&lead).map_err(duplicate_as_conflict)? {
        return Err(ApiError::NotFound(format!("Lead {} not found", id)));
    }

    tracing::info!(lead_id = %lead.id, status = %lead.status, admin_id = %admin.id, "Updated lead");
    Ok(Json(lead))
}

/// DELETE /api/v1/leads/:id
pub async fn delete_lead(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    if !state.db.delete_lead(&id)? {
        return Err(ApiError::NotFound(format!("Lead {} not found", id)));
    }

    tracing::info!(lead_id = %id, admin_id = %admin.id, "Deleted lead");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/leads/report
pub async fn lead_report(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Query(params): Query<LeadListParams>,
) -> ApiResult<Json<LeadReportResponse>> {
    let leads = filter_from(&params)?.apply(state.db.list_leads()?);
    Ok(Json(LeadReportResponse {
        total: leads.len(),
        leads,
    }))
}

/// GET /api/v1/leads/report/print
pub async fn print_report(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Query(params): Query<LeadListParams>,
) -> ApiResult<Html<String>> {
    let filter = filter_from(&params)?;
    let all = state.db.list_leads()?;
    let students = state.db.list_users_by_role(Role::Student)?;
    let stats = MarketingStats::compute(&all, &students);
    let leads = filter.apply(all);

    Ok(Html(leads_report_html(
        "Marketing Leads Report",
        &leads,
        &students,
        &stats,
        Utc::now(),
    )))
}

/// GET /api/v1/leads/export
pub async fn export_leads(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Query(params): Query<LeadListParams>,
) -> ApiResult<Response> {
    let leads = filter_from(&params)?.apply(state.db.list_leads()?);
    let students = state.db.list_users_by_role(Role::Student)?;
    let body = leads_csv(&leads, &students)?;
    let filename = leads_filename(Utc::now().date_naive());

    tracing::info!(rows = leads.len(), "Exported leads");
    Ok(csv_attachment(&filename, body))
}
