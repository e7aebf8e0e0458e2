//! Auth Routes
//!
//! - POST /api/v1/auth/register - Sign up as student or staff
//! - POST /api/v1/auth/login - Password login
//! - POST /api/v1/auth/admin-login - Password login for the admin area
//! - POST /api/v1/auth/logout - End the current session
//! - GET /api/v1/auth/me - Current user

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::{LoginRequest, MeResponse, RegisterResponse, SessionResponse};
use crate::api::error::ApiResult;
use crate::api::extract::AuthUser;
use crate::api::routes::blocking;
use crate::api::state::AppState;
use crate::auth::Registration;

/// POST /api/v1/auth/register
///
/// The new account is unverified until an administrator approves it,
/// but gets a session right away so the client can show the pending page.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(form): Json<Registration>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let auth = state.auth.clone();
    let (user, session, strength) = blocking(move || Ok(auth.register(form)?)).await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            session: SessionResponse::new(user, session),
            password_strength: strength,
        }),
    ))
}

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<SessionResponse>> {
    let auth = state.auth.clone();
    let (user, session) = blocking(move || Ok(auth.login(&req.email, &req.password)?)).await?;
    Ok(Json(SessionResponse::new(user, session)))
}

/// POST /api/v1/auth/admin-login
pub async fn admin_login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<SessionResponse>> {
    let auth = state.auth.clone();
    let (user, session) =
        blocking(move || Ok(auth.admin_login(&req.email, &req.password)?)).await?;
    Ok(Json(SessionResponse::new(user, session)))
}

/// POST /api/v1/auth/logout
pub async fn logout(State(state): State<Arc<AppState>>, auth: AuthUser) -> ApiResult<StatusCode> {
    state.auth.logout(&auth.session.token)?;
    tracing::debug!(user_id = %auth.user.id, "Logged out");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/me
///
/// Works for unapproved accounts too; the client reads `verified` to decide
/// between the dashboard and the pending-approval page.
pub async fn me(auth: AuthUser) -> Json<MeResponse> {
    Json(MeResponse {
        user: auth.user,
        expires_at: auth.session.expires_at,
    })
}
