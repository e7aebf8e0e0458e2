//! Request extractors for the signed-in user

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::auth::authorize;
use crate::storage::{Role, Session, User};

/// Pull the token out of an `Authorization: Bearer <token>` header
pub fn require_bearer(headers: &HeaderMap) -> Result<String, ApiError> {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("missing authorization header"))?;

    let mut parts = value.split_whitespace();
    let scheme = parts.next().unwrap_or("");
    if !scheme.eq_ignore_ascii_case("Bearer") {
        return Err(ApiError::unauthorized("invalid authorization scheme"));
    }

    let token = parts.next().unwrap_or("");
    if token.is_empty() {
        return Err(ApiError::unauthorized("missing bearer token"));
    }

    Ok(token.to_string())
}

/// Any user with a live session, approved or not
pub struct AuthUser {
    pub user: User,
    pub session: Session,
}

impl AuthUser {
    /// Apply the area guard; `None` admits any approved role
    pub fn require(&self, role: Option<Role>) -> Result<(), ApiError> {
        authorize(Some(&self.user), role).map_err(ApiError::from)
    }
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = require_bearer(&parts.headers)?;
        let (user, session) = state.auth.authenticate_token(&token)?;
        Ok(Self { user, session })
    }
}

/// A signed-in administrator
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let auth = AuthUser::from_request_parts(parts, state).await?;
        auth.require(Some(Role::Admin))?;
        Ok(Self(auth.user))
    }
}
