//! User Directory Routes
//!
//! Administrator-only account management.
//!
//! - GET /api/v1/users - Search, filter and page accounts
//! - GET /api/v1/users/export - Filtered accounts as CSV
//! - GET /api/v1/users/:id - One account
//! - PUT /api/v1/users/:id - Edit name, role, approval or profile
//! - DELETE /api/v1/users/:id - Remove an account and its sessions
//! - POST /api/v1/users/:id/approve - Approve a pending account

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Response,
    Json,
};
use chrono::Utc;
use std::sync::Arc;

use crate::api::dto::{UpdateUserRequest, UserListParams};
use crate::api::error::{ApiError, ApiResult};
use crate::api::extract::AdminUser;
use crate::api::routes::csv_attachment;
use crate::api::state::AppState;
use crate::directory::{paginate, Page, UserFilter};
use crate::reports::{users_csv, users_filename};
use crate::storage::{Role, User};
use crate::validation::{max_len, require};

fn load_user(state: &AppState, id: &str) -> ApiResult<User> {
    state
        .db
        .get_user(id)?
        .ok_or_else(|| ApiError::NotFound(format!("User {} not found", id)))
}

fn filtered_users(state: &AppState, params: &UserListParams) -> ApiResult<Vec<User>> {
    let filter = UserFilter::from_params(&params.filter_params()).map_err(ApiError::Validation)?;
    Ok(filter.apply(state.db.list_users()?))
}

/// GET /api/v1/users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Query(params): Query<UserListParams>,
) -> ApiResult<Json<Page<User>>> {
    let users = filtered_users(&state, &params)?;
    Ok(Json(paginate(users, params.page_request())))
}

/// GET /api/v1/users/:id
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Json<User>> {
    Ok(Json(load_user(&state, &id)?))
}

/// PUT /api/v1/users/:id
///
/// A new role without a matching profile drops the old profile; a profile
/// for another role is rejected.
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<User>> {
    check_own_role(&admin, &id, &req).map_err(ApiError::Validation)?;
    let mut user = load_user(&state, &id)?;
    apply_update(&mut user, req).map_err(ApiError::Validation)?;

    if !state.db.update_user(&user)? {
        return Err(ApiError::NotFound(format!("User {} not found", id)));
    }

    tracing::info!(
        user_id = %user.id,
        role = %user.role,
        verified = user.verified,
        admin_id = %admin.id,
        "Updated user"
    );
    Ok(Json(user))
}

/// An administrator may not demote themselves, or the admin area could be
/// left with nobody to run it.
fn check_own_role(admin: &User, target_id: &str, req: &UpdateUserRequest) -> Result<(), String> {
    if admin.id != target_id {
        return Ok(());
    }
    match req.role.as_deref().map(str::parse::<Role>).transpose()? {
        Some(role) if role != admin.role => Err("You cannot change your own role".to_string()),
        _ => Ok(()),
    }
}

fn apply_update(user: &mut User, req: UpdateUserRequest) -> Result<(), String> {
    if let Some(name) = req.name {
        require("Name", &name)?;
        max_len("Name", &name, 200)?;
        user.name = name.trim().to_string();
    }

    let role = match req.role.as_deref() {
        Some(role) => role.parse::<Role>()?,
        None => user.role,
    };
    if role != user.role || req.profile.is_some() {
        user.assign_role(role, req.profile)?;
    }

    if let Some(verified) = req.verified {
        user.verified = verified;
    }

    user.updated_at = Utc::now();
    Ok(())
}

/// POST /api/v1/users/:id/approve
pub async fn approve_user(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> ApiResult<Json<User>> {
    let mut user = load_user(&state, &id)?;

    if !user.verified {
        user.verified = true;
        user.updated_at = Utc::now();
        state.db.update_user(&user)?;
        tracing::info!(user_id = %user.id, admin_id = %admin.id, "Approved user");
    }

    Ok(Json(user))
}

/// DELETE /api/v1/users/:id
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    if admin.id == id {
        return Err(ApiError::Validation(
            "You cannot delete your own account".to_string(),
        ));
    }

    if !state.db.delete_user(&id)? {
        return Err(ApiError::NotFound(format!("User {} not found", id)));
    }

    tracing::info!(user_id = %id, admin_id = %admin.id, "Deleted user");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/users/export
pub async fn export_users(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
    Query(params): Query<UserListParams>,
) -> ApiResult<Response> {
    let users = filtered_users(&state, &params)?;
    let body = users_csv(&users)?;
    let filename = users_filename(Utc::now().date_naive());

    tracing::info!(rows = users.len(), "Exported users");
    Ok(csv_attachment(&filename, body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{RoleProfile, StaffProfile, StudentProfile};

    fn student() -> User {
        User::new("s@school.test", "Student", Role::Student)
            .with_profile(RoleProfile::Student(StudentProfile {
                class: Some("Two".to_string()),
                ..Default::default()
            }))
            .unwrap()
    }

    #[test]
    fn test_role_change_drops_profile() {
        let mut user = student();
        apply_update(
            &mut user,
            UpdateUserRequest {
                role: Some("staff".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(user.role, Role::Staff);
        assert!(user.profile.is_none());
    }

    #[test]
    fn test_role_change_with_matching_profile() {
        let mut user = student();
        apply_update(
            &mut user,
            UpdateUserRequest {
                role: Some("staff".to_string()),
                profile: Some(RoleProfile::Staff(StaffProfile {
                    designation: Some("Teacher".to_string()),
                    ..Default::default()
                })),
                ..Default::default()
            },
        )
        .unwrap();

        assert_eq!(user.staff_profile().unwrap().designation.as_deref(), Some("Teacher"));
    }

    #[test]
    fn test_mismatched_profile_rejected() {
        let mut user = student();
        let err = apply_update(
            &mut user,
            UpdateUserRequest {
                profile: Some(RoleProfile::Staff(StaffProfile::default())),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(err.contains("does not match"));
    }

    #[test]
    fn test_admin_cannot_change_own_role() {
        let admin = User::new("head@school.test", "Head", Role::Admin).verified(true);
        let demote = UpdateUserRequest {
            role: Some("student".to_string()),
            ..Default::default()
        };

        assert_eq!(
            check_own_role(&admin, &admin.id, &demote).unwrap_err(),
            "You cannot change your own role"
        );
        assert!(check_own_role(&admin, "someone-else", &demote).is_ok());

        let rename = UpdateUserRequest {
            name: Some("Head Teacher".to_string()),
            role: Some("admin".to_string()),
            ..Default::default()
        };
        assert!(check_own_role(&admin, &admin.id, &rename).is_ok());
    }

    #[test]
    fn test_name_and_verified() {
        let mut user = student();
        apply_update(
            &mut user,
            UpdateUserRequest {
                name: Some("  Renamed ".to_string()),
                verified: Some(true),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(user.name, "Renamed");
        assert!(user.verified);
        assert!(user.student_profile().is_some());

        assert!(apply_update(
            &mut user,
            UpdateUserRequest {
                name: Some(" ".to_string()),
                ..Default::default()
            }
        )
        .is_err());
    }
}
