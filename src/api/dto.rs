//! Data Transfer Objects
//!
//! Request and response types for the API endpoints.
//! These types are serialized/deserialized to/from JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::PasswordStrength;
use crate::directory::{LeadFilterParams, Page, PageRequest, UserFilterParams, DEFAULT_PAGE_SIZE};
use crate::marketing::MarketingStats;
use crate::storage::{Lead, RoleProfile, Session, StaffProfile, User};

// ============================================
// AUTH DTOs
// ============================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Issued session plus the account it belongs to
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

impl SessionResponse {
    pub fn new(user: User, session: Session) -> Self {
        Self {
            token: session.token,
            expires_at: session.expires_at,
            user,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    #[serde(flatten)]
    pub session: SessionResponse,
    pub password_strength: PasswordStrength,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub user: User,
    pub expires_at: DateTime<Utc>,
}

// ============================================
// USER DTOs
// ============================================

/// Query string of `GET /users` and `GET /users/export`
#[derive(Debug, Default, Deserialize)]
pub struct UserListParams {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub verified: Option<bool>,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl UserListParams {
    pub fn filter_params(&self) -> UserFilterParams {
        UserFilterParams {
            search: self.search.clone(),
            role: self.role.clone(),
            verified: self.verified,
        }
    }

    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page.unwrap_or(1), self.limit.unwrap_or(DEFAULT_PAGE_SIZE))
    }
}

/// Admin edit of an account; absent fields are left alone
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub verified: Option<bool>,
    #[serde(default)]
    pub profile: Option<RoleProfile>,
}

// ============================================
// LEAD DTOs
// ============================================

/// Query string of `GET /leads` and the report endpoints
#[derive(Debug, Default, Deserialize)]
pub struct LeadListParams {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl LeadListParams {
    pub fn filter_params(&self) -> LeadFilterParams {
        LeadFilterParams {
            search: self.search.clone(),
            status: self.status.clone(),
        }
    }

    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page.unwrap_or(1), self.limit.unwrap_or(DEFAULT_PAGE_SIZE))
    }
}

#[derive(Debug, Serialize)]
pub struct LeadListResponse {
    pub leads: Page<Lead>,
    /// Over the whole lead book, not just this page
    pub stats: MarketingStats,
    pub visible_pages: Vec<usize>,
}

#[derive(Debug, Serialize)]
pub struct LeadReportResponse {
    pub leads: Vec<Lead>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct IntakeResponse {
    pub id: String,
    pub message: String,
}

// ============================================
// DASHBOARD DTOs
// ============================================

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct AdminOverview {
    pub total_students: usize,
    pub total_staff: usize,
    pub total_admins: usize,
    pub pending_approvals: usize,
    pub verified_users: usize,
    pub total_leads: usize,
    pub admitted_leads: usize,
    pub incomplete_lead_profiles: usize,
    pub users_without_profile: usize,
}

#[derive(Debug, Serialize)]
pub struct StaffDashboard {
    pub user: User,
    pub profile: Option<StaffProfile>,
}

/// One labelled line of the student profile card
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct DetailField {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct StudentDashboard {
    pub user: User,
    pub details: Vec<DetailField>,
}

// ============================================
// UPLOAD DTOs
// ============================================

#[derive(Debug, Default, Deserialize)]
pub struct UploadParams {
    #[serde(default)]
    pub name: Option<String>,
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health status response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall status: "healthy" or "unhealthy"
    pub status: String,
    /// Database status: "ok" or "error"
    pub database: String,
    /// Photo uploads: "enabled" or "disabled"
    pub uploads: String,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Server version
    pub version: String,
}
