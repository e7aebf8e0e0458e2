//! Dashboard Routes
//!
//! - GET /api/v1/dashboard/admin - Head counts for administrators
//! - GET /api/v1/dashboard/staff - Approved staff member's own record
//! - GET /api/v1/dashboard/student - Approved student's profile card

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::{AdminOverview, DetailField, StaffDashboard, StudentDashboard};
use crate::api::error::ApiResult;
use crate::api::extract::{AdminUser, AuthUser};
use crate::api::state::AppState;
use crate::storage::{LeadStatus, Role, StudentProfile};

/// Shown for profile fields nobody filled in
pub const NOT_SET: &str = "Not set";

/// GET /api/v1/dashboard/admin
pub async fn admin_overview(
    State(state): State<Arc<AppState>>,
    AdminUser(_admin): AdminUser,
) -> ApiResult<Json<AdminOverview>> {
    let counts = state.db.user_counts()?;
    let leads = state.db.list_leads()?;

    Ok(Json(AdminOverview {
        total_students: counts.students,
        total_staff: counts.staff,
        total_admins: counts.admins,
        pending_approvals: counts.pending,
        verified_users: counts.verified,
        total_leads: leads.len(),
        admitted_leads: leads
            .iter()
            .filter(|l| l.status == LeadStatus::Admitted)
            .count(),
        incomplete_lead_profiles: leads.iter().filter(|l| !l.is_complete()).count(),
        users_without_profile: counts.without_profile,
    }))
}

/// GET /api/v1/dashboard/staff
pub async fn staff_dashboard(auth: AuthUser) -> ApiResult<Json<StaffDashboard>> {
    auth.require(Some(Role::Staff))?;
    let profile = auth.user.staff_profile().cloned();

    Ok(Json(StaffDashboard {
        user: auth.user,
        profile,
    }))
}

/// GET /api/v1/dashboard/student
pub async fn student_dashboard(auth: AuthUser) -> ApiResult<Json<StudentDashboard>> {
    auth.require(Some(Role::Student))?;
    let details = student_details(auth.user.student_profile());

    Ok(Json(StudentDashboard {
        user: auth.user,
        details,
    }))
}

/// Profile card lines, in display order
pub fn student_details(profile: Option<&StudentProfile>) -> Vec<DetailField> {
    let empty = StudentProfile::default();
    let p = profile.unwrap_or(&empty);

    [
        ("Student ID", &p.student_id),
        ("Class", &p.class),
        ("Section", &p.section),
        ("Roll Number", &p.roll_number),
        ("English Name", &p.english_name),
        ("Father's Name", &p.father_name),
        ("Mother's Name", &p.mother_name),
        ("Phone Number", &p.phone_number),
        ("Guardian Phone", &p.guardian_phone),
        ("Guardian Email", &p.guardian_email),
        ("Date of Birth", &p.date_of_birth),
        ("Gender", &p.gender),
        ("Address", &p.address),
        ("Enrollment Date", &p.enrollment_date),
        ("Previous School", &p.previous_school),
        ("Medical Info", &p.medical_info),
    ]
    .into_iter()
    .map(|(label, value)| DetailField {
        label: label.to_string(),
        value: value
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(NOT_SET)
            .to_string(),
    })
    .collect()
}
