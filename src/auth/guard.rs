//! Role based access checks for the portal areas

use crate::storage::{Role, User};

pub const LOGIN_PATH: &str = "/login";
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";
pub const PENDING_APPROVAL_PATH: &str = "/pending-approval";
pub const HOME_PATH: &str = "/";

/// Why a request was turned away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// No signed-in user
    Unauthenticated,
    /// Signed in, but the area belongs to another role
    WrongRole { required: Role },
    /// Non-admin account not yet approved by an administrator
    PendingApproval,
}

impl Denial {
    /// Where the client should send the user
    pub fn redirect(&self) -> &'static str {
        match self {
            Denial::Unauthenticated => LOGIN_PATH,
            Denial::WrongRole {
                required: Role::Admin,
            } => UNAUTHORIZED_PATH,
            Denial::WrongRole { .. } => HOME_PATH,
            Denial::PendingApproval => PENDING_APPROVAL_PATH,
        }
    }

    pub fn message(&self) -> String {
        match self {
            Denial::Unauthenticated => "Authentication required".to_string(),
            Denial::WrongRole {
                required: Role::Admin,
            } => "Only administrators can access this area".to_string(),
            Denial::WrongRole { required } => {
                format!("This area is only available to {} accounts", required)
            }
            Denial::PendingApproval => {
                "Your account is waiting for administrator approval".to_string()
            }
        }
    }
}

/// Decide whether `user` may enter an area.
///
/// `required` is the role that owns the area; `None` admits any role.
/// Checks run in order: signed in, role, approval.
pub fn authorize(user: Option<&User>, required: Option<Role>) -> Result<(), Denial> {
    let user = user.ok_or(Denial::Unauthenticated)?;

    if let Some(required) = required {
        if user.role != required {
            return Err(Denial::WrongRole { required });
        }
    }

    if !user.is_approved() {
        return Err(Denial::PendingApproval);
    }

    Ok(())
}
