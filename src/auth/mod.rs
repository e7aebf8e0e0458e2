//! Authentication
//!
//! Email / password accounts with bearer sessions:
//! - [`password`]: Argon2 hashing and a strength rating
//! - [`guard`]: role and approval checks for the portal areas
//! - [`Authenticator`]: sign up, login, admin login, logout, token lookup

pub mod guard;
pub mod password;

pub use guard::{authorize, Denial};
pub use password::{hash_password, password_strength, verify_password, PasswordStrength};

use crate::config::AuthConfig;
use crate::storage::{Database, Role, RoleProfile, Session, StorageError, User};
use crate::validation::{is_valid_email, max_len, require};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{Duration, Utc};
use rand::RngCore;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("user already exists")]
    UserExists,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("Only administrators can access this area")]
    AdminOnly,
    #[error("{0}")]
    Validation(String),
    #[error("session not found")]
    SessionNotFound,
    #[error("session expired")]
    SessionExpired,
    #[error("password hashing failed: {0}")]
    PasswordHash(#[from] argon2::password_hash::Error),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Sign up form
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub name: String,
    /// `student` or `staff`
    pub role: String,
    #[serde(default)]
    pub profile: Option<RoleProfile>,
}

#[derive(Clone)]
pub struct Authenticator {
    db: Arc<Database>,
    session_ttl: Duration,
    min_password_length: usize,
}

impl Authenticator {
    pub fn new(db: Arc<Database>, config: &AuthConfig) -> Self {
        Self {
            db,
            session_ttl: config.session_ttl(),
            min_password_length: config.min_password_length,
        }
    }

    /// Create a student or staff account awaiting approval and sign it in
    pub fn register(
        &self,
        form: Registration,
    ) -> AuthResult<(User, Session, PasswordStrength)> {
        let role: Role = form.role.parse().map_err(AuthError::Validation)?;
        if role == Role::Admin {
            return Err(AuthError::Validation(
                "Administrator accounts cannot be created through sign up".to_string(),
            ));
        }

        require("Name", &form.name).map_err(AuthError::Validation)?;
        max_len("Name", &form.name, 200).map_err(AuthError::Validation)?;
        if !is_valid_email(&form.email) {
            return Err(AuthError::Validation(format!(
                "Invalid email: {}",
                form.email.trim()
            )));
        }
        self.check_password(&form.password)?;
        if form.password != form.confirm_password {
            return Err(AuthError::Validation("Passwords do not match".to_string()));
        }

        if self.db.get_user_with_hash(&form.email)?.is_some() {
            return Err(AuthError::UserExists);
        }

        let mut user = User::new(&form.email, &form.name, role);
        if let Some(profile) = form.profile {
            user = user.with_profile(profile).map_err(AuthError::Validation)?;
        }

        let strength = password_strength(&form.password);
        let hash = hash_password(&form.password)?;
        self.db.insert_user(&user, &hash).map_err(|e| match e {
            StorageError::Duplicate(_) => AuthError::UserExists,
            other => AuthError::Storage(other),
        })?;

        info!(user_id = %user.id, role = %user.role, "Registered user");
        let session = self.issue_session(&user.id)?;
        Ok((user, session, strength))
    }

    /// Password login for any role
    pub fn login(&self, email: &str, password: &str) -> AuthResult<(User, Session)> {
        let user = self.check_credentials(email, password)?;
        let session = self.issue_session(&user.id)?;
        debug!(user_id = %user.id, "User logged in");
        Ok((user, session))
    }

    /// Password login for the admin area; other roles get no session
    pub fn admin_login(&self, email: &str, password: &str) -> AuthResult<(User, Session)> {
        let user = self.check_credentials(email, password)?;
        if user.role != Role::Admin {
            warn!(user_id = %user.id, role = %user.role, "Non-admin tried the admin login");
            return Err(AuthError::AdminOnly);
        }
        let session = self.issue_session(&user.id)?;
        info!(user_id = %user.id, "Administrator logged in");
        Ok((user, session))
    }

    /// End a session. Unknown tokens are not an error.
    pub fn logout(&self, token: &str) -> AuthResult<()> {
        if self.db.delete_session(token)? {
            debug!("Session closed");
        }
        Ok(())
    }

    /// Resolve a bearer token to its user. Expired sessions are removed.
    pub fn authenticate_token(&self, token: &str) -> AuthResult<(User, Session)> {
        let session = self
            .db
            .get_session(token)?
            .ok_or(AuthError::SessionNotFound)?;

        if session.is_expired() {
            self.db.delete_session(token)?;
            return Err(AuthError::SessionExpired);
        }

        match self.db.get_user(&session.user_id)? {
            Some(user) => Ok((user, session)),
            None => {
                self.db.delete_session(token)?;
                Err(AuthError::SessionNotFound)
            }
        }
    }

    /// Create a verified administrator unless the email is already taken.
    /// Returns the new account, or `None` when nothing was created.
    pub fn bootstrap_admin(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> AuthResult<Option<User>> {
        if !is_valid_email(email) {
            return Err(AuthError::Validation(format!(
                "Invalid bootstrap admin email: {}",
                email.trim()
            )));
        }

        if let Some((existing, _)) = self.db.get_user_with_hash(email)? {
            if existing.role != Role::Admin {
                warn!(
                    user_id = %existing.id,
                    role = %existing.role,
                    "Bootstrap admin email belongs to a non-admin account"
                );
            }
            return Ok(None);
        }

        self.check_password(password)?;
        let admin = User::new(email, name, Role::Admin).verified(true);
        let hash = hash_password(password)?;
        self.db.insert_user(&admin, &hash)?;

        info!(user_id = %admin.id, email = %admin.email, "Created bootstrap administrator");
        Ok(Some(admin))
    }

    /// Drop every expired session
    pub fn purge_expired(&self) -> AuthResult<usize> {
        Ok(self.db.purge_expired_sessions(Utc::now())?)
    }

    fn check_password(&self, password: &str) -> AuthResult<()> {
        if password.chars().count() < self.min_password_length {
            return Err(AuthError::Validation(format!(
                "Password must be at least {} characters",
                self.min_password_length
            )));
        }
        Ok(())
    }

    fn check_credentials(&self, email: &str, password: &str) -> AuthResult<User> {
        let Some((user, hash)) = self.db.get_user_with_hash(email)? else {
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password, &hash) {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }

    fn issue_session(&self, user_id: &str) -> AuthResult<Session> {
        let now = Utc::now();
        let session = Session {
            token: generate_session_token(),
            user_id: user_id.to_string(),
            created_at: now,
            expires_at: now + self.session_ttl,
        };
        self.db.insert_session(&session)?;
        Ok(session)
    }
}

fn generate_session_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
