//! # SchoolHub
//!
//! School management backend: accounts with approval, role dashboards, the
//! admissions lead book with its statistics, and CSV / printable reports, all
//! served as a JSON API.
//!
//! ## Modules
//!
//! - [`storage`]: SQLite persistence for users, sessions and leads
//! - [`auth`]: Password hashing, sessions and access guards
//! - [`directory`]: Search filters and pagination
//! - [`marketing`]: Lead validation and lead book statistics
//! - [`reports`]: CSV exports and printable reports
//! - [`uploads`]: Photo hosting through ImgBB
//! - [`api`]: REST API server with Axum
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use schoolhub::{AppState, Config, Database};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let db = Arc::new(Database::open(&config.database.path)?);
//!
//!     let state = AppState::new(db, config);
//!     state
//!         .auth
//!         .bootstrap_admin("head@school.example", "change-me", "Head Teacher")?;
//!
//!     schoolhub::serve(state).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod directory;
pub mod marketing;
pub mod reports;
pub mod storage;
pub mod uploads;
pub mod validation;

// Re-export top-level types for convenience
pub use storage::{
    Database, Lead, LeadSource, LeadStatus, Role, RoleProfile, Session, StorageError,
    StorageResult, User,
};

pub use auth::{AuthError, Authenticator, PasswordStrength, Registration};

pub use directory::{LeadFilter, Page, PageRequest, UserFilter};

pub use marketing::{IntakeForm, LeadDraft, MarketingStats};

pub use api::{build_router, serve, ApiError, AppState};

pub use config::{Config, ConfigError};

pub use uploads::{ImageHost, ImgbbClient, UploadError, UploadedImage};
