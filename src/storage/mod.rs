//! SchoolHub Store
//!
//! SQLite persistence for the portal:
//!
//! - **types**: Domain records (User, RoleProfile, Lead, Session)
//! - **db**: Connection handling and schema
//! - **users** / **sessions** / **leads**: Repository methods on `Database`
//! - **error**: Error types
//!
//! # Example
//!
//! ```rust,no_run
//! use schoolhub::storage::{Database, Lead, Role, User};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::open("./schoolhub.db")?;
//!
//!     db.insert_user(&User::new("head@school.test", "Head", Role::Admin), "argon2-hash")?;
//!     db.insert_lead(&Lead::new("Rahim", "01700000000").class("Play"))?;
//!
//!     println!("{} leads", db.list_leads()?.len());
//!     Ok(())
//! }
//! ```

pub mod db;
pub mod error;
pub mod leads;
pub mod sessions;
pub mod types;
pub mod users;

pub use db::Database;
pub use error::{StorageError, StorageResult};
pub use types::{
    AdminProfile, Lead, LeadSource, LeadStatus, Role, RoleProfile, Session, StaffProfile,
    StudentProfile, User,
};
pub use users::UserCounts;
