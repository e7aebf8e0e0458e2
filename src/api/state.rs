//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use crate::auth::Authenticator;
use crate::config::Config;
use crate::storage::Database;
use crate::uploads::ImageHost;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// SQLite store for users, sessions and leads
    pub db: Arc<Database>,
    /// Sign up, login and session lookup
    pub auth: Authenticator,
    /// Photo host; `None` when uploads are not configured
    pub image_host: Option<Arc<dyn ImageHost>>,
    /// Full service configuration
    pub config: Arc<Config>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Create an AppState without an image host
    pub fn new(db: Arc<Database>, config: Config) -> Self {
        let auth = Authenticator::new(Arc::clone(&db), &config.auth);
        Self {
            db,
            auth,
            image_host: None,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Builder method: enable photo uploads through `host`
    pub fn with_image_host(mut self, host: Arc<dyn ImageHost>) -> Self {
        self.image_host = Some(host);
        self
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    pub fn uploads_enabled(&self) -> bool {
        self.image_host.is_some()
    }
}
