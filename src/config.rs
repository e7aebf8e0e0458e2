//! Configuration System
//!
//! Loads configuration from a TOML file and applies `SCHOOLHUB_*`
//! environment variable overrides on top.

use serde::Deserialize;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

/// Prefix of every environment override
pub const ENV_PREFIX: &str = "SCHOOLHUB_";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub bootstrap: BootstrapConfig,

    #[serde(default)]
    pub uploads: UploadsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// SQLite database location
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_path")]
    pub path: String,
}

fn default_database_path() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("schoolhub").join("schoolhub.db").to_string_lossy().to_string())
        .unwrap_or_else(|| "./schoolhub_data/schoolhub.db".to_string())
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_database_path(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Upper bound for JSON and upload request bodies
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8090
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:5173".to_string(),
        "http://127.0.0.1:5173".to_string(),
    ]
}

fn default_max_body_bytes() -> usize {
    16 * 1024 * 1024 // 16 MB
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

/// Sessions and password policy
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: u64,

    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,
}

fn default_session_ttl_hours() -> u64 {
    24 * 7
}

fn default_min_password_length() -> usize {
    6
}

/// Accepted session lifetimes: one hour to ten years
pub const SESSION_TTL_HOURS: RangeInclusive<u64> = 1..=87_600;

impl AuthConfig {
    /// Session lifetime; a setting outside [`SESSION_TTL_HOURS`] reads as the default
    pub fn session_ttl(&self) -> chrono::Duration {
        let hours = if SESSION_TTL_HOURS.contains(&self.session_ttl_hours) {
            self.session_ttl_hours
        } else {
            default_session_ttl_hours()
        };
        chrono::Duration::hours(hours as i64)
    }

    fn normalize(&mut self) {
        if !SESSION_TTL_HOURS.contains(&self.session_ttl_hours) {
            tracing::warn!(
                session_ttl_hours = self.session_ttl_hours,
                default = default_session_ttl_hours(),
                "Session TTL out of range, using the default"
            );
            self.session_ttl_hours = default_session_ttl_hours();
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_hours: default_session_ttl_hours(),
            min_password_length: default_min_password_length(),
        }
    }
}

/// First administrator, created at startup when missing
#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapConfig {
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,

    #[serde(default = "default_admin_name")]
    pub admin_name: String,
}

fn default_admin_name() -> String {
    "Administrator".to_string()
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            admin_email: None,
            admin_password: None,
            admin_name: default_admin_name(),
        }
    }
}

/// Photo uploads through ImgBB
#[derive(Debug, Clone, Deserialize)]
pub struct UploadsConfig {
    /// Uploads are disabled while this is unset
    pub imgbb_api_key: Option<String>,

    #[serde(default = "default_upload_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_upload_max_bytes")]
    pub max_bytes: usize,

    #[serde(default = "default_upload_timeout")]
    pub timeout_secs: u64,
}

fn default_upload_endpoint() -> String {
    "https://api.imgbb.com/1/upload".to_string()
}

fn default_upload_max_bytes() -> usize {
    5 * 1024 * 1024 // 5 MB
}

fn default_upload_timeout() -> u64 {
    30
}

impl Default for UploadsConfig {
    fn default() -> Self {
        Self {
            imgbb_api_key: None,
            endpoint: default_upload_endpoint(),
            max_bytes: default_upload_max_bytes(),
            timeout_secs: default_upload_timeout(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, String> {
        let mut config: Config = toml::from_str(content).map_err(|e| e.to_string())?;
        config.normalize();
        Ok(config)
    }

    /// Replace out-of-range values with their defaults
    fn normalize(&mut self) {
        self.auth.normalize();
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("schoolhub").join("config.toml")),
            Some(PathBuf::from("/etc/schoolhub/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(format!("{}{}", ENV_PREFIX, key)).ok());
    }

    /// Apply overrides from `lookup`, which maps an unprefixed key such as
    /// `PORT` to its value. Unparseable numbers are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("DATABASE_PATH") {
            self.database.path = path;
        }

        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }

        if let Some(ttl) = lookup("SESSION_TTL_HOURS").and_then(|t| t.parse().ok()) {
            self.auth.session_ttl_hours = ttl;
        }

        if let Some(email) = lookup("ADMIN_EMAIL") {
            self.bootstrap.admin_email = Some(email);
        }
        if let Some(password) = lookup("ADMIN_PASSWORD") {
            self.bootstrap.admin_password = Some(password);
        }
        if let Some(name) = lookup("ADMIN_NAME") {
            self.bootstrap.admin_name = name;
        }

        if let Some(key) = lookup("IMGBB_API_KEY") {
            self.uploads.imgbb_api_key = Some(key).filter(|k| !k.trim().is_empty());
        }

        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            self.logging.format = format;
        }

        self.normalize();
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# SchoolHub Configuration
#
# Environment variables override these settings:
# - SCHOOLHUB_DATABASE_PATH
# - SCHOOLHUB_HOST
# - SCHOOLHUB_PORT
# - SCHOOLHUB_SESSION_TTL_HOURS
# - SCHOOLHUB_ADMIN_EMAIL / SCHOOLHUB_ADMIN_PASSWORD / SCHOOLHUB_ADMIN_NAME
# - SCHOOLHUB_IMGBB_API_KEY
# - SCHOOLHUB_LOG_LEVEL
# - SCHOOLHUB_LOG_FORMAT

[database]
# SQLite database file (created on first start)
path = "~/.local/share/schoolhub/schoolhub.db"

[server]
# API server host
host = "0.0.0.0"

# API server port
port = 8090

# Allowed CORS origins (the portal front end)
cors_origins = ["http://localhost:5173", "http://127.0.0.1:5173"]

# Largest accepted request body (bytes)
max_body_bytes = 16777216

[auth]
# How long a login stays valid (hours)
session_ttl_hours = 168

# Minimum password length at sign up
min_password_length = 6

[bootstrap]
# First administrator, created at startup if no account uses this email
# admin_email = "admin@school.example"
# admin_password = "change-me"
admin_name = "Administrator"

[uploads]
# ImgBB API key; photo uploads are disabled without it
# imgbb_api_key = ""

# ImgBB upload endpoint
endpoint = "https://api.imgbb.com/1/upload"

# Largest accepted photo (bytes)
max_bytes = 5242880

# Upload timeout in seconds
timeout_secs = 30

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
