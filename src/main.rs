//! SchoolHub API Server
//!
//! Run with: cargo run --bin schoolhub -- --config config.toml
//!
//! # Configuration
//!
//! Settings come from a TOML file (see `schoolhub-cli config`), then
//! `SCHOOLHUB_*` environment variables override them:
//! - `SCHOOLHUB_HOST`, `SCHOOLHUB_PORT`: Bind address (default: 0.0.0.0:8090)
//! - `SCHOOLHUB_DATABASE_PATH`: SQLite file
//! - `SCHOOLHUB_ADMIN_EMAIL`, `SCHOOLHUB_ADMIN_PASSWORD`: Bootstrap administrator
//! - `SCHOOLHUB_IMGBB_API_KEY`: Enables photo uploads
//! - `SCHOOLHUB_LOG_LEVEL`, `SCHOOLHUB_LOG_FORMAT`: `info`, `pretty` / `json`
//! - `RUST_LOG`: Full filter directive, wins over the log level

use anyhow::Context;
use clap::Parser;
use schoolhub::api::{serve, AppState};
use schoolhub::auth::Authenticator;
use schoolhub::config::{Config, LoggingConfig};
use schoolhub::storage::Database;
use schoolhub::uploads::ImgbbClient;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// How often expired sessions are swept
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[derive(Parser)]
#[command(name = "schoolhub")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "School management API server")]
struct Args {
    /// Config file (default: search the usual locations)
    #[arg(short, long, env = "SCHOOLHUB_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };

    init_tracing(&config.logging);
    tracing::info!("Starting SchoolHub API server v{}", env!("CARGO_PKG_VERSION"));

    let db_path = expand_home(&config.database.path);
    tracing::info!("Database: {:?}", db_path);
    let db = Arc::new(
        Database::open(&db_path).with_context(|| format!("opening database {:?}", db_path))?,
    );

    let mut state = AppState::new(Arc::clone(&db), config.clone());

    match ImgbbClient::from_config(&config.uploads)? {
        Some(client) => {
            tracing::info!("Photo uploads enabled via {}", config.uploads.endpoint);
            state = state.with_image_host(Arc::new(client));
        }
        None => tracing::info!("Photo uploads disabled (no ImgBB API key)"),
    }

    bootstrap_admin(&state.auth, &config).await?;
    start_session_sweep(state.auth.clone());

    serve(state).await?;
    Ok(())
}

/// Install the global subscriber. `RUST_LOG` wins over `logging.level`.
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "schoolhub={},tower_http=info",
            logging.level.trim()
        ))
    });

    let (pretty, json) = if logging.format.eq_ignore_ascii_case("json") {
        (None, Some(tracing_subscriber::fmt::layer().json()))
    } else {
        (Some(tracing_subscriber::fmt::layer()), None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(pretty)
        .with(json)
        .init();
}

/// Create the configured administrator on first start
async fn bootstrap_admin(auth: &Authenticator, config: &Config) -> anyhow::Result<()> {
    let bootstrap = &config.bootstrap;
    let (Some(email), Some(password)) = (
        bootstrap.admin_email.clone(),
        bootstrap.admin_password.clone(),
    ) else {
        tracing::info!("No bootstrap administrator configured");
        return Ok(());
    };

    let auth = auth.clone();
    let name = bootstrap.admin_name.clone();
    let created =
        tokio::task::spawn_blocking(move || auth.bootstrap_admin(&email, &password, &name))
            .await?
            .context("creating bootstrap administrator")?;

    if created.is_none() {
        tracing::debug!("Bootstrap administrator already present");
    }
    Ok(())
}

/// Sweep expired sessions now and then hourly
fn start_session_sweep(auth: Authenticator) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let auth = auth.clone();
            match tokio::task::spawn_blocking(move || auth.purge_expired()).await {
                Ok(Ok(0)) => {}
                Ok(Ok(purged)) => tracing::info!(purged, "Purged expired sessions"),
                Ok(Err(e)) => tracing::warn!(error = %e, "Session sweep failed"),
                Err(e) => tracing::error!(error = %e, "Session sweep task panicked"),
            }
        }
    });
}

/// Expand a leading `~/` to the home directory
fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
