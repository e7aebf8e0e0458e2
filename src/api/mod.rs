//! SchoolHub REST API
//!
//! HTTP API layer for SchoolHub, built with Axum.
//!
//! # Endpoints
//!
//! ## Auth
//! - `POST /api/v1/auth/register` - Sign up (student or staff)
//! - `POST /api/v1/auth/login` - Password login
//! - `POST /api/v1/auth/admin-login` - Administrator login
//! - `POST /api/v1/auth/logout` - End session
//! - `GET /api/v1/auth/me` - Current user
//!
//! ## Users (admin)
//! - `GET /api/v1/users` - Search and page accounts
//! - `GET /api/v1/users/export` - CSV export
//! - `GET /api/v1/users/:id` - Get an account
//! - `PUT /api/v1/users/:id` - Edit an account
//! - `DELETE /api/v1/users/:id` - Delete an account
//! - `POST /api/v1/users/:id/approve` - Approve a pending account
//!
//! ## Leads (admin)
//! - `GET /api/v1/leads` - Page of leads with statistics
//! - `POST /api/v1/leads` - Create a lead
//! - `GET /api/v1/leads/:id` - Get a lead
//! - `PUT /api/v1/leads/:id` - Update a lead
//! - `DELETE /api/v1/leads/:id` - Delete a lead
//! - `GET /api/v1/leads/report` - Unpaginated filtered list
//! - `GET /api/v1/leads/report/print` - Printable HTML report
//! - `GET /api/v1/leads/export` - CSV export
//!
//! ## Public
//! - `POST /api/v1/intake` - Admission form
//!
//! ## Dashboards
//! - `GET /api/v1/dashboard/admin`
//! - `GET /api/v1/dashboard/staff`
//! - `GET /api/v1/dashboard/student`
//!
//! ## Uploads
//! - `POST /api/v1/uploads/photo` - Proxy a photo to the image host
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use schoolhub::api::{serve, AppState};
//! use schoolhub::config::Config;
//! use schoolhub::storage::Database;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let db = Arc::new(Database::open(&config.database.path)?);
//!
//!     serve(AppState::new(db, config)).await?;
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Auth routes
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/admin-login", post(routes::auth::admin_login))
        .route("/auth/logout", post(routes::auth::logout))
        .route("/auth/me", get(routes::auth::me))
        // User directory
        .route("/users", get(routes::users::list_users))
        .route("/users/export", get(routes::users::export_users))
        .route(
            "/users/:id",
            get(routes::users::get_user)
                .put(routes::users::update_user)
                .delete(routes::users::delete_user),
        )
        .route("/users/:id/approve", post(routes::users::approve_user))
        // Marketing leads
        .route(
            "/leads",
            get(routes::leads::list_leads).post(routes::leads::create_lead),
        )
        .route("/leads/report", get(routes::leads::lead_report))
        .route("/leads/report/print", get(routes::leads::print_report))
        .route("/leads/export", get(routes::leads::export_leads))
        .route(
            "/leads/:id",
            get(routes::leads::get_lead)
                .put(routes::leads::update_lead)
                .delete(routes::leads::delete_lead),
        )
        // Public admission form
        .route("/intake", post(routes::intake::submit_intake))
        // Dashboards
        .route("/dashboard/admin", get(routes::dashboard::admin_overview))
        .route("/dashboard/staff", get(routes::dashboard::staff_dashboard))
        .route("/dashboard/student", get(routes::dashboard::student_dashboard))
        // Uploads
        .route("/uploads/photo", post(routes::uploads::upload_photo))
        .layer(DefaultBodyLimit::max(state.config.server.max_body_bytes));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    let cors = cors_layer(&state.config.server.cors_origins);
    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(shared_state)
}

/// CORS for the configured portal origins; `*` or an empty list allows any
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o.trim() == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
}

/// Start the API server
pub async fn serve(state: AppState) -> Result<(), ApiError> {
    let addr = state.config.socket_addr();
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("SchoolHub API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("SchoolHub API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::storage::{Database, Role, User};
    use crate::uploads::{ImageHost, UploadError, UploadedImage};
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    const UPLOAD_LIMIT: usize = 16;

    struct FakeHost;

    #[async_trait::async_trait]
    impl ImageHost for FakeHost {
        fn name(&self) -> &str {
            "fake"
        }

        async fn upload(&self, name: &str, _bytes: &[u8]) -> Result<UploadedImage, UploadError> {
            Ok(UploadedImage {
                url: format!("https://img.test/{}.png", name),
                display_url: format!("https://img.test/view/{}", name),
                delete_url: None,
            })
        }
    }

    fn test_state() -> AppState {
        let mut config = Config::default();
        config.uploads.max_bytes = UPLOAD_LIMIT;
        let db = Arc::new(Database::open_in_memory().unwrap());
        AppState::new(db, config)
    }

    fn create_test_app() -> (Router, AppState) {
        let state = test_state();
        (build_router(state.clone()), state)
    }

    fn admin_token(state: &AppState) -> (User, String) {
        state
            .auth
            .bootstrap_admin("head@school.test", "head-pass", "Head Teacher")
            .unwrap();
        let (user, session) = state.auth.login("head@school.test", "head-pass").unwrap();
        (user, session.token)
    }

    fn member_token(state: &AppState, email: &str, role: Role, verified: bool) -> (User, String) {
        let (mut user, session, _) = state
            .auth
            .register(crate::auth::Registration {
                email: email.to_string(),
                password: "secret-42".to_string(),
                confirm_password: "secret-42".to_string(),
                name: "Member".to_string(),
                role: role.as_str().to_string(),
                profile: None,
            })
            .unwrap();
        if verified {
            user.verified = true;
            state.db.update_user(&user).unwrap();
        }
        (user, session.token)
    }

    fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn send_raw(app: &Router, req: Request<Body>) -> (StatusCode, header::HeaderMap, String) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let (app, _state) = create_test_app();

        for uri in ["/health/live", "/health/ready"] {
            let (status, _) = send(&app, request("GET", uri, None, None)).await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, body) = send(&app, request("GET", "/health", None, None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["uploads"], "disabled");
    }

    #[tokio::test]
    async fn test_register_and_me() {
        let (app, _state) = create_test_app();

        let (status, body) = send(
            &app,
            request(
                "POST",
                "/api/v1/auth/register",
                None,
                Some(json!({
                    "email": "Nusrat@School.test",
                    "password": "Secret-42",
                    "confirm_password": "Secret-42",
                    "name": "Nusrat",
                    "role": "student",
                    "profile": {"role": "student", "class": "Six"}
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["user"]["email"], "nusrat@school.test");
        assert_eq!(body["user"]["verified"], false);
        assert_eq!(body["user"]["profile"]["class"], "Six");
        assert!(body["password_strength"].is_string());
        assert!(body["user"].get("password_hash").is_none());

        let token = body["token"].as_str().unwrap().to_string();
        let (status, me) = send(&app, request("GET", "/api/v1/auth/me", Some(&token), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["user"]["name"], "Nusrat");
    }

    #[tokio::test]
    async fn test_register_rejects_admin_and_duplicates() {
        let (app, state) = create_test_app();
        member_token(&state, "taken@school.test", Role::Staff, false);

        let form = |email: &str, role: &str| {
            json!({
                "email": email,
                "password": "secret-42",
                "confirm_password": "secret-42",
                "name": "X",
                "role": role
            })
        };

        let (status, body) = send(
            &app,
            request("POST", "/api/v1/auth/register", None, Some(form("x@school.test", "admin"))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, body) = send(
            &app,
            request("POST", "/api/v1/auth/register", None, Some(form("taken@school.test", "staff"))),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn test_login_failures() {
        let (app, state) = create_test_app();
        member_token(&state, "staff@school.test", Role::Staff, true);

        let (status, body) = send(
            &app,
            request(
                "POST",
                "/api/v1/auth/login",
                None,
                Some(json!({"email": "staff@school.test", "password": "wrong-pass"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["message"], "invalid credentials");
        assert_eq!(body["error"]["redirect"], "/login");
        assert!(body["request_id"].is_string());

        let (status, body) = send(
            &app,
            request(
                "POST",
                "/api/v1/auth/admin-login",
                None,
                Some(json!({"email": "staff@school.test", "password": "secret-42"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(
            body["error"]["message"],
            "Only administrators can access this area"
        );
    }

    #[tokio::test]
    async fn test_admin_login_and_logout() {
        let (app, state) = create_test_app();
        state
            .auth
            .bootstrap_admin("head@school.test", "head-pass", "Head")
            .unwrap();

        let (status, body) = send(
            &app,
            request(
                "POST",
                "/api/v1/auth/admin-login",
                None,
                Some(json!({"email": "head@school.test", "password": "head-pass"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["role"], "admin");
        let token = body["token"].as_str().unwrap().to_string();

        let (status, _) = send(&app, request("POST", "/api/v1/auth/logout", Some(&token), None)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, request("GET", "/api/v1/auth/me", Some(&token), None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_guard_responses() {
        let (app, state) = create_test_app();
        let (_, pending) = member_token(&state, "p@school.test", Role::Student, false);
        let (_, student) = member_token(&state, "s@school.test", Role::Student, true);

        let (status, body) = send(&app, request("GET", "/api/v1/users", None, None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["redirect"], "/login");

        let (status, body) = send(&app, request("GET", "/api/v1/users", Some(&student), None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "FORBIDDEN");
        assert_eq!(body["error"]["redirect"], "/unauthorized");

        let (status, body) =
            send(&app, request("GET", "/api/v1/dashboard/staff", Some(&student), None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["redirect"], "/");

        let (status, body) =
            send(&app, request("GET", "/api/v1/dashboard/student", Some(&pending), None)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "PENDING_APPROVAL");
        assert_eq!(body["error"]["redirect"], "/pending-approval");

        let (status, body) =
            send(&app, request("GET", "/api/v1/dashboard/student", Some(&student), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["details"][0]["value"], "Not set");
    }

    #[tokio::test]
    async fn test_user_directory() {
        let (app, state) = create_test_app();
        let (admin, token) = admin_token(&state);
        let (pending, _) = member_token(&state, "rahim@school.test", Role::Student, false);
        member_token(&state, "karim@school.test", Role::Staff, true);

        let (status, body) = send(
            &app,
            request("GET", "/api/v1/users?search=RAHIM&role=all", Some(&token), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);
        assert_eq!(body["items"][0]["email"], "rahim@school.test");

        let (_, body) = send(
            &app,
            request("GET", "/api/v1/users?verified=false", Some(&token), None),
        )
        .await;
        assert_eq!(body["total"], 1);

        let (status, _) = send(
            &app,
            request("GET", "/api/v1/users?role=teacher", Some(&token), None),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let uri = format!("/api/v1/users/{}/approve", pending.id);
        let (status, body) = send(&app, request("POST", &uri, Some(&token), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["verified"], true);

        let uri = format!("/api/v1/users/{}", pending.id);
        let (status, body) = send(
            &app,
            request(
                "PUT",
                &uri,
                Some(&token),
                Some(json!({"role": "staff", "profile": {"role": "staff", "designation": "Librarian"}})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], "staff");
        assert_eq!(body["profile"]["designation"], "Librarian");

        let (status, _) = send(
            &app,
            request(
                "PUT",
                &uri,
                Some(&token),
                Some(json!({"profile": {"role": "student"}})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let own = format!("/api/v1/users/{}", admin.id);
        let (status, _) = send(&app, request("DELETE", &own, Some(&token), None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, request("DELETE", &uri, Some(&token), None)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, request("GET", &uri, Some(&token), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_users_export() {
        let (app, state) = create_test_app();
        let (_, token) = admin_token(&state);

        let (status, headers, body) = send_raw(
            &app,
            request("GET", "/api/v1/users/export?role=admin", Some(&token), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(headers[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .contains("users_"));
        assert!(body.starts_with("Name,Email,Role,Verified"));
        assert!(body.contains("Head Teacher,head@school.test,admin,yes"));
    }

    #[tokio::test]
    async fn test_lead_lifecycle() {
        let (app, state) = create_test_app();
        let (_, token) = admin_token(&state);

        let (status, created) = send(
            &app,
            request(
                "POST",
                "/api/v1/leads",
                Some(&token),
                Some(json!({"name": "Rahim", "number": "01712345678", "class": "Play"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["status"], "Not Admitted");
        assert_eq!(created["source"], "manual");
        let id = created["id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            request(
                "POST",
                "/api/v1/leads",
                Some(&token),
                Some(json!({"name": "Other", "number": "01712345678"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["message"], "Phone number already exists");

        let (status, body) = send(
            &app,
            request(
                "POST",
                "/api/v1/leads",
                Some(&token),
                Some(json!({"name": "", "number": "01812345678"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Name is required");

        let uri = format!("/api/v1/leads/{}", id);
        let (status, updated) = send(
            &app,
            request(
                "PUT",
                &uri,
                Some(&token),
                Some(json!({"name": "Rahim", "number": "01712345678", "class": "Play", "status": "admitted"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["status"], "Admitted");

        let (status, list) = send(
            &app,
            request("GET", "/api/v1/leads?status=Admitted", Some(&token), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list["leads"]["total"], 1);
        assert_eq!(list["stats"]["total_leads"], 1);
        assert_eq!(list["stats"]["status_breakdown"]["admitted_percentage"], "100.00");
        assert_eq!(list["visible_pages"], json!([1]));

        let (status, _) = send(&app, request("DELETE", &uri, Some(&token), None)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, request("GET", &uri, Some(&token), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_stats_cover_whole_book() {
        let (app, state) = create_test_app();
        let (_, token) = admin_token(&state);

        for i in 0..12 {
            let (status, _) = send(
                &app,
                request(
                    "POST",
                    "/api/v1/leads",
                    Some(&token),
                    Some(json!({"name": format!("Lead {}", i), "number": format!("0171234{:04}", i)})),
                ),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (_, list) = send(
            &app,
            request("GET", "/api/v1/leads?page=9&search=lead%201", Some(&token), None),
        )
        .await;
        // "Lead 1", "Lead 10", "Lead 11" on one page; page 9 clamps to it
        assert_eq!(list["leads"]["total"], 3);
        assert_eq!(list["leads"]["page"], 1);
        assert_eq!(list["stats"]["total_leads"], 12);

        let (_, report) = send(&app, request("GET", "/api/v1/leads/report", Some(&token), None)).await;
        assert_eq!(report["total"], 12);
    }

    #[tokio::test]
    async fn test_intake_and_exports() {
        let (app, state) = create_test_app();
        let (_, token) = admin_token(&state);

        let (status, body) = send(
            &app,
            request(
                "POST",
                "/api/v1/intake",
                None,
                Some(json!({
                    "name": "Salma",
                    "english_name": "Salma",
                    "class": "One",
                    "phone_number": "01912345678",
                    "father_name": "<b>Karim</b>"
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["id"].as_str().unwrap().to_string();

        let (_, lead) = send(
            &app,
            request("GET", &format!("/api/v1/leads/{}", id), Some(&token), None),
        )
        .await;
        assert_eq!(lead["source"], "intake");
        assert_eq!(lead["status"], "Not Admitted");

        let (status, headers, csv) = send_raw(
            &app,
            request("GET", "/api/v1/leads/export", Some(&token), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(headers[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .contains("marketing_leads_"));
        assert!(csv.contains("Salma,01912345678,Not Admitted,One,Salma,-,<b>Karim</b>,-,-"));

        let (status, _, html) = send_raw(
            &app,
            request("GET", "/api/v1/leads/report/print", Some(&token), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("&lt;b&gt;Karim&lt;/b&gt;"));
    }

    #[tokio::test]
    async fn test_lead_student_link() {
        let (app, state) = create_test_app();
        let (_, token) = admin_token(&state);
        let (staff, _) = member_token(&state, "t@school.test", Role::Staff, true);
        let (moved, _) = member_token(&state, "moved@school.test", Role::Student, true);
        let (gone, _) = member_token(&state, "gone@school.test", Role::Student, true);

        let lead = |number: &str, student_id: &str| {
            json!({
                "name": "Karim",
                "number": number,
                "class": "One",
                "status": "Admitted",
                "student_id": student_id
            })
        };

        let (status, body) = send(
            &app,
            request("POST", "/api/v1/leads", Some(&token), Some(lead("01711111111", &staff.id))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], format!("User {} is not a student", staff.id));

        let (status, body) = send(
            &app,
            request("POST", "/api/v1/leads", Some(&token), Some(lead("01711111111", "nobody"))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Student nobody not found");

        let (status, first) = send(
            &app,
            request("POST", "/api/v1/leads", Some(&token), Some(lead("01711111111", &moved.id))),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let first_uri = format!("/api/v1/leads/{}", first["id"].as_str().unwrap());

        let (status, second) = send(
            &app,
            request("POST", "/api/v1/leads", Some(&token), Some(lead("01722222222", &gone.id))),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let second_uri = format!("/api/v1/leads/{}", second["id"].as_str().unwrap());

        // the export reads linked admitted leads from the student account
        let (_, _, csv) = send_raw(
            &app,
            request("GET", "/api/v1/leads/export", Some(&token), None),
        )
        .await;
        assert!(csv.contains("\nMember,01711111111,Admitted,One,"));
        assert!(!csv.contains("Karim"));

        // an edit that leaves out the link keeps it
        let (status, kept) = send(
            &app,
            request(
                "PUT",
                &first_uri,
                Some(&token),
                Some(json!({"name": "Karim", "number": "01711111111", "status": "Admitted"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(kept["student_id"], moved.id.as_str());

        let (status, _) = send(
            &app,
            request(
                "PUT",
                &format!("/api/v1/users/{}", moved.id),
                Some(&token),
                Some(json!({"role": "staff"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let (status, _) = send(
            &app,
            request("DELETE", &format!("/api/v1/users/{}", gone.id), Some(&token), None),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        for uri in [&first_uri, &second_uri] {
            let (_, fetched) = send(&app, request("GET", uri, Some(&token), None)).await;
            assert!(fetched.get("student_id").is_none());

            // saving the lead back as fetched still works
            let (status, saved) = send(&app, request("PUT", uri, Some(&token), Some(fetched))).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(saved["status"], "Admitted");
        }
    }

    #[tokio::test]
    async fn test_admin_cannot_demote_self() {
        let (app, state) = create_test_app();
        let (admin, token) = admin_token(&state);
        let own = format!("/api/v1/users/{}", admin.id);

        let (status, body) = send(
            &app,
            request("PUT", &own, Some(&token), Some(json!({"role": "student"}))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "You cannot change your own role");

        let (status, body) = send(
            &app,
            request("PUT", &own, Some(&token), Some(json!({"name": "Head Teacher"}))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["role"], "admin");

        let (status, _) = send(&app, request("GET", "/api/v1/users", Some(&token), None)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_intake_formula_exported_as_text() {
        let (app, state) = create_test_app();
        let (_, token) = admin_token(&state);

        let (status, _) = send(
            &app,
            request(
                "POST",
                "/api/v1/intake",
                None,
                Some(json!({
                    "name": "=HYPERLINK(\"http://evil.test\",\"x\")",
                    "class": "One",
                    "phone_number": "01912345678"
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, _, csv) = send_raw(
            &app,
            request("GET", "/api/v1/leads/export", Some(&token), None),
        )
        .await;
        assert!(csv.contains("\"'=HYPERLINK(\"\"http://evil.test\"\",\"\"x\"\")\",01912345678,"));
    }

    #[tokio::test]
    async fn test_admin_overview() {
        let (app, state) = create_test_app();
        let (_, token) = admin_token(&state);
        member_token(&state, "p@school.test", Role::Student, false);
        member_token(&state, "t@school.test", Role::Staff, true);

        let (status, body) = send(&app, request("GET", "/api/v1/dashboard/admin", Some(&token), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_students"], 1);
        assert_eq!(body["total_staff"], 1);
        assert_eq!(body["total_admins"], 1);
        assert_eq!(body["pending_approvals"], 1);
        assert_eq!(body["total_leads"], 0);
    }

    #[tokio::test]
    async fn test_uploads_disabled() {
        let (app, state) = create_test_app();
        let (_, token) = member_token(&state, "s@school.test", Role::Student, true);

        let mut req = request("POST", "/api/v1/uploads/photo", Some(&token), None);
        *req.body_mut() = Body::from(vec![1u8, 2, 3]);
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "SERVICE_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_uploads() {
        let state = test_state().with_image_host(Arc::new(FakeHost));
        let app = build_router(state.clone());
        let (_, token) = member_token(&state, "s@school.test", Role::Student, true);
        let (_, pending) = member_token(&state, "p@school.test", Role::Student, false);

        let upload = |token: &str, bytes: Vec<u8>| {
            let mut req = request("POST", "/api/v1/uploads/photo?name=rahim.png", Some(token), None);
            *req.body_mut() = Body::from(bytes);
            req
        };

        let (status, body) = send(&app, upload(&token, vec![7u8; 8])).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["url"], "https://img.test/rahim.png");

        let (status, _) = send(&app, upload(&token, Vec::new())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(&app, upload(&token, vec![0u8; UPLOAD_LIMIT + 1])).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(body["error"]["code"], "PAYLOAD_TOO_LARGE");

        let (status, _) = send(&app, upload(&pending, vec![7u8; 8])).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
