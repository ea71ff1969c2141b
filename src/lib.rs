//! Authgate - A minimal session-based authentication service
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      API Layer (Axum)                        │
//! │  - /api/register, /api/login, /api/logout, /api/profile     │
//! │  - /api/health, /, /metrics                                 │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Auth Store                              │
//! │  - Users (append-only, in memory)                           │
//! │  - Sessions (token -> session, in memory)                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `api`: HTTP handlers
//! - `auth`: Users, sessions, tokens and bearer extraction
//! - `config`: Configuration management
//! - `error`: Error types
//! - `metrics`: Prometheus instruments

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod metrics;

use std::any::Any;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};

/// Application state shared across all handlers
///
/// Cloned for each request; the store itself is shared.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::AppConfig>,

    /// Users and sessions
    pub auth: Arc<auth::AuthStore>,
}

impl AppState {
    /// Initialize application state with an empty store
    pub fn new(config: config::AppConfig) -> Self {
        tracing::info!(
            environment = ?config.server.environment,
            "Initializing application state..."
        );

        Self {
            config: Arc::new(config),
            auth: Arc::new(auth::AuthStore::new()),
        }
    }
}

/// Build the Axum router with all routes.
///
/// This is shared by the binary and integration tests to keep route
/// composition consistent across environments.
pub fn build_router(state: AppState) -> Router {
    use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

    let cors_layer = build_cors_layer(&state.config.server);
    let expose_details = state.config.server.environment.exposes_error_details();

    let metrics_routes = api::metrics_router().route_layer(middleware::from_fn_with_state(
        state.clone(),
        auth::require_auth,
    ));

    Router::new()
        .route("/", get(api::service_info).fallback(api::not_found))
        .nest("/api", api::api_router())
        .merge(metrics_routes)
        .fallback(api::not_found)
        .layer(middleware::from_fn(metrics::track_http_metrics))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            expose_error_detail,
        ))
        .layer(CatchPanicLayer::custom(
            move |panic: Box<dyn Any + Send + 'static>| panic_response(panic, expose_details),
        ))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

fn build_cors_layer(server: &config::ServerConfig) -> tower_http::cors::CorsLayer {
    use axum::http::HeaderValue;
    use tower_http::cors::{Any, CorsLayer};

    if server.cors_allowed_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = server
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::error!(%error, %origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Copy internal error detail into 500 bodies in development
async fn expose_error_detail(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;
    if !state.config.server.environment.exposes_error_details() {
        return response;
    }

    let detail = response
        .extensions()
        .get::<error::InternalErrorDetail>()
        .map(|detail| detail.0.clone());
    match detail {
        Some(detail) => internal_error_body(Some(&detail)),
        None => response,
    }
}

fn panic_response(panic: Box<dyn Any + Send + 'static>, expose_details: bool) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| panic.downcast_ref::<&str>().map(|s| s.to_string()))
        .unwrap_or_else(|| "unknown panic".to_string());

    tracing::error!(panic = %detail, "Handler panicked");
    metrics::ERRORS_TOTAL.with_label_values(&["panic"]).inc();

    internal_error_body(expose_details.then_some(detail.as_str()))
}

fn internal_error_body(detail: Option<&str>) -> Response {
    let mut body = serde_json::json!({
        "success": false,
        "message": error::INTERNAL_ERROR_MESSAGE,
    });
    if let Some(detail) = detail {
        body["error"] = serde_json::Value::from(detail);
    }
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use tower::ServiceExt;

    async fn send(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(
                axum::http::Request::builder()
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn explode() -> &'static str {
        panic!("handler exploded")
    }

    fn failing_router(environment: config::Environment) -> Router {
        let mut config = config::AppConfig::for_tests();
        config.server.environment = environment;
        let state = AppState::new(config);

        Router::new()
            .route(
                "/fail",
                get(|| async { error::AppError::Internal(anyhow::anyhow!("disk on fire")) }),
            )
            .route("/panic", get(explode))
            .layer(middleware::from_fn_with_state(
                state.clone(),
                expose_error_detail,
            ))
            .layer(tower_http::catch_panic::CatchPanicLayer::custom(
                move |panic: Box<dyn Any + Send + 'static>| {
                    panic_response(panic, environment.exposes_error_details())
                },
            ))
            .with_state(state)
    }

    #[tokio::test]
    async fn internal_error_detail_only_in_development() {
        let (status, body) = send(failing_router(config::Environment::Development), "/fail").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal server error");
        assert!(body["error"].as_str().unwrap().contains("disk on fire"));

        let (status, body) = send(failing_router(config::Environment::Production), "/fail").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn panics_become_internal_errors() {
        let (status, body) = send(failing_router(config::Environment::Production), "/panic").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert!(body.get("error").is_none());

        let (_, body) = send(failing_router(config::Environment::Development), "/panic").await;
        assert_eq!(body["error"], "handler exploded");
    }

    #[tokio::test]
    async fn unmatched_route_reports_path() {
        let router = build_router(AppState::new(config::AppConfig::for_tests()));

        let (status, body) = send(router, "/api/nope?x=1").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Endpoint not found");
        assert_eq!(body["path"], "/api/nope?x=1");
    }
}
