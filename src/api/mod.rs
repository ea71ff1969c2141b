//! API layer
//!
//! HTTP handlers for:
//! - Account and session endpoints
//! - Health and service info
//! - Metrics (Prometheus)

mod auth;
mod dto;
mod extract;
mod health;
pub mod metrics;

pub use dto::*;

pub use auth::auth_router;
pub use extract::JsonOrForm;
pub use health::{health_check, not_found, service_info};
pub use metrics::metrics_router;

use axum::{Router, routing::get};

use crate::AppState;

/// Create the `/api` router
///
/// Routes:
/// - GET /health
/// - POST /register, POST /login, POST /logout, GET /profile
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check).fallback(not_found))
        .merge(auth_router())
}
