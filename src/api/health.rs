//! Health and service info endpoints

use axum::{Json, extract::OriginalUri};

use super::dto::{EndpointIndex, HealthResponse, ServiceInfoResponse};
use crate::error::AppError;

/// GET /api/health
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        message: "API is healthy".to_string(),
        timestamp: chrono::Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /
///
/// Lists the public endpoints.
pub async fn service_info() -> Json<ServiceInfoResponse> {
    Json(ServiceInfoResponse {
        message: "Authgate session authentication API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        endpoints: EndpointIndex {
            health: "GET /api/health".to_string(),
            register: "POST /api/register".to_string(),
            login: "POST /api/login".to_string(),
            logout: "POST /api/logout".to_string(),
            profile: "GET /api/profile".to_string(),
        },
    })
}

/// Fallback for unmatched routes
pub async fn not_found(OriginalUri(uri): OriginalUri) -> AppError {
    AppError::NotFound {
        path: uri.to_string(),
    }
}
