//! Error types for Authgate
//!
//! Handlers return `AppError`, which implements `IntoResponse` and renders
//! the `{"success": false, "message": ...}` envelope used by every endpoint.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::auth::AuthError;

/// Message returned for every 500 response
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Application-wide error type
///
/// Each variant maps to one HTTP status code. The message carried by a
/// variant is sent to the client verbatim, except for `Internal`, whose
/// detail is only exposed in the development environment.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or incomplete request (400)
    #[error("{0}")]
    Validation(String),

    /// Missing or rejected credentials (401)
    #[error("{0}")]
    Unauthorized(String),

    /// No route matched (404)
    #[error("Endpoint not found")]
    NotFound { path: String },

    /// Configuration error (500)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal server error (500)
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    fn error_type(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::NotFound { .. } => "not_found",
            AppError::Config(_) => "config",
            AppError::Internal(_) => "internal",
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<AuthError> for AppError {
    /// Default HTTP mapping for core failures
    ///
    /// Handlers that need a different status for a given failure (duplicate
    /// registration, unknown token on logout) match on `AuthError` first.
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation | AuthError::DuplicateUser => {
                AppError::Validation(err.to_string())
            }
            AuthError::InvalidCredentials | AuthError::InvalidSession => {
                AppError::Unauthorized(err.to_string())
            }
            AuthError::StoreUnavailable => AppError::Internal(anyhow::Error::new(err)),
        }
    }
}

/// Detail of an internal error, attached to the response as an extension
///
/// `expose_error_detail` copies it into the body when running in the
/// development environment; otherwise it never leaves the process.
#[derive(Debug, Clone)]
pub struct InternalErrorDetail(pub String);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        use axum::Json;

        use crate::metrics::ERRORS_TOTAL;
        ERRORS_TOTAL.with_label_values(&[self.error_type()]).inc();

        let (status, body) = match &self {
            AppError::Validation(message) => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "success": false, "message": message }),
            ),
            AppError::Unauthorized(message) => (
                StatusCode::UNAUTHORIZED,
                serde_json::json!({ "success": false, "message": message }),
            ),
            AppError::NotFound { path } => (
                StatusCode::NOT_FOUND,
                serde_json::json!({
                    "success": false,
                    "message": self.to_string(),
                    "path": path,
                }),
            ),
            AppError::Config(_) | AppError::Internal(_) => {
                tracing::error!(error = %self, "Request failed with internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    serde_json::json!({ "success": false, "message": INTERNAL_ERROR_MESSAGE }),
                )
            }
        };

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            response
                .extensions_mut()
                .insert(InternalErrorDetail(self.to_string()));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body is readable");
        serde_json::from_slice(&bytes).expect("body is json")
    }

    #[tokio::test]
    async fn validation_error_renders_envelope() {
        let response = AppError::Validation("All fields are required".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "All fields are required");
    }

    #[tokio::test]
    async fn not_found_includes_path() {
        let response = AppError::NotFound {
            path: "/nope".to_string(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Endpoint not found");
        assert_eq!(body["path"], "/nope");
    }

    #[tokio::test]
    async fn internal_error_hides_detail_but_attaches_extension() {
        let response = AppError::Internal(anyhow::anyhow!("lock poisoned")).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let detail = response
            .extensions()
            .get::<InternalErrorDetail>()
            .cloned()
            .expect("detail extension is attached");
        assert!(detail.0.contains("lock poisoned"));

        let body = body_json(response).await;
        assert_eq!(body["message"], INTERNAL_ERROR_MESSAGE);
        assert!(body.get("error").is_none());
    }

    #[test]
    fn auth_errors_map_to_default_statuses() {
        assert!(matches!(
            AppError::from(AuthError::DuplicateUser),
            AppError::Validation(message) if message == "User already exists"
        ));
        assert!(matches!(
            AppError::from(AuthError::InvalidSession),
            AppError::Unauthorized(message) if message == "Invalid session"
        ));
        assert!(matches!(
            AppError::from(AuthError::Validation),
            AppError::Validation(message) if message == "All fields are required"
        ));
        assert!(matches!(
            AppError::from(AuthError::InvalidCredentials),
            AppError::Unauthorized(message) if message == "Invalid credentials"
        ));
        assert!(matches!(
            AppError::from(AuthError::StoreUnavailable),
            AppError::Internal(_)
        ));
    }
}
