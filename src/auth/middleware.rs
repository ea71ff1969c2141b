//! Bearer token extraction
//!
//! Protected routes take a [`CurrentSession`] argument; routes that need to
//! treat a missing token differently use [`BearerToken`] directly.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, State},
    http::{HeaderMap, Request, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};

use super::models::Session;
use crate::AppState;
use crate::error::AppError;

/// Message for requests without a usable Authorization header
pub const MISSING_TOKEN_MESSAGE: &str = "Authorization token is required";

/// Read the session token from the Authorization header
///
/// Accepts `Bearer <token>`; a header without the scheme is taken as the
/// token itself. An empty value counts as missing.
pub fn extract_token_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(|h| h.strip_prefix("Bearer ").unwrap_or(h))
        .filter(|token| !token.is_empty())
        .map(ToOwned::to_owned)
}

/// Raw bearer token, if the request carried one
#[derive(Debug, Clone)]
pub struct BearerToken(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(BearerToken(extract_token_from_headers(&parts.headers)))
    }
}

/// Extractor for the authenticated session
///
/// # Usage
/// ```ignore
/// async fn handler(current: CurrentSession) -> impl IntoResponse {
///     format!("Hello, {}", current.session.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentSession {
    pub token: String,
    pub session: Session,
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentSession
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(current) = parts.extensions.get::<CurrentSession>().cloned() {
            return Ok(current);
        }

        let state = AppState::from_ref(state);
        let token = extract_token_from_headers(&parts.headers)
            .ok_or_else(|| AppError::Unauthorized(MISSING_TOKEN_MESSAGE.to_string()))?;
        let session = state.auth.verify_session(&token)?;

        let current = CurrentSession { token, session };
        parts.extensions.insert(current.clone());
        Ok(current)
    }
}

/// Middleware to require a live session
///
/// # Usage
/// ```ignore
/// let protected_routes = Router::new()
///     .route("/metrics", ...)
///     .route_layer(middleware::from_fn_with_state(state, require_auth));
/// ```
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_token_from_headers(request.headers())
        .ok_or_else(|| AppError::Unauthorized(MISSING_TOKEN_MESSAGE.to_string()))?;
    let session = state.auth.verify_session(&token)?;

    request
        .extensions_mut()
        .insert(CurrentSession { token, session });

    Ok(next.run(request).await)
}
