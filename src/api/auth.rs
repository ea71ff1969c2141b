//! Account and session endpoints
//!
//! Thin translation between JSON or form bodies / bearer headers and
//! `AuthStore`.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use super::dto::{
    LoginRequest, LoginResponse, MessageResponse, ProfileResponse, RegisterRequest,
    RegisterResponse,
};
use super::extract::JsonOrForm;
use super::health::not_found;
use crate::AppState;
use crate::auth::{AuthError, BearerToken, CurrentSession, MISSING_TOKEN_MESSAGE};
use crate::error::AppError;

const REGISTER_FIELDS_REQUIRED: &str = "Username, password, and email are required";
const LOGIN_FIELDS_REQUIRED: &str = "Username and password are required";

/// Create auth router
///
/// Routes:
/// - POST /register - Create an account
/// - POST /login - Open a session
/// - POST /logout - Close the session named by the bearer token
/// - GET /profile - Session record for the bearer token
pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register).fallback(not_found))
        .route("/login", post(login).fallback(not_found))
        .route("/logout", post(logout).fallback(not_found))
        .route("/profile", get(profile).fallback(not_found))
}

fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

// =============================================================================
// Register / Login
// =============================================================================

/// POST /api/register
async fn register(
    State(state): State<AppState>,
    JsonOrForm(req): JsonOrForm<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), AppError> {
    let (Some(username), Some(password), Some(email)) = (
        required(req.username),
        required(req.password),
        required(req.email),
    ) else {
        return Err(AppError::Validation(REGISTER_FIELDS_REQUIRED.to_string()));
    };

    let registration = state.auth.register(&username, &password, &email)?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            success: true,
            message: "User registered successfully".to_string(),
            user_id: registration.user_id,
        }),
    ))
}

/// POST /api/login
async fn login(
    State(state): State<AppState>,
    JsonOrForm(req): JsonOrForm<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let (Some(identifier), Some(password)) = (required(req.username), required(req.password))
    else {
        return Err(AppError::Validation(LOGIN_FIELDS_REQUIRED.to_string()));
    };

    let outcome = state.auth.login(&identifier, &password)?;

    Ok(Json(LoginResponse {
        success: true,
        message: "Login successful".to_string(),
        token: outcome.token,
        user: outcome.user,
    }))
}

// =============================================================================
// Session
// =============================================================================

/// POST /api/logout
///
/// An unknown token is not an HTTP error: it answers 200 with
/// `success: false`.
async fn logout(
    State(state): State<AppState>,
    BearerToken(token): BearerToken,
) -> Result<Json<MessageResponse>, AppError> {
    let token = token.ok_or_else(|| AppError::Validation(MISSING_TOKEN_MESSAGE.to_string()))?;

    match state.auth.logout(&token) {
        Ok(()) => Ok(Json(MessageResponse::ok("Logged out successfully"))),
        Err(err @ AuthError::InvalidSession) => Ok(Json(MessageResponse::failed(err.to_string()))),
        Err(err) => Err(err.into()),
    }
}

/// GET /api/profile
async fn profile(current: CurrentSession) -> Json<ProfileResponse> {
    Json(ProfileResponse {
        success: true,
        message: "Profile retrieved successfully".to_string(),
        user: current.session,
    })
}
