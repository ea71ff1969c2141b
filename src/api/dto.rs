//! Request and response bodies
//!
//! Every response carries `success` and `message`; field names follow the
//! camelCase JSON the clients expect.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::{PublicUser, Session, UserId};

/// POST /api/register body
///
/// Fields are optional so a missing field produces the same 400 as an
/// empty one instead of a deserialization error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// POST /api/login body
///
/// `username` may also hold the account's email address.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Plain `{success, message}` envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    pub user_id: UserId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub token: String,
    pub user: PublicUser,
}

/// GET /api/profile response; `user` is the stored session record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub message: String,
    pub user: Session,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub success: bool,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

/// GET / response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfoResponse {
    pub message: String,
    pub version: String,
    pub endpoints: EndpointIndex,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointIndex {
    pub health: String,
    pub register: String,
    pub login: String,
    pub logout: String,
    pub profile: String,
}
