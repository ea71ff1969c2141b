//! Account and session records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User ID wrapper (ULID format, 26 characters)
///
/// Example: "01ARZ3NDEKTSV4RRFFQ69G5FAV"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    /// Generate a new ULID
    pub fn new() -> Self {
        Self(ulid::Ulid::new().to_string())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A registered account
///
/// Never serialized: responses use [`PublicUser`].
#[derive(Clone)]
pub struct User {
    pub id: UserId,
    pub username: String,
    /// Stored exactly as submitted. Compared only through
    /// [`super::password::verify_password`].
    pub password: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The fields safe to hand back to clients
    pub fn public_view(&self) -> PublicUser {
        PublicUser {
            id: self.id.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .field("email", &self.email)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Public user view returned on login
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: UserId,
    pub username: String,
    pub email: String,
}

/// Server-side session record, keyed by its token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: UserId,
    pub username: String,
    pub login_time: DateTime<Utc>,
}

/// Result of a successful registration
#[derive(Debug, Clone)]
pub struct Registration {
    pub user_id: UserId,
}

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// Opaque bearer token for the new session
    pub token: String,
    pub user: PublicUser,
}
