//! Username/password authentication with server-side sessions
//!
//! Handles:
//! - Account registration
//! - Login and session token issuance
//! - Session lookup and logout
//! - Bearer token extraction

mod middleware;
pub mod models;
mod password;
mod store;
mod token;

pub use middleware::{
    BearerToken, CurrentSession, MISSING_TOKEN_MESSAGE, extract_token_from_headers, require_auth,
};
pub use models::{LoginOutcome, PublicUser, Registration, Session, User, UserId};
pub use password::verify_password;
pub use store::{AuthError, AuthStore};
pub use token::generate_session_token;
