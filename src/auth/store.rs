//! In-memory user and session store
//!
//! Volatile: everything is lost on restart. Users and sessions share one
//! lock so every check-then-write sequence is atomic.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use thiserror::Error;

use super::models::{LoginOutcome, Registration, Session, User, UserId};
use super::password::verify_password;
use super::token::generate_session_token;
use crate::metrics::{AUTH_EVENTS_TOTAL, SESSIONS_ACTIVE, USERS_TOTAL};

/// Expected failures of store operations
///
/// All of these except `StoreUnavailable` are ordinary outcomes that the
/// caller reports back to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    /// A required registration field was empty
    #[error("All fields are required")]
    Validation,

    /// Username or email already taken
    #[error("User already exists")]
    DuplicateUser,

    /// No user matches the identifier and password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Token does not name a live session
    #[error("Invalid session")]
    InvalidSession,

    /// The store lock was poisoned by a panicking writer
    #[error("Authentication store is unavailable")]
    StoreUnavailable,
}

impl AuthError {
    fn outcome_label(&self) -> &'static str {
        match self {
            AuthError::Validation => "validation",
            AuthError::DuplicateUser => "duplicate_user",
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::InvalidSession => "invalid_session",
            AuthError::StoreUnavailable => "store_unavailable",
        }
    }
}

#[derive(Default)]
struct StoreState {
    /// Append-only, in registration order
    users: Vec<User>,
    /// Token -> session
    sessions: HashMap<String, Session>,
}

/// Owner of all users and sessions
///
/// Shared across handlers behind an `Arc`. Methods never block on I/O and
/// never hold the lock across an await point.
#[derive(Default)]
pub struct AuthStore {
    state: RwLock<StoreState>,
}

impl AuthStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, StoreState>, AuthError> {
        self.state.read().map_err(|_| {
            tracing::error!("Authentication store lock is poisoned");
            AuthError::StoreUnavailable
        })
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, StoreState>, AuthError> {
        self.state.write().map_err(|_| {
            tracing::error!("Authentication store lock is poisoned");
            AuthError::StoreUnavailable
        })
    }

    /// Register a new user
    ///
    /// # Errors
    /// - `Validation` if any field is empty
    /// - `DuplicateUser` if the username or email is already registered
    pub fn register(
        &self,
        username: &str,
        password: &str,
        email: &str,
    ) -> Result<Registration, AuthError> {
        let result = self.register_inner(username, password, email);
        record_event("register", &result);
        result
    }

    fn register_inner(
        &self,
        username: &str,
        password: &str,
        email: &str,
    ) -> Result<Registration, AuthError> {
        if username.is_empty() || password.is_empty() || email.is_empty() {
            return Err(AuthError::Validation);
        }

        let mut state = self.write()?;

        if state
            .users
            .iter()
            .any(|user| user.username == username || user.email == email)
        {
            tracing::debug!(%username, "Registration rejected: user already exists");
            return Err(AuthError::DuplicateUser);
        }

        let user = User {
            id: UserId::new(),
            username: username.to_string(),
            password: password.to_string(),
            email: email.to_string(),
            created_at: Utc::now(),
        };
        let user_id = user.id.clone();
        state.users.push(user);
        USERS_TOTAL.set(state.users.len() as i64);

        tracing::info!(user_id = %user_id, %username, "User registered");

        Ok(Registration { user_id })
    }

    /// Authenticate by username or email and open a new session
    ///
    /// Earlier sessions of the same user stay valid.
    ///
    /// # Errors
    /// `InvalidCredentials` if no user matches both identifier and password
    pub fn login(&self, identifier: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let result = self.login_inner(identifier, password);
        record_event("login", &result);
        result
    }

    fn login_inner(&self, identifier: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let mut state = self.write()?;

        let user = state
            .users
            .iter()
            .find(|user| {
                (user.username == identifier || user.email == identifier)
                    && verify_password(&user.password, password)
            })
            .ok_or(AuthError::InvalidCredentials)?;

        let session = Session {
            user_id: user.id.clone(),
            username: user.username.clone(),
            login_time: Utc::now(),
        };
        let public_user = user.public_view();

        let token = loop {
            let candidate = generate_session_token();
            if !state.sessions.contains_key(&candidate) {
                break candidate;
            }
        };
        state.sessions.insert(token.clone(), session);
        SESSIONS_ACTIVE.set(state.sessions.len() as i64);

        tracing::info!(user_id = %public_user.id, username = %public_user.username, "User logged in");

        Ok(LoginOutcome {
            token,
            user: public_user,
        })
    }

    /// Look up the session for a token
    ///
    /// # Errors
    /// `InvalidSession` if the token is unknown
    pub fn verify_session(&self, token: &str) -> Result<Session, AuthError> {
        let state = self.read()?;
        state
            .sessions
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidSession)
    }

    /// End the session for a token
    ///
    /// # Errors
    /// `InvalidSession` if the token is unknown (including already logged out)
    pub fn logout(&self, token: &str) -> Result<(), AuthError> {
        let result = self.logout_inner(token);
        record_event("logout", &result);
        result
    }

    fn logout_inner(&self, token: &str) -> Result<(), AuthError> {
        let mut state = self.write()?;
        let session = state
            .sessions
            .remove(token)
            .ok_or(AuthError::InvalidSession)?;
        SESSIONS_ACTIVE.set(state.sessions.len() as i64);

        tracing::info!(user_id = %session.user_id, username = %session.username, "User logged out");
        Ok(())
    }

    /// Number of registered users
    pub fn user_count(&self) -> Result<usize, AuthError> {
        Ok(self.read()?.users.len())
    }

    /// Number of live sessions
    pub fn session_count(&self) -> Result<usize, AuthError> {
        Ok(self.read()?.sessions.len())
    }
}

fn record_event<T>(event: &str, result: &Result<T, AuthError>) {
    let outcome = match result {
        Ok(_) => "success",
        Err(err) => err.outcome_label(),
    };
    AUTH_EVENTS_TOTAL.with_label_values(&[event, outcome]).inc();
}
