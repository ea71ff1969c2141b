//! Password comparison
//!
//! Passwords are stored as submitted. Every check goes through
//! [`verify_password`] so a hashed representation only has to change here
//! and at registration.

/// Check a login attempt against the stored password
///
/// Runs in time independent of where the inputs first differ.
pub fn verify_password(stored: &str, candidate: &str) -> bool {
    let stored = stored.as_bytes();
    let candidate = candidate.as_bytes();
    if stored.len() != candidate.len() {
        return false;
    }

    stored
        .iter()
        .zip(candidate)
        .fold(0_u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}
