//! Session token generation
//!
//! Tokens are opaque to clients: 32 bytes from the thread-local CSPRNG,
//! URL-safe base64 without padding.

use base64::{Engine as _, engine::general_purpose};
use rand::RngCore;

const TOKEN_BYTES: usize = 32;

/// Generate a fresh session token
pub fn generate_session_token() -> String {
    let mut bytes = [0_u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn token_is_url_safe_and_fixed_length() {
        let token = generate_session_token();

        assert_eq!(token.len(), 43);
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn tokens_do_not_repeat() {
        let tokens: HashSet<String> = (0..1000).map(|_| generate_session_token()).collect();
        assert_eq!(tokens.len(), 1000);
    }
}
