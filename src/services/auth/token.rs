//! Token format: `<username>:<hex(HMAC-SHA512(key, "<username>:<password_hash>:<id>"))>`.
//!
//! The MAC key is 64 random bytes used once and dropped; nothing is kept that
//! could re-derive a token later.
use hmac::{Hmac, Mac};
use sha2::Sha512;
use tracing::error;

use crate::services::auth::error::AuthError;

pub const MAC_KEY_LEN: usize = 64;
pub const SEPARATOR: char = ':';

type HmacSha512 = Hmac<Sha512>;

pub fn generate_mac_key() -> Result<[u8; MAC_KEY_LEN], AuthError> {
    let mut key = [0u8; MAC_KEY_LEN];
    getrandom::fill(&mut key).map_err(|e| {
        error!(error = %e, "secure randomness unavailable");
        AuthError::TokenGenerationFailed
    })?;
    Ok(key)
}

pub fn derive_token(
    key: &[u8],
    username: &str,
    password_hash: &str,
    account_id: &str,
) -> Result<String, AuthError> {
    let mut mac = HmacSha512::new_from_slice(key).map_err(|e| {
        error!(error = %e, "failed to key HMAC");
        AuthError::TokenGenerationFailed
    })?;
    mac.update(format!("{username}{SEPARATOR}{password_hash}{SEPARATOR}{account_id}").as_bytes());
    let digest = mac.finalize().into_bytes();

    Ok(format!("{username}{SEPARATOR}{}", hex::encode(digest)))
}

/// Username embedded in a token (text before the first `:`).
///
/// `None` when there is no separator or the username part is empty.
pub fn username_of(token: &str) -> Option<&str> {
    match token.split_once(SEPARATOR) {
        Some((user, _)) if !user.is_empty() => Some(user),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_embeds_username_and_hex_mac() {
        let key = [7u8; MAC_KEY_LEN];
        let token = derive_token(&key, "alice", "hash", "1").unwrap();

        let (user, mac) = token.split_once(':').unwrap();
        assert_eq!(user, "alice");
        // SHA-512 output is 64 bytes
        assert_eq!(mac.len(), 128);
        assert!(mac.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn same_key_same_token_different_key_different_token() {
        let a = derive_token(&[1u8; MAC_KEY_LEN], "alice", "hash", "1").unwrap();
        let b = derive_token(&[1u8; MAC_KEY_LEN], "alice", "hash", "1").unwrap();
        let c = derive_token(&[2u8; MAC_KEY_LEN], "alice", "hash", "1").unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn fresh_keys_differ() {
        let k1 = generate_mac_key().unwrap();
        let k2 = generate_mac_key().unwrap();
        assert_ne!(k1, k2);
    }

    #[test]
    fn username_of_splits_on_first_separator() {
        assert_eq!(username_of("alice:abc:def"), Some("alice"));
        assert_eq!(username_of("alice:"), Some("alice"));
        assert_eq!(username_of("no-separator"), None);
        assert_eq!(username_of(":abc"), None);
        assert_eq!(username_of(""), None);
    }
}
