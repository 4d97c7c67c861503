//! Access token minting/verification (HMAC-SHA256 JWT) and refresh token
//! generation (32 random bytes, hex-encoded).
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: i64,
    exp: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("invalid token")]
    Invalid,
}

/// Mints and verifies access tokens with a single process-wide signing key.
#[derive(Clone)]
pub struct TokenManager {
    signing_key: Vec<u8>,
}

impl TokenManager {
    pub fn new(signing_key: impl Into<Vec<u8>>) -> Self {
        Self {
            signing_key: signing_key.into(),
        }
    }

    pub fn issue_access_token(&self, user_id: i64, ttl: Duration, now: DateTime<Utc>) -> String {
        let claims = Claims {
            sub: user_id,
            exp: (now + chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::zero()))
                .timestamp(),
        };
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.signing_key),
        )
        .expect("HS256 encoding with an in-memory key cannot fail")
    }

    /// Parses and validates signature and expiration, returning the `sub`
    /// claim (the user id) on success.
    pub fn verify_access_token(&self, token: &str) -> Result<i64, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        let data = jsonwebtoken::decode::<Claims>(
            token,
            &DecodingKey::from_secret(&self.signing_key),
            &validation,
        )
        .map_err(|err| match err.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid,
        })?;
        Ok(data.claims.sub)
    }
}

/// 32 cryptographically random bytes, hex-encoded.
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_before_expiry() {
        let manager = TokenManager::new(b"test-signing-key".to_vec());
        let now = Utc::now();
        let token = manager.issue_access_token(42, Duration::from_secs(3600), now);
        assert_eq!(manager.verify_access_token(&token), Ok(42));
    }

    #[test]
    fn rejects_expired_token() {
        let manager = TokenManager::new(b"test-signing-key".to_vec());
        let now = Utc::now() - chrono::Duration::hours(3);
        let token = manager.issue_access_token(42, Duration::from_secs(3600), now);
        assert_eq!(manager.verify_access_token(&token), Err(TokenError::Expired));
    }

    #[test]
    fn rejects_token_signed_with_a_different_key() {
        let minter = TokenManager::new(b"key-a".to_vec());
        let verifier = TokenManager::new(b"key-b".to_vec());
        let token = minter.issue_access_token(42, Duration::from_secs(3600), Utc::now());
        assert_eq!(verifier.verify_access_token(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn refresh_tokens_are_unique_and_hex() {
        let a = generate_refresh_token();
        let b = generate_refresh_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.bytes().all(|c| c.is_ascii_hexdigit()));
    }
}
