//! Password hashing and access tokens

use base64::Engine;
use base64::engine::general_purpose::STANDARD_NO_PAD;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use pbkdf2::pbkdf2_hmac;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::model::AuthConfig;

const HASH_SCHEME: &str = "pbkdf2-sha256";
const SALT_LENGTH: usize = 32;
const HASH_LENGTH: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Token encoding failed: {0}")]
    Encoding(String),

    #[error("Invalid or expired token: {0}")]
    InvalidToken(String),
}

/// Hash a password for storage as `pbkdf2-sha256$<iterations>$<salt>$<hash>`
pub fn hash_password(password: &str, iterations: u32) -> String {
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill_bytes(&mut salt);

    let mut hash = [0u8; HASH_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, iterations, &mut hash);

    format!(
        "{}${}${}${}",
        HASH_SCHEME,
        iterations,
        STANDARD_NO_PAD.encode(salt),
        STANDARD_NO_PAD.encode(hash)
    )
}

/// Verify a password against a stored hash. Malformed hashes never verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let mut parts = stored.split('$');
    let (Some(scheme), Some(iterations), Some(salt), Some(expected), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return false;
    };

    if scheme != HASH_SCHEME {
        return false;
    }

    let Ok(iterations) = iterations.parse::<u32>() else {
        return false;
    };
    let (Ok(salt), Ok(expected)) = (STANDARD_NO_PAD.decode(salt), STANDARD_NO_PAD.decode(expected))
    else {
        return false;
    };
    if iterations == 0 || expected.is_empty() {
        return false;
    }

    let mut actual = vec![0u8; expected.len()];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, iterations, &mut actual);

    actual.ct_eq(&expected).into()
}

/// JWT claims carried by access tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User email
    pub sub: String,
    /// User id
    pub uid: i64,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and validates HS256 access tokens
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expire_minutes: i64,
    password_iterations: u32,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret_key.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret_key.as_bytes()),
            expire_minutes: config.token_expire_minutes,
            password_iterations: config.password_iterations,
        }
    }

    pub fn password_iterations(&self) -> u32 {
        self.password_iterations
    }

    /// Issue a token for a user
    pub fn issue(&self, user_id: i64, email: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: email.to_string(),
            uid: user_id,
            iat: now.timestamp(),
            exp: (now + Duration::minutes(self.expire_minutes)).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Encoding(e.to_string()))
    }

    /// Validate a token and return its claims
    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_ITERATIONS: u32 = 1_000;

    fn config(secret: &str, expire_minutes: i64) -> AuthConfig {
        AuthConfig {
            secret_key: secret.to_string(),
            token_expire_minutes: expire_minutes,
            password_iterations: TEST_ITERATIONS,
        }
    }

    #[test]
    fn test_password_round_trip() {
        let stored = hash_password("correct horse", TEST_ITERATIONS);
        assert!(stored.starts_with("pbkdf2-sha256$1000$"));
        assert!(verify_password("correct horse", &stored));
        assert!(!verify_password("wrong horse", &stored));
    }

    #[test]
    fn test_same_password_different_salts() {
        let a = hash_password("secret", TEST_ITERATIONS);
        let b = hash_password("secret", TEST_ITERATIONS);
        assert_ne!(a, b);
        assert!(verify_password("secret", &a));
        assert!(verify_password("secret", &b));
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        for stored in [
            "",
            "plain-text",
            "bcrypt$1000$abc$def",
            "pbkdf2-sha256$notanumber$abc$def",
            "pbkdf2-sha256$0$abc$def",
            "pbkdf2-sha256$1000$!!!$def",
            "pbkdf2-sha256$1000$abc$def$extra",
        ] {
            assert!(!verify_password("secret", stored), "verified against {stored}");
        }
    }

    #[test]
    fn test_token_round_trip() {
        let tokens = TokenService::new(&config("test-secret", 60));
        let token = tokens.issue(42, "doc@example.com").unwrap();
        let claims = tokens.validate(&token).unwrap();
        assert_eq!(claims.uid, 42);
        assert_eq!(claims.sub, "doc@example.com");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_token_from_other_key_rejected() {
        let issuer = TokenService::new(&config("key-one", 60));
        let verifier = TokenService::new(&config("key-two", 60));
        let token = issuer.issue(1, "a@example.com").unwrap();
        assert!(matches!(
            verifier.validate(&token),
            Err(AuthError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        // Well past the default 60s validation leeway
        let tokens = TokenService::new(&config("test-secret", -10));
        let token = tokens.issue(1, "a@example.com").unwrap();
        assert!(tokens.validate(&token).is_err());
    }

    #[test]
    fn test_garbage_token_rejected() {
        let tokens = TokenService::new(&config("test-secret", 60));
        assert!(tokens.validate("not.a.jwt").is_err());
    }
}
