//! Signed access tokens (HS256). Expiry is the only invalidation mechanism;
//! there is no refresh flow or revocation list.

use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{CareTrackError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: i32,
    /// Issued at (unix seconds)
    pub iat: u64,
    /// Expiration (unix seconds)
    pub exp: u64,
}

#[derive(Clone)]
pub struct TokenService {
    secret: String,
    expiry_seconds: u64,
}

impl TokenService {
    pub fn new(secret: impl Into<String>, expiry_seconds: u64) -> Self {
        Self {
            secret: secret.into(),
            expiry_seconds,
        }
    }

    pub fn issue(&self, user_id: i32) -> Result<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| CareTrackError::Auth(format!("system time error: {e}")))?
            .as_secs();
        let claims = Claims {
            sub: user_id,
            iat: now,
            exp: now + self.expiry_seconds,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| CareTrackError::Auth(format!("failed to sign token: {e}")))
    }

    /// Returns the user id the token was issued for. Fails on bad signature
    /// or expiry.
    pub fn verify(&self, token: &str) -> Result<i32> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| CareTrackError::Forbidden(format!("invalid or expired token: {e}")))?;
        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_and_verify() {
        let svc = TokenService::new("a-test-secret-that-is-long-enough!!", 3600);
        let token = svc.issue(42).unwrap();
        assert_eq!(svc.verify(&token).unwrap(), 42);
    }

    #[test]
    fn wrong_secret_rejected() {
        let svc = TokenService::new("a-test-secret-that-is-long-enough!!", 3600);
        let other = TokenService::new("another-secret-that-is-long-enough!", 3600);
        let token = svc.issue(7).unwrap();
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn expired_token_rejected() {
        let svc = TokenService::new("a-test-secret-that-is-long-enough!!", 0);
        let token = svc.issue(7).unwrap();
        // Validation applies default 60s leeway; build one with none.
        let mut validation = Validation::default();
        validation.leeway = 0;
        let result = decode::<Claims>(
            &token,
            &DecodingKey::from_secret("a-test-secret-that-is-long-enough!!".as_bytes()),
            &validation,
        );
        assert!(result.is_err());
    }
}
