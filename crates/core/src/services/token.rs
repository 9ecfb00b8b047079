//! Access token service.

use agora_common::config::AuthConfig;
use agora_common::{AppError, AppResult};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user's email.
    pub sub: String,
    /// Expiry as a Unix timestamp.
    pub exp: i64,
}

/// Issues and verifies the signed, time-limited bearer tokens returned by
/// login. HS256 with a shared secret; no refresh tokens.
#[derive(Clone)]
pub struct TokenService {
    secret: String,
    expiry_minutes: i64,
}

impl TokenService {
    /// Create a new token service.
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            secret: config.secret.clone(),
            expiry_minutes: config.token_expiry_minutes,
        }
    }

    /// Issue a token with the given subject.
    pub fn issue(&self, email: &str) -> AppResult<String> {
        let claims = Claims {
            sub: email.to_string(),
            exp: (Utc::now() + Duration::minutes(self.expiry_minutes)).timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Failed to sign token: {e}")))
    }

    /// Verify a token's signature and expiry, returning its claims.
    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|_| AppError::Unauthorized)
    }
}
