//! Request extractors.

use agora_common::AppError;
use agora_db::entities::user;
use axum::{extract::FromRequestParts, http::request::Parts};
use serde::Deserialize;

/// Authenticated user extractor.
///
/// The auth middleware stashes the resolved user in request extensions;
/// this surfaces it to handlers. Rejects with 401 when no user was
/// resolved and with 400 when the account is deactivated.
#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<user::Model>()
            .cloned()
            .ok_or(AppError::Unauthorized)?;

        if !user.is_active {
            return Err(AppError::BadRequest("Inactive user".to_string()));
        }

        Ok(Self(user))
    }
}

/// Offset/limit pagination query parameters.
#[derive(Debug, Deserialize)]
pub struct Pagination {
    /// Rows to skip from the start of the result set.
    #[serde(default)]
    pub skip: u64,
    /// Maximum rows to return.
    #[serde(default = "default_limit")]
    pub limit: u64,
}

const fn default_limit() -> u64 {
    10
}
