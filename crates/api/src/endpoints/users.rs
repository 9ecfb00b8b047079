//! User endpoints.

use agora_common::AppResult;
use agora_db::entities::user;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::Serialize;

use crate::{
    extractors::{AuthUser, Pagination},
    middleware::AppState,
};

/// User response, never carrying the password hash.
#[derive(Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    pub created_at: String,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            is_active: user.is_active,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Get the current user.
async fn me(AuthUser(user): AuthUser) -> Json<UserResponse> {
    Json(user.into())
}

/// List users in registration order.
async fn list(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> AppResult<Json<Vec<UserResponse>>> {
    let users = state.user_service.list(page.limit, page.skip).await?;

    Ok(Json(users.into_iter().map(Into::into).collect()))
}

/// Get a user by ID.
async fn show(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<UserResponse>> {
    let user = state.user_service.get(&id).await?;

    Ok(Json(user.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/me", get(me))
        .route("/{id}", get(show))
}
