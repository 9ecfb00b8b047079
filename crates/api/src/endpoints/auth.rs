//! Authentication endpoints.

use agora_common::AppResult;
use agora_core::CreateUserInput;
use axum::{Form, Json, Router, extract::State, http::StatusCode, routing::post};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{endpoints::users::UserResponse, middleware::AppState};

/// Register a new user account.
async fn register(
    State(state): State<AppState>,
    Json(input): Json<CreateUserInput>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    info!(username = %input.username, "Registering user");

    let user = state.user_service.create(input).await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Login form.
///
/// OAuth2 password-form shape: the `username` field carries the email.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Bearer token response.
#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Exchange email and password for a bearer token.
async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> AppResult<Json<TokenResponse>> {
    let user = state
        .user_service
        .authenticate(&form.username, &form.password)
        .await?;

    let access_token = state.token_service.issue(&user.email)?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}
