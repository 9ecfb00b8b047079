//! API middleware.

#![allow(missing_docs)]

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};

use agora_core::{PollService, TokenService, UserService, VoteService};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub token_service: TokenService,
    pub poll_service: PollService,
    pub vote_service: VoteService,
}

/// Authentication middleware.
///
/// Resolves `Authorization: Bearer <jwt>` to a user and stores the model in
/// request extensions. Any failure leaves the extensions untouched; the
/// `AuthUser` extractor turns that into a 401.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
        && let Ok(claims) = state.token_service.verify(token)
        && let Ok(user) = state.user_service.get_by_email(&claims.sub).await
    {
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}
