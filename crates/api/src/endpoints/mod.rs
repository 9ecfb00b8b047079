//! API endpoints.

mod auth;
mod polls;
mod users;

use axum::{Json, Router, routing::get};
use serde_json::{Value, json};

use crate::middleware::AppState;

/// Service banner.
async fn root() -> Json<Value> {
    Json(json!({
        "name": "agora",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/polls", polls::router())
}
