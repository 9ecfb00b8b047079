//! Poll endpoints.

use agora_common::AppResult;
use agora_core::{CreatePollInput, PollResults, PollWithOptions};
use agora_db::entities::poll_option;
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    extractors::{AuthUser, Pagination},
    middleware::AppState,
};

/// Poll response with options in display order.
#[derive(Serialize)]
pub struct PollResponse {
    pub id: String,
    pub creator_id: String,
    pub title: String,
    pub description: String,
    pub is_multiple_choice: bool,
    pub is_closed: bool,
    pub closing_date: Option<String>,
    pub created_at: String,
    pub options: Vec<PollOptionResponse>,
}

/// Poll option response.
#[derive(Serialize)]
pub struct PollOptionResponse {
    pub id: String,
    pub text: String,
    pub display_order: i32,
}

impl From<poll_option::Model> for PollOptionResponse {
    fn from(option: poll_option::Model) -> Self {
        Self {
            id: option.id,
            text: option.text,
            display_order: option.display_order,
        }
    }
}

impl From<PollWithOptions> for PollResponse {
    fn from(p: PollWithOptions) -> Self {
        Self {
            id: p.poll.id,
            creator_id: p.poll.creator_id,
            title: p.poll.title,
            description: p.poll.description,
            is_multiple_choice: p.poll.is_multiple_choice,
            is_closed: p.poll.is_closed,
            closing_date: p.poll.closing_date.map(|d| d.to_rfc3339()),
            created_at: p.poll.created_at.to_rfc3339(),
            options: p.options.into_iter().map(Into::into).collect(),
        }
    }
}

/// Message response for vote and close.
#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Create a poll with its options.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreatePollInput>,
) -> AppResult<(StatusCode, Json<PollResponse>)> {
    info!(user_id = %user.id, title = %input.title, "Creating poll");

    let created = state.poll_service.create(&user.id, input).await?;

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// List open polls, newest first.
async fn list(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> AppResult<Json<Vec<PollResponse>>> {
    let polls = state.poll_service.list(page.limit, page.skip).await?;

    Ok(Json(polls.into_iter().map(Into::into).collect()))
}

/// Get a poll with its options.
async fn show(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<PollResponse>> {
    let poll = state.poll_service.get(&id).await?;

    Ok(Json(poll.into()))
}

/// Vote request.
///
/// `poll_id` is accepted for wire compatibility; the path id wins.
#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub option_ids: Vec<String>,
    #[serde(default)]
    pub poll_id: Option<String>,
}

/// Cast or replace the caller's vote on a poll.
async fn vote(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<VoteRequest>,
) -> AppResult<Json<MessageResponse>> {
    info!(user_id = %user.id, poll_id = %id, "Casting vote");

    state.vote_service.cast(&user.id, &id, req.option_ids).await?;

    Ok(Json(MessageResponse {
        message: "Vote recorded successfully".to_string(),
    }))
}

/// Close a poll (creator only).
async fn close(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    info!(user_id = %user.id, poll_id = %id, "Closing poll");

    state.poll_service.close(&id, &user.id).await?;

    Ok(Json(MessageResponse {
        message: "Poll closed successfully".to_string(),
    }))
}

/// Get a poll's aggregated results.
async fn results(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<PollResults>> {
    let results = state.vote_service.results(&id).await?;

    Ok(Json(results))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create).get(list))
        .route("/{id}", get(show))
        .route("/{id}/vote", post(vote))
        .route("/{id}/close", post(close))
        .route("/{id}/results", get(results))
}
