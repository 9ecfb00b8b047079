//! Poll lifecycle service.

use std::collections::HashMap;

use agora_common::{AppError, AppResult, IdGenerator};
use agora_db::{
    entities::{poll, poll_option},
    repositories::PollRepository,
};
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::Set;
use serde::Deserialize;
use tracing::debug;
use validator::Validate;

/// Poll service for business logic.
#[derive(Clone)]
pub struct PollService {
    poll_repo: PollRepository,
    id_gen: IdGenerator,
}

/// One option of a new poll.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePollOption {
    #[validate(length(min = 1, max = 255))]
    pub text: String,
}

/// Input for creating a poll.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePollInput {
    #[validate(length(min = 3, max = 255))]
    pub title: String,

    #[validate(length(min = 10, max = 1000))]
    pub description: String,

    #[serde(default)]
    pub is_multiple_choice: bool,

    #[serde(default)]
    pub closing_date: Option<DateTime<FixedOffset>>,

    #[validate(nested)]
    pub options: Vec<CreatePollOption>,
}

/// A poll together with its options in display order.
#[derive(Debug, Clone)]
pub struct PollWithOptions {
    pub poll: poll::Model,
    pub options: Vec<poll_option::Model>,
}

impl PollService {
    /// Create a new poll service.
    #[must_use]
    pub fn new(poll_repo: PollRepository) -> Self {
        Self {
            poll_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a poll with its options.
    ///
    /// The poll and all of its options are inserted in one transaction;
    /// a poll is never visible without its options.
    pub async fn create(
        &self,
        creator_id: &str,
        input: CreatePollInput,
    ) -> AppResult<PollWithOptions> {
        input.validate()?;

        if input.options.len() < 2 {
            return Err(AppError::Validation(
                "Poll must have at least 2 options".to_string(),
            ));
        }
        if input.options.iter().any(|o| o.text.trim().is_empty()) {
            return Err(AppError::Validation(
                "Poll option text cannot be empty".to_string(),
            ));
        }

        let now: DateTime<FixedOffset> = Utc::now().into();
        let poll_id = self.id_gen.generate();

        let poll = poll::ActiveModel {
            id: Set(poll_id.clone()),
            creator_id: Set(creator_id.to_string()),
            title: Set(input.title),
            description: Set(input.description),
            is_multiple_choice: Set(input.is_multiple_choice),
            is_closed: Set(false),
            closing_date: Set(input.closing_date),
            created_at: Set(now),
        };

        let options = input
            .options
            .into_iter()
            .enumerate()
            .map(|(i, option)| poll_option::ActiveModel {
                id: Set(self.id_gen.generate()),
                poll_id: Set(poll_id.clone()),
                text: Set(option.text),
                display_order: Set(i as i32),
                created_at: Set(now),
            })
            .collect();

        let (poll, options) = self.poll_repo.create_with_options(poll, options).await?;
        Ok(PollWithOptions { poll, options })
    }

    /// Get a poll with its options.
    ///
    /// A poll whose closing date has passed is closed here on read, so a
    /// caller never sees an expired poll still marked open.
    pub async fn get(&self, poll_id: &str) -> AppResult<PollWithOptions> {
        let poll = self.poll_repo.get_by_id(poll_id).await?;
        let poll = self.close_if_expired(poll).await?;
        let options = self.poll_repo.find_options(poll_id).await?;
        Ok(PollWithOptions { poll, options })
    }

    /// List open polls with their options, newest first (paginated).
    ///
    /// Page size is capped at 100.
    pub async fn list(&self, limit: u64, offset: u64) -> AppResult<Vec<PollWithOptions>> {
        let polls = self.poll_repo.list_active(limit.min(100), offset).await?;

        let poll_ids: Vec<String> = polls.iter().map(|p| p.id.clone()).collect();
        let mut options_by_poll: HashMap<String, Vec<poll_option::Model>> = HashMap::new();
        for option in self.poll_repo.find_options_for_polls(&poll_ids).await? {
            options_by_poll
                .entry(option.poll_id.clone())
                .or_default()
                .push(option);
        }

        Ok(polls
            .into_iter()
            .map(|poll| {
                let options = options_by_poll.remove(&poll.id).unwrap_or_default();
                PollWithOptions { poll, options }
            })
            .collect())
    }

    /// Close a poll.
    ///
    /// Only the creator may close it; closing an already closed poll is a
    /// no-op and succeeds.
    pub async fn close(&self, poll_id: &str, acting_user_id: &str) -> AppResult<poll::Model> {
        let poll = self.poll_repo.get_by_id(poll_id).await?;

        if poll.creator_id != acting_user_id {
            return Err(AppError::Forbidden(
                "Only the poll creator can close the poll".to_string(),
            ));
        }

        if poll.is_closed {
            return Ok(poll);
        }

        let mut model: poll::ActiveModel = poll.into();
        model.is_closed = Set(true);
        self.poll_repo.update(model).await
    }

    /// Close every open poll whose closing date has passed.
    ///
    /// Returns the number of polls closed. The server runs this on a timer;
    /// [`Self::get`] also applies it per poll on the read path.
    pub async fn close_expired(&self) -> AppResult<u64> {
        self.poll_repo.close_expired(Utc::now().into()).await
    }

    async fn close_if_expired(&self, poll: poll::Model) -> AppResult<poll::Model> {
        if poll.is_closed {
            return Ok(poll);
        }
        let Some(closing_date) = poll.closing_date else {
            return Ok(poll);
        };
        if closing_date > Utc::now() {
            return Ok(poll);
        }

        debug!(poll_id = %poll.id, "Closing expired poll on read");

        let mut model: poll::ActiveModel = poll.into();
        model.is_closed = Set(true);
        self.poll_repo.update(model).await
    }
}
