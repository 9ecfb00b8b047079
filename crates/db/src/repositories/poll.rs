//! Poll and poll vote repositories.

use std::sync::Arc;

use crate::entities::{Poll, PollOption, PollVote, poll, poll_option, poll_vote};
use agora_common::{AppError, AppResult};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, TransactionTrait,
};

/// Poll repository for database operations.
///
/// Owns queries for polls and their options; options are part of the poll
/// aggregate and never mutated on their own.
#[derive(Clone)]
pub struct PollRepository {
    db: Arc<DatabaseConnection>,
}

impl PollRepository {
    /// Create a new poll repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a poll by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<poll::Model>> {
        Poll::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a poll by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<poll::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::PollNotFound(id.to_string()))
    }

    /// Insert a poll together with its options in one transaction.
    pub async fn create_with_options(
        &self,
        poll: poll::ActiveModel,
        options: Vec<poll_option::ActiveModel>,
    ) -> AppResult<(poll::Model, Vec<poll_option::Model>)> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let poll = poll
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut created = Vec::with_capacity(options.len());
        for option in options {
            let option = option
                .insert(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            created.push(option);
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok((poll, created))
    }

    /// Update a poll.
    pub async fn update(&self, model: poll::ActiveModel) -> AppResult<poll::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// List open polls, newest first (paginated).
    pub async fn list_active(&self, limit: u64, offset: u64) -> AppResult<Vec<poll::Model>> {
        Poll::find()
            .filter(poll::Column::IsClosed.eq(false))
            .order_by_desc(poll::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Load a poll's options in display order.
    pub async fn find_options(&self, poll_id: &str) -> AppResult<Vec<poll_option::Model>> {
        PollOption::find()
            .filter(poll_option::Column::PollId.eq(poll_id))
            .order_by_asc(poll_option::Column::DisplayOrder)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Load the options of several polls in one query, in display order.
    pub async fn find_options_for_polls(
        &self,
        poll_ids: &[String],
    ) -> AppResult<Vec<poll_option::Model>> {
        if poll_ids.is_empty() {
            return Ok(vec![]);
        }

        PollOption::find()
            .filter(poll_option::Column::PollId.is_in(poll_ids.to_vec()))
            .order_by_asc(poll_option::Column::PollId)
            .order_by_asc(poll_option::Column::DisplayOrder)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Load the subset of the given option IDs that belong to the poll.
    pub async fn find_options_by_ids(
        &self,
        poll_id: &str,
        option_ids: &[String],
    ) -> AppResult<Vec<poll_option::Model>> {
        if option_ids.is_empty() {
            return Ok(vec![]);
        }

        PollOption::find()
            .filter(poll_option::Column::PollId.eq(poll_id))
            .filter(poll_option::Column::Id.is_in(option_ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Close every open poll whose closing date has passed.
    ///
    /// Returns the number of polls closed.
    pub async fn close_expired(
        &self,
        now: sea_orm::prelude::DateTimeWithTimeZone,
    ) -> AppResult<u64> {
        let result = Poll::update_many()
            .col_expr(poll::Column::IsClosed, Expr::value(true))
            .filter(poll::Column::IsClosed.eq(false))
            .filter(poll::Column::ClosingDate.is_not_null())
            .filter(poll::Column::ClosingDate.lte(now))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected)
    }
}

/// Poll vote repository for database operations.
#[derive(Clone)]
pub struct PollVoteRepository {
    db: Arc<DatabaseConnection>,
}

impl PollVoteRepository {
    /// Create a new poll vote repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user's votes on a poll.
    pub async fn find_by_user_and_poll(
        &self,
        user_id: &str,
        poll_id: &str,
    ) -> AppResult<Vec<poll_vote::Model>> {
        PollVote::find()
            .filter(poll_vote::Column::UserId.eq(user_id))
            .filter(poll_vote::Column::PollId.eq(poll_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a vote in place (single-choice re-vote).
    pub async fn update(&self, model: poll_vote::ActiveModel) -> AppResult<poll_vote::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Replace a user's selection on a poll in one transaction.
    ///
    /// Deletes every prior vote row for (user, poll), then inserts the new
    /// set. Full replace, not merge.
    pub async fn replace_for_user(
        &self,
        user_id: &str,
        poll_id: &str,
        votes: Vec<poll_vote::ActiveModel>,
    ) -> AppResult<Vec<poll_vote::Model>> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        PollVote::delete_many()
            .filter(poll_vote::Column::UserId.eq(user_id))
            .filter(poll_vote::Column::PollId.eq(poll_id))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut created = Vec::with_capacity(votes.len());
        for vote in votes {
            let vote = vote
                .insert(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            created.push(vote);
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(created)
    }

    /// Count all votes on a poll.
    pub async fn count_by_poll(&self, poll_id: &str) -> AppResult<u64> {
        PollVote::find()
            .filter(poll_vote::Column::PollId.eq(poll_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count votes per option for a poll.
    ///
    /// Options with no votes do not appear; the caller zero-fills.
    pub async fn count_by_option(&self, poll_id: &str) -> AppResult<Vec<(String, i64)>> {
        PollVote::find()
            .select_only()
            .column(poll_vote::Column::OptionId)
            .column_as(poll_vote::Column::Id.count(), "vote_count")
            .filter(poll_vote::Column::PollId.eq(poll_id))
            .group_by(poll_vote::Column::OptionId)
            .into_tuple::<(String, i64)>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
