//! Vote casting and results service.

use std::collections::BTreeMap;

use agora_common::{AppError, AppResult, IdGenerator};
use agora_db::{
    entities::{poll, poll_vote},
    repositories::{PollRepository, PollVoteRepository},
};
use chrono::{DateTime, FixedOffset, Utc};
use sea_orm::Set;
use serde::Serialize;

/// Vote service for business logic.
#[derive(Clone)]
pub struct VoteService {
    poll_repo: PollRepository,
    vote_repo: PollVoteRepository,
    id_gen: IdGenerator,
}

/// Aggregated results of a poll, zero-filled over every option.
#[derive(Debug, Serialize)]
pub struct PollResults {
    pub poll_id: String,
    pub is_closed: bool,
    pub total_votes: u64,
    pub results: BTreeMap<String, u64>,
}

impl VoteService {
    /// Create a new vote service.
    #[must_use]
    pub fn new(poll_repo: PollRepository, vote_repo: PollVoteRepository) -> Self {
        Self {
            poll_repo,
            vote_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Cast or replace a user's vote on a poll.
    ///
    /// Re-voting replaces the previous selection in full. A single-choice
    /// re-vote updates the existing row in place so `created_at` survives;
    /// every other case deletes the user's prior rows for the poll and
    /// inserts the new selection in one transaction. Duplicate ids within
    /// one request are deduplicated.
    pub async fn cast(
        &self,
        user_id: &str,
        poll_id: &str,
        option_ids: Vec<String>,
    ) -> AppResult<Vec<poll_vote::Model>> {
        let poll = self.poll_repo.get_by_id(poll_id).await?;

        if poll.is_closed {
            return Err(AppError::BadRequest("Poll is closed".to_string()));
        }
        if let Some(closing_date) = poll.closing_date
            && closing_date <= Utc::now()
        {
            // Persist the transition so later reads see the poll closed
            let mut model: poll::ActiveModel = poll.into();
            model.is_closed = Set(true);
            self.poll_repo.update(model).await?;
            return Err(AppError::BadRequest("Poll has expired".to_string()));
        }

        // Dedupe while keeping request order
        let mut selection: Vec<String> = Vec::with_capacity(option_ids.len());
        for id in option_ids {
            if !selection.contains(&id) {
                selection.push(id);
            }
        }

        if selection.is_empty() {
            return Err(AppError::Validation(
                "At least one option must be selected".to_string(),
            ));
        }

        let options = self
            .poll_repo
            .find_options_by_ids(poll_id, &selection)
            .await?;
        if options.len() != selection.len() {
            return Err(AppError::BadRequest("Invalid option IDs".to_string()));
        }

        if !poll.is_multiple_choice && selection.len() > 1 {
            return Err(AppError::BadRequest(
                "This poll only allows single choice".to_string(),
            ));
        }

        let existing = self
            .vote_repo
            .find_by_user_and_poll(user_id, poll_id)
            .await?;

        let now: DateTime<FixedOffset> = Utc::now().into();

        if !poll.is_multiple_choice
            && let [current] = existing.as_slice()
        {
            let mut model: poll_vote::ActiveModel = current.clone().into();
            model.option_id = Set(selection[0].clone());
            model.updated_at = Set(Some(now));
            let updated = self.vote_repo.update(model).await?;
            return Ok(vec![updated]);
        }

        let votes = selection
            .iter()
            .map(|option_id| poll_vote::ActiveModel {
                id: Set(self.id_gen.generate()),
                user_id: Set(user_id.to_string()),
                poll_id: Set(poll_id.to_string()),
                option_id: Set(option_id.clone()),
                created_at: Set(now),
                updated_at: Set(None),
            })
            .collect();

        self.vote_repo
            .replace_for_user(user_id, poll_id, votes)
            .await
    }

    /// Aggregate a poll's results.
    ///
    /// One grouped count over the vote rows, zero-filled so every option of
    /// the poll appears. Closed polls keep serving their final tallies.
    pub async fn results(&self, poll_id: &str) -> AppResult<PollResults> {
        let poll = self.poll_repo.get_by_id(poll_id).await?;
        let options = self.poll_repo.find_options(poll_id).await?;

        let mut results: BTreeMap<String, u64> =
            options.into_iter().map(|option| (option.id, 0)).collect();

        for (option_id, count) in self.vote_repo.count_by_option(poll_id).await? {
            results.insert(option_id, count as u64);
        }

        let total_votes: u64 = results.values().sum();

        Ok(PollResults {
            poll_id: poll.id,
            is_closed: poll.is_closed,
            total_votes,
            results,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::services::{CreatePollInput, CreatePollOption, PollService};
    use agora_db::entities::{poll_option, user};
    use agora_db::test_utils::TestDatabase;
    use chrono::Duration;
    use sea_orm::{ActiveModelTrait, DatabaseBackend, DatabaseConnection, MockDatabase};
    use std::sync::Arc;

    fn create_test_poll(id: &str, multiple: bool) -> poll::Model {
        poll::Model {
            id: id.to_string(),
            creator_id: "user1".to_string(),
            title: "Favorite language?".to_string(),
            description: "Pick the one you reach for first".to_string(),
            is_multiple_choice: multiple,
            is_closed: false,
            closing_date: None,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_option(id: &str, poll_id: &str, order: i32) -> poll_option::Model {
        poll_option::Model {
            id: id.to_string(),
            poll_id: poll_id.to_string(),
            text: format!("Option {order}"),
            display_order: order,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_service(db: Arc<DatabaseConnection>) -> VoteService {
        VoteService::new(PollRepository::new(db.clone()), PollVoteRepository::new(db))
    }

    #[tokio::test]
    async fn test_cast_rejects_absent_poll() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<poll::Model>::new()])
                .into_connection(),
        );
        let service = create_test_service(db);

        let result = service
            .cast("user1", "nonexistent", vec!["opt1".to_string()])
            .await;

        match result {
            Err(AppError::PollNotFound(id)) => assert_eq!(id, "nonexistent"),
            _ => panic!("Expected PollNotFound error"),
        }
    }

    #[tokio::test]
    async fn test_cast_rejects_closed_poll() {
        let mut poll = create_test_poll("poll1", false);
        poll.is_closed = true;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[poll]])
                .into_connection(),
        );
        let service = create_test_service(db);

        let result = service
            .cast("user1", "poll1", vec!["opt1".to_string()])
            .await;

        match result {
            Err(AppError::BadRequest(msg)) => assert_eq!(msg, "Poll is closed"),
            _ => panic!("Expected BadRequest error"),
        }
    }

    #[tokio::test]
    async fn test_cast_on_expired_poll_marks_it_closed() {
        let mut poll = create_test_poll("poll1", false);
        poll.closing_date = Some((Utc::now() - Duration::hours(1)).into());
        let mut closed = poll.clone();
        closed.is_closed = true;

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[poll]])
                .append_query_results([[closed]])
                .into_connection(),
        );
        let service = create_test_service(db);

        let result = service
            .cast("user1", "poll1", vec!["opt1".to_string()])
            .await;

        match result {
            Err(AppError::BadRequest(msg)) => assert_eq!(msg, "Poll has expired"),
            _ => panic!("Expected BadRequest error"),
        }
    }

    #[tokio::test]
    async fn test_cast_rejects_empty_selection() {
        let poll = create_test_poll("poll1", false);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[poll]])
                .into_connection(),
        );
        let service = create_test_service(db);

        let result = service.cast("user1", "poll1", vec![]).await;

        match result {
            Err(AppError::Validation(msg)) => {
                assert_eq!(msg, "At least one option must be selected");
            }
            _ => panic!("Expected Validation error"),
        }
    }

    #[tokio::test]
    async fn test_cast_rejects_foreign_option() {
        let poll = create_test_poll("poll1", false);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[poll]])
                .append_query_results([Vec::<poll_option::Model>::new()])
                .into_connection(),
        );
        let service = create_test_service(db);

        let result = service
            .cast("user1", "poll1", vec!["other_poll_opt".to_string()])
            .await;

        match result {
            Err(AppError::BadRequest(msg)) => assert_eq!(msg, "Invalid option IDs"),
            _ => panic!("Expected BadRequest error"),
        }
    }

    #[tokio::test]
    async fn test_cast_rejects_multiple_options_on_single_choice() {
        let poll = create_test_poll("poll1", false);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[poll]])
                .append_query_results([vec![
                    create_test_option("opt1", "poll1", 0),
                    create_test_option("opt2", "poll1", 1),
                ]])
                .into_connection(),
        );
        let service = create_test_service(db);

        let result = service
            .cast("user1", "poll1", vec!["opt1".to_string(), "opt2".to_string()])
            .await;

        match result {
            Err(AppError::BadRequest(msg)) => {
                assert_eq!(msg, "This poll only allows single choice");
            }
            _ => panic!("Expected BadRequest error"),
        }
    }

    #[tokio::test]
    async fn test_cast_single_choice_revote_updates_in_place() {
        let poll = create_test_poll("poll1", false);
        let existing = poll_vote::Model {
            id: "vote1".to_string(),
            user_id: "user1".to_string(),
            poll_id: "poll1".to_string(),
            option_id: "opt1".to_string(),
            created_at: Utc::now().into(),
            updated_at: None,
        };
        let mut updated = existing.clone();
        updated.option_id = "opt2".to_string();
        updated.updated_at = Some(Utc::now().into());

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[poll]])
                .append_query_results([[create_test_option("opt2", "poll1", 1)]])
                .append_query_results([[existing]])
                .append_query_results([[updated]])
                .into_connection(),
        );
        let service = create_test_service(db);

        let result = service
            .cast("user1", "poll1", vec!["opt2".to_string()])
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, "vote1");
        assert_eq!(result[0].option_id, "opt2");
        assert!(result[0].updated_at.is_some());
    }

    // The replace and aggregation paths run real SQL against in-memory
    // SQLite; transactions and GROUP BY are poor fits for a mock.

    async fn seed_user(conn: &DatabaseConnection, id: &str, username: &str) {
        user::ActiveModel {
            id: Set(id.to_string()),
            username: Set(username.to_string()),
            email: Set(format!("{username}@example.com")),
            password_hash: Set("$argon2id$dummy".to_string()),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
        }
        .insert(conn)
        .await
        .unwrap();
    }

    fn poll_input(multiple: bool, options: Vec<&str>) -> CreatePollInput {
        CreatePollInput {
            title: "Favorite language?".to_string(),
            description: "Pick the one you reach for first".to_string(),
            is_multiple_choice: multiple,
            closing_date: None,
            options: options
                .into_iter()
                .map(|text| CreatePollOption {
                    text: text.to_string(),
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_single_choice_revote_keeps_one_row() {
        let db = TestDatabase::new().await.unwrap();
        let conn = db.connection();
        seed_user(conn.as_ref(), "user1", "alice").await;

        let poll_service = PollService::new(PollRepository::new(conn.clone()));
        let service = create_test_service(conn.clone());

        let created = poll_service
            .create("user1", poll_input(false, vec!["Rust", "Go"]))
            .await
            .unwrap();
        let option_a = created.options[0].id.clone();
        let option_b = created.options[1].id.clone();

        service
            .cast("user1", &created.poll.id, vec![option_a.clone()])
            .await
            .unwrap();
        let results = service.results(&created.poll.id).await.unwrap();
        assert_eq!(results.results[&option_a], 1);
        assert_eq!(results.results[&option_b], 0);
        assert_eq!(results.total_votes, 1);

        service
            .cast("user1", &created.poll.id, vec![option_b.clone()])
            .await
            .unwrap();
        let results = service.results(&created.poll.id).await.unwrap();
        assert_eq!(results.results[&option_a], 0);
        assert_eq!(results.results[&option_b], 1);
        assert_eq!(results.total_votes, 1);

        let rows = PollVoteRepository::new(conn.clone())
            .find_by_user_and_poll("user1", &created.poll.id)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].option_id, option_b);
        assert!(rows[0].updated_at.is_some());
    }

    #[tokio::test]
    async fn test_multiple_choice_revote_replaces_selection() {
        let db = TestDatabase::new().await.unwrap();
        let conn = db.connection();
        seed_user(conn.as_ref(), "user1", "alice").await;

        let poll_service = PollService::new(PollRepository::new(conn.clone()));
        let service = create_test_service(conn.clone());

        let created = poll_service
            .create("user1", poll_input(true, vec!["Rust", "Go", "Zig"]))
            .await
            .unwrap();
        let ids: Vec<String> = created.options.iter().map(|o| o.id.clone()).collect();

        service
            .cast("user1", &created.poll.id, vec![ids[0].clone(), ids[1].clone()])
            .await
            .unwrap();
        let results = service.results(&created.poll.id).await.unwrap();
        assert_eq!(results.results[&ids[0]], 1);
        assert_eq!(results.results[&ids[1]], 1);
        assert_eq!(results.results[&ids[2]], 0);
        assert_eq!(results.total_votes, 2);

        // Full replace: the new selection drops both prior rows
        service
            .cast("user1", &created.poll.id, vec![ids[2].clone()])
            .await
            .unwrap();
        let results = service.results(&created.poll.id).await.unwrap();
        assert_eq!(results.results[&ids[0]], 0);
        assert_eq!(results.results[&ids[1]], 0);
        assert_eq!(results.results[&ids[2]], 1);
        assert_eq!(results.total_votes, 1);
    }

    #[tokio::test]
    async fn test_results_sum_matches_total_across_voters() {
        let db = TestDatabase::new().await.unwrap();
        let conn = db.connection();
        seed_user(conn.as_ref(), "user1", "alice").await;
        seed_user(conn.as_ref(), "user2", "bob").await;

        let poll_service = PollService::new(PollRepository::new(conn.clone()));
        let service = create_test_service(conn.clone());

        let created = poll_service
            .create("user1", poll_input(false, vec!["Rust", "Go"]))
            .await
            .unwrap();
        let option_a = created.options[0].id.clone();

        service
            .cast("user1", &created.poll.id, vec![option_a.clone()])
            .await
            .unwrap();
        service
            .cast("user2", &created.poll.id, vec![option_a.clone()])
            .await
            .unwrap();

        let results = service.results(&created.poll.id).await.unwrap();
        assert_eq!(results.results[&option_a], 2);
        assert_eq!(results.total_votes, 2);
        assert_eq!(
            results.total_votes,
            results.results.values().sum::<u64>()
        );
    }
}
