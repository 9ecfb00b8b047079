//! Test utilities for database operations.
//!
//! Provides a disposable in-memory database with the full schema applied.

use std::sync::Arc;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use tracing::info;

/// A test database backed by in-memory SQLite.
///
/// Every instance is a fresh, fully migrated store that disappears when the
/// connection is dropped, so tests need no external server and no cleanup.
pub struct TestDatabase {
    /// Shared connection handle.
    pub conn: Arc<DatabaseConnection>,
}

impl TestDatabase {
    /// Connect to a fresh in-memory database and run all migrations.
    ///
    /// The pool is capped at one connection: each connection to
    /// `sqlite::memory:` opens its own blank database, so a larger pool
    /// would scatter queries across unrelated stores.
    pub async fn new() -> Result<Self, DbErr> {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1).sqlx_logging(false);

        let conn = Database::connect(opt).await?;
        crate::migrations::Migrator::up(&conn, None).await?;

        info!("Created in-memory test database");

        Ok(Self {
            conn: Arc::new(conn),
        })
    }

    /// Get the shared database connection.
    #[must_use]
    pub fn connection(&self) -> Arc<DatabaseConnection> {
        self.conn.clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::user;
    use sea_orm::{ActiveModelTrait, EntityTrait, Set};

    #[tokio::test]
    async fn test_schema_is_usable() {
        let db = TestDatabase::new().await.unwrap();

        let active = user::ActiveModel {
            id: Set("01hq0000000000000000000000".to_string()),
            username: Set("alice".to_string()),
            email: Set("alice@example.com".to_string()),
            password_hash: Set("$argon2id$dummy".to_string()),
            is_active: Set(true),
            created_at: Set(chrono::Utc::now().into()),
        };
        active.insert(db.conn.as_ref()).await.unwrap();

        let found = crate::entities::User::find_by_id("01hq0000000000000000000000")
            .one(db.conn.as_ref())
            .await
            .unwrap();
        assert!(found.is_some());
        assert_eq!(found.unwrap().username, "alice");
    }

    #[tokio::test]
    async fn test_each_instance_is_isolated() {
        let first = TestDatabase::new().await.unwrap();
        let second = TestDatabase::new().await.unwrap();

        let active = user::ActiveModel {
            id: Set("01hq0000000000000000000001".to_string()),
            username: Set("bob".to_string()),
            email: Set("bob@example.com".to_string()),
            password_hash: Set("$argon2id$dummy".to_string()),
            is_active: Set(true),
            created_at: Set(chrono::Utc::now().into()),
        };
        active.insert(first.conn.as_ref()).await.unwrap();

        let count = crate::entities::User::find()
            .all(second.conn.as_ref())
            .await
            .unwrap()
            .len();
        assert_eq!(count, 0);
    }
}
