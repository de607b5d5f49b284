//! SQLite-backed credential store for running without Firestore.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::info;
use wadash_core::{
    error::WadashError, record::CredentialRecord, shellexpand, traits::CredentialStore,
};

/// Local credential table. Unlike the remote store, usernames are unique.
#[derive(Clone)]
pub struct SqliteCredentialStore {
    pool: SqlitePool,
}

impl SqliteCredentialStore {
    /// Open (or create) the database and ensure the schema exists.
    pub async fn new(db_path: &str) -> Result<Self, WadashError> {
        let db_path = shellexpand(db_path);

        if let Some(parent) = std::path::Path::new(&db_path).parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| WadashError::Store(format!("failed to create data dir: {e}")))?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))
            .map_err(|e| WadashError::Store(format!("invalid db path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(opts)
            .await
            .map_err(|e| WadashError::Store(format!("failed to connect to sqlite: {e}")))?;

        sqlx::raw_sql(
            "CREATE TABLE IF NOT EXISTS credentials (
                username TEXT PRIMARY KEY,
                password TEXT,
                created_at TEXT NOT NULL DEFAULT (datetime('now')),
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );",
        )
        .execute(&pool)
        .await
        .map_err(|e| WadashError::Store(format!("failed to create credentials table: {e}")))?;

        info!("credential store initialized at {db_path}");
        Ok(Self { pool })
    }

    /// Insert a user or replace their password hash.
    pub async fn upsert(&self, username: &str, password_hash: &str) -> Result<(), WadashError> {
        sqlx::query(
            "INSERT INTO credentials (username, password) VALUES (?, ?)
             ON CONFLICT(username) DO UPDATE SET
                password = excluded.password,
                updated_at = datetime('now')",
        )
        .bind(username)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| WadashError::Store(format!("failed to save user '{username}': {e}")))?;
        Ok(())
    }

    /// Number of stored users.
    pub async fn count(&self) -> Result<i64, WadashError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM credentials")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| WadashError::Store(format!("failed to count users: {e}")))?;
        Ok(count)
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<CredentialRecord>, WadashError> {
        let row: Option<(String, Option<String>)> =
            sqlx::query_as("SELECT username, password FROM credentials WHERE username = ? LIMIT 1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| WadashError::Store(format!("credential lookup failed: {e}")))?;

        Ok(row.map(|(username, password)| CredentialRecord { username, password }))
    }
}
