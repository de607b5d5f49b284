//! SQLx-based storage backend for `whatsapp-rust`.
//!
//! Implements the `Backend` traits (SignalStore + AppSyncStore + ProtocolStore
//! + DeviceStore) on top of a single bucketed key-value table. sqlx is used
//! instead of `whatsapp-rust-sqlite-storage` because the latter pulls in
//! diesel, whose `libsqlite3-sys` conflicts with sqlx's.

mod app_sync;
mod device;
mod protocol;
mod signal;


use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode};
use sqlx::{Pool, Sqlite, SqlitePool};
use std::str::FromStr;
use wacore::store::error::db_err;

type Result<T> = wacore::store::error::Result<T>;

/// Separator between the parts of a composite key.
const KEY_SEP: u8 = 0x1f;

/// Logical tables inside `wa_kv`.
mod bucket {
    pub const IDENTITY: &str = "identity";
    pub const SESSION: &str = "session";
    pub const PREKEY: &str = "prekey";
    pub const SIGNED_PREKEY: &str = "signed_prekey";
    pub const SENDER_KEY: &str = "sender_key";
    pub const SYNC_KEY: &str = "sync_key";
    pub const APP_VERSION: &str = "app_version";
    pub const MUTATION_MAC: &str = "mutation_mac";
    pub const SKDM: &str = "skdm";
    pub const LID: &str = "lid";
    pub const PN: &str = "pn";
    pub const BASE_KEY: &str = "base_key";
    pub const DEVICE_LIST: &str = "device_list";
    pub const FORGET_MARK: &str = "forget_mark";
    pub const DEVICE: &str = "device";
}

/// SQLx-backed WhatsApp session store.
pub struct SqlxWhatsAppStore {
    pool: Pool<Sqlite>,
}

impl SqlxWhatsAppStore {
    /// Open (or create) the session database and ensure the schema exists.
    pub async fn new(db_path: &str) -> std::result::Result<Self, sqlx::Error> {
        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);
        let pool = SqlitePool::connect_with(opts).await?;

        sqlx::raw_sql(
            "CREATE TABLE IF NOT EXISTS wa_kv (
                bucket TEXT NOT NULL,
                key BLOB NOT NULL,
                value BLOB NOT NULL,
                PRIMARY KEY (bucket, key)
            );",
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }

    async fn get(&self, bucket: &str, key: &[u8]) -> Result<Option<Vec<u8>>> {
        let row: Option<(Vec<u8>,)> =
            sqlx::query_as("SELECT value FROM wa_kv WHERE bucket = ? AND key = ?")
                .bind(bucket)
                .bind(key)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;
        Ok(row.map(|(v,)| v))
    }

    async fn put(&self, bucket: &str, key: &[u8], value: &[u8]) -> Result<()> {
        sqlx::query("INSERT OR REPLACE INTO wa_kv (bucket, key, value) VALUES (?, ?, ?)")
            .bind(bucket)
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    /// Insert an empty marker value unless the key already exists.
    async fn mark(&self, bucket: &str, key: &[u8]) -> Result<()> {
        sqlx::query("INSERT OR IGNORE INTO wa_kv (bucket, key, value) VALUES (?, ?, x'')")
            .bind(bucket)
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn delete(&self, bucket: &str, key: &[u8]) -> Result<()> {
        sqlx::query("DELETE FROM wa_kv WHERE bucket = ? AND key = ?")
            .bind(bucket)
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    /// All entries of a bucket.
    async fn scan(&self, bucket: &str) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        sqlx::query_as("SELECT key, value FROM wa_kv WHERE bucket = ?")
            .bind(bucket)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)
    }

    /// Entries whose key starts with `prefix`, returned with the prefix stripped.
    async fn scan_prefix(&self, bucket: &str, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>> {
        let rows: Vec<(Vec<u8>, Vec<u8>)> = sqlx::query_as(
            "SELECT key, value FROM wa_kv WHERE bucket = ? AND substr(key, 1, ?) = ?",
        )
        .bind(bucket)
        .bind(prefix.len() as i64)
        .bind(prefix)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(rows
            .into_iter()
            .map(|(k, v)| (k[prefix.len()..].to_vec(), v))
            .collect())
    }

    async fn delete_prefix(&self, bucket: &str, prefix: &[u8]) -> Result<()> {
        sqlx::query("DELETE FROM wa_kv WHERE bucket = ? AND substr(key, 1, ?) = ?")
            .bind(bucket)
            .bind(prefix.len() as i64)
            .bind(prefix)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }
}

/// Join key parts with [`KEY_SEP`].
fn composite(parts: &[&[u8]]) -> Vec<u8> {
    let mut key = Vec::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            key.push(KEY_SEP);
        }
        key.extend_from_slice(part);
    }
    key
}

/// Prefix matching every composite key whose first part is `head`.
fn prefix_of(head: &[u8]) -> Vec<u8> {
    let mut p = head.to_vec();
    p.push(KEY_SEP);
    p
}

fn id_key(id: u32) -> [u8; 4] {
    id.to_be_bytes()
}
