//! SQLite local storage implementation.
//!
//! Implements `LocalStorage` from `recomendify-core` on the `local_storage`
//! table of the client database.

use chrono::Utc;
use recomendify_core::storage::LocalStorage;
use recomendify_types::error::StorageError;
use sqlx::Row;

use super::format_datetime;
use super::pool::DatabasePool;

/// SQLite-backed implementation of `LocalStorage`.
#[derive(Clone)]
pub struct SqliteLocalStorage {
    pool: DatabasePool,
}

impl SqliteLocalStorage {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn storage_error(e: sqlx::Error) -> StorageError {
    StorageError::Query(e.to_string())
}

impl LocalStorage for SqliteLocalStorage {
    async fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let row = sqlx::query("SELECT value FROM local_storage WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(storage_error)?;

        row.map(|r| r.try_get("value")).transpose().map_err(storage_error)
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        sqlx::query(
            r#"INSERT INTO local_storage (key, value, updated_at)
               VALUES (?, ?, ?)
               ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at"#,
        )
        .bind(key)
        .bind(value)
        .bind(format_datetime(&Utc::now()))
        .execute(&self.pool.writer)
        .await
        .map_err(storage_error)?;

        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        sqlx::query("DELETE FROM local_storage WHERE key = ?")
            .bind(key)
            .execute(&self.pool.writer)
            .await
            .map_err(storage_error)?;

        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, StorageError> {
        let rows = sqlx::query("SELECT key FROM local_storage ORDER BY key ASC")
            .fetch_all(&self.pool.reader)
            .await
            .map_err(storage_error)?;

        rows.iter()
            .map(|r| r.try_get("key"))
            .collect::<Result<Vec<String>, _>>()
            .map_err(storage_error)
    }
}
