//! SQLite message store implementation.
//!
//! Implements `MessageStore` from `recomendify-core` using sqlx with split
//! read/write pools. Every committed insert or read-flag update is published
//! on the store's `ChangeFeed`, which backs the live channels.

use chrono::{SubsecRound, Utc};
use recomendify_core::realtime::{ChangeFeed, LiveChannel};
use recomendify_core::repository::MessageStore;
use recomendify_types::change::RowChange;
use recomendify_types::error::StoreError;
use recomendify_types::message::{NewMessage, PrivateMessage};
use sqlx::Row;
use tracing::debug;
use uuid::Uuid;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_error};

const SELECT_COLUMNS: &str = "SELECT id, sender_id, receiver_id, content, created_at, read FROM private_messages";

/// SQLite-backed implementation of `MessageStore`.
pub struct SqliteMessageStore {
    pool: DatabasePool,
    feed: ChangeFeed,
}

impl SqliteMessageStore {
    pub fn new(pool: DatabasePool, feed: ChangeFeed) -> Self {
        Self { pool, feed }
    }

    /// The feed that receives this store's row changes.
    pub fn feed(&self) -> &ChangeFeed {
        &self.feed
    }

    pub async fn get_message(&self, id: &str) -> Result<Option<PrivateMessage>, StoreError> {
        let row = sqlx::query(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        match row {
            Some(r) => {
                let row = MessageRow::from_row(&r).map_err(query_error)?;
                Ok(Some(row.into_message()?))
            }
            None => Ok(None),
        }
    }

    /// Set the read flag of a message and publish the `Update`.
    pub async fn mark_read(&self, id: &str) -> Result<PrivateMessage, StoreError> {
        let old = self.get_message(id).await?.ok_or(StoreError::NotFound)?;
        if old.read {
            return Ok(old);
        }

        sqlx::query("UPDATE private_messages SET read = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool.writer)
            .await
            .map_err(query_error)?;

        let new = PrivateMessage {
            read: true,
            ..old.clone()
        };
        let receivers = self.feed.publish(RowChange::update(Some(old), new.clone()));
        debug!(message_id = %id, receivers, "message marked read");
        Ok(new)
    }
}

// ---------------------------------------------------------------------------
// Internal row types
// ---------------------------------------------------------------------------

struct MessageRow {
    id: String,
    sender_id: String,
    receiver_id: String,
    content: String,
    created_at: String,
    read: bool,
}

impl MessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            sender_id: row.try_get("sender_id")?,
            receiver_id: row.try_get("receiver_id")?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
            read: row.try_get("read")?,
        })
    }

    fn into_message(self) -> Result<PrivateMessage, StoreError> {
        Ok(PrivateMessage {
            id: self.id,
            sender_id: self.sender_id,
            receiver_id: self.receiver_id,
            content: self.content,
            created_at: parse_datetime(&self.created_at)?,
            read: self.read,
            is_bot: false,
        })
    }
}

// ---------------------------------------------------------------------------
// MessageStore implementation
// ---------------------------------------------------------------------------

impl MessageStore for SqliteMessageStore {
    async fn fetch_conversation(
        &self,
        user_id: &str,
        peer_id: &str,
    ) -> Result<Vec<PrivateMessage>, StoreError> {
        let rows = sqlx::query(&format!(
            "{SELECT_COLUMNS} \
             WHERE (sender_id = ? AND receiver_id = ?) OR (sender_id = ? AND receiver_id = ?) \
             ORDER BY created_at ASC, rowid ASC"
        ))
        .bind(user_id)
        .bind(peer_id)
        .bind(peer_id)
        .bind(user_id)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        rows.iter()
            .map(|r| {
                MessageRow::from_row(r)
                    .map_err(query_error)
                    .and_then(MessageRow::into_message)
            })
            .collect()
    }

    async fn insert_message(&self, message: &NewMessage) -> Result<PrivateMessage, StoreError> {
        let stored = PrivateMessage {
            id: Uuid::now_v7().to_string(),
            sender_id: message.sender_id.clone(),
            receiver_id: message.receiver_id.clone(),
            content: message.content.clone(),
            // Stored at microsecond precision; keep the published row identical.
            created_at: Utc::now().trunc_subsecs(6),
            read: false,
            is_bot: false,
        };

        sqlx::query(
            r#"INSERT INTO private_messages (id, sender_id, receiver_id, content, created_at, read)
               VALUES (?, ?, ?, ?, ?, 0)"#,
        )
        .bind(&stored.id)
        .bind(&stored.sender_id)
        .bind(&stored.receiver_id)
        .bind(&stored.content)
        .bind(format_datetime(&stored.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                StoreError::Conflict(format!("message '{}' already exists", stored.id))
            }
            other => query_error(other),
        })?;

        let receivers = self.feed.publish(RowChange::insert(stored.clone()));
        debug!(message_id = %stored.id, receivers, "message inserted");
        Ok(stored)
    }

    async fn subscribe(&self, channel: &str) -> Result<LiveChannel, StoreError> {
        Ok(self.feed.subscribe(channel))
    }
}
