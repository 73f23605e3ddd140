//! Bot conversation history persisted as one JSON array in local storage.
//!
//! The history is global: it is shared by every user of the same local
//! storage, and is not keyed by user id.

use recomendify_types::error::StorageError;
use recomendify_types::message::PrivateMessage;
use tracing::warn;

use super::LocalStorage;

/// Local storage key holding the bot conversation.
pub const BOT_HISTORY_KEY: &str = "chat_bot_history";

/// Reader/writer for the bot conversation history.
#[derive(Debug, Clone)]
pub struct BotHistory<L> {
    storage: L,
}

impl<L: LocalStorage> BotHistory<L> {
    pub fn new(storage: L) -> Self {
        Self { storage }
    }

    /// Load the stored history in stored order.
    ///
    /// A missing key yields an empty history. A blob that does not parse is
    /// treated as empty and logged; it is overwritten by the next save.
    pub async fn load(&self) -> Result<Vec<PrivateMessage>, StorageError> {
        let Some(raw) = self.storage.get_item(BOT_HISTORY_KEY).await? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(messages) => Ok(messages),
            Err(e) => {
                warn!(error = %e, "ignoring unreadable bot history");
                Ok(Vec::new())
            }
        }
    }

    /// Replace the stored history with `messages`.
    pub async fn save(&self, messages: &[PrivateMessage]) -> Result<(), StorageError> {
        let raw = serde_json::to_string(messages)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.storage.set_item(BOT_HISTORY_KEY, &raw).await
    }

    /// Append one message to the stored history.
    pub async fn append(&self, message: PrivateMessage) -> Result<(), StorageError> {
        let mut messages = self.load().await?;
        if messages.iter().any(|m| m.id == message.id) {
            return Ok(());
        }
        messages.push(message);
        self.save(&messages).await
    }

    pub async fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove_item(BOT_HISTORY_KEY).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStorage;

    #[tokio::test]
    async fn missing_history_is_empty() {
        let history = BotHistory::new(MemoryStorage::default());
        assert!(history.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_then_load_preserves_order() {
        let history = BotHistory::new(MemoryStorage::default());
        let q = PrivateMessage::local("u1", "bot", "Recomenda um livro?");
        let a = PrivateMessage::bot_reply("bot", "u1", "Dom Casmurro.");
        history.save(&[q.clone(), a.clone()]).await.unwrap();

        let loaded = history.load().await.unwrap();
        assert_eq!(loaded, vec![q, a]);
    }

    #[tokio::test]
    async fn corrupt_blob_loads_empty_and_is_overwritten() {
        let storage = MemoryStorage::default();
        storage.set_item(BOT_HISTORY_KEY, "{not json").await.unwrap();
        let history = BotHistory::new(storage.clone());

        assert!(history.load().await.unwrap().is_empty());

        history
            .append(PrivateMessage::local("u1", "bot", "oi"))
            .await
            .unwrap();
        assert_eq!(history.load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn append_skips_known_id() {
        let history = BotHistory::new(MemoryStorage::default());
        let reply = PrivateMessage::bot_reply("bot", "u1", "oi");
        history.append(reply.clone()).await.unwrap();
        history.append(reply).await.unwrap();
        assert_eq!(history.load().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn clear_removes_key() {
        let storage = MemoryStorage::default();
        let history = BotHistory::new(storage.clone());
        history
            .save(&[PrivateMessage::local("u1", "bot", "oi")])
            .await
            .unwrap();
        history.clear().await.unwrap();
        assert!(storage.keys().await.unwrap().is_empty());
    }
}
