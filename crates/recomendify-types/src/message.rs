//! Private message domain types.
//!
//! A `PrivateMessage` is one row of the `private_messages` table, or one entry
//! of the locally persisted bot conversation. Field names stay snake_case on the
//! wire so the bot history blob and the store rows share one JSON layout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Prefix for identifiers generated locally for the user's own bot messages.
pub const LOCAL_ID_PREFIX: &str = "LOCAL_";

/// Prefix for identifiers generated locally for bot replies.
pub const BOT_ID_PREFIX: &str = "BOT_";

/// A single message between two participants.
///
/// Within a conversation the `id` is unique and the sequence is ordered by
/// `created_at` ascending. Only `read` may change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrivateMessage {
    pub id: String,
    pub sender_id: String,
    pub receiver_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub read: bool,
    #[serde(default)]
    pub is_bot: bool,
}

impl PrivateMessage {
    /// Build the user's own message in the bot conversation.
    ///
    /// The id is locally generated and marked with [`LOCAL_ID_PREFIX`].
    pub fn local(sender_id: &str, receiver_id: &str, content: &str) -> Self {
        Self {
            id: local_id(LOCAL_ID_PREFIX),
            sender_id: sender_id.to_string(),
            receiver_id: receiver_id.to_string(),
            content: content.to_string(),
            created_at: Utc::now(),
            read: true,
            is_bot: false,
        }
    }

    /// Build a bot reply addressed to `receiver_id`.
    pub fn bot_reply(bot_id: &str, receiver_id: &str, content: &str) -> Self {
        Self {
            id: local_id(BOT_ID_PREFIX),
            sender_id: bot_id.to_string(),
            receiver_id: receiver_id.to_string(),
            content: content.to_string(),
            created_at: Utc::now(),
            read: true,
            is_bot: true,
        }
    }

    /// Whether this message carries a locally generated identifier.
    pub fn is_local(&self) -> bool {
        self.id.starts_with(LOCAL_ID_PREFIX) || self.id.starts_with(BOT_ID_PREFIX)
    }

    /// Whether this message was exchanged between `a` and `b`, in either direction.
    pub fn is_between(&self, a: &str, b: &str) -> bool {
        (self.sender_id == a && self.receiver_id == b)
            || (self.sender_id == b && self.receiver_id == a)
    }
}

/// Time-ordered local identifier: prefix followed by a UUIDv7.
fn local_id(prefix: &str) -> String {
    format!("{prefix}{}", Uuid::now_v7())
}

/// Insert payload for the message store.
///
/// The store assigns `id`, `created_at`, and `read`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMessage {
    pub sender_id: String,
    pub receiver_id: String,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_message_is_marked_local_and_read() {
        let msg = PrivateMessage::local("alice", "bot-assistente-001", "Oi");
        assert!(msg.id.starts_with(LOCAL_ID_PREFIX));
        assert!(msg.is_local());
        assert!(msg.read);
        assert!(!msg.is_bot);
    }

    #[test]
    fn bot_reply_is_flagged() {
        let msg = PrivateMessage::bot_reply("bot-assistente-001", "alice", "Tente 1984.");
        assert!(msg.id.starts_with(BOT_ID_PREFIX));
        assert!(msg.is_bot);
        assert_eq!(msg.receiver_id, "alice");
    }

    #[test]
    fn local_ids_do_not_collide_within_a_millisecond() {
        let a = PrivateMessage::local("alice", "bot", "1");
        let b = PrivateMessage::local("alice", "bot", "2");
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn is_between_ignores_direction() {
        let msg = PrivateMessage::local("alice", "bob", "hi");
        assert!(msg.is_between("alice", "bob"));
        assert!(msg.is_between("bob", "alice"));
        assert!(!msg.is_between("alice", "carol"));
    }

    #[test]
    fn missing_flags_default_to_false() {
        let json = r#"{
            "id": "42",
            "sender_id": "alice",
            "receiver_id": "bob",
            "content": "hello",
            "created_at": "2025-04-14T12:00:00Z"
        }"#;
        let msg: PrivateMessage = serde_json::from_str(json).unwrap();
        assert!(!msg.read);
        assert!(!msg.is_bot);
        assert!(!msg.is_local());
    }
}
