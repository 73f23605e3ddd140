//! Realtime row change events for the `private_messages` table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::message::PrivateMessage;

/// Table name carried by message change events.
pub const PRIVATE_MESSAGES_TABLE: &str = "private_messages";

/// The kind of row-level change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// A row-level change pushed over a live channel.
///
/// Subscriptions receive every kind (`event: "*"`); filtering to the relevant
/// conversation happens on the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowChange {
    pub kind: ChangeKind,
    pub table: String,
    /// Row after the change. `None` for deletes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new: Option<PrivateMessage>,
    /// Row before the change, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old: Option<PrivateMessage>,
    pub commit_timestamp: DateTime<Utc>,
}

impl RowChange {
    pub fn insert(row: PrivateMessage) -> Self {
        Self {
            kind: ChangeKind::Insert,
            table: PRIVATE_MESSAGES_TABLE.to_string(),
            new: Some(row),
            old: None,
            commit_timestamp: Utc::now(),
        }
    }

    pub fn update(old: Option<PrivateMessage>, new: PrivateMessage) -> Self {
        Self {
            kind: ChangeKind::Update,
            table: PRIVATE_MESSAGES_TABLE.to_string(),
            new: Some(new),
            old,
            commit_timestamp: Utc::now(),
        }
    }

    pub fn delete(old: PrivateMessage) -> Self {
        Self {
            kind: ChangeKind::Delete,
            table: PRIVATE_MESSAGES_TABLE.to_string(),
            new: None,
            old: Some(old),
            commit_timestamp: Utc::now(),
        }
    }
}
