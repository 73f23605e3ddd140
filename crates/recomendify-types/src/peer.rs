//! Conversation peers and user profiles.

use serde::{Deserialize, Serialize};

/// Identifier of the shared bot assistant.
pub const BOT_PEER_ID: &str = "bot-assistente-001";

/// Display name of the shared bot assistant.
pub const BOT_DISPLAY_NAME: &str = "Recomendify Bot";

/// Avatar used for the bot assistant.
pub const BOT_AVATAR_URL: &str = "https://api.dicebear.com/7.x/bottts/svg?seed=Bot";

/// The counterpart of a two-party conversation.
///
/// `is_bot` selects the local history + bot responder path instead of the
/// remote message store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationPeer {
    pub id: String,
    pub display_name: Option<String>,
    #[serde(default)]
    pub is_bot: bool,
}

impl ConversationPeer {
    /// A human peer.
    pub fn human(id: impl Into<String>, display_name: Option<String>) -> Self {
        Self {
            id: id.into(),
            display_name,
            is_bot: false,
        }
    }

    /// The bot assistant sentinel. Its history is global, not per user pair.
    pub fn assistant() -> Self {
        Self {
            id: BOT_PEER_ID.to_string(),
            display_name: Some(BOT_DISPLAY_NAME.to_string()),
            is_bot: true,
        }
    }

    /// Name to show in the UI.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.id)
    }

    /// Whether switching from `self` to `other` requires re-initialization.
    pub fn same_conversation(&self, other: &ConversationPeer) -> bool {
        self.id == other.id && self.is_bot == other.is_bot
    }
}

/// A registered user as listed in the `profiles` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl Profile {
    /// Build a profile for a freshly registered user.
    ///
    /// The display name defaults to the local part of the email and the avatar
    /// to a generated one seeded by the user id.
    pub fn for_new_user(id: &str, email: &str) -> Self {
        let display_name = email
            .split('@')
            .next()
            .filter(|local| !local.is_empty())
            .unwrap_or("User");
        Self {
            id: id.to_string(),
            email: Some(email.to_string()),
            display_name: Some(display_name.to_string()),
            avatar_url: Some(default_avatar_url(id)),
        }
    }

    /// Display name, else email, else a generic label.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.email.as_deref())
            .unwrap_or("Usuário")
    }

    /// The peer used to open a conversation with this user.
    pub fn to_peer(&self) -> ConversationPeer {
        ConversationPeer::human(self.id.clone(), Some(self.label().to_string()))
    }
}

/// Generated avatar for a user id.
pub fn default_avatar_url(user_id: &str) -> String {
    format!("https://api.dicebear.com/7.x/adventurer/svg?seed={user_id}")
}
