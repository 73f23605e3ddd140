//! Conversation sync: history + live merge for one two-party conversation.

pub mod channel;
pub mod directory;
pub mod guard;
pub mod state;
pub mod sync;
pub mod timeline;

pub use channel::channel_name;
pub use directory::{chat_peers, find_peer};
pub use state::{ConversationSnapshot, Phase, SendOutcome};
pub use sync::{ConversationSync, SyncOptions};
pub use timeline::Timeline;
