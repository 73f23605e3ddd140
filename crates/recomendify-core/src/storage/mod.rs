//! Persistent client-side key-value storage and the bot history kept in it.

pub mod bot_history;
pub mod local_storage;

pub use bot_history::{BOT_HISTORY_KEY, BotHistory};
pub use local_storage::LocalStorage;
