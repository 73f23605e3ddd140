use std::time::Duration;

use thiserror::Error;

/// Errors from message store and profile directory operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store connection error: {0}")]
    Connection(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("subscription error: {0}")]
    Subscription(String),
}

/// Errors from the bot responder and the bot function backend.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("bot endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("bot request failed: {0}")]
    Transport(String),

    #[error("malformed bot response: {0}")]
    Malformed(String),

    #[error("bot did not answer within {0:?}")]
    Timeout(Duration),

    #[error("completion backend error: {0}")]
    Backend(String),
}

/// Errors from local persistent storage.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O error: {0}")]
    Io(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("storage query error: {0}")]
    Query(String),
}

/// Errors from session providers.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no active session")]
    NoSession,

    #[error("unknown user '{0}'")]
    UnknownUser(String),

    #[error("session provider error: {0}")]
    Provider(String),
}

/// Errors surfaced by the conversation sync engine.
///
/// All of them are recoverable: the engine stays usable and a later
/// `initialize` or `send` can succeed.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("no conversation peer selected")]
    NoPeer,

    #[error("a message is already being sent")]
    SendInFlight,

    #[error("failed to load messages: {0}")]
    Fetch(#[source] StoreError),

    #[error("failed to send message: {0}")]
    Send(#[source] StoreError),

    #[error("failed to get a bot reply: {0}")]
    Bot(#[source] BotError),

    #[error("failed to persist bot history: {0}")]
    History(#[source] StorageError),
}
