//! Port traits for the remote data the chat depends on.
//!
//! Implementations live in recomendify-infra: SQLite-backed on the server,
//! HTTP-backed on the client.

pub mod message;
pub mod profile;

pub use message::MessageStore;
pub use profile::ProfileDirectory;
