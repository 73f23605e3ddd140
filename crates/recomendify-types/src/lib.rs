//! Shared domain types for Recomendify private chat.
//!
//! This crate contains the types exchanged between the sync engine, the
//! storage adapters and the HTTP surface: private messages, conversation
//! peers, realtime row changes, sessions, configuration, and errors.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod bot;
pub mod change;
pub mod config;
pub mod error;
pub mod message;
pub mod peer;
pub mod routes;
pub mod session;
