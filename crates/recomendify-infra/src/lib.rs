//! Infrastructure layer for Recomendify.
//!
//! Contains implementations of the port traits defined in `recomendify-core`:
//! SQLite storage for the server, HTTP clients for the remote store, realtime
//! stream and bot function, the OpenAI-backed completion backend, and the
//! TOML configuration loader.

pub mod auth;
pub mod config;
pub mod http;
pub mod llm;
pub mod sqlite;
