//! HTTP server for Recomendify.
//!
//! Axum router hosting the message store REST API, the realtime SSE channel,
//! and the bot function endpoint, with CORS and request tracing.

pub mod error;
pub mod handlers;
pub mod router;
