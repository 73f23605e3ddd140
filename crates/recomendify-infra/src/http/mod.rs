//! HTTP clients for a remote Recomendify server.
//!
//! - [`RemoteStore`]: REST message store + profile directory, with realtime
//!   over server-sent events.
//! - [`HttpBotResponder`]: the bot function endpoint.

pub mod bot;
pub mod realtime;
pub mod store;

pub use bot::HttpBotResponder;
pub use store::RemoteStore;

use std::time::Duration;

/// Shared HTTP client.
///
/// Only the connect phase is bounded: realtime streams stay open
/// indefinitely, and bot calls are bounded by the sync engine.
pub fn http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .build()
}
