//! HTTP request handlers.

pub mod bot;
pub mod messages;
pub mod profiles;
pub mod realtime;
