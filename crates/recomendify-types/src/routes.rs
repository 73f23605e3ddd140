//! HTTP paths shared by the server and its clients.

/// REST resource of private messages.
pub const MESSAGES_PATH: &str = "/rest/v1/private_messages";

/// REST resource of user profiles.
pub const PROFILES_PATH: &str = "/rest/v1/profiles";

/// Server-sent events stream of `private_messages` row changes.
pub const REALTIME_MESSAGES_PATH: &str = "/realtime/v1/private_messages";

/// Bot function endpoint.
pub const BOT_FUNCTION_PATH: &str = "/functions/v1/openai-bot";

/// SSE event name carrying a `RowChange`.
pub const REALTIME_EVENT: &str = "postgres_changes";

/// Join a base URL and a path without doubling the slash.
pub fn join_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}
