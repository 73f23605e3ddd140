//! Configuration types for the chat client and server.
//!
//! `ClientConfig` is loaded from `client.toml` and `ServerConfig` from
//! `server.toml` in the data directory. All fields have defaults so an empty
//! or missing file is valid.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Which session provider the client uses.
///
/// The development provider is only ever selected explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// Sessions resolved against the server's profile directory.
    Remote,
    /// Fixed local identity for development and tests.
    Development,
}

impl Default for AuthMode {
    fn default() -> Self {
        AuthMode::Remote
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthMode::Remote => write!(f, "remote"),
            AuthMode::Development => write!(f, "development"),
        }
    }
}

impl FromStr for AuthMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "remote" => Ok(AuthMode::Remote),
            "development" | "dev" => Ok(AuthMode::Development),
            other => Err(format!("invalid auth mode: '{other}'")),
        }
    }
}

/// Authentication settings for the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub mode: AuthMode,

    /// Email of the user to sign in as (remote mode), remembered by `rcmd login`.
    #[serde(default)]
    pub email: Option<String>,

    /// User id of the development identity.
    #[serde(default = "default_dev_user_id")]
    pub dev_user_id: String,

    /// Display name of the development identity.
    #[serde(default = "default_dev_display_name")]
    pub dev_display_name: String,
}

fn default_dev_user_id() -> String {
    "dev-user".to_string()
}

fn default_dev_display_name() -> String {
    "Developer".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            mode: AuthMode::default(),
            email: None,
            dev_user_id: default_dev_user_id(),
            dev_display_name: default_dev_display_name(),
        }
    }
}

/// Client-side configuration (`client.toml`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the chat server (REST, realtime, and bot function).
    #[serde(default = "default_server_url")]
    pub server_url: String,

    /// Upper bound for one bot round trip, in seconds.
    #[serde(default = "default_bot_timeout_secs")]
    pub bot_timeout_secs: u64,

    #[serde(default)]
    pub auth: AuthConfig,
}

fn default_server_url() -> String {
    "http://127.0.0.1:54321".to_string()
}

fn default_bot_timeout_secs() -> u64 {
    60
}

/// Shortest bot timeout accepted from configuration.
pub const MIN_BOT_TIMEOUT_SECS: u64 = 1;

impl ClientConfig {
    /// The bot timeout, raised to `MIN_BOT_TIMEOUT_SECS` when configured lower.
    pub fn bot_timeout(&self) -> Duration {
        Duration::from_secs(self.bot_timeout_secs.max(MIN_BOT_TIMEOUT_SECS))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            bot_timeout_secs: default_bot_timeout_secs(),
            auth: AuthConfig::default(),
        }
    }
}

/// Settings for the bot function backed by an OpenAI-compatible API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotFunctionConfig {
    #[serde(default = "default_bot_model")]
    pub model: String,

    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
}

fn default_bot_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

impl Default for BotFunctionConfig {
    fn default() -> Self {
        Self {
            model: default_bot_model(),
            api_key_env: default_api_key_env(),
            base_url: default_openai_base_url(),
        }
    }
}

/// Server-side configuration (`server.toml`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// SQLite file name, relative to the data directory.
    #[serde(default = "default_database_file")]
    pub database_file: String,

    /// Capacity of the realtime broadcast channel.
    #[serde(default = "default_realtime_capacity")]
    pub realtime_capacity: usize,

    #[serde(default)]
    pub bot: BotFunctionConfig,
}

fn default_database_file() -> String {
    "recomendify.db".to_string()
}

fn default_realtime_capacity() -> usize {
    1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_file: default_database_file(),
            realtime_capacity: default_realtime_capacity(),
            bot: BotFunctionConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_client_config_uses_defaults() {
        let config: ClientConfig = toml::from_str("").unwrap();
        assert_eq!(config.server_url, "http://127.0.0.1:54321");
        assert_eq!(config.bot_timeout_secs, 60);
        assert_eq!(config.auth.mode, AuthMode::Remote);
        assert!(config.auth.email.is_none());
    }

    #[test]
    fn zero_bot_timeout_is_raised_to_minimum() {
        let config: ClientConfig = toml::from_str("bot_timeout_secs = 0").unwrap();
        assert_eq!(config.bot_timeout(), Duration::from_secs(MIN_BOT_TIMEOUT_SECS));

        let config: ClientConfig = toml::from_str("bot_timeout_secs = 90").unwrap();
        assert_eq!(config.bot_timeout(), Duration::from_secs(90));
    }

    #[test]
    fn development_mode_is_explicit() {
        let config: ClientConfig = toml::from_str(
            r#"
[auth]
mode = "development"
dev_user_id = "tester"
"#,
        )
        .unwrap();
        assert_eq!(config.auth.mode, AuthMode::Development);
        assert_eq!(config.auth.dev_user_id, "tester");
        assert_eq!(config.auth.dev_display_name, "Developer");
    }

    #[test]
    fn server_config_defaults() {
        let config: ServerConfig = toml::from_str("[bot]\nmodel = \"gpt-4o\"\n").unwrap();
        assert_eq!(config.database_file, "recomendify.db");
        assert_eq!(config.realtime_capacity, 1024);
        assert_eq!(config.bot.model, "gpt-4o");
        assert_eq!(config.bot.api_key_env, "OPENAI_API_KEY");
    }

    #[test]
    fn auth_mode_roundtrip() {
        for mode in [AuthMode::Remote, AuthMode::Development] {
            let parsed: AuthMode = mode.to_string().parse().unwrap();
            assert_eq!(parsed, mode);
        }
        assert!("admin".parse::<AuthMode>().is_err());
    }
}
