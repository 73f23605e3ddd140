//! Configuration loading for the client and server.
//!
//! Reads `client.toml` and `server.toml` from the data directory
//! (`~/.recomendify/` by default). Falls back to defaults when a file is
//! missing or malformed.

use std::path::{Path, PathBuf};

use recomendify_types::config::{ClientConfig, ServerConfig};
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "RECOMENDIFY_DATA_DIR";

/// Environment variable overriding `ClientConfig::server_url`.
pub const SERVER_URL_ENV: &str = "RECOMENDIFY_SERVER_URL";

pub const CLIENT_CONFIG_FILE: &str = "client.toml";
pub const SERVER_CONFIG_FILE: &str = "server.toml";

/// The data directory: `$RECOMENDIFY_DATA_DIR`, else `~/.recomendify`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".recomendify")
}

/// Load `{data_dir}/client.toml`, then apply `RECOMENDIFY_SERVER_URL`.
pub async fn load_client_config(data_dir: &Path) -> ClientConfig {
    let mut config: ClientConfig = load_toml(&data_dir.join(CLIENT_CONFIG_FILE)).await;
    apply_server_url_override(&mut config, std::env::var(SERVER_URL_ENV).ok());
    config
}

/// Load `{data_dir}/server.toml`.
pub async fn load_server_config(data_dir: &Path) -> ServerConfig {
    load_toml(&data_dir.join(SERVER_CONFIG_FILE)).await
}

/// Write `{data_dir}/client.toml`, creating the directory if needed.
pub async fn save_client_config(data_dir: &Path, config: &ClientConfig) -> anyhow::Result<()> {
    save_toml(&data_dir.join(CLIENT_CONFIG_FILE), config).await
}

fn apply_server_url_override(config: &mut ClientConfig, server_url: Option<String>) {
    if let Some(url) = server_url.filter(|url| !url.trim().is_empty()) {
        tracing::debug!(%url, "server url overridden from environment");
        config.server_url = url;
    }
}

async fn load_toml<T: DeserializeOwned + Default>(path: &Path) -> T {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config found at {}, using defaults", path.display());
            return T::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return T::default();
        }
    };

    match toml::from_str::<T>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
            T::default()
        }
    }
}

async fn save_toml<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let content = toml::to_string_pretty(value)?;
    tokio::fs::write(path, content).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use recomendify_types::config::AuthMode;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_files_return_defaults() {
        let tmp = TempDir::new().unwrap();
        let server = load_server_config(tmp.path()).await;
        assert_eq!(server.database_file, "recomendify.db");
        assert_eq!(server.bot.model, "gpt-4o-mini");

        let client: ClientConfig = load_toml(&tmp.path().join(CLIENT_CONFIG_FILE)).await;
        assert_eq!(client.bot_timeout_secs, 60);
        assert_eq!(client.auth.mode, AuthMode::Remote);
    }

    #[tokio::test]
    async fn valid_server_toml_is_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join(SERVER_CONFIG_FILE),
            r#"
database_file = "chat.db"
realtime_capacity = 256

[bot]
model = "gpt-4o"
base_url = "http://localhost:11434/v1"
"#,
        )
        .await
        .unwrap();

        let config = load_server_config(tmp.path()).await;
        assert_eq!(config.database_file, "chat.db");
        assert_eq!(config.realtime_capacity, 256);
        assert_eq!(config.bot.model, "gpt-4o");
        assert_eq!(config.bot.api_key_env, "OPENAI_API_KEY");
    }

    #[tokio::test]
    async fn invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join(SERVER_CONFIG_FILE), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_server_config(tmp.path()).await;
        assert_eq!(config.database_file, "recomendify.db");
    }

    #[tokio::test]
    async fn saved_client_config_loads_back() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("nested");
        let mut config = ClientConfig::default();
        config.auth.email = Some("ana@example.com".into());
        config.bot_timeout_secs = 15;

        save_client_config(&dir, &config).await.unwrap();
        let loaded: ClientConfig = load_toml(&dir.join(CLIENT_CONFIG_FILE)).await;
        assert_eq!(loaded.auth.email.as_deref(), Some("ana@example.com"));
        assert_eq!(loaded.bot_timeout_secs, 15);
    }

    #[test]
    fn server_url_override_ignores_blank() {
        let mut config = ClientConfig::default();
        apply_server_url_override(&mut config, Some("  ".into()));
        assert_eq!(config.server_url, "http://127.0.0.1:54321");

        apply_server_url_override(&mut config, Some("http://chat.local:8080".into()));
        assert_eq!(config.server_url, "http://chat.local:8080");
    }
}
