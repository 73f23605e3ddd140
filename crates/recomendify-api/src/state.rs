//! Application state for the two halves of the binary.
//!
//! `ServerState` backs the HTTP server (`rcmd serve`): SQLite message store
//! and profile directory plus the bot function. `ClientState` backs every
//! other command: HTTP clients for a running server, the local bot history
//! database, and the configured session provider.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use recomendify_core::auth::{DevSessionProvider, SessionProvider};
use recomendify_core::bot::{BotFunction, CompletionBackend};
use recomendify_core::chat::{ConversationSync, SyncOptions};
use recomendify_core::realtime::ChangeFeed;
use recomendify_infra::auth::RemoteSessionProvider;
use recomendify_infra::config::{load_client_config, load_server_config, resolve_data_dir};
use recomendify_infra::http::{HttpBotResponder, RemoteStore, http_client};
use recomendify_infra::llm::OpenAiCompletion;
use recomendify_infra::sqlite::{
    DatabasePool, SqliteLocalStorage, SqliteMessageStore, SqliteProfileDirectory,
};
use recomendify_types::config::{AuthMode, ClientConfig, ServerConfig};
use recomendify_types::error::AuthError;
use recomendify_types::session::Session;
use tokio::sync::watch;
use tracing::{info, warn};

/// File name of the client's local database (bot history).
const CLIENT_DATABASE_FILE: &str = "client.db";

/// Shared server state.
///
/// Generic over the completion backend so tests can serve a scripted model.
/// `bot` is `None` when no API key is configured; the bot endpoint then
/// answers with an error.
pub struct ServerState<C> {
    pub messages: Arc<SqliteMessageStore>,
    pub profiles: Arc<SqliteProfileDirectory>,
    pub bot: Option<Arc<BotFunction<C>>>,
}

impl<C> Clone for ServerState<C> {
    fn clone(&self) -> Self {
        Self {
            messages: Arc::clone(&self.messages),
            profiles: Arc::clone(&self.profiles),
            bot: self.bot.clone(),
        }
    }
}

impl<C: CompletionBackend> ServerState<C> {
    pub fn new(pool: DatabasePool, feed: ChangeFeed, bot: Option<BotFunction<C>>) -> Self {
        Self {
            messages: Arc::new(SqliteMessageStore::new(pool.clone(), feed)),
            profiles: Arc::new(SqliteProfileDirectory::new(pool)),
            bot: bot.map(Arc::new),
        }
    }
}

impl ServerState<OpenAiCompletion> {
    /// Open the server database and wire the OpenAI-backed bot function.
    pub async fn init() -> anyhow::Result<(Self, ServerConfig)> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_server_config(&data_dir).await;
        let pool = DatabasePool::open_in(&data_dir, &config.database_file).await?;
        let feed = ChangeFeed::new(config.realtime_capacity);

        let bot = match OpenAiCompletion::from_config(&config.bot) {
            Ok(backend) => Some(BotFunction::new(backend)),
            Err(e) => {
                warn!(error = %e, "bot function disabled");
                None
            }
        };

        Ok((Self::new(pool, feed, bot), config))
    }
}

/// The conversation engine as the CLI uses it.
pub type ChatEngine = ConversationSync<RemoteStore, HttpBotResponder, SqliteLocalStorage>;

/// Session provider chosen by `auth.mode`.
pub enum Sessions {
    Remote(RemoteSessionProvider<RemoteStore>),
    Development(DevSessionProvider),
}

impl Sessions {
    /// Register a new user. Only the remote provider supports registration.
    pub async fn register(&self, email: &str) -> Result<Session, AuthError> {
        match self {
            Sessions::Remote(provider) => provider.register(email).await,
            Sessions::Development(_) => Err(AuthError::Provider(
                "registration is not available with the development identity".to_string(),
            )),
        }
    }
}

impl SessionProvider for Sessions {
    fn current_session(&self) -> Option<Session> {
        match self {
            Sessions::Remote(p) => p.current_session(),
            Sessions::Development(p) => p.current_session(),
        }
    }

    async fn sign_in(&self, email: &str) -> Result<Session, AuthError> {
        match self {
            Sessions::Remote(p) => p.sign_in(email).await,
            Sessions::Development(p) => p.sign_in(email).await,
        }
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        match self {
            Sessions::Remote(p) => p.sign_out().await,
            Sessions::Development(p) => p.sign_out().await,
        }
    }

    fn on_change(&self) -> watch::Receiver<Option<Session>> {
        match self {
            Sessions::Remote(p) => p.on_change(),
            Sessions::Development(p) => p.on_change(),
        }
    }
}

/// Shared client state for every command except `serve`.
pub struct ClientState {
    pub data_dir: PathBuf,
    pub config: ClientConfig,
    pub store: RemoteStore,
    pub bot: HttpBotResponder,
    pub local_storage: SqliteLocalStorage,
    pub sessions: Sessions,
}

impl ClientState {
    /// Load `client.toml`, open the local database, and restore the session.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_client_config(&data_dir).await;
        let client = http_client()?;
        let store = RemoteStore::new(client.clone(), &config.server_url);
        let bot = HttpBotResponder::new(client, &config.server_url);

        let pool = DatabasePool::open_in(&data_dir, CLIENT_DATABASE_FILE).await?;
        let local_storage = SqliteLocalStorage::new(pool);

        let sessions = match config.auth.mode {
            AuthMode::Development => {
                info!(user_id = %config.auth.dev_user_id, "using development identity");
                Sessions::Development(DevSessionProvider::from_config(&config.auth))
            }
            AuthMode::Remote => {
                let provider = RemoteSessionProvider::new(store.clone());
                if let Some(email) = &config.auth.email {
                    if let Err(e) = provider.sign_in(email).await {
                        warn!(error = %e, "could not restore session");
                    }
                }
                Sessions::Remote(provider)
            }
        };

        Ok(Self {
            data_dir,
            config,
            store,
            bot,
            local_storage,
            sessions,
        })
    }

    /// The signed-in session, or an error telling the user how to sign in.
    pub fn require_session(&self) -> anyhow::Result<Session> {
        self.sessions
            .current_session()
            .ok_or(AuthError::NoSession)
            .context("sign in first with: rcmd login <EMAIL>")
    }

    /// A fresh conversation engine for `user_id`.
    pub fn engine(&self, user_id: &str) -> ChatEngine {
        ConversationSync::new(
            self.store.clone(),
            self.bot.clone(),
            self.local_storage.clone(),
            user_id,
            SyncOptions {
                bot_timeout: self.config.bot_timeout(),
            },
        )
    }
}
