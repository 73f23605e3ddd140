//! Development session provider with a fixed local identity.

use recomendify_types::config::{AuthConfig, AuthMode};
use recomendify_types::error::AuthError;
use recomendify_types::session::Session;
use tokio::sync::watch;
use tracing::info;

use super::{SessionCell, SessionProvider};

/// Signs in as one configured identity, without any credential.
///
/// Starts signed in. `sign_in` accepts any email and keeps the configured
/// user id, so tests and local runs share a stable identity.
#[derive(Debug)]
pub struct DevSessionProvider {
    user_id: String,
    display_name: String,
    cell: SessionCell,
}

impl DevSessionProvider {
    pub fn new(user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        let user_id = user_id.into();
        let display_name = display_name.into();
        let session = Self::session_for(&user_id, &display_name, None);
        Self {
            user_id,
            display_name,
            cell: SessionCell::new(Some(session)),
        }
    }

    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.dev_user_id.clone(), config.dev_display_name.clone())
    }

    fn session_for(user_id: &str, display_name: &str, email: Option<&str>) -> Session {
        Session {
            user_id: user_id.to_string(),
            email: email.map(str::to_string),
            display_name: Some(display_name.to_string()),
            provider: AuthMode::Development,
        }
    }
}

impl SessionProvider for DevSessionProvider {
    fn current_session(&self) -> Option<Session> {
        self.cell.get()
    }

    async fn sign_in(&self, email: &str) -> Result<Session, AuthError> {
        let session = Self::session_for(&self.user_id, &self.display_name, Some(email));
        self.cell.set(Some(session.clone()));
        info!(user_id = %self.user_id, "signed in with development identity");
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.cell.set(None);
        Ok(())
    }

    fn on_change(&self) -> watch::Receiver<Option<Session>> {
        self.cell.subscribe()
    }
}
