//! Session provider resolved against the profile directory.

use recomendify_core::auth::{SessionCell, SessionProvider};
use recomendify_core::repository::ProfileDirectory;
use recomendify_types::config::AuthMode;
use recomendify_types::error::{AuthError, StoreError};
use recomendify_types::peer::Profile;
use recomendify_types::session::Session;
use tokio::sync::watch;
use tracing::info;
use uuid::Uuid;

/// Signs users in by email against a [`ProfileDirectory`].
///
/// Starts signed out.
#[derive(Debug)]
pub struct RemoteSessionProvider<P> {
    directory: P,
    cell: SessionCell,
}

impl<P: ProfileDirectory> RemoteSessionProvider<P> {
    pub fn new(directory: P) -> Self {
        Self {
            directory,
            cell: SessionCell::default(),
        }
    }

    /// Create a profile for `email` and sign in as it.
    ///
    /// Fails with `AuthError::Provider` if the email is already registered.
    pub async fn register(&self, email: &str) -> Result<Session, AuthError> {
        let email = normalize_email(email)?;
        if self
            .directory
            .find_by_email(&email)
            .await
            .map_err(provider_error)?
            .is_some()
        {
            return Err(AuthError::Provider(format!("'{email}' is already registered")));
        }

        let id = Uuid::now_v7().to_string();
        let profile = self
            .directory
            .upsert_profile(&Profile::for_new_user(&id, &email))
            .await
            .map_err(provider_error)?;
        info!(user_id = %profile.id, "registered new user");
        Ok(self.activate(profile))
    }

    fn activate(&self, profile: Profile) -> Session {
        let session = Session {
            user_id: profile.id,
            email: profile.email,
            display_name: profile.display_name,
            provider: AuthMode::Remote,
        };
        self.cell.set(Some(session.clone()));
        session
    }
}

impl<P: ProfileDirectory> SessionProvider for RemoteSessionProvider<P> {
    fn current_session(&self) -> Option<Session> {
        self.cell.get()
    }

    async fn sign_in(&self, email: &str) -> Result<Session, AuthError> {
        let email = normalize_email(email)?;
        let profile = self
            .directory
            .find_by_email(&email)
            .await
            .map_err(provider_error)?
            .ok_or_else(|| AuthError::UnknownUser(email.clone()))?;
        let session = self.activate(profile);
        info!(user_id = %session.user_id, "signed in");
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

fn normalize_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(AuthError::UnknownUser(email));
    }
    Ok(email)
}

fn provider_error(e: StoreError) -> AuthError {
    AuthError::Provider(e.to_string())
}
