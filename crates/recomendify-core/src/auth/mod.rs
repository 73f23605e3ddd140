//! Session providers.
//!
//! The signed-in user's id is the only thing the sync engine needs from
//! authentication. Providers are chosen explicitly from configuration; the
//! development provider never activates on its own.

pub mod dev;

use recomendify_types::error::AuthError;
use recomendify_types::session::Session;
use tokio::sync::watch;

pub use dev::DevSessionProvider;

/// Source of the current session.
pub trait SessionProvider: Send + Sync {
    /// The session right now, if signed in.
    fn current_session(&self) -> Option<Session>;

    fn sign_in(
        &self,
        email: &str,
    ) -> impl std::future::Future<Output = Result<Session, AuthError>> + Send;

    fn sign_out(&self) -> impl std::future::Future<Output = Result<(), AuthError>> + Send;

    /// Receiver that observes every sign-in and sign-out.
    fn on_change(&self) -> watch::Receiver<Option<Session>>;
}

/// Shared session slot used by provider implementations.
#[derive(Debug)]
pub struct SessionCell {
    sender: watch::Sender<Option<Session>>,
}

impl SessionCell {
    pub fn new(initial: Option<Session>) -> Self {
        let (sender, _) = watch::channel(initial);
        Self { sender }
    }

    pub fn get(&self) -> Option<Session> {
        self.sender.borrow().clone()
    }

    pub fn set(&self, session: Option<Session>) {
        self.sender.send_replace(session);
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.sender.subscribe()
    }
}

impl Default for SessionCell {
    fn default() -> Self {
        Self::new(None)
    }
}
