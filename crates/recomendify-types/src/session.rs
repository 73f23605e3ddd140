//! Authenticated session types.

use serde::{Deserialize, Serialize};

use crate::config::AuthMode;

/// The identity of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
    /// Which provider issued this session.
    pub provider: AuthMode,
}

impl Session {
    /// Name shown in banners and prompts.
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.user_id)
    }
}
