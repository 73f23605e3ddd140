//! Bot responder trait.

use recomendify_types::bot::BotReply;
use recomendify_types::error::BotError;

/// Answers a single user prompt with generated text.
///
/// The client implementation calls the bot function endpoint over HTTP.
pub trait BotResponder: Send + Sync {
    fn respond(
        &self,
        prompt: &str,
    ) -> impl std::future::Future<Output = Result<BotReply, BotError>> + Send;
}

impl<T: BotResponder> BotResponder for std::sync::Arc<T> {
    fn respond(
        &self,
        prompt: &str,
    ) -> impl std::future::Future<Output = Result<BotReply, BotError>> + Send {
        (**self).respond(prompt)
    }
}
