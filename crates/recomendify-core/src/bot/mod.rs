//! The bot assistant: client-side responder port and server-side function.

pub mod function;
pub mod responder;

pub use function::{BOT_PERSONA, BotFunction, CompletionBackend, FUNCTION_FALLBACK_REPLY};
pub use responder::BotResponder;
