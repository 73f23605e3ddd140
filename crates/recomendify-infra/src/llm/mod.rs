//! Completion backends for the bot function.

pub mod openai;

pub use openai::OpenAiCompletion;
