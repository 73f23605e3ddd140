//! OpenAI chat-completions backend for the bot function.
//!
//! Uses [`async_openai`] against any OpenAI-compatible base URL. One
//! non-streaming completion per call: system persona + user prompt.

use async_openai::Client;
use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessage,
    ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessage,
    ChatCompletionRequestUserMessageContent, CreateChatCompletionRequest,
};
use recomendify_core::bot::CompletionBackend;
use recomendify_types::config::BotFunctionConfig;
use recomendify_types::error::BotError;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

/// `CompletionBackend` over the OpenAI chat-completions API.
///
/// Does NOT derive Debug: the `async_openai::Client` holds the API key.
pub struct OpenAiCompletion {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiCompletion {
    pub fn new(api_key: SecretString, base_url: &str, model: &str) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(api_key.expose_secret())
            .with_api_base(base_url);
        Self {
            client: Client::with_config(config),
            model: model.to_string(),
        }
    }

    /// Build from configuration, reading the key from `config.api_key_env`.
    pub fn from_config(config: &BotFunctionConfig) -> Result<Self, BotError> {
        let key = std::env::var(&config.api_key_env).map_err(|_| {
            BotError::Backend(format!("environment variable {} is not set", config.api_key_env))
        })?;
        Ok(Self::new(SecretString::from(key), &config.base_url, &config.model))
    }

    fn build_request(&self, system: &str, prompt: &str) -> CreateChatCompletionRequest {
        let messages = vec![
            ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                content: ChatCompletionRequestSystemMessageContent::Text(system.to_string()),
                name: None,
            }),
            ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                content: ChatCompletionRequestUserMessageContent::Text(prompt.to_string()),
                name: None,
            }),
        ];

        CreateChatCompletionRequest {
            model: self.model.clone(),
            messages,
            ..Default::default()
        }
    }
}

impl CompletionBackend for OpenAiCompletion {
    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, system: &str, prompt: &str) -> Result<Option<String>, BotError> {
        let request = self.build_request(system, prompt);
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(map_openai_error)?;

        debug!(
            model = %response.model,
            input_tokens = response.usage.as_ref().map(|u| u.prompt_tokens),
            output_tokens = response.usage.as_ref().map(|u| u.completion_tokens),
            "completion received"
        );

        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content))
    }
}

/// Map an `async_openai` error to a [`BotError`].
fn map_openai_error(err: async_openai::error::OpenAIError) -> BotError {
    use async_openai::error::OpenAIError;

    match &err {
        OpenAIError::Reqwest(reqwest_err) => match reqwest_err.status() {
            Some(status) => BotError::Status {
                status: status.as_u16(),
                body: err.to_string(),
            },
            None => BotError::Transport(err.to_string()),
        },
        OpenAIError::JSONDeserialize(_, content) => {
            BotError::Malformed(format!("failed to parse completion: {content}"))
        }
        _ => BotError::Backend(err.to_string()),
    }
}
