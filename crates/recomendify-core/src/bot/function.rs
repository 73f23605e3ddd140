//! Server-side logic of the bot function endpoint.
//!
//! One stateless completion per request: fixed persona as the system message,
//! the user's prompt as the only user message. No conversation history is
//! sent to the model.

use recomendify_types::bot::{BotPrompt, BotReply};
use recomendify_types::error::BotError;
use tracing::{debug, warn};

/// System message sent with every completion.
pub const BOT_PERSONA: &str = "Você é um assistente Bot que conversa sobre livros e filmes de forma \
acolhedora e divertida. Responda de forma breve, amigável e sempre incentive boas leituras ou bons \
filmes. Se a pergunta não estiver relacionada ao tema, oriente o usuário para voltar a falar sobre \
livros ou filmes.";

/// Returned as `generatedText` when the model produced no text.
pub const FUNCTION_FALLBACK_REPLY: &str = "Desculpe, não consegui gerar uma resposta agora.";

/// A chat-completion model.
pub trait CompletionBackend: Send + Sync {
    /// Model identifier, for logs and spans.
    fn model(&self) -> &str;

    /// Complete `prompt` under `system`. `Ok(None)` means the model answered
    /// without any text.
    fn complete(
        &self,
        system: &str,
        prompt: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>, BotError>> + Send;
}

/// The bot function: persona + backend + fallback.
#[derive(Debug, Clone)]
pub struct BotFunction<C> {
    backend: C,
}

impl<C: CompletionBackend> BotFunction<C> {
    pub fn new(backend: C) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &C {
        &self.backend
    }

    /// Answer one request body.
    pub async fn handle(&self, request: &BotPrompt) -> Result<BotReply, BotError> {
        debug!(model = self.backend.model(), prompt_len = request.prompt.len(), "bot function call");
        let generated = self.backend.complete(BOT_PERSONA, &request.prompt).await?;
        let text = match generated.filter(|text| !text.trim().is_empty()) {
            Some(text) => text,
            None => {
                warn!(model = self.backend.model(), "completion returned no text, using fallback");
                FUNCTION_FALLBACK_REPLY.to_string()
            }
        };
        Ok(BotReply::text(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct ScriptedBackend {
        answer: Result<Option<String>, String>,
        seen: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedBackend {
        fn answering(answer: Option<&str>) -> Self {
            Self {
                answer: Ok(answer.map(str::to_string)),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing(message: &str) -> Self {
            Self {
                answer: Err(message.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    fn prompt(text: &str) -> BotPrompt {
        BotPrompt {
            prompt: text.to_string(),
        }
    }

    impl CompletionBackend for ScriptedBackend {
        fn model(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, system: &str, prompt: &str) -> Result<Option<String>, BotError> {
            self.seen
                .lock()
                .unwrap()
                .push((system.to_string(), prompt.to_string()));
            self.answer.clone().map_err(BotError::Backend)
        }
    }

    #[tokio::test]
    async fn sends_persona_and_prompt() {
        let function = BotFunction::new(ScriptedBackend::answering(Some("Leia Dom Casmurro!")));
        let reply = function
            .handle(&BotPrompt {
                prompt: "Me indica um livro".into(),
            })
            .await
            .unwrap();

        assert_eq!(reply.generated_text.as_deref(), Some("Leia Dom Casmurro!"));
        let seen = function.backend().seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, BOT_PERSONA);
        assert_eq!(seen[0].1, "Me indica um livro");
    }

    #[tokio::test]
    async fn missing_text_uses_fallback() {
        let function = BotFunction::new(ScriptedBackend::answering(None));
        let reply = function.handle(&prompt("oi")).await.unwrap();
        assert_eq!(reply.generated_text.as_deref(), Some(FUNCTION_FALLBACK_REPLY));
    }

    #[tokio::test]
    async fn blank_text_uses_fallback() {
        let function = BotFunction::new(ScriptedBackend::answering(Some("  \n")));
        let reply = function.handle(&prompt("oi")).await.unwrap();
        assert_eq!(reply.generated_text.as_deref(), Some(FUNCTION_FALLBACK_REPLY));
    }

    #[tokio::test]
    async fn backend_error_propagates() {
        let function = BotFunction::new(ScriptedBackend::failing("quota exceeded"));
        let err = function.handle(&prompt("oi")).await.unwrap_err();
        assert!(matches!(err, BotError::Backend(ref m) if m == "quota exceeded"));
    }
}
