//! HTTP client for the bot function endpoint.

use recomendify_core::bot::BotResponder;
use recomendify_types::bot::{BotPrompt, BotReply};
use recomendify_types::error::BotError;
use recomendify_types::routes::{BOT_FUNCTION_PATH, join_url};
use tracing::debug;

/// `BotResponder` that calls `POST {server}/functions/v1/openai-bot`.
#[derive(Debug, Clone)]
pub struct HttpBotResponder {
    client: reqwest::Client,
    url: String,
}

impl HttpBotResponder {
    pub fn new(client: reqwest::Client, server_url: &str) -> Self {
        Self {
            client,
            url: join_url(server_url, BOT_FUNCTION_PATH),
        }
    }
}

impl BotResponder for HttpBotResponder {
    async fn respond(&self, prompt: &str) -> Result<BotReply, BotError> {
        let body = BotPrompt {
            prompt: prompt.to_string(),
        };

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| BotError::Transport(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| BotError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(BotError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let reply: BotReply =
            serde_json::from_str(&text).map_err(|e| BotError::Malformed(e.to_string()))?;
        debug!(has_text = reply.generated_text.is_some(), "bot replied");
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::Router;
    use axum::http::StatusCode;
    use axum::routing::post;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn responder(base: &str) -> HttpBotResponder {
        HttpBotResponder::new(reqwest::Client::new(), base)
    }

    #[tokio::test]
    async fn success_parses_generated_text() {
        let base = serve(Router::new().route(
            BOT_FUNCTION_PATH,
            post(|axum::Json(body): axum::Json<BotPrompt>| async move {
                axum::Json(BotReply::text(format!("Você disse: {}", body.prompt)))
            }),
        ))
        .await;

        let reply = responder(&base).respond("Tente 1984.").await.unwrap();
        assert_eq!(reply.generated_text.as_deref(), Some("Você disse: Tente 1984."));
    }

    #[tokio::test]
    async fn non_success_status_is_error() {
        let base = serve(Router::new().route(
            BOT_FUNCTION_PATH,
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, r#"{"error":"boom"}"#) }),
        ))
        .await;

        let err = responder(&base).respond("oi").await.unwrap_err();
        assert!(matches!(err, BotError::Status { status: 500, ref body } if body.contains("boom")));
    }

    #[tokio::test]
    async fn malformed_body_is_error() {
        let base = serve(Router::new().route(BOT_FUNCTION_PATH, post(|| async { "not json" }))).await;

        let err = responder(&base).respond("oi").await.unwrap_err();
        assert!(matches!(err, BotError::Malformed(_)));
    }

    #[tokio::test]
    async fn unreachable_server_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = responder(&format!("http://{addr}")).respond("oi").await.unwrap_err();
        assert!(matches!(err, BotError::Transport(_)));
    }
}
