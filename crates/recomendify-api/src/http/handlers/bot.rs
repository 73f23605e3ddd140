//! Bot function endpoint.
//!
//! POST /functions/v1/openai-bot
//!
//! Body `{"prompt": "..."}`. Answers `{"generatedText": "..."}` on success,
//! HTTP 400 `{"error": ...}` for a malformed body and HTTP 500
//! `{"error": ...}` when the model call fails or no backend is configured.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{Instrument, info_span, warn};

use recomendify_core::bot::CompletionBackend;
use recomendify_observe::attrs::{
    GEN_AI_AGENT_ID, GEN_AI_OPERATION_NAME, GEN_AI_PROVIDER_NAME, GEN_AI_REQUEST_MODEL, OP_CHAT,
    PROVIDER_OPENAI,
};
use recomendify_types::bot::{BotFailure, BotPrompt};
use recomendify_types::peer::BOT_PEER_ID;

use crate::state::ServerState;

fn failure(status: StatusCode, error: impl Into<String>) -> Response {
    (status, Json(BotFailure { error: error.into() })).into_response()
}

/// POST /functions/v1/openai-bot
pub async fn generate<C: CompletionBackend + 'static>(
    State(state): State<ServerState<C>>,
    body: Result<Json<BotPrompt>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return failure(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    let Some(bot) = state.bot else {
        return failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            "bot backend is not configured",
        );
    };

    let model = bot.backend().model().to_string();
    let span = info_span!(
        "chat",
        { GEN_AI_OPERATION_NAME } = OP_CHAT,
        { GEN_AI_PROVIDER_NAME } = PROVIDER_OPENAI,
        { GEN_AI_REQUEST_MODEL } = model.as_str(),
        { GEN_AI_AGENT_ID } = BOT_PEER_ID,
    );

    match bot.handle(&request).instrument(span).await {
        Ok(reply) => Json(reply).into_response(),
        Err(e) => {
            warn!(error = %e, model = %model, "bot function failed");
            failure(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}
