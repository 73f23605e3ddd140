//! Message store REST handlers.
//!
//! - `GET  /rest/v1/private_messages?user_id=..&peer_id=..`: one conversation,
//!   oldest first.
//! - `POST /rest/v1/private_messages`: insert; the server assigns id and
//!   timestamp and pushes the row to realtime subscribers.
//! - `POST /rest/v1/private_messages/{id}/read`: set the read flag.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use tracing::{Instrument, info_span};

use recomendify_core::bot::CompletionBackend;
use recomendify_core::repository::MessageStore;
use recomendify_observe::attrs::{
    MESSAGING_DESTINATION_NAME, MESSAGING_MESSAGE_ID, MESSAGING_OPERATION_TYPE, MESSAGING_SYSTEM,
    MESSAGING_SYSTEM_REALTIME, OP_SEND,
};
use recomendify_types::change::PRIVATE_MESSAGES_TABLE;
use recomendify_types::message::{NewMessage, PrivateMessage};

use crate::http::error::AppError;
use crate::state::ServerState;

/// Query parameters selecting one conversation.
#[derive(Debug, Deserialize)]
pub struct ConversationQuery {
    pub user_id: Option<String>,
    pub peer_id: Option<String>,
}

/// GET /rest/v1/private_messages
pub async fn list_conversation<C: CompletionBackend + 'static>(
    State(state): State<ServerState<C>>,
    Query(query): Query<ConversationQuery>,
) -> Result<Json<Vec<PrivateMessage>>, AppError> {
    let (Some(user_id), Some(peer_id)) = (query.user_id, query.peer_id) else {
        return Err(AppError::Validation(
            "user_id and peer_id are required".to_string(),
        ));
    };
    let messages = state.messages.fetch_conversation(&user_id, &peer_id).await?;
    Ok(Json(messages))
}

/// POST /rest/v1/private_messages
pub async fn insert_message<C: CompletionBackend + 'static>(
    State(state): State<ServerState<C>>,
    Json(body): Json<NewMessage>,
) -> Result<(StatusCode, Json<PrivateMessage>), AppError> {
    if body.sender_id.trim().is_empty() || body.receiver_id.trim().is_empty() {
        return Err(AppError::Validation(
            "sender_id and receiver_id are required".to_string(),
        ));
    }
    if body.content.trim().is_empty() {
        return Err(AppError::Validation("content must not be blank".to_string()));
    }

    let span = info_span!(
        "send private_messages",
        { MESSAGING_SYSTEM } = MESSAGING_SYSTEM_REALTIME,
        { MESSAGING_OPERATION_TYPE } = OP_SEND,
        { MESSAGING_DESTINATION_NAME } = PRIVATE_MESSAGES_TABLE,
        { MESSAGING_MESSAGE_ID } = tracing::field::Empty,
    );

    let row = state
        .messages
        .insert_message(&body)
        .instrument(span.clone())
        .await?;
    span.record(MESSAGING_MESSAGE_ID, row.id.as_str());
    Ok((StatusCode::CREATED, Json(row)))
}

/// POST /rest/v1/private_messages/{id}/read
pub async fn mark_read<C: CompletionBackend + 'static>(
    State(state): State<ServerState<C>>,
    Path(id): Path<String>,
) -> Result<Json<PrivateMessage>, AppError> {
    let row = state.messages.mark_read(&id).await?;
    Ok(Json(row))
}
