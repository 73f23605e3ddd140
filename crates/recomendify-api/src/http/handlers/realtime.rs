//! Realtime SSE endpoint.
//!
//! GET /realtime/v1/private_messages?channel=msg:a-b
//!
//! Streams every `private_messages` row change as a `postgres_changes` event
//! whose data is the `RowChange` JSON. The channel name is registered for as
//! long as the client stays connected.

use std::convert::Infallible;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use serde::Deserialize;
use tokio_stream::Stream;
use tracing::{debug, info_span, warn};

use recomendify_core::bot::CompletionBackend;
use recomendify_observe::attrs::{
    MESSAGING_DESTINATION_NAME, MESSAGING_OPERATION_TYPE, MESSAGING_SYSTEM,
    MESSAGING_SYSTEM_REALTIME, OP_SUBSCRIBE,
};
use recomendify_types::routes::REALTIME_EVENT;

use crate::http::error::AppError;
use crate::state::ServerState;

/// Interval between keep-alive comments.
pub const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

#[derive(Debug, Deserialize)]
pub struct SubscribeQuery {
    pub channel: Option<String>,
}

/// GET /realtime/v1/private_messages
pub async fn subscribe<C: CompletionBackend + 'static>(
    State(state): State<ServerState<C>>,
    Query(query): Query<SubscribeQuery>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let channel = query
        .channel
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| AppError::Validation("channel is required".to_string()))?;

    let span = info_span!(
        "subscribe",
        { MESSAGING_SYSTEM } = MESSAGING_SYSTEM_REALTIME,
        { MESSAGING_OPERATION_TYPE } = OP_SUBSCRIBE,
        { MESSAGING_DESTINATION_NAME } = channel.as_str(),
    );
    span.in_scope(|| debug!("realtime client connected"));

    // Registered before the response starts: the client treats an open
    // stream as live.
    let mut live = state.messages.feed().subscribe(&channel);

    let stream = async_stream::stream! {
        while let Some(change) = live.recv().await {
            match Event::default().event(REALTIME_EVENT).json_data(&change) {
                Ok(event) => yield Ok(event),
                Err(e) => warn!(channel = %live.name(), error = %e, "failed to encode change"),
            }
        }
        debug!(channel = %live.name(), "realtime feed closed");
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::new().interval(KEEP_ALIVE_INTERVAL)))
}
