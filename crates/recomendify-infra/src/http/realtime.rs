//! Realtime subscriptions over server-sent events.
//!
//! Each subscription opens one SSE stream and pumps its `postgres_changes`
//! events into a private [`ChangeFeed`]. The returned [`LiveChannel`] owns a
//! drop guard for the pump, so dropping the channel closes the stream.

use futures_util::StreamExt;
use recomendify_core::realtime::feed::DEFAULT_FEED_CAPACITY;
use recomendify_core::realtime::{ChangeFeed, LiveChannel};
use recomendify_types::change::RowChange;
use recomendify_types::error::StoreError;
use recomendify_types::routes::REALTIME_EVENT;
use reqwest_eventsource::{Event, EventSource};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Open an SSE stream at `url` for `channel`.
///
/// Resolves once the server has accepted the stream, so changes committed
/// after this returns are delivered.
pub(crate) async fn open_channel(
    client: &reqwest::Client,
    url: &str,
    channel: &str,
) -> Result<LiveChannel, StoreError> {
    let request = client.get(url).query(&[("channel", channel)]);
    let mut source =
        EventSource::new(request).map_err(|e| StoreError::Subscription(e.to_string()))?;

    let feed = ChangeFeed::new(DEFAULT_FEED_CAPACITY);
    let live = feed.subscribe(channel);

    match source.next().await {
        Some(Ok(Event::Open)) => {}
        Some(Ok(Event::Message(message))) => forward(&feed, channel, &message.event, &message.data),
        Some(Err(e)) => {
            source.close();
            return Err(StoreError::Subscription(e.to_string()));
        }
        None => {
            return Err(StoreError::Subscription(
                "realtime stream closed before opening".to_string(),
            ));
        }
    }

    let token = CancellationToken::new();
    tokio::spawn(pump(source, feed, channel.to_string(), token.clone()));
    debug!(channel, "realtime stream opened");

    Ok(live.with_upstream(token.drop_guard()))
}

async fn pump(mut source: EventSource, feed: ChangeFeed, channel: String, token: CancellationToken) {
    loop {
        tokio::select! {
            _ = token.cancelled() => break,
            item = source.next() => match item {
                Some(Ok(Event::Open)) => debug!(channel = %channel, "realtime stream reconnected"),
                Some(Ok(Event::Message(message))) => forward(&feed, &channel, &message.event, &message.data),
                Some(Err(e)) => warn!(channel = %channel, error = %e, "realtime stream error"),
                None => break,
            },
        }
    }
    source.close();
    debug!(channel = %channel, "realtime stream closed");
}

fn forward(feed: &ChangeFeed, channel: &str, event: &str, data: &str) {
    if event != REALTIME_EVENT {
        return;
    }
    match serde_json::from_str::<RowChange>(data) {
        Ok(change) => {
            feed.publish(change);
        }
        Err(e) => warn!(channel, error = %e, "dropping malformed realtime event"),
    }
}

