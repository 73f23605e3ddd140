//! Broadcast change feed with a registry of named live channels.
//!
//! Built on `tokio::sync::broadcast`: every subscriber sees every row change
//! and filters on its own side. Each subscription registers its channel name
//! so callers can see which conversations are live. The registration is held
//! by a [`ChannelLease`] and released when the lease drops.

use std::sync::Arc;

use dashmap::DashMap;
use recomendify_types::change::RowChange;
use tokio::sync::broadcast;
use tokio_util::sync::DropGuard;
use tracing::{debug, warn};

/// Default broadcast capacity.
pub const DEFAULT_FEED_CAPACITY: usize = 1024;

/// Multi-consumer feed of `private_messages` row changes.
///
/// Cloning the feed clones the sender and shares the channel registry.
#[derive(Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<RowChange>,
    /// channel name -> number of live subscriptions
    channels: Arc<DashMap<String, usize>>,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            channels: Arc::new(DashMap::new()),
        }
    }

    /// Open a live channel that receives all future changes.
    pub fn subscribe(&self, channel: &str) -> LiveChannel {
        *self.channels.entry(channel.to_string()).or_insert(0) += 1;
        debug!(channel, "live channel opened");
        LiveChannel {
            lease: ChannelLease {
                name: channel.to_string(),
                registry: Arc::clone(&self.channels),
                _upstream: None,
            },
            receiver: ChangeReceiver {
                channel: channel.to_string(),
                inner: self.sender.subscribe(),
            },
        }
    }

    /// Publish a change to all current subscribers.
    ///
    /// Returns the number of receivers reached. With no subscribers the change
    /// is dropped.
    pub fn publish(&self, change: RowChange) -> usize {
        self.sender.send(change).unwrap_or(0)
    }

    /// Names of channels with at least one live subscription, sorted.
    pub fn active_channels(&self) -> Vec<String> {
        let mut names: Vec<String> = self.channels.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn is_active(&self, channel: &str) -> bool {
        self.channels.contains_key(channel)
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_CAPACITY)
    }
}

impl std::fmt::Debug for ChangeFeed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeFeed")
            .field("receiver_count", &self.sender.receiver_count())
            .field("channels", &self.channels.len())
            .finish()
    }
}

/// A subscription to a named channel: its registration plus its receiver.
#[derive(Debug)]
pub struct LiveChannel {
    lease: ChannelLease,
    receiver: ChangeReceiver,
}

impl LiveChannel {
    pub fn name(&self) -> &str {
        &self.lease.name
    }

    /// Tie an upstream pump to this channel: `guard` fires when the lease drops.
    pub fn with_upstream(mut self, guard: DropGuard) -> Self {
        self.lease._upstream = Some(guard);
        self
    }

    pub async fn recv(&mut self) -> Option<RowChange> {
        self.receiver.recv().await
    }

    /// Separate the registration from the receiver so a listener task can
    /// own the receiver while the caller controls teardown.
    pub fn split(self) -> (ChannelLease, ChangeReceiver) {
        (self.lease, self.receiver)
    }
}

/// Registration of one live channel. Dropping it unsubscribes.
#[derive(Debug)]
pub struct ChannelLease {
    name: String,
    registry: Arc<DashMap<String, usize>>,
    _upstream: Option<DropGuard>,
}

impl ChannelLease {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for ChannelLease {
    fn drop(&mut self) {
        {
            if let Some(mut count) = self.registry.get_mut(&self.name) {
                *count = count.saturating_sub(1);
            }
        }
        self.registry.remove_if(&self.name, |_, count| *count == 0);
        debug!(channel = %self.name, "live channel closed");
    }
}

/// Receiving half of a live channel.
#[derive(Debug)]
pub struct ChangeReceiver {
    channel: String,
    inner: broadcast::Receiver<RowChange>,
}

impl ChangeReceiver {
    /// Next change, or `None` once the feed is gone.
    ///
    /// A lagged receiver skips the missed changes and keeps going.
    pub async fn recv(&mut self) -> Option<RowChange> {
        loop {
            match self.inner.recv().await {
                Ok(change) => return Some(change),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(channel = %self.channel, skipped, "live channel lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
