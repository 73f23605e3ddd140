//! Message store trait definition.

use recomendify_types::error::StoreError;
use recomendify_types::message::{NewMessage, PrivateMessage};

use crate::realtime::LiveChannel;

/// Store of private messages with a live change feed.
///
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait MessageStore: Send + Sync {
    /// All messages exchanged between `user_id` and `peer_id` in either
    /// direction, ordered by `created_at` ascending.
    fn fetch_conversation(
        &self,
        user_id: &str,
        peer_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<PrivateMessage>, StoreError>> + Send;

    /// Insert a message. The store assigns `id` and `created_at` and returns
    /// the stored row.
    fn insert_message(
        &self,
        message: &NewMessage,
    ) -> impl std::future::Future<Output = Result<PrivateMessage, StoreError>> + Send;

    /// Open a live channel receiving every `private_messages` row change.
    fn subscribe(
        &self,
        channel: &str,
    ) -> impl std::future::Future<Output = Result<LiveChannel, StoreError>> + Send;
}

impl<T: MessageStore> MessageStore for std::sync::Arc<T> {
    fn fetch_conversation(
        &self,
        user_id: &str,
        peer_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<PrivateMessage>, StoreError>> + Send {
        (**self).fetch_conversation(user_id, peer_id)
    }

    fn insert_message(
        &self,
        message: &NewMessage,
    ) -> impl std::future::Future<Output = Result<PrivateMessage, StoreError>> + Send {
        (**self).insert_message(message)
    }

    fn subscribe(
        &self,
        channel: &str,
    ) -> impl std::future::Future<Output = Result<LiveChannel, StoreError>> + Send {
        (**self).subscribe(channel)
    }
}
