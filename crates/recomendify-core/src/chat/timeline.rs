//! Ordered, duplicate-free message sequence of one conversation.

use std::collections::HashSet;

use recomendify_types::message::PrivateMessage;

/// Messages sorted ascending by `created_at`, at most one per id.
///
/// Equal timestamps keep arrival order.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    messages: Vec<PrivateMessage>,
    ids: HashSet<String>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `message` in order. Returns `false` if its id is already held.
    pub fn merge(&mut self, message: PrivateMessage) -> bool {
        if self.ids.contains(&message.id) {
            return false;
        }
        let at = self
            .messages
            .partition_point(|m| m.created_at <= message.created_at);
        self.ids.insert(message.id.clone());
        self.messages.insert(at, message);
        true
    }

    /// Append a locally created message. Local timestamps come from the
    /// clock, so this lands at the end unless the clock went backwards.
    pub fn push_local(&mut self, message: PrivateMessage) -> bool {
        self.merge(message)
    }

    /// Merge every message, returning how many were new.
    pub fn extend_merged(&mut self, messages: impl IntoIterator<Item = PrivateMessage>) -> usize {
        messages
            .into_iter()
            .map(|m| self.merge(m))
            .filter(|added| *added)
            .count()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&PrivateMessage> {
        self.messages.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PrivateMessage> {
        self.messages.iter()
    }

    pub fn as_slice(&self) -> &[PrivateMessage] {
        &self.messages
    }

    pub fn to_vec(&self) -> Vec<PrivateMessage> {
        self.messages.clone()
    }
}
