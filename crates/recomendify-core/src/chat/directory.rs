//! The list of people the current user can chat with.

use recomendify_types::peer::{ConversationPeer, Profile};

/// The bot assistant first, then every profile except the current user, in
/// the order given.
pub fn chat_peers(profiles: &[Profile], current_user_id: &str) -> Vec<ConversationPeer> {
    std::iter::once(ConversationPeer::assistant())
        .chain(
            profiles
                .iter()
                .filter(|p| p.id != current_user_id)
                .map(Profile::to_peer),
        )
        .collect()
}

/// Find a peer by id or by (case-insensitive) label.
pub fn find_peer<'a>(peers: &'a [ConversationPeer], query: &str) -> Option<&'a ConversationPeer> {
    peers
        .iter()
        .find(|p| p.id == query)
        .or_else(|| peers.iter().find(|p| p.label().eq_ignore_ascii_case(query)))
}
