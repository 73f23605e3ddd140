//! `rcmd peers` and peer resolution shared by the chat commands.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use recomendify_core::chat::{chat_peers, find_peer};
use recomendify_core::repository::ProfileDirectory;
use recomendify_types::peer::ConversationPeer;

use crate::state::ClientState;

/// Every peer the signed-in user can chat with, bot first.
pub async fn load_peers(state: &ClientState, user_id: &str) -> Result<Vec<ConversationPeer>> {
    let profiles = state.store.list_profiles().await?;
    Ok(chat_peers(&profiles, user_id))
}

/// Resolve a peer by id or display name.
pub async fn resolve_peer(
    state: &ClientState,
    user_id: &str,
    query: &str,
) -> Result<ConversationPeer> {
    let peers = load_peers(state, user_id).await?;
    find_peer(&peers, query).cloned().ok_or_else(|| {
        anyhow::anyhow!("no peer named '{query}'. List them with: rcmd peers")
    })
}

/// List chat peers in a table.
pub async fn list_peers(state: &ClientState, json: bool) -> Result<()> {
    let session = state.require_session()?;
    let peers = load_peers(state, &session.user_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&peers)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Name").fg(Color::White),
        Cell::new("ID").fg(Color::White),
        Cell::new("Kind").fg(Color::White),
    ]);

    for peer in &peers {
        let kind = if peer.is_bot {
            Cell::new("bot").fg(Color::Magenta)
        } else {
            Cell::new("user").fg(Color::Green)
        };
        table.add_row(vec![
            Cell::new(peer.label()).fg(Color::Cyan),
            Cell::new(&peer.id).fg(Color::DarkGrey),
            kind,
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} peer{}",
        style(peers.len()).bold(),
        if peers.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}
