//! `rcmd send`: one message through the conversation engine.

use anyhow::Result;
use console::style;

use recomendify_core::chat::SendOutcome;

use crate::cli::chat::render::spinner;
use crate::cli::peers::resolve_peer;
use crate::state::ClientState;

pub async fn send_message(state: &ClientState, peer: &str, text: &str, json: bool) -> Result<()> {
    let session = state.require_session()?;
    let peer = resolve_peer(state, &session.user_id, peer).await?;

    let engine = state.engine(&session.user_id);
    engine.initialize(peer.clone()).await?;

    let thinking = (peer.is_bot && !json)
        .then(|| spinner(format!("{} está pensando...", peer.label())));

    let outcome = engine.send_text(text).await;
    if let Some(thinking) = thinking {
        thinking.finish_and_clear();
    }
    engine.close();

    match outcome? {
        SendOutcome::Ignored => anyhow::bail!("message is empty"),
        SendOutcome::Delivered(row) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&row)?);
            } else {
                println!(
                    "\n  {} Sent to {}\n",
                    style("✓").green().bold(),
                    style(peer.label()).cyan()
                );
            }
        }
        SendOutcome::Answered { reply, .. } => {
            if json {
                println!("{}", serde_json::to_string_pretty(&reply)?);
            } else {
                println!(
                    "\n  {} {}\n",
                    style(format!("{}:", peer.label())).magenta().bold(),
                    reply.content
                );
            }
        }
    }

    Ok(())
}
