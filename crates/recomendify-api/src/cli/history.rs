//! `rcmd history`: the bot conversation stored on this machine.

use anyhow::Result;
use console::style;

use recomendify_core::storage::BotHistory;
use recomendify_types::peer::BOT_DISPLAY_NAME;

use crate::cli::chat::render::format_message;
use crate::state::ClientState;

pub async fn show_history(state: &ClientState, clear: bool, json: bool) -> Result<()> {
    let history = BotHistory::new(state.local_storage.clone());

    if clear {
        history.clear().await?;
        if json {
            println!("{}", serde_json::json!({ "cleared": true }));
        } else {
            println!("\n  {}\n", style("Bot history cleared.").dim());
        }
        return Ok(());
    }

    let messages = history.load().await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&messages)?);
        return Ok(());
    }

    if messages.is_empty() {
        println!(
            "\n  {} No bot conversation yet. Start one with: {}\n",
            style("i").blue().bold(),
            style("rcmd chat bot-assistente-001").yellow()
        );
        return Ok(());
    }

    println!();
    for message in &messages {
        println!("{}", format_message(message, !message.is_bot, BOT_DISPLAY_NAME));
    }
    println!();
    Ok(())
}
