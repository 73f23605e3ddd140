//! Main chat loop orchestration.
//!
//! Resolves the peer, opens the conversation, prints the history and then
//! runs two things side by side: the input loop (messages and slash
//! commands) and a render task that prints rows as the engine merges them.

use std::collections::HashSet;
use std::io::Write;
use std::sync::Arc;

use console::style;
use dialoguer::Select;
use rustyline_async::SharedWriter;
use tracing::{debug, warn};

use recomendify_core::chat::{Phase, SendOutcome, find_peer};
use recomendify_types::peer::ConversationPeer;

use crate::cli::peers::load_peers;
use crate::state::{ChatEngine, ClientState};

use super::banner::print_welcome_banner;
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};
use super::render::{format_message, spinner};

/// Ask the user which peer to talk to.
fn pick_peer(peers: &[ConversationPeer]) -> anyhow::Result<ConversationPeer> {
    let labels: Vec<&str> = peers.iter().map(ConversationPeer::label).collect();
    let index = Select::new()
        .with_prompt("Conversar com")
        .items(&labels)
        .default(0)
        .interact()?;
    Ok(peers[index].clone())
}

/// Run the interactive chat loop.
pub async fn run_chat_loop(state: &ClientState, peer_query: Option<&str>) -> anyhow::Result<()> {
    let session = state.require_session()?;
    let peers = load_peers(state, &session.user_id).await?;
    let peer = match peer_query {
        Some(query) => find_peer(&peers, query).cloned().ok_or_else(|| {
            anyhow::anyhow!("no peer named '{query}'. List them with: rcmd peers")
        })?,
        None => pick_peer(&peers)?,
    };
    let user_id = session.user_id.clone();
    let peer_label = peer.label().to_string();

    let engine = Arc::new(state.engine(&user_id));

    let loading = spinner("carregando mensagens...".to_string());
    let opened = engine.initialize(peer.clone()).await;
    loading.finish_and_clear();
    if let Err(e) = &opened {
        warn!(error = %e, peer_id = %peer.id, "conversation failed to load");
    }

    print_welcome_banner(&peer, session.label(), engine.active_channel().is_some());

    let snapshot = engine.snapshot();
    for message in &snapshot.messages {
        println!(
            "{}",
            format_message(message, message.sender_id == user_id, &peer_label)
        );
    }
    if let Some(notice) = &snapshot.error {
        println!("  {} {}", style("!").red().bold(), style(notice).red());
        println!("  {}", style("Use /reload to try again.").dim());
    }
    if !snapshot.messages.is_empty() {
        println!();
    }

    let prompt = format!("  {} ", style("Você >").green().bold());
    let (mut chat_input, mut writer) = ChatInput::new(prompt)
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    let printed: HashSet<String> = snapshot.messages.iter().map(|m| m.id.clone()).collect();
    let renderer = tokio::spawn(render_updates(
        Arc::clone(&engine),
        writer.clone(),
        printed,
        user_id.clone(),
        peer_label.clone(),
    ));

    loop {
        match chat_input.read_line().await {
            InputEvent::Eof => break,
            InputEvent::Interrupted => {
                let _ = writeln!(writer, "  {}", style("Press Ctrl+D to exit, or keep chatting.").dim());
                continue;
            }
            InputEvent::Message(text) => {
                if text.is_empty() {
                    continue;
                }

                if let Some(cmd) = commands::parse(&text) {
                    match cmd {
                        ChatCommand::Help => {
                            let _ = write!(writer, "{}", commands::help_text());
                        }
                        ChatCommand::History => {
                            let _ = writeln!(writer);
                            for message in engine.snapshot().messages {
                                let own = message.sender_id == user_id;
                                let _ = writeln!(writer, "{}", format_message(&message, own, &peer_label));
                            }
                            let _ = writeln!(writer);
                        }
                        ChatCommand::Clear => chat_input.clear(),
                        ChatCommand::Reload => {
                            if let Err(e) = engine.reload().await {
                                let _ = writeln!(writer, "  {} {e}", style("!").red().bold());
                            }
                        }
                        ChatCommand::ResetBot => {
                            if !peer.is_bot {
                                let _ = writeln!(writer, "  {} Only the bot conversation can be reset.", style("i").blue().bold());
                                continue;
                            }
                            match engine.clear_bot_history().await {
                                Ok(()) => {
                                    let _ = writeln!(writer, "  {}", style("Bot history cleared.").dim());
                                }
                                Err(e) => {
                                    let _ = writeln!(writer, "  {} {e}", style("!").red().bold());
                                }
                            }
                        }
                        ChatCommand::Exit => break,
                        ChatCommand::Unknown(name) => {
                            let _ = writeln!(
                                writer,
                                "  {} Unknown command: {}. Type /help for available commands.",
                                style("?").yellow().bold(),
                                style(name).dim()
                            );
                        }
                    }
                    continue;
                }

                if engine.phase() != Phase::Ready {
                    let _ = writeln!(writer, "  {} Conversation is not loaded. Use /reload.", style("!").yellow().bold());
                    continue;
                }

                let thinking = peer.is_bot.then(|| spinner(format!("{peer_label} está pensando...")));
                let outcome = engine.send_text(&text).await;
                if let Some(thinking) = thinking {
                    thinking.finish_and_clear();
                }

                match outcome {
                    Ok(SendOutcome::Delivered(row)) => debug!(message_id = %row.id, "message delivered"),
                    Ok(SendOutcome::Answered { .. }) | Ok(SendOutcome::Ignored) => {}
                    Err(e) => {
                        let notice = engine.snapshot().error.unwrap_or_else(|| e.to_string());
                        let _ = writeln!(writer, "  {} {}", style("!").red().bold(), style(notice).red());
                        debug!(error = %e, "send failed");
                    }
                }
            }
        }
    }

    renderer.abort();
    engine.close();
    chat_input.flush();
    println!("\n  {}", style("Conversa encerrada.").dim());
    Ok(())
}

/// Print every row the engine merges that this terminal has not shown yet.
///
/// The user's own rows are only recorded: readline already echoed them.
async fn render_updates(
    engine: Arc<ChatEngine>,
    mut out: SharedWriter,
    mut printed: HashSet<String>,
    user_id: String,
    peer_label: String,
) {
    let mut updates = engine.updates();
    while updates.changed().await.is_ok() {
        for message in engine.snapshot().messages {
            if printed.insert(message.id.clone()) && message.sender_id != user_id {
                let _ = writeln!(out, "{}", format_message(&message, false, &peer_label));
            }
        }
    }
}
