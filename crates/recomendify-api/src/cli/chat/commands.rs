//! Slash command parsing for the chat loop.

use console::style;

/// Available slash commands in the chat loop.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    /// Show available commands.
    Help,
    /// Reprint the whole conversation.
    History,
    /// Clear the terminal screen.
    Clear,
    /// Fetch the conversation again.
    Reload,
    /// Delete the stored bot conversation.
    ResetBot,
    /// Leave the chat.
    Exit,
    /// Unknown command.
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let cmd = trimmed
        .split_whitespace()
        .next()
        .unwrap_or(trimmed)
        .to_lowercase();

    match cmd.as_str() {
        "/help" | "/h" | "/?" => Some(ChatCommand::Help),
        "/history" => Some(ChatCommand::History),
        "/clear" | "/cls" => Some(ChatCommand::Clear),
        "/reload" => Some(ChatCommand::Reload),
        "/reset-bot" => Some(ChatCommand::ResetBot),
        "/exit" | "/quit" | "/q" => Some(ChatCommand::Exit),
        other => Some(ChatCommand::Unknown(other.to_string())),
    }
}

/// The help text listing all available commands.
pub fn help_text() -> String {
    let rows = [
        ("/help", "Show this help message"),
        ("/history", "Show the whole conversation"),
        ("/clear", "Clear the screen"),
        ("/reload", "Fetch the conversation again"),
        ("/reset-bot", "Delete the bot conversation stored on this machine"),
        ("/exit", "Leave the chat"),
    ];

    let mut text = format!("\n  {}\n\n", style("Available commands:").bold());
    for (name, description) in rows {
        text.push_str(&format!("  {:<12} {}\n", style(name).cyan(), description));
    }
    text.push_str(&format!(
        "\n  {}\n",
        style("Ctrl+D to exit, Ctrl+C clears the line").dim()
    ));
    text
}
