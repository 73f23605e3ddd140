//! Message formatting for the terminal.

use std::time::Duration;

use chrono::Local;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use recomendify_types::message::PrivateMessage;

/// One line for `message`: local time, author, content.
///
/// `own` marks messages sent by the current user; everything else is
/// attributed to `peer_label`.
pub fn format_message(message: &PrivateMessage, own: bool, peer_label: &str) -> String {
    let time = message.created_at.with_timezone(&Local).format("%H:%M");
    let author = if own {
        style("Você".to_string()).green().bold()
    } else if message.is_bot {
        style(peer_label.to_string()).magenta().bold()
    } else {
        style(peer_label.to_string()).cyan().bold()
    };
    format!("  {} {} {}", style(time).dim(), author, message.content)
}

/// Steady-ticking spinner shown while waiting on the engine.
pub fn spinner(message: impl Into<String>) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("  {spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}
