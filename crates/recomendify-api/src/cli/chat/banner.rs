//! Welcome banner display for chat sessions.

use console::style;

use recomendify_types::peer::ConversationPeer;

/// Print the banner shown when a conversation opens.
pub fn print_welcome_banner(peer: &ConversationPeer, user_label: &str, live: bool) {
    let marker = if peer.is_bot { "🤖" } else { "💬" };

    println!();
    println!("  {} {}", marker, style(peer.label()).cyan().bold());
    if peer.is_bot {
        println!("  {}", style("Dicas de livros e filmes").dim());
    }
    println!();
    println!("  {}  {}", style("Você:").bold(), style(user_label).dim());
    if !peer.is_bot {
        let status = if live {
            style("ao vivo").green()
        } else {
            style("sem atualizações ao vivo").yellow()
        };
        println!("  {}  {}", style("Canal:").bold(), status);
    }
    println!();
    println!(
        "  {}",
        style("Type /help for commands, Ctrl+D to exit").dim()
    );
    println!("  {}", style("---").dim());
    println!();
}
