//! `rcmd login`, `rcmd logout` and `rcmd whoami`.

use anyhow::Result;
use console::style;

use recomendify_core::auth::SessionProvider;
use recomendify_infra::config::save_client_config;
use recomendify_types::session::Session;

use crate::state::ClientState;

/// Sign in (optionally registering first) and remember the email.
pub async fn login(state: &ClientState, email: &str, register: bool, json: bool) -> Result<()> {
    let session = if register {
        state.sessions.register(email).await?
    } else {
        state.sessions.sign_in(email).await?
    };

    let mut config = state.config.clone();
    config.auth.email = session.email.clone().or_else(|| Some(email.to_string()));
    save_client_config(&state.data_dir, &config).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&session)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Signed in as {}",
        style("✓").green().bold(),
        style(session.label()).cyan().bold()
    );
    println!();
    Ok(())
}

/// Sign out and forget the remembered email.
pub async fn logout(state: &ClientState, json: bool) -> Result<()> {
    state.sessions.sign_out().await?;

    let mut config = state.config.clone();
    config.auth.email = None;
    save_client_config(&state.data_dir, &config).await?;

    if json {
        println!("{}", serde_json::json!({ "signed_in": false }));
    } else {
        println!("\n  {}\n", style("Signed out.").dim());
    }
    Ok(())
}

/// Print the current session.
pub fn whoami(state: &ClientState, json: bool) -> Result<()> {
    let session = state.sessions.current_session();

    if json {
        println!("{}", serde_json::to_string_pretty(&session)?);
        return Ok(());
    }

    match session {
        Some(session) => print_session(&session),
        None => println!(
            "\n  {} Not signed in. Run: {}\n",
            style("i").blue().bold(),
            style("rcmd login <EMAIL>").yellow()
        ),
    }
    Ok(())
}

fn print_session(session: &Session) {
    println!();
    println!("  {}  {}", style("User:").bold(), style(session.label()).cyan());
    println!("  {}  {}", style("ID:").bold(), style(&session.user_id).dim());
    if let Some(email) = &session.email {
        println!("  {}  {}", style("Email:").bold(), email);
    }
    println!("  {}  {}", style("Auth:").bold(), session.provider);
    println!();
}
