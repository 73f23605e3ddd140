//! Recomendify chat CLI and server entry point.
//!
//! Binary name: `rcmd`
//!
//! Parses CLI arguments, sets up tracing, then either starts the HTTP server
//! or builds the client state and dispatches to a command handler.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;
use recomendify_infra::llm::OpenAiCompletion;
use recomendify_observe::tracing_setup::{filter_for, init_tracing, shutdown_tracing};

use cli::{Cli, Commands};
use state::{ClientState, ServerState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions need neither tracing nor state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "rcmd", &mut std::io::stdout());
        return Ok(());
    }

    if let Commands::Serve { port, host, otel } = &cli.command {
        let filter = match cli.verbose {
            0 if cli.quiet => "error",
            0 => "info",
            _ => filter_for(cli.verbose, cli.quiet),
        };
        init_tracing(filter, *otel).map_err(|e| anyhow::anyhow!("{e}"))?;
        let result = serve(host, *port).await;
        shutdown_tracing();
        return result;
    }

    init_tracing(filter_for(cli.verbose, cli.quiet), false)
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    let state = ClientState::init().await?;

    match cli.command {
        Commands::Chat { peer } => {
            cli::chat::loop_runner::run_chat_loop(&state, peer.as_deref()).await?;
        }
        Commands::Peers => {
            cli::peers::list_peers(&state, cli.json).await?;
        }
        Commands::Send { peer, text } => {
            cli::send::send_message(&state, &peer, &text, cli.json).await?;
        }
        Commands::History { clear } => {
            cli::history::show_history(&state, clear, cli.json).await?;
        }
        Commands::Login { email, register } => {
            cli::session::login(&state, &email, register, cli.json).await?;
        }
        Commands::Logout => {
            cli::session::logout(&state, cli.json).await?;
        }
        Commands::Whoami => {
            cli::session::whoami(&state, cli.json)?;
        }
        Commands::Serve { .. } | Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// Run the HTTP server until Ctrl+C or SIGTERM.
async fn serve(host: &str, port: u16) -> anyhow::Result<()> {
    let (state, config) = ServerState::<OpenAiCompletion>::init().await?;

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    println!(
        "  {} Recomendify server listening on {}",
        console::style("⚡").bold(),
        console::style(format!("http://{addr}")).cyan()
    );
    println!(
        "  {}",
        console::style(format!(
            "database: {}, bot: {}",
            config.database_file,
            if state.bot.is_some() { config.bot.model.as_str() } else { "disabled" }
        ))
        .dim()
    );
    println!("  {}", console::style("Press Ctrl+C to stop").dim());

    let router = http::router::build_router(state);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    println!("\n  Server stopped.");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
