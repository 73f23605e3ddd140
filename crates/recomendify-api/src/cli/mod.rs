//! CLI command definitions for the `rcmd` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod chat;
pub mod history;
pub mod peers;
pub mod send;
pub mod session;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Private messaging for Recomendify: chat with friends and the
/// recommendation bot.
#[derive(Parser)]
#[command(name = "rcmd", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open an interactive conversation.
    Chat {
        /// Peer id or name. Prompts with a picker when omitted.
        peer: Option<String>,
    },

    /// List the people (and the bot) you can chat with.
    #[command(alias = "ls")]
    Peers,

    /// Send one message and exit. Waits for the answer when the peer is the bot.
    Send {
        /// Peer id or name.
        peer: String,
        /// Message text.
        text: String,
    },

    /// Show the bot conversation history stored on this machine.
    History {
        /// Delete the stored bot history instead.
        #[arg(long)]
        clear: bool,
    },

    /// Sign in by email and remember it for later commands.
    Login {
        email: String,
        /// Create the profile first.
        #[arg(long)]
        register: bool,
    },

    /// Forget the remembered sign-in.
    Logout,

    /// Show the signed-in user.
    Whoami,

    /// Start the HTTP server (REST, realtime, bot function).
    Serve {
        /// Port to listen on.
        #[arg(long, default_value = "54321")]
        port: u16,

        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Export traces to stdout through OpenTelemetry.
        #[arg(long)]
        otel: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}
