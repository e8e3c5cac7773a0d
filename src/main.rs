//! mexline - Offline inspection tool for newsletter requests
//!
//! Prints the stanzas newsletter operations would send, projects saved
//! metadata payloads, and shows the effective auto-follow configuration.

mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use mexline_protocol::NewsletterJid;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mexline")]
#[command(about = "Inspect newsletter request envelopes and metadata payloads")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the request envelope an operation would send
    Envelope {
        /// Operation to render
        #[arg(value_enum)]
        op: Operation,

        /// Newsletter jid (e.g. 120363419833061999@newsletter)
        jid: NewsletterJid,
    },

    /// Project a saved metadata response payload
    Extract {
        /// File holding the JSON text of the response's result node
        file: PathBuf,

        /// Read the payload as a create response
        #[arg(long)]
        create: bool,
    },

    /// Show the effective auto-follow configuration
    Config {
        /// Path to a YAML config file (defaults to MEXLINE_CONFIG)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Newsletter operation selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Operation {
    Follow,
    Unfollow,
    Mute,
    Unmute,
    Delete,
    Metadata,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match commands::execute(cli.command).await {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("{}: {}", "Error".red(), e);
            std::process::exit(1);
        }
    }
}
