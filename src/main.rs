//! Fastback
//!
//! Schema-driven backend scaffolding for axum + sqlx.
//!
//! This is the main entry point: it installs logging, prints the banner and
//! hands the parsed command to `fastback_cli`.

use clap::Parser;
use fastback_cli::{Cli, Command, output};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Print startup banner, except where stdout carries data
    if !matches!(cli.command, Command::Inspect { json: true }) {
        banner();
    }

    if let Err(error) = fastback_cli::run(cli).await {
        tracing::error!("{:#}", error);
        output::error(&error);
        std::process::exit(1);
    }
}

fn banner() {
    println!();
    println!("╔═══════════════════════════════════════════════════════════╗");
    println!("║                                                           ║");
    println!("║   Fastback v{:<46}║", fastback_cli::VERSION);
    println!("║   Backend scaffolding from a live database schema         ║");
    println!("║                                                           ║");
    println!("╚═══════════════════════════════════════════════════════════╝");
    println!();
}
