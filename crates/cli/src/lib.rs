//! # Fastback CLI
//!
//! Command-line interface for Fastback.
//!
//! Every command reads the whole schema once over a fresh connection; there
//! is no per-table selection.
//!
//! ## Commands
//!
//! - `models` - Generate `src/models`
//! - `repositories` - Generate `src/repositories`
//! - `controllers` - Generate `src/controllers`
//! - `all` - All three, over one introspection pass
//! - `inspect` - Print tables, relationships and inferred routes
//!

pub mod commands;
pub mod config;
pub mod output;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fastback_codegen::ArtifactRole;
use std::path::PathBuf;

use config::{FileConfig, Overrides, Settings};

/// CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Arguments
// ============================================================================

/// Generate an axum + sqlx backend from a live database schema
#[derive(Debug, Parser)]
#[command(name = "fastback", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Connection URL of the schema to read
    #[arg(long, global = true, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Output root for generated code
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Configuration file (default: ./fastback.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Delete artifacts of tables no longer in the schema
    #[arg(long, global = true)]
    pub prune: bool,

    /// Debug-level logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Generate one model per table
    Models,
    /// Generate one repository per keyed table
    Repositories,
    /// Generate one controller per keyed table
    Controllers,
    /// Generate models, repositories and controllers
    All,
    /// Show what the schema looks like to the generator
    Inspect {
        /// Print the raw snapshot as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Command {
    /// Roles a generating command produces; empty for `inspect`
    pub fn roles(&self) -> &'static [ArtifactRole] {
        match self {
            Command::Models => &[ArtifactRole::Model],
            Command::Repositories => &[ArtifactRole::Repository],
            Command::Controllers => &[ArtifactRole::Controller],
            Command::All => ArtifactRole::all(),
            Command::Inspect { .. } => &[],
        }
    }
}

impl Cli {
    /// Settings for this invocation, with `fastback.toml` looked up in `dir`
    pub fn settings(&self, dir: &std::path::Path) -> Result<Settings> {
        let file = FileConfig::discover(self.config.as_deref(), dir)
            .context("Could not read the configuration file")?;
        let overrides = Overrides {
            database_url: self.database_url.clone(),
            output_dir: self.output.clone(),
            prune: self.prune,
        };
        Ok(Settings::resolve(&overrides, file)?)
    }
}

// ============================================================================
// Entry point
// ============================================================================

/// Run the parsed command
pub async fn run(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir().context("Could not read the working directory")?;
    let settings = cli.settings(&cwd)?;

    match &cli.command {
        Command::Inspect { json } => commands::inspect(&settings, *json).await,
        command => commands::generate(&settings, command.roles()).await,
    }
}

// ============================================================================
// Tests
// ============================================================================
