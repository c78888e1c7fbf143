//! CLI argument definitions and command implementations.

pub mod status;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Engram -- user memory service for a chat data-analysis assistant.
#[derive(Debug, Parser)]
#[command(name = "engram", version, about)]
pub struct Cli {
    /// Emit machine-readable JSON instead of styled output.
    #[arg(long, global = true)]
    pub json: bool,

    /// Bridge tracing spans to OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Bind host (overrides config.toml).
        #[arg(long)]
        host: Option<String>,
        /// Bind port (overrides config.toml).
        #[arg(long)]
        port: Option<u16>,
    },

    /// Show service status: data dir, memory counts, analytics state.
    Status,

    /// Generate shell completions.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}
