//! CLI command definitions
//!
//! Defines the clap commands for the idea-e2e CLI.

use clap::{Args, Subcommand};
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Run a scenario against the API (the built-in lifecycle scenario by default)
    Run {
        /// YAML scenario file to run instead of the built-in one
        #[arg(long, short)]
        scenario: Option<PathBuf>,

        #[command(flatten)]
        connection: ConnectionArgs,

        /// Print requests and response bodies
        #[arg(long, short)]
        verbose: bool,
    },

    /// Print the built-in scenario as YAML
    Scenario,

    /// Show the config file location and resolved settings
    Config {
        #[command(flatten)]
        connection: ConnectionArgs,
    },
}

/// Connection settings that override config file and environment
#[derive(Args, Debug, Default)]
pub struct ConnectionArgs {
    /// API base URL, including the `/api` prefix
    #[arg(long)]
    pub base_url: Option<String>,

    /// Login email
    #[arg(long)]
    pub email: Option<String>,

    /// Login password (prefer IDEA_API_PASSWORD)
    #[arg(long)]
    pub password: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}
