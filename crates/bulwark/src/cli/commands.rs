//! CLI command definitions.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Bulwark - inspect rate limits, failure classification, and retry backoff
#[derive(Parser, Debug)]
#[command(name = "bulwark")]
#[command(about = "Inspect provider rate limits, failure classification, and retry backoff", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Load configuration from this file instead of the default locations
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the resolved requests-per-minute table
    Limits {
        /// Only show this provider
        #[arg(long)]
        provider: Option<String>,

        /// Output format
        #[arg(long, default_value = "human")]
        format: OutputFormat,
    },

    /// Classify an HTTP response into the provider error taxonomy
    Classify {
        /// HTTP status code
        #[arg(long)]
        status: u16,

        /// Response header as NAME:VALUE (repeatable)
        #[arg(long = "header", value_name = "NAME:VALUE")]
        headers: Vec<String>,

        /// Response body
        #[arg(long)]
        body: Option<String>,

        /// Provider id to tag the error with
        #[arg(long, default_value = "unknown")]
        provider: String,

        /// Output format
        #[arg(long, default_value = "human")]
        format: OutputFormat,
    },

    /// Print the delay schedule of the configured retry policy
    Backoff {
        /// Number of delays to print (defaults to max_attempts - 1)
        #[arg(long)]
        count: Option<u32>,
    },
}

/// Output format options
#[derive(ValueEnum, Clone, Debug)]
pub enum OutputFormat {
    /// Human-readable format
    Human,
    /// JSON format
    Json,
}
