//! Bulwark CLI binary.
//!
//! Inspection tools for the resilience layer:
//! - Show the resolved per-provider rate limits
//! - Classify an HTTP response into the provider error taxonomy
//! - Sample the configured retry backoff schedule

use bulwark::{BulwarkConfig, ObservabilityConfig, init_logging};
use clap::Parser;

mod cli;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, classify_response_command, show_backoff, show_limits};

    // Parse command-line arguments
    let cli = Cli::parse();

    // Initialize tracing
    let mut observability = ObservabilityConfig::new().with_json_logs(cli.json_logs);
    if cli.verbose {
        observability = observability.with_log_level("info,bulwark=debug");
    }
    init_logging(&observability)?;

    let config = match &cli.config {
        Some(path) => BulwarkConfig::from_file(path)?,
        None => BulwarkConfig::load()?,
    };

    // Execute the requested command
    match cli.command {
        Commands::Limits { provider, format } => {
            show_limits(&config, provider.as_deref(), &format)?;
        }

        Commands::Classify {
            status,
            headers,
            body,
            provider,
            format,
        } => {
            classify_response_command(status, &headers, body.as_deref(), &provider, &format)?;
        }

        Commands::Backoff { count } => {
            show_backoff(&config, count)?;
        }
    }

    Ok(())
}
