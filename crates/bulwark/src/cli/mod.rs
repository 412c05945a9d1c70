//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the bulwark binary.

mod commands;
mod handlers;

pub use commands::{Cli, Commands, OutputFormat};
pub use handlers::{classify_response_command, show_backoff, show_limits};
