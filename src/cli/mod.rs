//! Command line interface for kodegen_scm_release.
//!
//! This module provides argument parsing, command execution, and colored
//! user feedback for release runs.

mod args;
pub mod commands;
mod output;

pub use args::{Args, Command, RuntimeConfig};
pub use commands::execute_command;
pub use output::OutputManager;

use crate::error::Result;

/// Main CLI entry point
pub async fn run(args: Args) -> Result<i32> {
    execute_command(args).await
}

/// Parse arguments without executing
pub fn parse_args() -> Args {
    Args::parse_args()
}
