//! Command execution functions coordinating release operations.
//!
//! This module dispatches the parsed command and turns its outcome into an
//! exit code, reporting failures with recovery suggestions.

mod check;
mod helpers;
mod release;
mod steps;

use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::Result;

use check::execute_check;
use helpers::print_suggestions;
use release::execute_release;
use steps::execute_steps;

/// Execute the main command based on parsed arguments.
///
/// Invalid arguments are returned as errors so the caller reports them as
/// fatal; command failures are reported here and mapped to exit code 1.
pub async fn execute_command(args: Args) -> Result<i32> {
    args.validate()?;

    let config = RuntimeConfig::from(&args);
    let command = args.command();

    let result = match command {
        Command::Release => execute_release(&args, &config).await,
        Command::Check => execute_check(&args, &config).await,
        Command::Steps => execute_steps(&config),
    };

    match result {
        Ok(()) => Ok(0),
        Err(e) => {
            config.error_println(&format!("Command '{}' failed: {}", command.name(), e));
            print_suggestions(&config, &e);
            Ok(1)
        }
    }
}
