//! Check command implementation.
//!
//! Runs only the verification steps, so it never touches the repository.

use super::helpers::{ConsoleObserver, load_context};
use crate::cli::{Args, RuntimeConfig};
use crate::error::Result;
use crate::release::run_checks;

/// Execute check command
pub(super) async fn execute_check(args: &Args, config: &RuntimeConfig) -> Result<()> {
    let mut ctx = load_context(args)?;
    let mut observer = ConsoleObserver::new(config);
    run_checks(&mut ctx, &mut observer).await?;
    config.success_println(&format!(
        "{} {} is ready for release",
        ctx.project.name, ctx.project.version
    ));
    Ok(())
}
