//! Release command implementation.
//!
//! Runs the full pipeline. A failure after repository changes triggers the
//! revert hook before the error is reported.

use super::helpers::{ConsoleObserver, load_context};
use crate::cli::{Args, RuntimeConfig};
use crate::error::Result;
use crate::release::run_release;

/// Execute release command
pub(super) async fn execute_release(args: &Args, config: &RuntimeConfig) -> Result<()> {
    let mut ctx = load_context(args)?;
    config.info_println(&format!(
        "Releasing {} {}",
        ctx.project.name, ctx.project.version
    ));

    let mut observer = ConsoleObserver::new(config);
    run_release(&mut ctx, &mut observer).await?;

    let tag = ctx
        .scm
        .as_ref()
        .and_then(|scm| scm.session().tag.clone())
        .unwrap_or_default();
    config.success_println(&format!(
        "Released tag {}, next version is {}",
        tag, ctx.project.version
    ));
    Ok(())
}
