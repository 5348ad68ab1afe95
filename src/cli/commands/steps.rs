//! Steps command implementation.

use crate::cli::RuntimeConfig;
use crate::error::Result;
use crate::release::{Pipeline, release_steps};

/// Print the step catalogue in execution order
pub(super) fn execute_steps(config: &RuntimeConfig) -> Result<()> {
    let pipeline = Pipeline::new(release_steps())?;
    for (position, step) in pipeline.steps().iter().enumerate() {
        let marker = if step.skip_if.is_some() { " (conditional)" } else { "" };
        config.println(&format!(
            "{:>2}. {:<32} {}{}",
            position + 1,
            step.name,
            step.description,
            marker
        ));
    }
    Ok(())
}
