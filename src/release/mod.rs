//! Release orchestration.
//!
//! This module assembles the canonical steps into a pipeline, runs it, and
//! reverts the repository when the aggregate `release` step fails.

mod context;
mod pipeline;
mod step;
mod steps;

pub use context::ReleaseContext;
pub use pipeline::{Pipeline, SilentObserver, StepObserver};
pub use step::{SkipPredicate, Step, StepAction, StepFuture};
pub use steps::{CHECK_STEPS, release_steps};

use crate::error::{PipelineError, ReleaseError, Result};
use crate::git::{ScmAdapter, find_scm_adapter};

/// Run the full release, reverting on failure when configured to
pub async fn run_release(ctx: &mut ReleaseContext, observer: &mut dyn StepObserver) -> Result<()> {
    let pipeline = Pipeline::new(release_steps())?;
    match pipeline.run(ctx, observer).await {
        Ok(()) => Ok(()),
        Err(error) => Err(on_release_failed(ctx, error).await),
    }
}

/// Run the verification-only steps. Nothing is mutated, so nothing is reverted.
pub async fn run_checks(ctx: &mut ReleaseContext, observer: &mut dyn StepObserver) -> Result<()> {
    Pipeline::new(release_steps())?
        .select(CHECK_STEPS)?
        .run(ctx, observer)
        .await
}

/// Failure hook of the `release` step.
///
/// Acquiring an adapter is best effort. The revert itself is not: its error
/// replaces the original one.
async fn on_release_failed(ctx: &mut ReleaseContext, error: ReleaseError) -> ReleaseError {
    if ctx.scm.is_none() {
        match find_scm_adapter(&ctx.config, &ctx.project.dir) {
            Ok(scm) => ctx.scm = Some(scm),
            Err(e) => log::debug!("No adapter available for revert: {}", e),
        }
    }

    let property_file = ctx.property_file_path();
    match ctx.scm.as_mut() {
        Some(scm) if ctx.config.revert_on_fail && property_file.exists() => {
            log::error!("Release process failed, reverting back any changes made by the release.");
            if let Err(revert_error) = scm.revert().await {
                let step = match &error {
                    ReleaseError::Pipeline(PipelineError::StepFailed { step, .. }) => step.clone(),
                    _ => "release".to_string(),
                };
                return PipelineError::RevertFailed {
                    step,
                    cause: error.to_string(),
                    source: Box::new(revert_error),
                }
                .into();
            }
        }
        _ => log::error!(
            "Release process failed, please remember to revert any uncommitted changes made by the release."
        ),
    }
    error
}
