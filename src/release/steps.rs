//! The canonical release steps.
//!
//! Each step runs after the previous one; `release` runs after all of them
//! and is the unit whose failure triggers the revert hook.

use super::context::{ReleaseContext, adapter};
use super::step::{Step, StepFuture};
use crate::config::ReleaseConfig;
use crate::error::{ConfigError, PreconditionError};
use crate::exec::ExecRequest;
use crate::git::{ScmAdapter, find_scm_adapter};

/// Names of the verification-only subset, in canonical order
pub const CHECK_STEPS: &[&str] = &[
    "createAdapter",
    "initAdapter",
    "checkCommitNeeded",
    "checkUpdateNeeded",
    "checkSnapshotDependencies",
];

/// All release steps in canonical order
pub fn release_steps() -> Vec<Step<ReleaseContext>> {
    let chain = vec![
        Step::new(
            "createAdapter",
            "Select the SCM adapter for the project directory",
            create_adapter,
        ),
        Step::new(
            "initAdapter",
            "Record the current branch and commit, enforce the branch policy",
            init_adapter,
        ),
        Step::new(
            "checkCommitNeeded",
            "Check for untracked and uncommitted files",
            check_commit_needed,
        ),
        Step::new(
            "checkUpdateNeeded",
            "Check for commits to push or pull",
            check_update_needed,
        ),
        Step::new(
            "checkoutMergeToReleaseBranch",
            "Merge the working branch into the release branch",
            checkout_merge_to_release_branch,
        )
        .skip_if(without_release_branch),
        Step::new(
            "unSnapshotVersion",
            "Remove the snapshot suffix from the version",
            un_snapshot_version,
        ),
        Step::new(
            "confirmReleaseVersion",
            "Confirm the version to release",
            confirm_release_version,
        )
        .skip_if(|ctx: &ReleaseContext| ctx.state.properties_file_created),
        Step::new(
            "checkSnapshotDependencies",
            "Check for snapshot dependencies",
            check_snapshot_dependencies,
        ),
        Step::new(
            "preTagCommit",
            "Commit the release version",
            pre_tag_commit,
        ),
        Step::new(
            "createReleaseTag",
            "Create the release tag",
            create_release_tag,
        ),
        Step::new(
            "runBuildTasks",
            "Run the release build",
            run_build_tasks,
        ),
        Step::new(
            "checkoutMergeFromReleaseBranch",
            "Merge the release branch back into the working branch",
            checkout_merge_from_release_branch,
        )
        .skip_if(without_release_branch),
        Step::new(
            "updateVersion",
            "Move to the next development version",
            update_version,
        ),
        Step::new(
            "commitNewVersion",
            "Commit the next development version",
            commit_new_version,
        ),
        Step::new("push", "Push queued tags and branches", push),
    ];

    let mut steps = Vec::with_capacity(chain.len() + 1);
    let mut previous: Option<&'static str> = None;
    for step in chain {
        let name = step.name;
        steps.push(match previous {
            Some(previous) => step.after(&[previous]),
            None => step,
        });
        previous = Some(name);
    }

    let all: Vec<&'static str> = steps.iter().map(|s| s.name).collect();
    steps.push(Step::new("release", "Perform the whole release", release).after(&all));
    steps
}

fn without_release_branch(ctx: &ReleaseContext) -> bool {
    ctx.config.push_release_version_branch.is_none()
}

/// Merging release branches over a dirty working tree
fn is_bad_combination(config: &ReleaseConfig) -> bool {
    config.push_release_version_branch.is_some() && !config.fail_on_commit_needed
}

fn warn_bad_combination(config: &ReleaseConfig) {
    if is_bad_combination(config) {
        log::warn!("/!\\Warning/!\\");
        log::warn!(
            "It is strongly discouraged to set fail_on_commit_needed to false when push_release_version_branch is enabled."
        );
        log::warn!("Merging with an uncleaned working directory will lead to unexpected results.");
    }
}

fn create_adapter(ctx: &mut ReleaseContext) -> StepFuture<'_> {
    Box::pin(async move {
        if ctx.scm.is_none() {
            ctx.scm = Some(find_scm_adapter(&ctx.config, &ctx.project.dir)?);
        }
        Ok(())
    })
}

fn init_adapter(ctx: &mut ReleaseContext) -> StepFuture<'_> {
    Box::pin(async move { adapter(&mut ctx.scm, "initAdapter")?.init().await })
}

fn check_commit_needed(ctx: &mut ReleaseContext) -> StepFuture<'_> {
    Box::pin(async move {
        adapter(&mut ctx.scm, "checkCommitNeeded")?
            .check_commit_needed()
            .await
    })
}

fn check_update_needed(ctx: &mut ReleaseContext) -> StepFuture<'_> {
    Box::pin(async move {
        adapter(&mut ctx.scm, "checkUpdateNeeded")?
            .check_update_needed()
            .await
    })
}

fn checkout_merge_to_release_branch(ctx: &mut ReleaseContext) -> StepFuture<'_> {
    Box::pin(async move {
        warn_bad_combination(&ctx.config);
        adapter(&mut ctx.scm, "checkoutMergeToReleaseBranch")?
            .checkout_merge_to_release_branch()
            .await
    })
}

fn un_snapshot_version(ctx: &mut ReleaseContext) -> StepFuture<'_> {
    Box::pin(async move {
        let mut versions = ctx.versions();
        versions.check_properties_file()?;
        let current = versions.project.version.clone();
        let release = versions.un_snapshot(&current);
        versions.update_version_and_project(&release)
    })
}

fn confirm_release_version(ctx: &mut ReleaseContext) -> StepFuture<'_> {
    Box::pin(async move {
        let mut versions = ctx.versions();
        let current = versions.project.version.clone();
        let release = versions.release_version(&current)?;
        versions.update_version_and_project(&release)
    })
}

fn check_snapshot_dependencies(ctx: &mut ReleaseContext) -> StepFuture<'_> {
    Box::pin(async move {
        match ctx
            .project
            .snapshot_report(&ctx.config.ignored_snapshot_dependencies)
        {
            Some(report) => PreconditionError::SnapshotDependencies { report }
                .warn_or_throw(ctx.config.fail_on_snapshot_dependencies),
            None => Ok(()),
        }
    })
}

fn pre_tag_commit(ctx: &mut ReleaseContext) -> StepFuture<'_> {
    Box::pin(async move {
        if !ctx.state.needs_pre_tag_commit() {
            log::debug!("Version unchanged, no pre tag commit needed");
            return Ok(());
        }
        let message = ctx.commit_message(&ctx.config.pre_tag_commit_message);
        let property_file = ctx.property_file_path();
        let created = ctx.state.properties_file_created;

        let scm = adapter(&mut ctx.scm, "preTagCommit")?;
        if created {
            scm.add(&property_file).await?;
        }
        scm.commit(&message).await
    })
}

fn create_release_tag(ctx: &mut ReleaseContext) -> StepFuture<'_> {
    Box::pin(async move {
        let message = ctx.commit_message(&ctx.config.tag_commit_message);
        adapter(&mut ctx.scm, "createReleaseTag")?
            .create_release_tag(&ctx.project, &message)
            .await
    })
}

fn run_build_tasks(ctx: &mut ReleaseContext) -> StepFuture<'_> {
    Box::pin(async move {
        let build = &ctx.config.build;
        if build.is_empty() {
            log::debug!("No release build configured");
            return Ok(());
        }
        let tag = ctx.tag_name();
        let phases = [
            ("beforeReleaseBuild", &build.before),
            ("runReleaseBuild", &build.tasks),
            ("afterReleaseBuild", &build.after),
        ];

        for (phase, commands) in phases {
            for command in commands {
                if command.is_empty() {
                    return Err(ConfigError::Invalid {
                        reason: format!("empty command in {phase}"),
                    }
                    .into());
                }
                log::info!("{}: {}", phase, command.join(" "));
                let request = ExecRequest::new(command.iter().cloned())
                    .current_dir(&ctx.project.dir)
                    .envs(build.env.clone())
                    .envs([
                        ("RELEASE_VERSION", ctx.project.version.clone()),
                        ("RELEASE_TAG", tag.clone()),
                    ])
                    .strict();
                ctx.executor.execute(&request).await?;
            }
        }
        Ok(())
    })
}

fn checkout_merge_from_release_branch(ctx: &mut ReleaseContext) -> StepFuture<'_> {
    Box::pin(async move {
        warn_bad_combination(&ctx.config);
        adapter(&mut ctx.scm, "checkoutMergeFromReleaseBranch")?
            .checkout_merge_from_release_branch()
            .await
    })
}

fn update_version(ctx: &mut ReleaseContext) -> StepFuture<'_> {
    Box::pin(async move {
        let mut versions = ctx.versions();
        versions.check_properties_file()?;
        let current = versions.project.version.clone();
        let candidate = match &versions.config.overrides.new_version {
            Some(version) => version.clone(),
            None => versions.next_version(&current)?,
        };
        let next = versions.confirm_next_version(&candidate)?;
        versions.update_version_and_project(&next)
    })
}

fn commit_new_version(ctx: &mut ReleaseContext) -> StepFuture<'_> {
    Box::pin(async move {
        let message = ctx.commit_message(&ctx.config.new_version_commit_message);
        adapter(&mut ctx.scm, "commitNewVersion")?
            .commit(&message)
            .await
    })
}

fn push(ctx: &mut ReleaseContext) -> StepFuture<'_> {
    Box::pin(async move { adapter(&mut ctx.scm, "push")?.push().await })
}

fn release(ctx: &mut ReleaseContext) -> StepFuture<'_> {
    Box::pin(async move {
        log::info!("Released {} {}", ctx.project.name, ctx.project.version);
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::release::Pipeline;

    #[test]
    fn canonical_order_is_preserved() {
        let pipeline = Pipeline::new(release_steps()).unwrap();
        let names: Vec<_> = pipeline.steps().iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec![
                "createAdapter",
                "initAdapter",
                "checkCommitNeeded",
                "checkUpdateNeeded",
                "checkoutMergeToReleaseBranch",
                "unSnapshotVersion",
                "confirmReleaseVersion",
                "checkSnapshotDependencies",
                "preTagCommit",
                "createReleaseTag",
                "runBuildTasks",
                "checkoutMergeFromReleaseBranch",
                "updateVersion",
                "commitNewVersion",
                "push",
                "release",
            ]
        );
        let release = pipeline.steps().last().unwrap();
        assert_eq!(release.after.len(), 15);
    }

    #[test]
    fn every_step_is_described() {
        assert!(release_steps().iter().all(|s| !s.description.is_empty()));
    }

    #[test]
    fn release_branch_with_lenient_commit_check_is_flagged() {
        let mut config = ReleaseConfig::default();
        assert!(!is_bad_combination(&config));
        config.push_release_version_branch = Some("release".to_string());
        assert!(!is_bad_combination(&config));
        config.fail_on_commit_needed = false;
        assert!(is_bad_combination(&config));
    }

    #[test]
    fn merge_steps_run_only_with_a_release_branch() {
        let pipeline = Pipeline::new(release_steps()).unwrap();
        let merges: Vec<_> = pipeline
            .steps()
            .iter()
            .filter(|s| s.name.starts_with("checkoutMerge"))
            .collect();
        assert_eq!(merges.len(), 2);

        let project = crate::project::Project::new("demo", ".", "1.0");
        let mut config = ReleaseConfig::default();
        let ctx = ReleaseContext::new(
            config.clone(),
            project.clone(),
            Box::new(crate::prompt::AutomaticResolver),
        );
        assert!(merges.iter().all(|s| s.should_skip(&ctx)));

        config.push_release_version_branch = Some("release".to_string());
        let ctx = ReleaseContext::new(config, project, Box::new(crate::prompt::AutomaticResolver));
        assert!(merges.iter().all(|s| !s.should_skip(&ctx)));
    }

    #[test]
    fn check_subset_is_a_prefix_of_the_release() {
        let subset = Pipeline::new(release_steps())
            .unwrap()
            .select(CHECK_STEPS)
            .unwrap();
        let names: Vec<_> = subset.steps().iter().map(|s| s.name).collect();
        assert_eq!(names, CHECK_STEPS);
    }
}
