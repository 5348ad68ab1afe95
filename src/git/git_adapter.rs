//! Git implementation of the ScmAdapter trait.
//!
//! Every operation shells out to the `git` binary through the command
//! executor. Output patterns, not exit codes, are the authoritative failure
//! signal for most git commands.

use crate::config::ReleaseConfig;
use crate::error::{ConfigError, GitError, PreconditionError, Result};
use crate::exec::{CommandExecutor, ExecRequest};
use crate::git::session::{PushTarget, ScmSession};
use crate::git::status;
use crate::git::ScmAdapter;
use crate::project::Project;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

const ERROR_PATTERNS: &[&str] = &["error: ", "fatal: "];

/// Git operations backed by the `git` command line
#[derive(Debug)]
pub struct GitAdapter {
    config: Arc<ReleaseConfig>,
    project_dir: PathBuf,
    executor: CommandExecutor,
    session: ScmSession,
}

impl GitAdapter {
    /// Create an adapter for the project rooted at `project_dir`
    pub fn new(config: Arc<ReleaseConfig>, project_dir: impl Into<PathBuf>) -> Self {
        Self {
            config,
            project_dir: project_dir.into(),
            executor: CommandExecutor::new(),
            session: ScmSession::default(),
        }
    }

    /// Current session state
    pub fn session(&self) -> &ScmSession {
        &self.session
    }

    fn git<I, S>(&self, args: I) -> ExecRequest
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut command = vec!["git".to_string()];
        command.extend(args.into_iter().map(Into::into));
        ExecRequest::new(command).current_dir(&self.session.working_directory)
    }

    async fn current_branch(&self) -> Result<String> {
        let output = self
            .executor
            .execute(&self.git(["branch", "--no-color"]))
            .await?;
        status::current_branch(&output).ok_or_else(|| GitError::EmptyRepository.into())
    }

    async fn current_commit(&self) -> Result<String> {
        let output = self
            .executor
            .execute(&self.git(["rev-parse", "--verify", "HEAD"]).strict())
            .await?;
        Ok(output.trim().to_string())
    }

    /// Version property file relative to the repository root when possible
    fn property_file(&self) -> PathBuf {
        let file = self.project_dir.join(&self.config.version_property_file);
        file.strip_prefix(&self.session.working_directory)
            .map(Path::to_path_buf)
            .unwrap_or(file)
    }

    fn push_target(&self, refspec: String) -> Option<PushTarget> {
        self.config.git.push_to_remote.as_ref().map(|remote| PushTarget {
            remote: remote.clone(),
            refspec,
            options: self.config.git.push_options.clone(),
        })
    }

    fn ensure_initialized(&self, operation: &str) -> Result<()> {
        if self.session.working_branch.is_empty() {
            return Err(GitError::NotInitialized {
                operation: operation.to_string(),
            }
            .into());
        }
        Ok(())
    }

    async fn checkout_merge(&self, to: &str, from: &str) -> Result<()> {
        self.executor
            .execute(&self.git(["fetch"]).fail_on(ERROR_PATTERNS))
            .await?;
        self.executor
            .execute(&self.git(["checkout", to]).fail_on(ERROR_PATTERNS))
            .await?;
        self.executor
            .execute(
                &self
                    .git(["merge", "--no-ff", "--no-commit", from])
                    .fail_on(ERROR_PATTERNS)
                    .fail_on(&["CONFLICT"]),
            )
            .await?;
        Ok(())
    }
}

impl ScmAdapter for GitAdapter {
    fn name(&self) -> &'static str {
        "git"
    }

    fn is_supported(&mut self, directory: &Path) -> bool {
        let mut current = Some(directory);
        while let Some(dir) = current {
            if dir.join(".git").exists() {
                log::debug!("Found git repository at {}", dir.display());
                self.session.working_directory = dir.to_path_buf();
                return true;
            }
            current = dir.parent();
        }
        false
    }

    async fn init(&mut self) -> Result<()> {
        let branch = self.current_branch().await?;
        let head = self.current_commit().await?;

        if let Some(required) = &self.config.git.require_branch {
            let regex = Regex::new(&format!("^(?:{required})$")).map_err(|source| {
                ConfigError::InvalidBranchPattern {
                    pattern: required.clone(),
                    source,
                }
            })?;
            if !regex.is_match(&branch) {
                return Err(GitError::WrongBranch {
                    current: branch,
                    required: required.clone(),
                }
                .into());
            }
        }

        self.session.release_branch = self
            .config
            .push_release_version_branch
            .clone()
            .unwrap_or_else(|| branch.clone());
        log::info!("Working on branch {} at {}", branch, head);
        self.session.working_branch = branch;
        self.session.head = Some(head);
        Ok(())
    }

    async fn check_commit_needed(&self) -> Result<()> {
        let output = self
            .executor
            .execute(&self.git(["status", "--porcelain"]))
            .await?;
        let changes = status::classify_changes(&output);

        if !changes.unversioned.is_empty() {
            PreconditionError::UnversionedFiles {
                files: changes.unversioned,
            }
            .warn_or_throw(self.config.fail_on_unversioned_files)?;
        }
        if !changes.uncommitted.is_empty() {
            PreconditionError::UncommittedFiles {
                files: changes.uncommitted,
            }
            .warn_or_throw(self.config.fail_on_commit_needed)?;
        }
        Ok(())
    }

    async fn check_update_needed(&self) -> Result<()> {
        self.executor
            .execute(&self.git(["remote", "update"]).fail_on(ERROR_PATTERNS))
            .await?;
        let output = self
            .executor
            .execute(&self.git(["status", "--porcelain", "-b"]))
            .await?;
        let (ahead, behind) = status::ahead_behind(&output);

        if ahead > 0 {
            PreconditionError::LocalChangesToPush { count: ahead }
                .warn_or_throw(self.config.fail_on_publish_needed)?;
        }
        if behind > 0 {
            PreconditionError::RemoteChangesToPull { count: behind }
                .warn_or_throw(self.config.fail_on_update_needed)?;
        }
        Ok(())
    }

    async fn create_release_tag(&mut self, project: &Project, message: &str) -> Result<()> {
        self.ensure_initialized("createReleaseTag")?;
        let tag_name = self.config.tag_name(project);

        let mut args = vec!["tag", "-a", tag_name.as_str(), "-m", message];
        if self.config.git.sign_tag {
            args.push("-s");
        }
        self.executor
            .execute(
                &self
                    .git(args)
                    .fail_on(&["already exists", "failed to sign"])
                    .error_message(format!("Duplicate tag [{tag_name}] or signing error")),
            )
            .await?;

        log::info!("Created tag {}", tag_name);
        if let Some(target) = self.push_target(tag_name.clone()) {
            self.session.enqueue_push(target);
        }
        self.session.tag = Some(tag_name);
        Ok(())
    }

    async fn add(&self, file: &Path) -> Result<()> {
        let file = file.to_string_lossy().into_owned();
        self.executor
            .execute(
                &self
                    .git(["add", file.as_str()])
                    .fail_on(ERROR_PATTERNS)
                    .error_message(format!("Error adding file {file}")),
            )
            .await?;
        Ok(())
    }

    async fn commit(&mut self, message: &str) -> Result<()> {
        self.ensure_initialized("commit")?;
        let scope = if self.config.git.commit_version_file_only {
            self.property_file().to_string_lossy().into_owned()
        } else {
            "-a".to_string()
        };
        self.executor
            .execute(
                &self
                    .git(["commit", "-m", message, scope.as_str()])
                    .fail_on(ERROR_PATTERNS),
            )
            .await?;

        let branch = self.current_branch().await?;
        let refspec = match &self.config.git.push_to_branch_prefix {
            Some(prefix) => format!("HEAD:{prefix}{branch}"),
            None => branch,
        };
        if let Some(target) = self.push_target(refspec) {
            self.session.enqueue_push(target);
        }
        Ok(())
    }

    async fn push(&self) -> Result<()> {
        let Some(remote) = &self.config.git.push_to_remote else {
            log::debug!("No push remote configured, skipping push");
            return Ok(());
        };

        let remotes = self
            .executor
            .execute(&self.git(["remote"]).strict())
            .await?;
        if !remotes.lines().any(|line| line.trim() == remote) {
            if remote == "origin" {
                log::debug!("Repository has no origin remote, skipping push");
                return Ok(());
            }
            return Err(GitError::RemoteNotFound {
                remote: remote.clone(),
            }
            .into());
        }

        for target in &self.session.pending_pushes {
            let mut args = vec![
                "push".to_string(),
                "--porcelain".to_string(),
                target.remote.clone(),
                target.refspec.clone(),
            ];
            args.extend(target.options.iter().cloned());
            self.executor
                .execute(
                    &self
                        .git(args)
                        .fail_on(&["[rejected]"])
                        .fail_on(ERROR_PATTERNS)
                        .error_message(format!(
                            "Failed to push to remote: {} {}",
                            target.remote, target.refspec
                        )),
                )
                .await?;
        }
        Ok(())
    }

    async fn revert(&mut self) -> Result<()> {
        if let Some(head) = self.session.head.clone() {
            let current = self.current_commit().await?;
            if current != head {
                log::info!("Reverting commits...");
                self.executor
                    .execute(
                        &self
                            .git(["reset", "--soft", head.as_str()])
                            .strict()
                            .fail_on(ERROR_PATTERNS),
                    )
                    .await?;
                self.session.head = None;
            }
        }

        if let Some(tag) = self.session.tag.clone() {
            log::info!("Reverting tag...");
            self.executor
                .execute(
                    &self
                        .git(["tag", "--delete", tag.as_str()])
                        .strict()
                        .fail_on(ERROR_PATTERNS),
                )
                .await?;
            self.session.tag = None;
        }

        log::info!("Reverting property file");
        let file = self.property_file().to_string_lossy().into_owned();
        self.executor
            .execute(
                &self
                    .git(["checkout", "HEAD", "--", file.as_str()])
                    .strict()
                    .fail_on(ERROR_PATTERNS)
                    .error_message("Error reverting changes made by the release."),
            )
            .await?;
        Ok(())
    }

    async fn checkout_merge_to_release_branch(&mut self) -> Result<()> {
        self.ensure_initialized("checkoutMergeToReleaseBranch")?;
        let (to, from) = (
            self.session.release_branch.clone(),
            self.session.working_branch.clone(),
        );
        self.checkout_merge(&to, &from).await
    }

    async fn checkout_merge_from_release_branch(&mut self) -> Result<()> {
        self.ensure_initialized("checkoutMergeFromReleaseBranch")?;
        let (to, from) = (
            self.session.working_branch.clone(),
            self.session.release_branch.clone(),
        );
        self.checkout_merge(&to, &from).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovers_repository_in_ancestor() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        let nested = dir.path().join("a/b");
        std::fs::create_dir_all(&nested).unwrap();

        let mut adapter = GitAdapter::new(Arc::new(ReleaseConfig::default()), &nested);
        assert!(adapter.is_supported(&nested));
        assert_eq!(adapter.session().working_directory, dir.path());
        assert_eq!(adapter.property_file(), PathBuf::from("a/b/version.properties"));
    }

    #[test]
    fn push_targets_follow_remote_setting() {
        let mut config = ReleaseConfig::default();
        config.git.push_options = vec!["--no-verify".to_string()];
        let adapter = GitAdapter::new(Arc::new(config.clone()), "/tmp");
        let target = adapter.push_target("1.0".to_string()).unwrap();
        assert_eq!(target.remote, "origin");
        assert_eq!(target.options, vec!["--no-verify".to_string()]);

        config.git.push_to_remote = None;
        let adapter = GitAdapter::new(Arc::new(config), "/tmp");
        assert!(adapter.push_target("1.0".to_string()).is_none());
    }

    #[tokio::test]
    async fn tagging_before_init_is_rejected() {
        let mut adapter = GitAdapter::new(Arc::new(ReleaseConfig::default()), "/tmp");
        let project = Project::new("demo", "/tmp", "1.0");
        let err = adapter.create_release_tag(&project, "msg").await.unwrap_err();
        assert!(err.to_string().contains("before init"));
    }
}
