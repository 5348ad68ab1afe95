//! SCM adapter trait for release management.
//!
//! This module defines the ScmAdapter trait covering every repository
//! operation the release pipeline needs. The git implementation lives in the
//! git_adapter module; other backends plug in through the same trait.

use crate::error::{GitError, Result};
use crate::project::Project;
use std::future::Future;
use std::path::Path;

/// Repository operations used by the release steps.
///
/// An adapter is a small state machine: uninitialized until [`init`] captures
/// the checkpoint, then optionally tagged and committed, and finally pushed
/// or reverted.
///
/// [`init`]: ScmAdapter::init
pub trait ScmAdapter {
    /// Short adapter name used in messages
    fn name(&self) -> &'static str;

    /// Whether `directory` or one of its ancestors is a repository of this
    /// kind. The first match becomes the working directory.
    fn is_supported(&mut self, directory: &Path) -> bool;

    /// Capture the working branch and head commit, enforce the branch policy
    fn init(&mut self) -> impl Future<Output = Result<()>>;

    /// Warn or fail on untracked and uncommitted files
    fn check_commit_needed(&self) -> impl Future<Output = Result<()>>;

    /// Refresh remote refs, then warn or fail on unpushed and unpulled commits
    fn check_update_needed(&self) -> impl Future<Output = Result<()>>;

    /// Create the annotated release tag for `project` and queue its push
    fn create_release_tag(
        &mut self,
        project: &Project,
        message: &str,
    ) -> impl Future<Output = Result<()>>;

    /// Stage a single file
    fn add(&self, file: &Path) -> impl Future<Output = Result<()>>;

    /// Commit and queue a push of the current branch
    fn commit(&mut self, message: &str) -> impl Future<Output = Result<()>>;

    /// Replay queued pushes in order
    fn push(&self) -> impl Future<Output = Result<()>>;

    /// Roll back to the checkpoint captured by `init`
    fn revert(&mut self) -> impl Future<Output = Result<()>>;

    /// Merge the working branch into the release branch and check it out
    fn checkout_merge_to_release_branch(&mut self) -> impl Future<Output = Result<()>> {
        let adapter = self.name().to_string();
        async move { Err(GitError::MergeUnsupported { adapter }.into()) }
    }

    /// Merge the release branch back into the working branch and check it out
    fn checkout_merge_from_release_branch(&mut self) -> impl Future<Output = Result<()>> {
        let adapter = self.name().to_string();
        async move { Err(GitError::MergeUnsupported { adapter }.into()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ReadOnlyScm;

    impl ScmAdapter for ReadOnlyScm {
        fn name(&self) -> &'static str {
            "readonly"
        }
        fn is_supported(&mut self, _directory: &Path) -> bool {
            true
        }
        async fn init(&mut self) -> Result<()> {
            Ok(())
        }
        async fn check_commit_needed(&self) -> Result<()> {
            Ok(())
        }
        async fn check_update_needed(&self) -> Result<()> {
            Ok(())
        }
        async fn create_release_tag(&mut self, _project: &Project, _message: &str) -> Result<()> {
            Ok(())
        }
        async fn add(&self, _file: &Path) -> Result<()> {
            Ok(())
        }
        async fn commit(&mut self, _message: &str) -> Result<()> {
            Ok(())
        }
        async fn push(&self) -> Result<()> {
            Ok(())
        }
        async fn revert(&mut self) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn branch_merge_fails_explicitly_without_support() {
        let mut scm = ReadOnlyScm;
        let err = scm.checkout_merge_to_release_branch().await.unwrap_err();
        assert!(err.to_string().contains("supported only for GIT projects"));
        assert!(scm.checkout_merge_from_release_branch().await.is_err());
    }
}
