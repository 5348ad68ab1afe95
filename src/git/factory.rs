//! Adapter selection.
//!
//! Adapters are probed in the configured priority order; the first one that
//! recognizes the project directory (or an ancestor) wins.

use crate::config::ReleaseConfig;
use crate::error::{ConfigError, Result};
use crate::git::{GitAdapter, ScmAdapter, ScmSession};
use crate::project::Project;
use path_absolutize::Absolutize;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

/// Adapter kinds that can be listed in `scm_adapters`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScmKind {
    /// The git command line
    Git,
}

impl ScmKind {
    /// Build an uninitialized adapter of this kind
    pub fn create(self, config: Arc<ReleaseConfig>, project_dir: &Path) -> Scm {
        match self {
            ScmKind::Git => Scm::Git(GitAdapter::new(config, project_dir)),
        }
    }
}

/// A concrete adapter selected at run time
#[derive(Debug)]
pub enum Scm {
    /// Git repository
    Git(GitAdapter),
}

impl Scm {
    /// Session state of the underlying adapter
    pub fn session(&self) -> &ScmSession {
        match self {
            Scm::Git(git) => git.session(),
        }
    }
}

/// Create the first configured adapter supporting `project_dir`
pub fn find_scm_adapter(config: &Arc<ReleaseConfig>, project_dir: &Path) -> Result<Scm> {
    let directory = project_dir
        .absolutize()
        .map_err(|e| ConfigError::Invalid {
            reason: format!("cannot resolve {}: {}", project_dir.display(), e),
        })?
        .into_owned();

    for kind in &config.scm_adapters {
        let mut adapter = kind.create(Arc::clone(config), &directory);
        if adapter.is_supported(&directory) {
            log::debug!("Using {} adapter for {}", adapter.name(), directory.display());
            return Ok(adapter);
        }
    }
    Err(ConfigError::NoSupportedAdapter { path: directory }.into())
}

impl ScmAdapter for Scm {
    fn name(&self) -> &'static str {
        match self {
            Scm::Git(git) => git.name(),
        }
    }

    fn is_supported(&mut self, directory: &Path) -> bool {
        match self {
            Scm::Git(git) => git.is_supported(directory),
        }
    }

    async fn init(&mut self) -> Result<()> {
        match self {
            Scm::Git(git) => git.init().await,
        }
    }

    async fn check_commit_needed(&self) -> Result<()> {
        match self {
            Scm::Git(git) => git.check_commit_needed().await,
        }
    }

    async fn check_update_needed(&self) -> Result<()> {
        match self {
            Scm::Git(git) => git.check_update_needed().await,
        }
    }

    async fn create_release_tag(&mut self, project: &Project, message: &str) -> Result<()> {
        match self {
            Scm::Git(git) => git.create_release_tag(project, message).await,
        }
    }

    async fn add(&self, file: &Path) -> Result<()> {
        match self {
            Scm::Git(git) => git.add(file).await,
        }
    }

    async fn commit(&mut self, message: &str) -> Result<()> {
        match self {
            Scm::Git(git) => git.commit(message).await,
        }
    }

    async fn push(&self) -> Result<()> {
        match self {
            Scm::Git(git) => git.push().await,
        }
    }

    async fn revert(&mut self) -> Result<()> {
        match self {
            Scm::Git(git) => git.revert().await,
        }
    }

    async fn checkout_merge_to_release_branch(&mut self) -> Result<()> {
        match self {
            Scm::Git(git) => git.checkout_merge_to_release_branch().await,
        }
    }

    async fn checkout_merge_from_release_branch(&mut self) -> Result<()> {
        match self {
            Scm::Git(git) => git.checkout_merge_from_release_branch().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_directory_has_no_adapter() {
        let dir = tempfile::tempdir().unwrap();
        let config = Arc::new(ReleaseConfig::default());
        let err = find_scm_adapter(&config, dir.path()).unwrap_err();
        assert!(err.to_string().contains("No supported adapter could be found"));
    }

    #[test]
    fn git_directory_selects_git() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        let config = Arc::new(ReleaseConfig::default());
        let scm = find_scm_adapter(&config, dir.path()).unwrap();
        assert_eq!(scm.name(), "git");
    }
}
