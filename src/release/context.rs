//! Everything the release steps share during one run.

use crate::config::ReleaseConfig;
use crate::error::{GitError, Result};
use crate::exec::CommandExecutor;
use crate::git::Scm;
use crate::project::Project;
use crate::prompt::ValueResolver;
use crate::state::ReleaseState;
use crate::version::VersionManager;
use std::path::PathBuf;
use std::sync::Arc;

/// Context for executing release steps with all required dependencies
pub struct ReleaseContext {
    /// Run configuration
    pub config: Arc<ReleaseConfig>,
    /// Project being released
    pub project: Project,
    /// Flags raised by earlier steps
    pub state: ReleaseState,
    /// Adapter created by `createAdapter`, or by the failure hook
    pub scm: Option<Scm>,
    /// Confirmation callback
    pub resolver: Box<dyn ValueResolver>,
    /// Runs release build commands
    pub executor: CommandExecutor,
}

impl ReleaseContext {
    /// Create a context with no adapter yet
    pub fn new(config: ReleaseConfig, project: Project, resolver: Box<dyn ValueResolver>) -> Self {
        Self {
            config: Arc::new(config),
            project,
            state: ReleaseState::default(),
            scm: None,
            resolver,
            executor: CommandExecutor::new(),
        }
    }

    /// Version operations over this run's project and flags
    pub fn versions(&mut self) -> VersionManager<'_> {
        VersionManager {
            config: self.config.as_ref(),
            project: &mut self.project,
            state: &mut self.state,
            resolver: self.resolver.as_ref(),
        }
    }

    /// Absolute path of the version property file
    pub fn property_file_path(&self) -> PathBuf {
        self.project.dir.join(&self.config.version_property_file)
    }

    /// Tag name for the project's current version
    pub fn tag_name(&self) -> String {
        self.config.tag_name(&self.project)
    }

    /// Commit message built from `template` for the current tag
    pub fn commit_message(&self, template: &str) -> String {
        self.config.commit_message(template, &self.tag_name())
    }
}

/// The adapter, or an error naming the operation that needed it
pub(crate) fn adapter<'a>(scm: &'a mut Option<Scm>, operation: &str) -> Result<&'a mut Scm> {
    scm.as_mut().ok_or_else(|| {
        GitError::NotInitialized {
            operation: operation.to_string(),
        }
        .into()
    })
}
