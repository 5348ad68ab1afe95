//! Shared helper functions for command execution.

use crate::cli::{Args, RuntimeConfig};
use crate::config::ConfigFile;
use crate::error::{ConfigError, ReleaseError, Result};
use crate::project::Project;
use crate::prompt::{AutomaticResolver, ConsoleResolver, ValueResolver};
use crate::release::{ReleaseContext, StepObserver};
use path_absolutize::Absolutize;

/// Build the release context from the config file and command line
pub(super) fn load_context(args: &Args) -> Result<ReleaseContext> {
    let project_dir = args
        .project_dir
        .absolutize()
        .map_err(|e| ConfigError::Invalid {
            reason: format!("cannot resolve {}: {}", args.project_dir.display(), e),
        })?
        .into_owned();

    let file = ConfigFile::load(&project_dir, args.config.as_deref())?;
    let mut config = file.release.into_config()?;
    config.overrides = args.overrides();
    if let Some(text) = args.pre_commit_text.as_deref().filter(|t| !t.is_empty()) {
        config.pre_commit_text = text.to_string();
    }

    let project = Project::load(&project_dir, &file.project, &config.version_property_file);
    log::debug!(
        "Loaded project {} {} from {}",
        project.name,
        project.version,
        project.dir.display()
    );

    let resolver: Box<dyn ValueResolver> = if config.overrides.automatic {
        Box::new(AutomaticResolver)
    } else {
        Box::new(ConsoleResolver)
    };
    Ok(ReleaseContext::new(config, project, resolver))
}

/// Print recovery suggestions for `error`
pub(super) fn print_suggestions(config: &RuntimeConfig, error: &ReleaseError) {
    if !error.is_recoverable() {
        config.warning_println("Rerunning will fail the same way until the configuration is fixed");
    }
    let suggestions = error.recovery_suggestions();
    if suggestions.is_empty() {
        return;
    }
    config.println("\n💡 Recovery suggestions:");
    for suggestion in suggestions {
        config.println(&format!("  • {}", suggestion));
    }
}

/// Reports step progress on the terminal
pub(super) struct ConsoleObserver<'a> {
    config: &'a RuntimeConfig,
}

impl<'a> ConsoleObserver<'a> {
    pub(super) fn new(config: &'a RuntimeConfig) -> Self {
        Self { config }
    }
}

impl StepObserver for ConsoleObserver<'_> {
    fn started(&mut self, name: &str, description: &str) {
        let _ = self
            .config
            .output()
            .progress(&format!("{name}: {description}"));
    }

    fn skipped(&mut self, name: &str) {
        self.config.info_println(&format!("{name} skipped"));
    }

    fn finished(&mut self, name: &str) {
        self.config.success_println(name);
    }

    fn failed(&mut self, name: &str, _error: &ReleaseError) {
        self.config.error_println(&format!("{name} failed"));
    }
}
