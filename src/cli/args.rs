//! Command line argument parsing and validation.
//!
//! Point the tool at a project directory and it releases it. Interactive
//! values can be supplied up front through flags or `RELEASE_*` variables.

use crate::config::VersionOverrides;
use crate::error::CliError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Release a version controlled project
#[derive(Parser, Debug)]
#[command(
    name = "kodegen_scm_release",
    version,
    about = "Release a version controlled project",
    long_about = "Strip the snapshot suffix, tag, build, bump to the next version, commit and push.
Repository changes are reverted when any step fails.

Usage:
  kodegen_scm_release                      # full release of the current directory
  kodegen_scm_release -y --new-version 2.0.0-SNAPSHOT
  kodegen_scm_release check                # verification steps only
  kodegen_scm_release steps                # list the release steps"
)]
pub struct Args {
    /// Command to run
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Project directory
    #[arg(long, short = 'C', value_name = "DIR", default_value = ".", global = true)]
    pub project_dir: PathBuf,

    /// Config file, defaults to release.toml in the project directory
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Accept every default without prompting
    #[arg(short = 'y', long = "automatic", env = "RELEASE_USE_AUTOMATIC_VERSION", global = true)]
    pub automatic: bool,

    /// Version to release instead of the un-snapshotted one
    #[arg(long, value_name = "VERSION", env = "RELEASE_RELEASE_VERSION", global = true)]
    pub release_version: Option<String>,

    /// Development version to move to after the release
    #[arg(long, value_name = "VERSION", env = "RELEASE_NEW_VERSION", global = true)]
    pub new_version: Option<String>,

    /// Text prepended to every commit message
    #[arg(long, value_name = "TEXT", env = "RELEASE_PRE_COMMIT_TEXT", global = true)]
    pub pre_commit_text: Option<String>,

    /// Show debug logs
    #[arg(short, long, conflicts_with = "quiet", global = true)]
    pub verbose: bool,

    /// Only show warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Run the full release pipeline (default)
    Release,
    /// Run the verification steps only
    Check,
    /// List the release steps in execution order
    Steps,
}

impl Command {
    /// Command name for messages
    pub fn name(&self) -> &'static str {
        match self {
            Command::Release => "release",
            Command::Check => "check",
            Command::Steps => "steps",
        }
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Command to run, `release` when none was given
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Release)
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), CliError> {
        for (flag, value) in [
            ("--release-version", &self.release_version),
            ("--new-version", &self.new_version),
        ] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(CliError::InvalidArguments {
                    reason: format!("{flag} must not be empty"),
                });
            }
        }
        if !self.project_dir.is_dir() {
            return Err(CliError::InvalidArguments {
                reason: format!(
                    "Project directory {} does not exist",
                    self.project_dir.display()
                ),
            });
        }
        Ok(())
    }

    /// Default log filter for the chosen verbosity
    pub fn log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else if self.quiet {
            "warn"
        } else {
            "info"
        }
    }

    /// Run time version overrides
    pub fn overrides(&self) -> VersionOverrides {
        VersionOverrides {
            automatic: self.automatic,
            release_version: self.release_version.clone(),
            new_version: self.new_version.clone(),
        }
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
}

impl RuntimeConfig {
    /// Create runtime configuration
    pub fn new(quiet: bool) -> Self {
        Self {
            output: super::OutputManager::new(quiet),
        }
    }

    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self::new(args.quiet)
    }
}

impl RuntimeConfig {
    /// Print message
    pub fn println(&self, message: &str) {
        let _ = self.output.println(message);
    }

    /// Print error message (always shown)
    pub fn error_println(&self, message: &str) {
        self.output.error(message);
    }

    /// Print warning message
    pub fn warning_println(&self, message: &str) {
        let _ = self.output.warn(message);
    }

    /// Print success message
    pub fn success_println(&self, message: &str) {
        let _ = self.output.success(message);
    }

    /// Print info message
    pub fn info_println(&self, message: &str) {
        let _ = self.output.info(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_is_the_default_command() {
        let args = Args::try_parse_from(["kodegen_scm_release"]).unwrap();
        assert_eq!(args.command(), Command::Release);
        assert_eq!(args.log_filter(), "info");
    }

    #[test]
    fn overrides_are_collected() {
        let args = Args::try_parse_from([
            "kodegen_scm_release",
            "-y",
            "--release-version",
            "1.0",
            "--new-version",
            "1.1-SNAPSHOT",
            "check",
            "-v",
        ])
        .unwrap();
        assert_eq!(args.command(), Command::Check);
        assert_eq!(args.log_filter(), "debug");
        let overrides = args.overrides();
        assert!(overrides.automatic);
        assert_eq!(overrides.release_version.as_deref(), Some("1.0"));
        assert_eq!(overrides.new_version.as_deref(), Some("1.1-SNAPSHOT"));
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        assert!(Args::try_parse_from(["kodegen_scm_release", "-v", "-q"]).is_err());
    }

    #[test]
    fn empty_version_override_is_invalid() {
        let args =
            Args::try_parse_from(["kodegen_scm_release", "--new-version", " "]).unwrap();
        let err = args.validate().unwrap_err();
        assert!(err.to_string().contains("--new-version must not be empty"), "{err}");
    }

    #[test]
    fn missing_project_directory_is_invalid() {
        let args =
            Args::try_parse_from(["kodegen_scm_release", "-C", "/definitely/not/here"]).unwrap();
        assert!(matches!(
            args.validate(),
            Err(CliError::InvalidArguments { .. })
        ));
    }
}
