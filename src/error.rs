//! Comprehensive error types for release pipeline operations.
//!
//! This module defines all error types with actionable error messages and recovery suggestions.

use std::path::PathBuf;
use thiserror::Error;

/// Horizontal rule framing file listings in precondition messages
pub const LINE: &str = "~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~";

/// Result type alias for release operations
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Main error type for all release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Version management errors
    #[error("Version error: {0}")]
    Version(#[from] VersionError),

    /// SCM operation errors
    #[error("Git error: {0}")]
    Git(#[from] GitError),

    /// Precondition violations raised by warn-or-throw policies
    #[error("{0}")]
    Precondition(#[from] PreconditionError),

    /// Subprocess execution errors
    #[error("{0}")]
    Exec(#[from] ExecError),

    /// Pipeline structure and execution errors
    #[error("{0}")]
    Pipeline(#[from] PipelineError),

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

}

/// Configuration errors. Always fatal, never retried.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No configured SCM adapter accepts the project directory
    #[error(
        "No supported adapter could be found. Are [{path}] or its parents valid scm directories?"
    )]
    NoSupportedAdapter {
        /// Project directory that was probed
        path: PathBuf,
    },

    /// Config file could not be read
    #[error("Failed to read config file {path}: {source}")]
    ReadFailed {
        /// Path to the config file
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Config file could not be parsed
    #[error("Failed to parse config file {path}: {source}")]
    ParseFailed {
        /// Path to the config file
        path: PathBuf,
        /// TOML error
        #[source]
        source: toml::de::Error,
    },

    /// A configured version pattern is not a valid regex
    #[error("Invalid version pattern '{pattern}': {source}")]
    InvalidPattern {
        /// Pattern source
        pattern: String,
        /// Regex compilation error
        #[source]
        source: regex::Error,
    },

    /// An increment pattern names a capture group it does not have
    #[error(
        "Version pattern '{pattern}' has no capture group {group} to increment ({groups} group(s) defined)"
    )]
    InvalidIncrementGroup {
        /// Pattern source
        pattern: String,
        /// Configured group index
        group: usize,
        /// Number of capture groups in the pattern
        groups: usize,
    },

    /// A configured branch policy is not a valid regex
    #[error("Invalid requireBranch pattern '{pattern}': {source}")]
    InvalidBranchPattern {
        /// Pattern source
        pattern: String,
        /// Regex compilation error
        #[source]
        source: regex::Error,
    },

    /// Invalid configuration value
    #[error("Invalid configuration: {reason}")]
    Invalid {
        /// Reason for the error
        reason: String,
    },
}

/// Version management errors
#[derive(Error, Debug)]
pub enum VersionError {
    /// No version pattern matches the current version
    #[error(
        "Failed to increase version [{version}] - unknown pattern. Known patterns: [{}]",
        .patterns.join(", ")
    )]
    UnknownPattern {
        /// Version that could not be incremented
        version: String,
        /// All configured pattern sources
        patterns: Vec<String>,
    },

    /// The incremented group of a matching pattern captured no number
    #[error(
        "Failed to increase version [{version}] - group {group} of pattern '{pattern}' did not capture a number"
    )]
    NotIncrementable {
        /// Version that could not be incremented
        version: String,
        /// Matching pattern source
        pattern: String,
        /// Configured group index
        group: usize,
    },

    /// Property file has no `version` key
    #[error("[{path}] contains no 'version' property")]
    MissingVersionProperty {
        /// Property file path
        path: PathBuf,
    },

    /// Property file version does not match any configured pattern
    #[error(
        "[{path}] version [{version}] doesn't match any of known version patterns: [{}]",
        .patterns.join(", ")
    )]
    UnmatchedVersion {
        /// Property file path
        path: PathBuf,
        /// Version read from the file
        version: String,
        /// All configured pattern sources
        patterns: Vec<String>,
    },

    /// Operator declined creating a missing property file
    #[error(
        "[{path}] not found and you opted out of it being created, please create it manually and specify the version property."
    )]
    PropertiesFileDeclined {
        /// Property file path
        path: PathBuf,
    },

    /// Property file cannot be read or written
    #[error("Unable to update version property in {path}. Please check file permissions.")]
    PropertiesFileAccess {
        /// Property file path
        path: PathBuf,
    },

    /// Writing the property file failed
    #[error("Unable to write version property to {path}: {source}")]
    WriteFailed {
        /// Property file path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },
}

/// SCM operation errors
#[derive(Error, Debug)]
pub enum GitError {
    /// Repository has no commits and no current branch
    #[error("Error, this repository is empty.")]
    EmptyRepository,

    /// Current branch does not satisfy `requireBranch`
    #[error("Current Git branch is \"{current}\" and not \"{required}\".")]
    WrongBranch {
        /// Branch that is checked out
        current: String,
        /// Configured branch pattern
        required: String,
    },

    /// Configured push remote is not known to the repository
    #[error("Could not push to remote {remote} as repository has no such remote")]
    RemoteNotFound {
        /// Remote name
        remote: String,
    },

    /// Adapter does not implement release branch checkout/merge
    #[error("Checkout and merge is supported only for GIT projects (adapter: {adapter})")]
    MergeUnsupported {
        /// Adapter name
        adapter: String,
    },

    /// An operation requiring `init()` ran before it
    #[error("SCM adapter used before init: {operation}")]
    NotInitialized {
        /// Operation that was attempted
        operation: String,
    },
}

/// Precondition violations, each gated by its own warn-or-throw policy flag
#[derive(Error, Debug)]
pub enum PreconditionError {
    /// Untracked files in the working tree
    #[error("You have unversioned files:\n{}\n{}\n{}", LINE, .files.join("\n"), LINE)]
    UnversionedFiles {
        /// Porcelain status lines
        files: Vec<String>,
    },

    /// Modified, added or deleted files in the working tree
    #[error("You have uncommitted files:\n{}\n{}\n{}", LINE, .files.join("\n"), LINE)]
    UncommittedFiles {
        /// Porcelain status lines
        files: Vec<String>,
    },

    /// Local commits not yet on the remote
    #[error("You have {count} local change(s) to push.")]
    LocalChangesToPush {
        /// Number of commits ahead
        count: u32,
    },

    /// Remote commits not yet merged locally
    #[error("You have {count} remote change(s) to pull.")]
    RemoteChangesToPull {
        /// Number of commits behind
        count: u32,
    },

    /// Unresolved snapshot dependencies
    #[error("Snapshot dependencies detected: {report}")]
    SnapshotDependencies {
        /// Per-project listing
        report: String,
    },
}

impl PreconditionError {
    /// Fail with this violation when `fail` is set, otherwise log it as a warning
    pub fn warn_or_throw(self, fail: bool) -> Result<()> {
        if fail {
            return Err(self.into());
        }
        log::warn!("!!WARNING!! {self}");
        Ok(())
    }
}

/// Subprocess execution errors
#[derive(Error, Debug)]
pub enum ExecError {
    /// Program could not be located on PATH
    #[error("Program '{program}' not found: {source}")]
    ProgramNotFound {
        /// Program name
        program: String,
        /// Lookup error
        #[source]
        source: which::Error,
    },

    /// Process could not be spawned
    #[error("Failed to spawn [{command}]: {source}")]
    SpawnFailed {
        /// Command line
        command: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Nonzero exit on a command that was run strictly
    #[error("Running [{command}] produced an error (exit code {code:?}): [{stderr}]")]
    NonZeroExit {
        /// Command line
        command: String,
        /// Exit code, if the process was not killed by a signal
        code: Option<i32>,
        /// Trimmed stderr
        stderr: String,
    },

    /// A configured failure pattern appeared in stdout or stderr
    #[error("{message}")]
    FailurePattern {
        /// Command line
        command: String,
        /// Custom or default failure message
        message: String,
    },

    /// An output reader task failed
    #[error("Failed to read output of [{command}]: {reason}")]
    ReaderFailed {
        /// Command line
        command: String,
        /// Reason for the error
        reason: String,
    },
}

/// Pipeline structure and execution errors
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Two steps share a name
    #[error("Duplicate step name '{name}'")]
    DuplicateStep {
        /// Step name
        name: String,
    },

    /// A step must run after a step that is not part of the pipeline
    #[error("Step '{step}' must run after unknown step '{predecessor}'")]
    UnknownPredecessor {
        /// Step declaring the ordering
        step: String,
        /// Missing predecessor
        predecessor: String,
    },

    /// Ordering constraints form a cycle
    #[error("Step ordering contains a cycle at '{step}'")]
    Cycle {
        /// Step where the cycle was detected
        step: String,
    },

    /// A step failed
    #[error("Step '{step}' failed: {source}")]
    StepFailed {
        /// Failed step name
        step: String,
        /// Underlying error
        #[source]
        source: Box<ReleaseError>,
    },

    /// The failure hook's revert failed
    #[error("Step '{step}' failed ({cause}) and reverting the release failed: {source}")]
    RevertFailed {
        /// Failed step name
        step: String,
        /// Rendered original failure
        cause: String,
        /// Revert error
        #[source]
        source: Box<ReleaseError>,
    },
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Interactive input failed
    #[error("Failed to read input for '{prompt}': {source}")]
    InputFailed {
        /// Prompt being answered
        prompt: String,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },
}

impl ReleaseError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ReleaseError::Pipeline(PipelineError::StepFailed { source, .. }) => {
                source.recovery_suggestions()
            }
            ReleaseError::Pipeline(PipelineError::RevertFailed { .. }) => vec![
                "Inspect the repository with: git status && git log --oneline -3".to_string(),
                "Restore the version property file manually: git checkout HEAD -- <file>"
                    .to_string(),
                "Delete any release tag created by this run: git tag --delete <tag>".to_string(),
            ],
            ReleaseError::Cli(CliError::InvalidArguments { .. }) => {
                vec!["Run with --help to see the accepted options".to_string()]
            }
            ReleaseError::Config(ConfigError::NoSupportedAdapter { .. }) => vec![
                "Run from within a git working tree".to_string(),
                "Initialize the repository first: git init".to_string(),
            ],
            ReleaseError::Precondition(PreconditionError::UnversionedFiles { .. })
            | ReleaseError::Precondition(PreconditionError::UncommittedFiles { .. }) => vec![
                "Commit pending changes: git add . && git commit -m 'message'".to_string(),
                "Stash changes temporarily: git stash --include-untracked".to_string(),
            ],
            ReleaseError::Precondition(PreconditionError::LocalChangesToPush { .. }) => {
                vec!["Push local commits first: git push".to_string()]
            }
            ReleaseError::Precondition(PreconditionError::RemoteChangesToPull { .. }) => {
                vec!["Integrate remote commits first: git pull".to_string()]
            }
            ReleaseError::Git(GitError::WrongBranch { required, .. }) => vec![
                format!("Checkout a branch matching '{}'", required),
                "Or change release.git.require_branch in release.toml".to_string(),
            ],
            ReleaseError::Git(GitError::RemoteNotFound { remote }) => vec![
                format!("Add the remote: git remote add {} <url>", remote),
                "Or change release.git.push_to_remote in release.toml".to_string(),
            ],
            ReleaseError::Version(VersionError::UnknownPattern { .. })
            | ReleaseError::Version(VersionError::UnmatchedVersion { .. }) => vec![
                "Add a matching entry to release.version_patterns".to_string(),
            ],
            ReleaseError::Version(VersionError::NotIncrementable { .. }) => vec![
                "Point the pattern's increment at a group that always captures digits"
                    .to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        if let ReleaseError::Pipeline(PipelineError::StepFailed { source, .. }) = self {
            return source.is_recoverable();
        }
        !matches!(
            self,
            ReleaseError::Config(_)
                | ReleaseError::Version(VersionError::UnknownPattern { .. })
                | ReleaseError::Version(VersionError::NotIncrementable { .. })
                | ReleaseError::Git(GitError::RemoteNotFound { .. })
                | ReleaseError::Pipeline(PipelineError::RevertFailed { .. })
        )
    }
}
