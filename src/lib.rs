//! # KODEGEN SCM Release
//!
//! Release pipeline for version controlled projects.
//!
//! A release strips the snapshot suffix from the version, commits and tags
//! it, runs the release build, moves to the next development version,
//! commits again and pushes everything queued along the way. When a step
//! fails the repository is reverted to the state captured at the start.
//!
//! ## Features
//!
//! - **Ordered Steps**: Named steps with "must run after" constraints and skip predicates
//! - **Rollback**: Soft reset to the checkpoint, tag deletion, property file restore
//! - **Deferred Push**: Tags and branches are queued and pushed only at the end
//! - **Version Patterns**: Ordered regex rules compute the next version
//! - **Format Preserving**: The version property file keeps comments and layout
//!
//! ## Usage
//!
//! ```bash
//! kodegen_scm_release                  # Full release of the current directory
//! kodegen_scm_release -y               # Accept every default
//! kodegen_scm_release check            # Verification steps only
//! kodegen_scm_release steps            # List the steps
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Core modules
pub mod cli;
pub mod config;
pub mod error;
pub mod exec;
pub mod git;
pub mod project;
pub mod prompt;
pub mod release;
pub mod state;
pub mod version;

// Re-export main types for public API
pub use cli::Args;
pub use config::ReleaseConfig;
pub use error::{CliError, ReleaseError, Result};
pub use exec::{CommandExecutor, ExecRequest};
pub use git::{GitAdapter, Scm, ScmAdapter, find_scm_adapter};
pub use project::Project;
pub use prompt::{AutomaticResolver, ConsoleResolver, ValueResolver};
pub use release::{ReleaseContext, run_checks, run_release};
pub use state::ReleaseState;
pub use version::VersionManager;
