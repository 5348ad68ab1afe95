//! SCM operations for release workflows.
//!
//! This module provides the adapter trait the pipeline talks to, the git
//! backed implementation, its per-run session, and adapter selection.

mod factory;
mod git_adapter;
mod operations;
mod session;
pub mod status;

pub use factory::{Scm, ScmKind, find_scm_adapter};
pub use git_adapter::GitAdapter;
pub use operations::ScmAdapter;
pub use session::{PushTarget, ScmSession};
