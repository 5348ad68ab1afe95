//! Per-run adapter state: checkpoint, created tag and the push queue.

use std::path::PathBuf;

/// A queued `git push` destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushTarget {
    /// Remote name
    pub remote: String,
    /// Tag name, branch name or `HEAD:<prefix><branch>` refspec
    pub refspec: String,
    /// Extra push arguments
    pub options: Vec<String>,
}

/// State an adapter accumulates over one release run
#[derive(Debug, Clone, Default)]
pub struct ScmSession {
    /// Repository root discovered by `is_supported`
    pub working_directory: PathBuf,
    /// Branch checked out at `init`
    pub working_branch: String,
    /// Branch the release is tagged on
    pub release_branch: String,
    /// Commit id captured at `init`, the rollback checkpoint
    pub head: Option<String>,
    /// Tag created during this run
    pub tag: Option<String>,
    /// Pushes replayed in order by `push`
    pub pending_pushes: Vec<PushTarget>,
}

impl ScmSession {
    /// Queue a push, keeping insertion order
    pub fn enqueue_push(&mut self, target: PushTarget) {
        log::debug!("Queued push of [{}] to {}", target.refspec, target.remote);
        self.pending_pushes.push(target);
    }
}
