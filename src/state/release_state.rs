//! Release state tracking for a single pipeline run.

/// Flags raised by early steps and consulted by later ones.
///
/// Owned by the release context for exactly one run and never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReleaseState {
    /// The project version carried the snapshot suffix before release
    pub uses_snapshot: bool,
    /// The version property file was created during this run
    pub properties_file_created: bool,
    /// The project version was rewritten during this run
    pub version_modified: bool,
}

impl ReleaseState {
    /// Whether the pipeline changed anything that the pre-tag commit must record
    pub fn needs_pre_tag_commit(&self) -> bool {
        self.uses_snapshot || self.version_modified || self.properties_file_created
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pre_tag_commit_follows_any_flag() {
        assert!(!ReleaseState::default().needs_pre_tag_commit());
        for state in [
            ReleaseState { uses_snapshot: true, ..Default::default() },
            ReleaseState { properties_file_created: true, ..Default::default() },
            ReleaseState { version_modified: true, ..Default::default() },
        ] {
            assert!(state.needs_pre_tag_commit());
        }
    }
}
