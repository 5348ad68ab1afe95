//! Typed release configuration.
//!
//! [`ReleaseConfig`] is built once per run from `release.toml` and the command
//! line, then shared read-only by every step.

mod file;

pub use file::{ConfigFile, DEFAULT_CONFIG_FILE, PatternSpec, ReleaseSection};

use crate::git::ScmKind;
use crate::project::Project;
use crate::version::{VersionPattern, default_patterns};
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::path::PathBuf;

/// Git specific settings.
///
/// `require_branch` defaults to `main`. Repositories still releasing from
/// `master` must set it explicitly, or set it to an empty string to accept
/// any branch.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// Regex the current branch must fully match, `None` disables the check
    #[serde(deserialize_with = "empty_as_none")]
    pub require_branch: Option<String>,
    /// Remote receiving queued pushes, `None` disables pushing
    #[serde(deserialize_with = "empty_as_none")]
    pub push_to_remote: Option<String>,
    /// Extra arguments appended to every `git push`
    pub push_options: Vec<String>,
    /// Create GPG signed tags
    pub sign_tag: bool,
    /// Prefix for the pushed branch ref, e.g. `refs/for/`
    #[serde(deserialize_with = "empty_as_none")]
    pub push_to_branch_prefix: Option<String>,
    /// Commit only the version property file instead of all tracked changes
    pub commit_version_file_only: bool,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            require_branch: Some("main".to_string()),
            push_to_remote: Some("origin".to_string()),
            push_options: Vec::new(),
            sign_tag: false,
            push_to_branch_prefix: None,
            commit_version_file_only: false,
        }
    }
}

/// Commands run by the `runBuildTasks` step
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Commands run before the release build
    pub before: Vec<Vec<String>>,
    /// The release build itself
    pub tasks: Vec<Vec<String>>,
    /// Commands run after the release build
    pub after: Vec<Vec<String>>,
    /// Environment entries added to every build command
    pub env: HashMap<String, String>,
}

impl BuildConfig {
    /// Whether no build command is configured
    pub fn is_empty(&self) -> bool {
        self.before.is_empty() && self.tasks.is_empty() && self.after.is_empty()
    }
}

/// Values supplied at run time instead of being confirmed interactively
#[derive(Debug, Clone, Default)]
pub struct VersionOverrides {
    /// Accept every default without prompting
    pub automatic: bool,
    /// Version to release instead of the un-snapshotted one
    pub release_version: Option<String>,
    /// Development version to move to after the release
    pub new_version: Option<String>,
}

/// Configuration of one release run
#[derive(Debug, Clone)]
pub struct ReleaseConfig {
    /// Fail on uncommitted changes instead of warning
    pub fail_on_commit_needed: bool,
    /// Fail when local and remote branches diverge instead of warning
    pub fail_on_update_needed: bool,
    /// Fail on untracked files instead of warning
    pub fail_on_unversioned_files: bool,
    /// Fail on local commits not yet pushed instead of warning
    pub fail_on_publish_needed: bool,
    /// Fail on snapshot dependencies instead of warning
    pub fail_on_snapshot_dependencies: bool,
    /// Revert repository changes when the release fails
    pub revert_on_fail: bool,
    /// Message of the commit made before tagging
    pub pre_tag_commit_message: String,
    /// Annotation of the release tag
    pub tag_commit_message: String,
    /// Message of the commit recording the next version
    pub new_version_commit_message: String,
    /// Text prepended to every commit message
    pub pre_commit_text: String,
    /// Tag name template, `$version` and `$name` are substituted
    pub tag_template: String,
    /// Version property file, relative to the project directory
    pub version_property_file: PathBuf,
    /// Extra keys kept in sync with `version`
    pub version_properties: Vec<String>,
    /// Suffix marking development versions
    pub snapshot_suffix: String,
    /// Release branch merged to and from around the tag
    pub push_release_version_branch: Option<String>,
    /// Ordered version patterns, first match wins
    pub version_patterns: Vec<VersionPattern>,
    /// `group:name` entries exempt from the snapshot check
    pub ignored_snapshot_dependencies: Vec<String>,
    /// Adapters probed in order by `createAdapter`
    pub scm_adapters: Vec<ScmKind>,
    /// Git settings
    pub git: GitConfig,
    /// Release build commands
    pub build: BuildConfig,
    /// Run time overrides
    pub overrides: VersionOverrides,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            fail_on_commit_needed: true,
            fail_on_update_needed: true,
            fail_on_unversioned_files: true,
            fail_on_publish_needed: true,
            fail_on_snapshot_dependencies: true,
            revert_on_fail: true,
            pre_tag_commit_message: "[Release] - pre tag commit:".to_string(),
            tag_commit_message: "[Release] - creating tag:".to_string(),
            new_version_commit_message: "[Release] - new version commit:".to_string(),
            pre_commit_text: String::new(),
            tag_template: "$version".to_string(),
            version_property_file: PathBuf::from("version.properties"),
            version_properties: Vec::new(),
            snapshot_suffix: "-SNAPSHOT".to_string(),
            push_release_version_branch: None,
            version_patterns: default_patterns(),
            ignored_snapshot_dependencies: Vec::new(),
            scm_adapters: vec![ScmKind::Git],
            git: GitConfig::default(),
            build: BuildConfig::default(),
            overrides: VersionOverrides::default(),
        }
    }
}

impl ReleaseConfig {
    /// Tag name for `project` at its current version
    pub fn tag_name(&self, project: &Project) -> String {
        self.tag_template
            .replace("$version", &project.version)
            .replace("$name", &project.name)
    }

    /// Compose a commit or tag message: `<preCommitText> <template> '<tag>'.`
    pub fn commit_message(&self, template: &str, tag: &str) -> String {
        let prefix = [self.pre_commit_text.trim(), template.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        format!("{prefix} '{tag}'.").trim().to_string()
    }

    /// Regex sources of the configured version patterns, in order
    pub fn pattern_sources(&self) -> Vec<String> {
        self.version_patterns
            .iter()
            .map(|p| p.as_str().to_string())
            .collect()
    }
}

/// Treat an empty string as an explicitly disabled option
fn empty_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_strict() {
        let config = ReleaseConfig::default();
        assert!(config.fail_on_commit_needed);
        assert!(config.fail_on_update_needed);
        assert!(config.fail_on_unversioned_files);
        assert!(config.fail_on_publish_needed);
        assert!(config.fail_on_snapshot_dependencies);
        assert!(config.revert_on_fail);
        assert_eq!(config.git.require_branch.as_deref(), Some("main"));
        assert_eq!(config.git.push_to_remote.as_deref(), Some("origin"));
        assert_eq!(config.pattern_sources(), vec![r"(\d+)([^\d]*$)".to_string()]);
    }

    #[test]
    fn tag_template_substitutes_literally() {
        let mut config = ReleaseConfig::default();
        config.tag_template = "$name-v$version".to_string();
        let project = Project::new("app", "/tmp/app", "1.2");
        assert_eq!(config.tag_name(&project), "app-v1.2");
    }

    #[test]
    fn commit_message_drops_empty_parts() {
        let mut config = ReleaseConfig::default();
        assert_eq!(
            config.commit_message(&config.pre_tag_commit_message.clone(), "1.0"),
            "[Release] - pre tag commit: '1.0'."
        );
        config.pre_commit_text = "JIRA-1".to_string();
        assert_eq!(
            config.commit_message("bump", "1.0"),
            "JIRA-1 bump '1.0'."
        );
        assert_eq!(config.commit_message("", "1.0"), "JIRA-1 '1.0'.");
    }
}
