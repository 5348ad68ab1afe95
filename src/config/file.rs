//! `release.toml` loading.

use super::{BuildConfig, GitConfig, ReleaseConfig};
use crate::error::{ConfigError, Result};
use crate::git::ScmKind;
use crate::project::ProjectSection;
use crate::version::{VersionPattern, VersionTransform, default_patterns};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file looked up in the project directory
pub const DEFAULT_CONFIG_FILE: &str = "release.toml";

/// Parsed `release.toml`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Release behavior
    pub release: ReleaseSection,
    /// Project model
    pub project: ProjectSection,
}

/// Version pattern entry: a regex with either an incremented group or a template
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatternSpec {
    /// Regex matched against the current version
    pub pattern: String,
    /// Capture group to increment, defaults to 1
    #[serde(default)]
    pub increment: Option<usize>,
    /// Replacement template expanding `$1` / `${name}`
    #[serde(default)]
    pub template: Option<String>,
}

impl PatternSpec {
    fn compile(&self) -> Result<VersionPattern> {
        match (&self.increment, &self.template) {
            (Some(_), Some(_)) => Err(ConfigError::Invalid {
                reason: format!(
                    "version pattern '{}' sets both increment and template",
                    self.pattern
                ),
            }
            .into()),
            (_, Some(template)) => {
                VersionPattern::new(&self.pattern, VersionTransform::Template(template.clone()))
            }
            (group, None) => VersionPattern::increment(&self.pattern, group.unwrap_or(1)),
        }
    }
}

/// `[release]` table. Absent keys keep their defaults.
///
/// Fields mirror [`ReleaseConfig`], with version patterns still uncompiled.
#[allow(missing_docs)]
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReleaseSection {
    pub fail_on_commit_needed: bool,
    pub fail_on_update_needed: bool,
    pub fail_on_unversioned_files: bool,
    pub fail_on_publish_needed: bool,
    pub fail_on_snapshot_dependencies: bool,
    pub revert_on_fail: bool,
    pub pre_tag_commit_message: String,
    pub tag_commit_message: String,
    pub new_version_commit_message: String,
    pub pre_commit_text: String,
    pub tag_template: String,
    pub version_property_file: PathBuf,
    pub version_properties: Vec<String>,
    pub snapshot_suffix: String,
    pub push_release_version_branch: Option<String>,
    pub version_patterns: Vec<PatternSpec>,
    pub ignored_snapshot_dependencies: Vec<String>,
    pub scm_adapters: Vec<ScmKind>,
    pub git: GitConfig,
    pub build: BuildConfig,
}

impl Default for ReleaseSection {
    fn default() -> Self {
        let defaults = ReleaseConfig::default();
        Self {
            fail_on_commit_needed: defaults.fail_on_commit_needed,
            fail_on_update_needed: defaults.fail_on_update_needed,
            fail_on_unversioned_files: defaults.fail_on_unversioned_files,
            fail_on_publish_needed: defaults.fail_on_publish_needed,
            fail_on_snapshot_dependencies: defaults.fail_on_snapshot_dependencies,
            revert_on_fail: defaults.revert_on_fail,
            pre_tag_commit_message: defaults.pre_tag_commit_message,
            tag_commit_message: defaults.tag_commit_message,
            new_version_commit_message: defaults.new_version_commit_message,
            pre_commit_text: defaults.pre_commit_text,
            tag_template: defaults.tag_template,
            version_property_file: defaults.version_property_file,
            version_properties: defaults.version_properties,
            snapshot_suffix: defaults.snapshot_suffix,
            push_release_version_branch: defaults.push_release_version_branch,
            version_patterns: Vec::new(),
            ignored_snapshot_dependencies: defaults.ignored_snapshot_dependencies,
            scm_adapters: defaults.scm_adapters,
            git: defaults.git,
            build: defaults.build,
        }
    }
}

impl ReleaseSection {
    /// Compile patterns and produce the run configuration
    pub fn into_config(self) -> Result<ReleaseConfig> {
        let version_patterns = if self.version_patterns.is_empty() {
            default_patterns()
        } else {
            self.version_patterns
                .iter()
                .map(PatternSpec::compile)
                .collect::<Result<Vec<_>>>()?
        };
        if self.scm_adapters.is_empty() {
            return Err(ConfigError::Invalid {
                reason: "scm_adapters must name at least one adapter".to_string(),
            }
            .into());
        }

        Ok(ReleaseConfig {
            fail_on_commit_needed: self.fail_on_commit_needed,
            fail_on_update_needed: self.fail_on_update_needed,
            fail_on_unversioned_files: self.fail_on_unversioned_files,
            fail_on_publish_needed: self.fail_on_publish_needed,
            fail_on_snapshot_dependencies: self.fail_on_snapshot_dependencies,
            revert_on_fail: self.revert_on_fail,
            pre_tag_commit_message: self.pre_tag_commit_message,
            tag_commit_message: self.tag_commit_message,
            new_version_commit_message: self.new_version_commit_message,
            pre_commit_text: self.pre_commit_text,
            tag_template: self.tag_template,
            version_property_file: self.version_property_file,
            version_properties: self.version_properties,
            snapshot_suffix: self.snapshot_suffix,
            push_release_version_branch: self
                .push_release_version_branch
                .filter(|b| !b.is_empty()),
            version_patterns,
            ignored_snapshot_dependencies: self.ignored_snapshot_dependencies,
            scm_adapters: self.scm_adapters,
            git: self.git,
            build: self.build,
            overrides: Default::default(),
        })
    }
}

impl ConfigFile {
    /// Parse config text, `path` is only used in error messages
    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|source| {
            ConfigError::ParseFailed {
                path: path.to_path_buf(),
                source,
            }
            .into()
        })
    }

    /// Load the config for `project_dir`.
    ///
    /// An explicit `path` must exist. Without one, `release.toml` in the
    /// project directory is read when present and defaults are used otherwise.
    pub fn load(project_dir: &Path, path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (project_dir.join(DEFAULT_CONFIG_FILE), false),
        };

        if !required && !path.exists() {
            log::debug!("No {} found, using default configuration", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::ReadFailed {
            path: path.clone(),
            source,
        })?;
        log::debug!("Loaded configuration from {}", path.display());
        Self::parse(&content, &path)
    }
}
