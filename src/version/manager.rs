//! Project version lifecycle: property file discovery, snapshot handling,
//! confirmation and persistence.

use crate::config::ReleaseConfig;
use crate::error::{Result, VersionError};
use crate::project::Project;
use crate::prompt::ValueResolver;
use crate::state::ReleaseState;
use std::path::PathBuf;

use super::pattern::{next_version, strip_snapshot};
use super::properties::{persist, read_property};

/// Version assumed for a project that has none
pub const UNSPECIFIED_VERSION: &str = "unspecified";

/// Starting version offered when a property file has to be created
pub const INITIAL_VERSION: &str = "1.0.0";

/// Whether `version` holds a real value
pub fn is_version_defined(version: &str) -> bool {
    !version.is_empty() && version != UNSPECIFIED_VERSION
}

/// Version operations over the project, release flags and property file
pub struct VersionManager<'a> {
    /// Immutable run configuration
    pub config: &'a ReleaseConfig,
    /// In-memory project model
    pub project: &'a mut Project,
    /// Flags shared with later steps
    pub state: &'a mut ReleaseState,
    /// Confirmation callback
    pub resolver: &'a dyn ValueResolver,
}

impl VersionManager<'_> {
    /// Absolute path of the version property file
    pub fn property_file_path(&self) -> PathBuf {
        self.project.dir.join(&self.config.version_property_file)
    }

    /// Return the property file, creating it after confirmation when absent.
    pub fn find_or_create_properties_file(&mut self) -> Result<PathBuf> {
        let path = self.property_file_path();
        if path.is_file() {
            return Ok(path);
        }

        let automatic = self.config.overrides.automatic;
        if !is_version_defined(&self.project.version) {
            let version = self.release_version(INITIAL_VERSION)?;
            self.project.set_version(&version);
        }
        if !automatic
            && self
                .resolver
                .confirm("Do you want to use SNAPSHOT versions in between releases", false)?
        {
            self.state.uses_snapshot = true;
        }

        let create = automatic
            || self.resolver.confirm(
                &format!(
                    "[{}] not found, create it with version = {}",
                    path.display(),
                    self.project.version
                ),
                false,
            )?;
        if !create {
            log::debug!(
                "[{}] was not found, and user opted out of it being created",
                path.display()
            );
            return Err(VersionError::PropertiesFileDeclined { path }.into());
        }

        persist(&path, "version", &self.project.version)?;
        self.state.properties_file_created = true;
        log::info!("Created {} with version {}", path.display(), self.project.version);
        Ok(path)
    }

    /// Ensure the property file is usable before versions are rewritten.
    ///
    /// The file must be readable and writable, hold a `version` property, and
    /// that version must match a configured pattern.
    pub fn check_properties_file(&mut self) -> Result<PathBuf> {
        let path = self.find_or_create_properties_file()?;
        let access_error = || VersionError::PropertiesFileAccess { path: path.clone() };

        let metadata = std::fs::metadata(&path).map_err(|_| access_error())?;
        if metadata.permissions().readonly() {
            return Err(access_error().into());
        }
        let content = std::fs::read_to_string(&path).map_err(|_| access_error())?;

        let version = read_property(&content, "version").ok_or_else(|| {
            VersionError::MissingVersionProperty { path: path.clone() }
        })?;
        if !self.config.version_patterns.iter().any(|p| p.is_match(&version)) {
            return Err(VersionError::UnmatchedVersion {
                path,
                version,
                patterns: self.config.pattern_sources(),
            }
            .into());
        }

        if !is_version_defined(&self.project.version) {
            self.project.set_version(&version);
        }
        Ok(path)
    }

    /// Strip the snapshot suffix from `current`, flagging snapshot usage
    pub fn un_snapshot(&mut self, current: &str) -> String {
        match strip_snapshot(current, &self.config.snapshot_suffix) {
            Some(release) => {
                self.state.uses_snapshot = true;
                release.to_string()
            }
            None => current.to_string(),
        }
    }

    /// Next development version after `current`
    pub fn next_version(&self, current: &str) -> Result<String> {
        let suffix = self
            .state
            .uses_snapshot
            .then_some(self.config.snapshot_suffix.as_str());
        next_version(current, &self.config.version_patterns, suffix)
    }

    /// Release version to use, confirming `candidate` or its override
    pub fn release_version(&self, candidate: &str) -> Result<String> {
        let overrides = &self.config.overrides;
        let default = overrides.release_version.as_deref().unwrap_or(candidate);
        self.resolver
            .resolve("This release version", default, overrides.automatic)
    }

    /// Development version to move to, confirming `candidate` or its override
    pub fn confirm_next_version(&self, candidate: &str) -> Result<String> {
        let overrides = &self.config.overrides;
        let default = overrides.new_version.as_deref().unwrap_or(candidate);
        self.resolver.resolve(
            &format!(
                "Enter the next version (current one released as [{}])",
                self.project.version
            ),
            default,
            overrides.automatic,
        )
    }

    /// Apply `new_version` to the project, its subprojects and the property file.
    ///
    /// Writes `version` plus every configured extra key. A no-op when the
    /// version is unchanged.
    pub fn update_version_and_project(&mut self, new_version: &str) -> Result<()> {
        if self.project.version == new_version {
            return Ok(());
        }
        log::info!("Updating version {} -> {}", self.project.version, new_version);
        self.project.set_version(new_version);
        self.state.version_modified = true;

        let path = self.find_or_create_properties_file()?;
        for key in self
            .config
            .version_properties
            .iter()
            .map(String::as_str)
            .chain(std::iter::once("version"))
        {
            persist(&path, key, new_version)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::AutomaticResolver;
    use std::fs;

    fn setup(content: Option<&str>) -> (tempfile::TempDir, ReleaseConfig, Project) {
        let dir = tempfile::tempdir().unwrap();
        if let Some(content) = content {
            fs::write(dir.path().join("version.properties"), content).unwrap();
        }
        let mut config = ReleaseConfig::default();
        config.overrides.automatic = true;
        let project = Project::new("demo", dir.path(), UNSPECIFIED_VERSION);
        (dir, config, project)
    }

    #[test]
    fn version_definition() {
        assert!(is_version_defined("1.0"));
        assert!(!is_version_defined(""));
        assert!(!is_version_defined(UNSPECIFIED_VERSION));
    }

    #[test]
    fn un_snapshot_then_bump_restores_suffix() {
        let (_dir, config, mut project) = setup(Some("version=1.4-SNAPSHOT"));
        let mut state = ReleaseState::default();
        let resolver = AutomaticResolver;
        let mut versions = VersionManager {
            config: &config,
            project: &mut project,
            state: &mut state,
            resolver: &resolver,
        };

        let release = versions.un_snapshot("1.4-SNAPSHOT");
        assert_eq!(release, "1.4");
        assert!(versions.state.uses_snapshot);
        assert_eq!(versions.next_version(&release).unwrap(), "1.5-SNAPSHOT");
        assert_eq!(versions.un_snapshot("2.0"), "2.0");
    }

    #[test]
    fn check_adopts_version_from_file() {
        let (dir, config, mut project) = setup(Some("# comment\nversion=2.3\n"));
        let mut state = ReleaseState::default();
        let resolver = AutomaticResolver;
        let mut versions = VersionManager {
            config: &config,
            project: &mut project,
            state: &mut state,
            resolver: &resolver,
        };
        let path = versions.check_properties_file().unwrap();
        assert_eq!(path, dir.path().join("version.properties"));
        assert_eq!(project.version, "2.3");
    }

    #[test]
    fn check_rejects_missing_and_unmatched_versions() {
        let (_dir, config, mut project) = setup(Some("name=demo\n"));
        let mut state = ReleaseState::default();
        let resolver = AutomaticResolver;
        let err = VersionManager {
            config: &config,
            project: &mut project,
            state: &mut state,
            resolver: &resolver,
        }
        .check_properties_file()
        .unwrap_err();
        assert!(err.to_string().contains("contains no 'version' property"));

        let (_dir, config, mut project) = setup(Some("version=abc\n"));
        let err = VersionManager {
            config: &config,
            project: &mut project,
            state: &mut state,
            resolver: &resolver,
        }
        .check_properties_file()
        .unwrap_err();
        assert!(err.to_string().contains("doesn't match any of known version patterns"));
    }

    #[test]
    fn missing_file_is_created_in_automatic_mode() {
        let (dir, config, mut project) = setup(None);
        let mut state = ReleaseState::default();
        let resolver = AutomaticResolver;
        let mut versions = VersionManager {
            config: &config,
            project: &mut project,
            state: &mut state,
            resolver: &resolver,
        };
        versions.find_or_create_properties_file().unwrap();
        assert!(state.properties_file_created);
        assert!(!state.uses_snapshot);
        assert_eq!(project.version, INITIAL_VERSION);
        assert_eq!(
            fs::read_to_string(dir.path().join("version.properties")).unwrap(),
            "version=1.0.0"
        );
    }

    #[test]
    fn declined_creation_is_fatal() {
        let (_dir, mut config, mut project) = setup(None);
        config.overrides.automatic = false;
        project.version = "3.0".to_string();
        let mut state = ReleaseState::default();
        let resolver = AutomaticResolver;
        let err = VersionManager {
            config: &config,
            project: &mut project,
            state: &mut state,
            resolver: &resolver,
        }
        .find_or_create_properties_file()
        .unwrap_err();
        assert!(err.to_string().contains("opted out of it being created"));
        assert!(!state.properties_file_created);
    }

    #[test]
    fn update_writes_extra_keys_and_subprojects() {
        let (dir, mut config, mut project) = setup(Some("version=1.1\nversion1=1.1\nversion2=1.1\n"));
        config.version_properties = vec!["version1".to_string()];
        project.version = "1.1".to_string();
        project.subprojects.push(Project::new("core", dir.path().join("core"), "1.1"));
        let mut state = ReleaseState::default();
        let resolver = AutomaticResolver;
        VersionManager {
            config: &config,
            project: &mut project,
            state: &mut state,
            resolver: &resolver,
        }
        .update_version_and_project("2.2")
        .unwrap();

        assert!(state.version_modified);
        assert_eq!(project.version, "2.2");
        assert_eq!(project.subprojects[0].version, "2.2");
        assert_eq!(
            fs::read_to_string(dir.path().join("version.properties")).unwrap(),
            "version=2.2\nversion1=2.2\nversion2=1.1\n"
        );
    }

    #[test]
    fn update_with_same_version_changes_nothing() {
        let (_dir, config, mut project) = setup(Some("version=1.1\n"));
        project.version = "1.1".to_string();
        let mut state = ReleaseState::default();
        let resolver = AutomaticResolver;
        VersionManager {
            config: &config,
            project: &mut project,
            state: &mut state,
            resolver: &resolver,
        }
        .update_version_and_project("1.1")
        .unwrap();
        assert!(!state.version_modified);
    }

    #[test]
    fn overrides_feed_confirmation_defaults() {
        let (_dir, mut config, mut project) = setup(Some("version=1.1\n"));
        config.overrides.release_version = Some("1.1-rc1".to_string());
        config.overrides.new_version = Some("9.9".to_string());
        let mut state = ReleaseState::default();
        let resolver = AutomaticResolver;
        let versions = VersionManager {
            config: &config,
            project: &mut project,
            state: &mut state,
            resolver: &resolver,
        };
        assert_eq!(versions.release_version("1.1").unwrap(), "1.1-rc1");
        assert_eq!(versions.confirm_next_version("1.2").unwrap(), "9.9");
    }
}
