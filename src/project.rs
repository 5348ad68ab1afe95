//! In-memory model of the project being released.
//!
//! The host build owns the real project graph. The release pipeline only needs
//! its name, directory, version, nested subprojects and the declared
//! dependencies inspected by the snapshot check.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::version::{UNSPECIFIED_VERSION, read_property};

/// A declared dependency of a project
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Dependency {
    /// Group / organization, may be absent
    #[serde(default)]
    pub group: Option<String>,
    /// Artifact name
    pub name: String,
    /// Requested version, may be absent
    #[serde(default)]
    pub version: Option<String>,
}

impl Dependency {
    /// `group:name` coordinate used by the ignore list
    pub fn module_id(&self) -> String {
        format!("{}:{}", self.group.as_deref().unwrap_or(""), self.name)
    }

    /// `group:name:version` coordinate used in reports
    pub fn coordinates(&self) -> String {
        format!(
            "{}:{}",
            self.module_id(),
            self.version.as_deref().unwrap_or("")
        )
    }

    /// Whether the requested version is a snapshot
    pub fn is_snapshot(&self) -> bool {
        self.version
            .as_deref()
            .is_some_and(|v| v.contains("SNAPSHOT"))
    }
}

/// Project section of `release.toml`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProjectSection {
    /// Project name, defaults to the directory name
    pub name: Option<String>,
    /// Version used when the property file does not provide one
    pub version: Option<String>,
    /// Declared dependencies
    pub dependencies: Vec<Dependency>,
    /// Nested projects
    pub subprojects: Vec<SubprojectSection>,
}

/// Subproject entry of `release.toml`
#[derive(Debug, Clone, Deserialize)]
pub struct SubprojectSection {
    /// Subproject name
    pub name: String,
    /// Directory relative to the root project, defaults to the name
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Declared dependencies
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

/// A project and its subprojects
#[derive(Debug, Clone)]
pub struct Project {
    /// Project name, substituted for `$name` in tag templates
    pub name: String,
    /// Project directory
    pub dir: PathBuf,
    /// Current version
    pub version: String,
    /// Nested projects sharing the root's version
    pub subprojects: Vec<Project>,
    /// Declared dependencies
    pub dependencies: Vec<Dependency>,
}

impl Project {
    /// Create a project without subprojects or dependencies
    pub fn new(name: impl Into<String>, dir: impl Into<PathBuf>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dir: dir.into(),
            version: version.into(),
            subprojects: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    /// Build the project model rooted at `dir`.
    ///
    /// The version is taken from the property file when it has one, then from
    /// the config section, and is otherwise left unspecified.
    pub fn load(dir: &Path, section: &ProjectSection, version_property_file: &Path) -> Self {
        let name = section.name.clone().unwrap_or_else(|| {
            dir.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "project".to_string())
        });

        let version = std::fs::read_to_string(dir.join(version_property_file))
            .ok()
            .and_then(|content| read_property(&content, "version"))
            .or_else(|| section.version.clone())
            .unwrap_or_else(|| UNSPECIFIED_VERSION.to_string());

        let subprojects = section
            .subprojects
            .iter()
            .map(|sub| Project {
                name: sub.name.clone(),
                dir: dir.join(sub.path.clone().unwrap_or_else(|| PathBuf::from(&sub.name))),
                version: version.clone(),
                subprojects: Vec::new(),
                dependencies: sub.dependencies.clone(),
            })
            .collect();

        Self {
            name,
            dir: dir.to_path_buf(),
            version,
            subprojects,
            dependencies: section.dependencies.clone(),
        }
    }

    /// Set the version on this project and every nested subproject
    pub fn set_version(&mut self, version: &str) {
        self.version = version.to_string();
        for sub in &mut self.subprojects {
            sub.set_version(version);
        }
    }

    /// This project followed by all nested subprojects, depth first
    pub fn all_projects(&self) -> Vec<&Project> {
        let mut projects = vec![self];
        for sub in &self.subprojects {
            projects.extend(sub.all_projects());
        }
        projects
    }

    /// Report of snapshot dependencies not covered by `ignored`, one line per
    /// offending project. `None` when there are none.
    pub fn snapshot_report(&self, ignored: &[String]) -> Option<String> {
        let report: String = self
            .all_projects()
            .into_iter()
            .filter_map(|project| {
                let snapshots: Vec<String> = project
                    .dependencies
                    .iter()
                    .filter(|d| d.is_snapshot() && !ignored.contains(&d.module_id()))
                    .map(Dependency::coordinates)
                    .collect();
                (!snapshots.is_empty())
                    .then(|| format!("\n\t{}: [{}]", project.name, snapshots.join(", ")))
            })
            .collect();
        (!report.is_empty()).then_some(report)
    }
}
