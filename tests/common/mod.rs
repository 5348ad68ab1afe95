//! Test helpers for integration tests

#![allow(dead_code)]

use kodegen_scm_release::config::ReleaseConfig;
use kodegen_scm_release::project::{Project, ProjectSection};
use kodegen_scm_release::prompt::AutomaticResolver;
use kodegen_scm_release::release::ReleaseContext;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Initial content of the version property file
pub const INITIAL_PROPERTIES: &str = "# managed by the release\nversion=1.4-SNAPSHOT\n";

/// A working repository cloned from a local bare `origin`
pub struct TestRepo {
    _root: TempDir,
    pub path: PathBuf,
    pub origin: PathBuf,
}

impl TestRepo {
    /// Repository on `main` with one pushed commit holding version.properties
    pub fn new() -> Self {
        let root = TempDir::new().expect("create temp dir");
        let origin = root.path().join("origin.git");
        let path = root.path().join("work");

        git(root.path(), &["init", "--bare", "--initial-branch=main", "origin.git"]);
        git(root.path(), &["init", "--initial-branch=main", "work"]);
        git(&path, &["config", "user.name", "Test User"]);
        git(&path, &["config", "user.email", "test@example.com"]);
        git(&path, &["config", "commit.gpgsign", "false"]);
        git(&path, &["config", "tag.gpgsign", "false"]);

        std::fs::write(path.join("version.properties"), INITIAL_PROPERTIES)
            .expect("write version.properties");
        git(&path, &["add", "."]);
        git(&path, &["commit", "-m", "Initial commit"]);
        git(&path, &["remote", "add", "origin", origin.to_str().expect("utf-8 path")]);
        git(&path, &["push", "-u", "origin", "main"]);

        Self {
            _root: root,
            path,
            origin,
        }
    }

    /// Run git in the working repository and return trimmed stdout
    pub fn git(&self, args: &[&str]) -> String {
        git(&self.path, args)
    }

    /// Current HEAD commit id
    pub fn head(&self) -> String {
        self.git(&["rev-parse", "HEAD"])
    }

    /// Local tag names
    pub fn tags(&self) -> Vec<String> {
        self.git(&["tag", "--list"])
            .lines()
            .map(String::from)
            .collect()
    }

    /// Tag names present in the bare origin
    pub fn origin_tags(&self) -> Vec<String> {
        git(&self.origin, &["tag", "--list"])
            .lines()
            .map(String::from)
            .collect()
    }

    /// Content of a file in the working repository
    pub fn read(&self, file: &str) -> String {
        std::fs::read_to_string(self.path.join(file)).expect("read file")
    }

    /// Write a file in the working repository
    pub fn write(&self, file: &str, content: &str) {
        std::fs::write(self.path.join(file), content).expect("write file");
    }

    /// Commit every change with `message`
    pub fn commit_all(&self, message: &str) {
        self.git(&["add", "."]);
        self.git(&["commit", "-m", message]);
    }

    /// Push a new commit to `origin` and drop it locally, leaving the branch one behind
    pub fn fall_behind_origin(&self) {
        self.write("upstream.txt", "pushed from elsewhere");
        self.commit_all("Upstream change");
        self.git(&["push", "origin", "main"]);
        self.git(&["reset", "--hard", "HEAD~1"]);
    }

    /// Create `branch` at HEAD and publish it to `origin`
    pub fn publish_branch(&self, branch: &str) {
        self.git(&["branch", branch]);
        self.git(&["push", "origin", branch]);
    }

    /// Remove the version property file from the repository and from `origin`
    pub fn untrack_property_file(&self) {
        self.git(&["rm", "-q", "version.properties"]);
        self.git(&["commit", "-m", "Drop version file"]);
        self.git(&["push", "origin", "main"]);
    }

    /// Release context for this repository in automatic mode
    pub fn context(&self, mut config: ReleaseConfig) -> ReleaseContext {
        config.overrides.automatic = true;
        let project = Project::load(
            &self.path,
            &ProjectSection::default(),
            &config.version_property_file,
        );
        ReleaseContext::new(config, project, Box::new(AutomaticResolver))
    }
}

/// Run git in `dir`, panicking on failure
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}
