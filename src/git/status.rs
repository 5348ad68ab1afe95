//! Parsers for git porcelain output.

use regex::Regex;
use std::sync::LazyLock;

static AHEAD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"ahead (\d+)").expect("ahead pattern compiles"));
static BEHIND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"behind (\d+)").expect("behind pattern compiles"));

/// Branch marked current in `git branch --no-color` output
pub fn current_branch(output: &str) -> Option<String> {
    output
        .lines()
        .find_map(|line| line.strip_prefix("* "))
        .map(|branch| branch.trim().to_string())
}

/// Working tree changes from `git status --porcelain`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkingTreeChanges {
    /// Untracked entries (`??`)
    pub unversioned: Vec<String>,
    /// Every other change
    pub uncommitted: Vec<String>,
}

/// Partition porcelain status lines into untracked and other changes
pub fn classify_changes(output: &str) -> WorkingTreeChanges {
    let mut changes = WorkingTreeChanges::default();
    for line in output.lines().filter(|l| !l.trim().is_empty()) {
        if line.starts_with("??") {
            changes.unversioned.push(line.to_string());
        } else {
            changes.uncommitted.push(line.to_string());
        }
    }
    changes
}

/// Commits ahead of and behind the upstream, read from the
/// `## branch...upstream [ahead N, behind M]` header of `git status --porcelain -b`
pub fn ahead_behind(output: &str) -> (u32, u32) {
    let header = output.lines().next().unwrap_or_default();
    let count = |regex: &Regex| {
        regex
            .captures(header)
            .and_then(|caps| caps[1].parse().ok())
            .unwrap_or(0)
    };
    (count(&AHEAD), count(&BEHIND))
}
