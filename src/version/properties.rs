//! Format-preserving reads and writes of flat `key<sep>value` property files.
//!
//! Separators are `=`, `:` or plain whitespace. Rewrites touch only the value
//! portion of lines whose key matches; comments, blank lines, ordering and
//! every unrelated line are preserved byte for byte.

use crate::error::{Result, VersionError};
use regex::Regex;
use std::path::Path;

fn key_line_regex(key: &str) -> Regex {
    let pattern = format!(r"^(\s*){}((?:\s*[=:]\s*)|(?:\s+))(.+)$", regex::escape(key));
    // The key is escaped, so the pattern is always valid.
    Regex::new(&pattern).expect("escaped property key forms a valid regex")
}

/// Split a trailing carriage return off a line so CRLF files survive a rewrite
fn split_cr(line: &str) -> (&str, &str) {
    match line.strip_suffix('\r') {
        Some(body) => (body, "\r"),
        None => (line, ""),
    }
}

/// Value of `key` in `content`, trimmed
pub fn read_property(content: &str, key: &str) -> Option<String> {
    let regex = key_line_regex(key);
    content.split('\n').find_map(|line| {
        let (body, _) = split_cr(line);
        regex
            .captures(body)
            .and_then(|caps| caps.get(3))
            .map(|value| value.as_str().trim().to_string())
    })
}

/// Replace the value of every line assigning `key`. Returns the new content
/// and whether any line matched.
pub fn rewrite_property(content: &str, key: &str, value: &str) -> (String, bool) {
    let regex = key_line_regex(key);
    let mut matched = false;
    let lines: Vec<String> = content
        .split('\n')
        .map(|line| {
            let (body, cr) = split_cr(line);
            match regex.captures(body) {
                Some(caps) => {
                    matched = true;
                    format!("{}{}{}{}{}", &caps[1], key, &caps[2], value, cr)
                }
                None => line.to_string(),
            }
        })
        .collect();
    (lines.join("\n"), matched)
}

/// Persist `key = value` into the property file at `path`.
///
/// A missing file is created holding the single line `key=value`. An existing
/// file without the key is left untouched.
pub fn persist(path: &Path, key: &str, value: &str) -> Result<()> {
    if !path.is_file() {
        return std::fs::write(path, format!("{key}={value}")).map_err(|source| {
            VersionError::WriteFailed {
                path: path.to_path_buf(),
                source,
            }
            .into()
        });
    }

    let content = std::fs::read_to_string(path).map_err(|_| VersionError::PropertiesFileAccess {
        path: path.to_path_buf(),
    })?;
    let (updated, matched) = rewrite_property(&content, key, value);
    if !matched {
        log::debug!("{} has no '{}' property, leaving it unchanged", path.display(), key);
        return Ok(());
    }
    std::fs::write(path, updated).map_err(|source| VersionError::WriteFailed {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}
