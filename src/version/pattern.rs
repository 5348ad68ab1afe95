//! Ordered version patterns and next-version computation.

use crate::error::{ConfigError, Result, VersionError};
use regex::{Captures, Regex};
use std::fmt;
use std::sync::Arc;

/// Pattern used when no `version_patterns` are configured
pub const DEFAULT_VERSION_PATTERN: &str = r"(\d+)([^\d]*$)";

/// Pure function from a pattern match to its replacement text
pub type TransformFn = dyn Fn(&Captures<'_>) -> String + Send + Sync;

/// How a matched portion of a version is rewritten
#[derive(Clone)]
pub enum VersionTransform {
    /// Increment the numeric capture group, keep the rest of the match verbatim
    Increment {
        /// Capture group index (1-based)
        group: usize,
    },
    /// Expand a replacement template (`$1`, `${name}`)
    Template(String),
    /// Arbitrary pure transform supplied in code
    Custom(Arc<TransformFn>),
}

impl fmt::Debug for VersionTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Increment { group } => f.debug_struct("Increment").field("group", group).finish(),
            Self::Template(template) => f.debug_tuple("Template").field(template).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// A regex paired with the transform applied to its match
#[derive(Debug, Clone)]
pub struct VersionPattern {
    regex: Regex,
    transform: VersionTransform,
}

impl VersionPattern {
    /// Compile a pattern
    pub fn new(pattern: &str, transform: VersionTransform) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self { regex, transform })
    }

    /// Pattern incrementing capture group `group`.
    ///
    /// `group` must name one of the pattern's capture groups.
    pub fn increment(pattern: &str, group: usize) -> Result<Self> {
        let compiled = Self::new(pattern, VersionTransform::Increment { group })?;
        let groups = compiled.regex.captures_len() - 1;
        if group == 0 || group > groups {
            return Err(ConfigError::InvalidIncrementGroup {
                pattern: pattern.to_string(),
                group,
                groups,
            }
            .into());
        }
        Ok(compiled)
    }

    /// Pattern with a transform written in code
    pub fn custom<F>(pattern: &str, transform: F) -> Result<Self>
    where
        F: Fn(&Captures<'_>) -> String + Send + Sync + 'static,
    {
        Self::new(pattern, VersionTransform::Custom(Arc::new(transform)))
    }

    /// Regex source
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Whether the regex matches anywhere in `version`
    pub fn is_match(&self, version: &str) -> bool {
        self.regex.is_match(version)
    }

    /// Replace every match in `version` with its transform
    pub fn apply(&self, version: &str) -> Result<String> {
        let mut next = String::with_capacity(version.len() + 1);
        let mut copied = 0;
        for caps in self.regex.captures_iter(version) {
            let Some(whole) = caps.get(0) else { continue };
            next.push_str(&version[copied..whole.start()]);
            next.push_str(&self.transform_match(version, &caps)?);
            copied = whole.end();
        }
        next.push_str(&version[copied..]);
        Ok(next)
    }

    fn transform_match(&self, version: &str, caps: &Captures<'_>) -> Result<String> {
        match &self.transform {
            VersionTransform::Increment { group } => {
                increment_group(caps, *group).ok_or_else(|| {
                    VersionError::NotIncrementable {
                        version: version.to_string(),
                        pattern: self.as_str().to_string(),
                        group: *group,
                    }
                    .into()
                })
            }
            VersionTransform::Template(template) => {
                let mut expanded = String::new();
                caps.expand(template, &mut expanded);
                Ok(expanded)
            }
            VersionTransform::Custom(transform) => Ok(transform(caps)),
        }
    }
}

/// The built-in pattern list: bump the last number in the version
pub fn default_patterns() -> Vec<VersionPattern> {
    vec![VersionPattern {
        regex: Regex::new(DEFAULT_VERSION_PATTERN).expect("default version pattern compiles"),
        transform: VersionTransform::Increment { group: 1 },
    }]
}

/// Compute the version following `current`.
///
/// The first pattern matching `current` is authoritative. `snapshot_suffix`
/// is appended to the result when given.
pub fn next_version(
    current: &str,
    patterns: &[VersionPattern],
    snapshot_suffix: Option<&str>,
) -> Result<String> {
    let pattern = patterns
        .iter()
        .find(|p| p.is_match(current))
        .ok_or_else(|| VersionError::UnknownPattern {
            version: current.to_string(),
            patterns: patterns.iter().map(|p| p.as_str().to_string()).collect(),
        })?;

    let mut next = pattern.apply(current)?;
    if let Some(suffix) = snapshot_suffix {
        next.push_str(suffix);
    }
    Ok(next)
}

/// Strip `suffix` from the end of `version`, `None` if it is not a snapshot
pub fn strip_snapshot<'v>(version: &'v str, suffix: &str) -> Option<&'v str> {
    if suffix.is_empty() {
        return None;
    }
    version.strip_suffix(suffix)
}

/// The match with group `group` incremented, `None` unless the group captured digits
fn increment_group(caps: &Captures<'_>, group: usize) -> Option<String> {
    let whole = caps.get(0)?;
    let target = caps.get(group)?;
    let incremented = increment_decimal(target.as_str())?;
    let text = whole.as_str();
    let start = target.start() - whole.start();
    let end = target.end() - whole.start();
    Some(format!("{}{}{}", &text[..start], incremented, &text[end..]))
}

/// Add one to a decimal digit string of any length
fn increment_decimal(digits: &str) -> Option<String> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let mut bytes = digits.as_bytes().to_vec();
    for byte in bytes.iter_mut().rev() {
        if *byte == b'9' {
            *byte = b'0';
        } else {
            *byte += 1;
            return Some(String::from_utf8_lossy(&bytes).into_owned());
        }
    }
    let mut carried = String::with_capacity(bytes.len() + 1);
    carried.push('1');
    carried.push_str(&String::from_utf8_lossy(&bytes));
    Some(carried)
}
