//! Version management for property-file based releases.
//!
//! This module parses and increments version strings against ordered
//! patterns, and rewrites the flat version property file in place.

mod manager;
mod pattern;
mod properties;

pub use manager::{INITIAL_VERSION, UNSPECIFIED_VERSION, VersionManager, is_version_defined};
pub use pattern::{
    DEFAULT_VERSION_PATTERN, TransformFn, VersionPattern, VersionTransform, default_patterns,
    next_version, strip_snapshot,
};
pub use properties::{persist, read_property, rewrite_property};
