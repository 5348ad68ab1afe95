//! State management for release operations.
//!
//! The pipeline threads a small set of flags from the steps that discover a
//! condition to the steps that act on it.

mod release_state;

pub use release_state::ReleaseState;
