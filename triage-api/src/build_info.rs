//! Compile-time build identification

use std::fmt;

use serde::Serialize;

/// Commit, build time and cargo profile baked in by `build.rs`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuildInfo {
    pub git_hash: &'static str,
    /// RFC 3339, UTC
    pub timestamp: &'static str,
    pub profile: &'static str,
}

impl BuildInfo {
    pub const fn current() -> Self {
        Self {
            git_hash: env!("GIT_HASH"),
            timestamp: env!("BUILD_TIMESTAMP"),
            profile: env!("BUILD_PROFILE"),
        }
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}, built {}", self.git_hash, self.profile, self.timestamp)
    }
}
