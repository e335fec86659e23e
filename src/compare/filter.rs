//! Key filtering for bucket listings.
//!
//! Glob patterns (`logs/**`, `*.tmp`) drop keys before they enter a snapshot,
//! so excluded keys are never classified.

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::error::{BucketDiffError, Result};

/// Compiled exclude patterns.
#[derive(Debug, Clone)]
pub struct KeyFilter {
    /// Compiled glob set for matching.
    glob_set: GlobSet,
    /// Raw pattern strings (for display).
    patterns: Vec<String>,
}

impl Default for KeyFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyFilter {
    /// Filter that keeps every key.
    pub fn new() -> Self {
        Self {
            glob_set: GlobSet::empty(),
            patterns: Vec::new(),
        }
    }

    /// Compile a list of exclude patterns.
    pub fn from_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        let mut pattern_list = Vec::new();

        for pattern in patterns {
            let pattern = pattern.as_ref();
            let glob = Glob::new(pattern).map_err(|e| BucketDiffError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })?;
            builder.add(glob);
            pattern_list.push(pattern.to_string());
        }

        let glob_set = builder.build().map_err(|e| BucketDiffError::InvalidPattern {
            pattern: pattern_list.join(", "),
            reason: e.to_string(),
        })?;

        Ok(Self {
            glob_set,
            patterns: pattern_list,
        })
    }

    /// Check whether a key is excluded.
    pub fn is_excluded(&self, key: &str) -> bool {
        !self.patterns.is_empty() && self.glob_set.is_match(key)
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
