// Key classification module
// Assigns every key in the union of two snapshots exactly one outcome

use std::collections::BTreeSet;
use std::fmt;

use super::report::KeyDetail;
use super::snapshot::BucketSnapshot;
use crate::hash::DEFAULT_ALGORITHM;
use crate::store::ObjectRecord;

/// Reference chunk size for streaming object bodies
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Per-key result of a comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    MissingInTarget,
    ExtraInTarget,
    SizeMismatch,
    IntegrityTagMismatch,
    ContentMismatch,
    /// Content check requested but a body could not be hashed
    Unverifiable,
    Matched,
}

impl Outcome {
    /// Every outcome, in report order
    pub const ALL: [Outcome; 7] = [
        Outcome::MissingInTarget,
        Outcome::ExtraInTarget,
        Outcome::SizeMismatch,
        Outcome::IntegrityTagMismatch,
        Outcome::ContentMismatch,
        Outcome::Unverifiable,
        Outcome::Matched,
    ];

    /// Outcomes that count as a difference
    pub const DIFFERENCES: [Outcome; 6] = [
        Outcome::MissingInTarget,
        Outcome::ExtraInTarget,
        Outcome::SizeMismatch,
        Outcome::IntegrityTagMismatch,
        Outcome::ContentMismatch,
        Outcome::Unverifiable,
    ];

    /// Report heading
    pub fn title(self) -> &'static str {
        match self {
            Outcome::MissingInTarget => "Missing In Target",
            Outcome::ExtraInTarget => "Extra In Target",
            Outcome::SizeMismatch => "Size Mismatch",
            Outcome::IntegrityTagMismatch => "Integrity Tag Mismatch",
            Outcome::ContentMismatch => "Content Mismatch",
            Outcome::Unverifiable => "Unverifiable",
            Outcome::Matched => "Matched",
        }
    }

    /// Outcome seen from the other side: missing and extra trade places
    pub fn swapped(self) -> Outcome {
        match self {
            Outcome::MissingInTarget => Outcome::ExtraInTarget,
            Outcome::ExtraInTarget => Outcome::MissingInTarget,
            other => other,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Knobs for one comparison run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareOptions {
    /// A tag mismatch alone is not a difference
    pub ignore_integrity_tag: bool,
    /// Hash bodies of keys whose metadata agrees
    pub verify_content: bool,
    pub digest_algorithm: String,
    pub chunk_size: usize,
    /// Content checks in flight at once; 1 is strictly sequential
    pub concurrency: usize,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            ignore_integrity_tag: false,
            verify_content: false,
            digest_algorithm: DEFAULT_ALGORITHM.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            concurrency: 1,
        }
    }
}

/// What metadata alone says about a key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Final(Outcome, Option<KeyDetail>),
    /// Metadata agrees; only a content check can settle it
    VerifyContent,
}

/// Decide a key from its two records. Pure: no I/O, no shared state.
///
/// Size is checked before the tag, since a tag only means something once
/// sizes agree.
pub fn decide(
    source: Option<&ObjectRecord>,
    target: Option<&ObjectRecord>,
    options: &CompareOptions,
) -> Decision {
    let (source, target) = match (source, target) {
        (None, Some(t)) => {
            return Decision::Final(Outcome::ExtraInTarget, Some(KeyDetail::Present { size: t.size }))
        }
        (Some(s), None) => {
            return Decision::Final(Outcome::MissingInTarget, Some(KeyDetail::Present { size: s.size }))
        }
        (Some(s), Some(t)) => (s, t),
        // Absent from both snapshots: nothing to differ
        (None, None) => return Decision::Final(Outcome::Matched, None),
    };

    if source.size != target.size {
        return Decision::Final(
            Outcome::SizeMismatch,
            Some(KeyDetail::Sizes {
                source: source.size,
                target: target.size,
            }),
        );
    }

    if !options.ignore_integrity_tag && source.integrity_tag != target.integrity_tag {
        return Decision::Final(
            Outcome::IntegrityTagMismatch,
            Some(KeyDetail::Tags {
                source: source.integrity_tag.clone(),
                target: target.integrity_tag.clone(),
            }),
        );
    }

    if options.verify_content {
        Decision::VerifyContent
    } else {
        Decision::Final(Outcome::Matched, None)
    }
}

/// Result of the metadata pass over the key union
#[derive(Debug, Default)]
pub struct MetadataPass {
    pub total_keys: usize,
    /// Keys settled by metadata, in key order
    pub decided: Vec<(String, Outcome, Option<KeyDetail>)>,
    /// Keys waiting on a content check, in key order
    pub pending: Vec<String>,
}

/// Fold [`decide`] over `union(source.keys, target.keys)`
pub fn classify_metadata(
    source: &BucketSnapshot,
    target: &BucketSnapshot,
    options: &CompareOptions,
) -> MetadataPass {
    let all_keys: BTreeSet<&String> = source.keys().chain(target.keys()).collect();

    let mut pass = MetadataPass {
        total_keys: all_keys.len(),
        ..Default::default()
    };

    for key in all_keys {
        match decide(source.get(key), target.get(key), options) {
            Decision::Final(outcome, detail) => pass.decided.push((key.clone(), outcome, detail)),
            Decision::VerifyContent => pass.pending.push(key.clone()),
        }
    }

    pass
}
