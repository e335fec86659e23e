// Centralized error handling module
// Error kinds for bucket access, content verification and run setup

use std::fmt;
use std::path::PathBuf;

/// Which side of the comparison an error came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Source,
    Target,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Side::Source => write!(f, "source"),
            Side::Target => write!(f, "target"),
        }
    }
}

/// Main error type for bucket comparison
#[derive(Debug)]
pub enum BucketDiffError {
    /// Listing or object fetch failed (network, auth, not found)
    StoreAccess {
        bucket: String,
        key: Option<String>,
        operation: String,
        reason: String,
    },

    /// A digest could not be computed for one side of a key
    Verification { key: String, side: Side, reason: String },

    /// Setup errors, raised before any bucket is listed
    UnsupportedAlgorithm { algorithm: String },
    InvalidBucketUri { uri: String, reason: String },
    ProfileCredentials { profile: String, reason: String },
    ConfigError { path: PathBuf, reason: String },
    InvalidPattern { pattern: String, reason: String },
}

impl fmt::Display for BucketDiffError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BucketDiffError::StoreAccess { bucket, key, operation, reason } => {
                match key {
                    Some(k) => writeln!(f, "Failed {} {} in bucket {}: {}", operation, k, bucket, reason)?,
                    None => writeln!(f, "Failed {} bucket {}: {}", operation, bucket, reason)?,
                }
                write!(f, "Suggestion: Check the bucket name, credentials and network connectivity")
            }
            BucketDiffError::Verification { key, side, reason } => {
                writeln!(f, "Could not hash {} object {}: {}", side, key, reason)?;
                write!(f, "Suggestion: Re-run the comparison; the object may have been removed or is unreadable")
            }
            BucketDiffError::UnsupportedAlgorithm { algorithm } => {
                writeln!(f, "Unsupported hash algorithm: {}", algorithm)?;
                write!(f, "Suggestion: Use one of md5, sha1, sha256, sha384, sha512, sha3-256, sha3-512, blake2b, blake2s, blake3, xxh3, xxh128")
            }
            BucketDiffError::InvalidBucketUri { uri, reason } => {
                writeln!(f, "Invalid bucket location {}: {}", uri, reason)?;
                write!(f, "Suggestion: Use a bucket name, s3://bucket, gs://bucket or file:///path")
            }
            BucketDiffError::ProfileCredentials { profile, reason } => {
                writeln!(f, "Could not load credentials for AWS profile {}: {}", profile, reason)?;
                write!(f, "Suggestion: Check the profile in ~/.aws/config and ~/.aws/credentials (or AWS_CONFIG_FILE / AWS_SHARED_CREDENTIALS_FILE)")
            }
            BucketDiffError::ConfigError { path, reason } => {
                writeln!(f, "Error reading config {}: {}", path.display(), reason)?;
                write!(f, "Suggestion: Check that the config file is valid TOML")
            }
            BucketDiffError::InvalidPattern { pattern, reason } => {
                writeln!(f, "Invalid exclude pattern {}: {}", pattern, reason)?;
                write!(f, "Suggestion: Use glob syntax such as 'logs/**' or '*.tmp'")
            }
        }
    }
}

impl std::error::Error for BucketDiffError {}

impl BucketDiffError {
    /// Build a StoreAccess error from any displayable cause
    pub fn store_access(
        bucket: &str,
        key: Option<&str>,
        operation: &str,
        err: impl fmt::Display,
    ) -> Self {
        BucketDiffError::StoreAccess {
            bucket: bucket.to_string(),
            key: key.map(str::to_string),
            operation: operation.to_string(),
            reason: err.to_string(),
        }
    }

    /// True for errors confined to a single key's content check
    pub fn is_per_key(&self) -> bool {
        matches!(
            self,
            BucketDiffError::Verification { .. } | BucketDiffError::StoreAccess { key: Some(_), .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, BucketDiffError>;
