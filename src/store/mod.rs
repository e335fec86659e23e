//! Object store adapters.
//!
//! Every bucket the comparison reads goes through [`ObjectStore`]: a complete
//! recursive listing with per-object metadata, and a streaming reader for one
//! object's body. Remote buckets are served by OpenDAL; [`MemoryStore`] keeps
//! everything in process.

pub mod gcs;
pub mod local;
pub mod memory;
pub mod operator;
pub mod s3;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;

use crate::config::SideConfig;
use crate::error::{BucketDiffError, Result};

pub use memory::MemoryStore;
pub use operator::OperatorStore;

/// Metadata for one stored object, as reported by the store's listing.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ObjectRecord {
    pub key: String,
    pub size: u64,
    /// Store-computed tag (S3 ETag, GCS md5/etag). Opaque; not always a content hash.
    pub integrity_tag: Option<String>,
    pub last_modified: Option<DateTime<Utc>>,
}

impl ObjectRecord {
    pub fn new(key: impl Into<String>, size: u64, integrity_tag: Option<&str>) -> Self {
        Self {
            key: key.into(),
            size,
            integrity_tag: integrity_tag.map(normalize_tag),
            last_modified: None,
        }
    }

    pub fn with_last_modified(mut self, last_modified: DateTime<Utc>) -> Self {
        self.last_modified = Some(last_modified);
        self
    }
}

/// S3 returns ETags wrapped in double quotes; listings from other tools may not.
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().trim_matches('"').to_string()
}

/// Stream of listed objects; an `Err` item ends the listing.
pub type ObjectStream<'a> = BoxStream<'a, Result<ObjectRecord>>;

/// Byte stream for a single object body.
pub type ObjectReader = Box<dyn futures::AsyncRead + Send + Unpin>;

/// Read-only view of one bucket.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Bucket name used in logs and reports
    fn bucket(&self) -> &str;

    /// List every object under `prefix` (empty for the whole bucket).
    ///
    /// Pagination is handled inside the stream; callers drain it to the end.
    fn list_objects<'a>(&'a self, prefix: &'a str) -> ObjectStream<'a>;

    /// Open the body of `key` for streaming reads
    async fn open_object(&self, key: &str) -> Result<ObjectReader>;

    /// Display form of a key, e.g. `s3://bucket/key`
    fn display_key(&self, key: &str) -> String {
        format!("{}/{}", self.bucket(), key)
    }
}

/// Where a bucket lives, parsed from the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BucketLocation {
    S3 { bucket: String },
    Gcs { bucket: String },
    Local { root: PathBuf },
}

impl fmt::Display for BucketLocation {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            BucketLocation::S3 { bucket } => write!(f, "s3://{}", bucket),
            BucketLocation::Gcs { bucket } => write!(f, "gs://{}", bucket),
            BucketLocation::Local { root } => write!(f, "file://{}", root.display()),
        }
    }
}

impl FromStr for BucketLocation {
    type Err = BucketDiffError;

    fn from_str(uri: &str) -> Result<Self> {
        let invalid = |reason: &str| BucketDiffError::InvalidBucketUri {
            uri: uri.to_string(),
            reason: reason.to_string(),
        };

        if let Some(path) = uri.strip_prefix("file://") {
            if path.is_empty() {
                return Err(invalid("missing directory path"));
            }
            return Ok(BucketLocation::Local { root: PathBuf::from(path) });
        }

        let (scheme, bucket) = match uri.split_once("://") {
            Some((scheme, rest)) => (scheme, rest.trim_end_matches('/')),
            None => ("s3", uri),
        };

        if bucket.is_empty() {
            return Err(invalid("missing bucket name"));
        }
        if bucket.contains('/') {
            return Err(invalid("bucket location must not include a key path; use --prefix"));
        }

        match scheme {
            "s3" => Ok(BucketLocation::S3 { bucket: bucket.to_string() }),
            "gs" | "gcs" => Ok(BucketLocation::Gcs { bucket: bucket.to_string() }),
            other => Err(invalid(&format!("unknown scheme '{}'", other))),
        }
    }
}

/// Open the store for a location using one side's settings
pub async fn open_store(
    location: &BucketLocation,
    side: &SideConfig,
) -> Result<Arc<dyn ObjectStore>> {
    let store = match location {
        BucketLocation::S3 { bucket } => s3::open(bucket, side).await?,
        BucketLocation::Gcs { bucket } => gcs::open(bucket, side)?,
        BucketLocation::Local { root } => local::open(root)?,
    };
    Ok(Arc::new(store))
}
