use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use futures::{StreamExt, TryFutureExt, TryStreamExt};
use opendal::{Entry, Metadata, Operator};
use tracing::debug;

use crate::error::{BucketDiffError, Result};
use crate::store::{normalize_tag, ObjectReader, ObjectRecord, ObjectStream, ObjectStore};

/// Any OpenDAL-backed bucket (S3, GCS, local directory)
pub struct OperatorStore {
    operator: Operator,
    bucket: String,
    scheme: &'static str,
}

impl OperatorStore {
    pub fn new(operator: Operator, bucket: &str, scheme: &'static str) -> Self {
        Self {
            operator,
            bucket: bucket.to_string(),
            scheme,
        }
    }

    fn list_error(&self, err: opendal::Error) -> BucketDiffError {
        BucketDiffError::store_access(&self.bucket, None, "listing", err)
    }

    /// Turn a listing entry into a record, skipping directory placeholders.
    ///
    /// Some services list names only; those entries are completed with a stat.
    async fn record_from_entry(&self, entry: Entry) -> Result<Option<ObjectRecord>> {
        let (path, meta) = entry.into_parts();
        if meta.mode().is_dir() || path.ends_with('/') {
            return Ok(None);
        }

        let meta = if meta.etag().is_none() && meta.last_modified().is_none() {
            debug!(bucket = %self.bucket, key = %path, "listing carried no metadata, falling back to stat");
            self.operator
                .stat(&path)
                .await
                .map_err(|e| BucketDiffError::store_access(&self.bucket, Some(&path), "reading metadata of", e))?
        } else {
            meta
        };

        Ok(Some(to_record(path, &meta)))
    }
}

fn to_record(key: String, meta: &Metadata) -> ObjectRecord {
    ObjectRecord {
        key,
        size: meta.content_length(),
        // GCS etags follow the object generation; its content md5 does not
        integrity_tag: meta.content_md5().or(meta.etag()).map(normalize_tag),
        last_modified: meta.last_modified().and_then(|ts| to_utc(&ts.to_string())),
    }
}

/// Parse the store's timestamp rendering (RFC 3339 or `YYYY-MM-DD HH:MM:SS UTC`)
fn to_utc(text: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f UTC")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

/// Directory to list for a key prefix: the prefix up to its last `/`.
///
/// Keys are then kept only when they start with the full prefix, so
/// `data/2024` matches `data/2024-01.csv` as an S3 prefix would.
fn list_root(prefix: &str) -> String {
    match prefix.rfind('/') {
        Some(end) => prefix[..=end].to_string(),
        None => "/".to_string(),
    }
}

#[async_trait]
impl ObjectStore for OperatorStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn list_objects<'a>(&'a self, prefix: &'a str) -> ObjectStream<'a> {
        let prefix = prefix.trim_start_matches('/');
        let root = list_root(prefix);

        let lister = async move {
            self.operator
                .lister_with(&root)
                .recursive(true)
                .await
                .map_err(|e| self.list_error(e))
        };

        lister
            .map_ok(move |lister| {
                lister
                    .map_err(move |e| self.list_error(e))
                    .try_filter_map(move |entry| async move {
                        if entry.path().starts_with(prefix) {
                            self.record_from_entry(entry).await
                        } else {
                            Ok(None)
                        }
                    })
            })
            .try_flatten_stream()
            .boxed()
    }

    async fn open_object(&self, key: &str) -> Result<ObjectReader> {
        let reader = self
            .operator
            .reader(key)
            .await
            .map_err(|e| BucketDiffError::store_access(&self.bucket, Some(key), "opening", e))?;
        let stream = reader
            .into_futures_async_read(..)
            .await
            .map_err(|e| BucketDiffError::store_access(&self.bucket, Some(key), "opening", e))?;
        Ok(Box::new(stream))
    }

    fn display_key(&self, key: &str) -> String {
        format!("{}://{}/{}", self.scheme, self.bucket, key)
    }
}
