use std::collections::{BTreeMap, HashSet};
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use futures::io::Cursor;
use futures::{stream, AsyncRead, StreamExt};

use crate::error::{BucketDiffError, Result};
use crate::hash::digest_hex;
use crate::store::{ObjectReader, ObjectRecord, ObjectStream, ObjectStore};

#[derive(Debug, Clone)]
struct MemoryObject {
    record: ObjectRecord,
    body: Vec<u8>,
}

/// In-process bucket with optional injected failures.
///
/// Objects are listed in key order, `page_size` records at a time.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    bucket: String,
    objects: BTreeMap<String, MemoryObject>,
    page_size: usize,
    failing_reads: HashSet<String>,
    listing_failure: Option<(usize, String)>,
}

impl MemoryStore {
    pub fn new(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            objects: BTreeMap::new(),
            page_size: 1000,
            failing_reads: HashSet::new(),
            listing_failure: None,
        }
    }

    /// Add an object whose tag is the MD5 of its body, like a single-part S3 upload
    pub fn with_object(self, key: &str, body: impl Into<Vec<u8>>) -> Self {
        let body = body.into();
        let tag = digest_hex("md5", &body).ok();
        self.insert(key, body, tag)
    }

    /// Add an object with an explicit tag (e.g. a multipart `"<hash>-3"` ETag)
    pub fn with_tagged_object(self, key: &str, body: impl Into<Vec<u8>>, tag: &str) -> Self {
        self.insert(key, body.into(), Some(tag.to_string()))
    }

    /// Make reads of `key` fail after the object was opened
    pub fn with_failing_read(mut self, key: &str) -> Self {
        self.failing_reads.insert(key.to_string());
        self
    }

    /// Make the listing fail once `after` records have been yielded
    pub fn with_listing_failure(mut self, after: usize, reason: &str) -> Self {
        self.listing_failure = Some((after, reason.to_string()));
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn insert(mut self, key: &str, body: Vec<u8>, tag: Option<String>) -> Self {
        let record = ObjectRecord::new(key, body.len() as u64, tag.as_deref())
            .with_last_modified(chrono::Utc::now());
        self.objects.insert(key.to_string(), MemoryObject { record, body });
        self
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn list_objects<'a>(&'a self, prefix: &'a str) -> ObjectStream<'a> {
        let records: Vec<ObjectRecord> = self
            .objects
            .values()
            .filter(|object| object.record.key.starts_with(prefix))
            .map(|object| object.record.clone())
            .collect();

        let mut items: Vec<Result<ObjectRecord>> = match &self.listing_failure {
            Some((after, reason)) => {
                let mut items: Vec<_> = records.into_iter().take(*after).map(Ok).collect();
                items.push(Err(BucketDiffError::store_access(&self.bucket, None, "listing", reason)));
                items
            }
            None => records.into_iter().map(Ok).collect(),
        };

        // Yield page by page so consumers see a multi-page listing
        let mut pages = Vec::new();
        while !items.is_empty() {
            let rest = items.split_off(items.len().min(self.page_size));
            pages.push(std::mem::replace(&mut items, rest));
        }

        stream::iter(pages)
            .flat_map(stream::iter)
            .boxed()
    }

    async fn open_object(&self, key: &str) -> Result<ObjectReader> {
        let object = self.objects.get(key).ok_or_else(|| {
            BucketDiffError::store_access(&self.bucket, Some(key), "opening", "no such key")
        })?;

        if self.failing_reads.contains(key) {
            return Ok(Box::new(FailingReader));
        }
        Ok(Box::new(Cursor::new(object.body.clone())))
    }

    fn display_key(&self, key: &str) -> String {
        format!("mem://{}/{}", self.bucket, key)
    }
}

/// Reader whose first read fails, like a connection reset mid-download
struct FailingReader;

impl AsyncRead for FailingReader {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &mut [u8],
    ) -> Poll<io::Result<usize>> {
        Poll::Ready(Err(io::Error::new(
            io::ErrorKind::ConnectionReset,
            "connection reset while reading object body",
        )))
    }
}
