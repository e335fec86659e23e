// Bucket snapshot module
// Drains a store listing into a complete key -> metadata map

use std::collections::HashMap;
use std::time::Duration;

use futures::TryStreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use super::filter::KeyFilter;
use crate::error::Result;
use crate::store::{ObjectRecord, ObjectStore};

/// Point-in-time listing of one bucket
#[derive(Debug, Clone, Default)]
pub struct BucketSnapshot {
    bucket: String,
    objects: HashMap<String, ObjectRecord>,
}

impl BucketSnapshot {
    pub fn new(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            objects: HashMap::new(),
        }
    }

    /// Build a snapshot from records; a repeated key keeps the last record
    pub fn from_records(bucket: &str, records: impl IntoIterator<Item = ObjectRecord>) -> Self {
        let mut snapshot = Self::new(bucket);
        for record in records {
            snapshot.insert(record);
        }
        snapshot
    }

    fn insert(&mut self, record: ObjectRecord) {
        self.objects.insert(record.key.clone(), record);
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn get(&self, key: &str) -> Option<&ObjectRecord> {
        self.objects.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.objects.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.objects.keys()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn total_bytes(&self) -> u64 {
        self.objects.values().map(|r| r.size).sum()
    }
}

/// Builds snapshots from an object store
#[derive(Debug, Clone, Default)]
pub struct SnapshotBuilder {
    prefix: String,
    filter: KeyFilter,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only list keys under this prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Drop keys matching the filter while draining
    pub fn with_filter(mut self, filter: KeyFilter) -> Self {
        self.filter = filter;
        self
    }

    /// List the whole bucket into a snapshot.
    ///
    /// The listing is drained to the end. Any listing error aborts the build
    /// and no partial snapshot is returned.
    pub async fn build(&self, store: &dyn ObjectStore) -> Result<BucketSnapshot> {
        self.build_with_progress(store, &ProgressBar::hidden()).await
    }

    /// Same as [`build`](Self::build), ticking a spinner as records arrive
    pub async fn build_with_progress(
        &self,
        store: &dyn ObjectStore,
        pb: &ProgressBar,
    ) -> Result<BucketSnapshot> {
        let bucket = store.bucket();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} [{elapsed_precise}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(120));
        pb.set_message(format!("Listing {}", bucket));

        let mut snapshot = BucketSnapshot::new(bucket);
        let mut excluded = 0usize;
        let mut listing = store.list_objects(&self.prefix);

        while let Some(record) = listing.try_next().await.inspect_err(|_| pb.abandon())? {
            if self.filter.is_excluded(&record.key) {
                excluded += 1;
                continue;
            }

            if snapshot.contains_key(&record.key) {
                warn!(bucket, key = %store.display_key(&record.key), "key listed twice, keeping the later record");
            }
            snapshot.insert(record);

            if snapshot.len() % 1000 == 0 {
                debug!(bucket, objects = snapshot.len(), "listing in progress");
                pb.set_message(format!("Listing {}: {} objects", bucket, snapshot.len()));
            }
        }

        pb.finish_and_clear();
        info!(
            bucket,
            objects = snapshot.len(),
            bytes = snapshot.total_bytes(),
            excluded,
            "bucket listed"
        );

        Ok(snapshot)
    }
}
