// Tests for store adapters

use std::fs;
use std::sync::Arc;

use bucketdiff::compare::{CompareEngine, CompareOptions, Outcome, SnapshotBuilder};
use bucketdiff::store::{local, MemoryStore, ObjectStore};
use futures::TryStreamExt;
use tempfile::TempDir;

#[tokio::test]
async fn test_memory_listing_spans_pages() {
    let mut store = MemoryStore::new("paged").with_page_size(3);
    for i in 0..10 {
        store = store.with_object(&format!("k{}", i), "v");
    }

    let records: Vec<_> = store.list_objects("").try_collect().await.unwrap();
    assert_eq!(records.len(), 10);

    let snapshot = SnapshotBuilder::new().build(&store).await.unwrap();
    assert_eq!(snapshot.len(), 10);
    assert_eq!(snapshot.total_bytes(), 10);
}

#[tokio::test]
async fn test_memory_tag_is_body_md5() {
    let store = MemoryStore::new("b").with_object("hello", "hello world");
    let snapshot = SnapshotBuilder::new().build(&store).await.unwrap();
    let record = snapshot.get("hello").unwrap();

    assert_eq!(record.size, 11);
    assert_eq!(record.integrity_tag.as_deref(), Some("5eb63bbbe01eeed093cb22bb8f5acdc3"));
    assert!(record.last_modified.is_some());
}

#[tokio::test]
async fn test_local_directories_compare() {
    let source_dir = TempDir::new().unwrap();
    let target_dir = TempDir::new().unwrap();

    fs::create_dir_all(source_dir.path().join("nested")).unwrap();
    fs::create_dir_all(target_dir.path().join("nested")).unwrap();
    fs::write(source_dir.path().join("same.txt"), "identical").unwrap();
    fs::write(target_dir.path().join("same.txt"), "identical").unwrap();
    fs::write(source_dir.path().join("nested/changed.txt"), "before").unwrap();
    fs::write(target_dir.path().join("nested/changed.txt"), "after!").unwrap();
    fs::write(source_dir.path().join("nested/only-source.txt"), "x").unwrap();

    let source: Arc<dyn ObjectStore> = Arc::new(local::open(source_dir.path()).unwrap());
    let target: Arc<dyn ObjectStore> = Arc::new(local::open(target_dir.path()).unwrap());

    let options = CompareOptions {
        verify_content: true,
        ..CompareOptions::default()
    };
    let report = CompareEngine::new(options)
        .with_snapshot_builder(SnapshotBuilder::new())
        .compare(source, target)
        .await
        .unwrap();

    assert_eq!(report.total_keys, 3);
    assert_eq!(report.outcome_of("same.txt"), Some(Outcome::Matched));
    assert_eq!(report.outcome_of("nested/changed.txt"), Some(Outcome::ContentMismatch));
    assert_eq!(report.outcome_of("nested/only-source.txt"), Some(Outcome::MissingInTarget));
}

#[test]
fn test_local_root_must_exist() {
    let dir = TempDir::new().unwrap();
    assert!(local::open(&dir.path().join("absent")).is_err());
}

#[tokio::test]
async fn test_prefix_is_a_key_prefix_on_every_store() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("logs")).unwrap();
    fs::write(dir.path().join("logs/a.txt"), "a").unwrap();
    fs::write(dir.path().join("logs-old.txt"), "old").unwrap();
    fs::write(dir.path().join("other.txt"), "other").unwrap();

    let local = local::open(dir.path()).unwrap();
    let memory = MemoryStore::new("mem")
        .with_object("logs/a.txt", "a")
        .with_object("logs-old.txt", "old")
        .with_object("other.txt", "other");

    let builder = SnapshotBuilder::new().with_prefix("logs");
    let sorted_keys = |snapshot: bucketdiff::compare::BucketSnapshot| {
        let mut keys: Vec<String> = snapshot.keys().cloned().collect();
        keys.sort();
        keys
    };

    let from_local = sorted_keys(builder.build(&local).await.unwrap());
    let from_memory = sorted_keys(builder.build(&memory).await.unwrap());

    assert_eq!(from_local, vec!["logs-old.txt", "logs/a.txt"]);
    assert_eq!(from_local, from_memory);

    let nested = SnapshotBuilder::new().with_prefix("logs/");
    assert_eq!(sorted_keys(nested.build(&local).await.unwrap()), vec!["logs/a.txt"]);
}
