// Tests for listing and read failures

use std::sync::Arc;

use bucketdiff::compare::{CompareEngine, CompareOptions, ComparisonStatus, KeyDetail, Outcome, SnapshotBuilder};
use bucketdiff::error::BucketDiffError;
use bucketdiff::store::{MemoryStore, ObjectStore};

use crate::{compare, verify_content};

#[tokio::test]
async fn test_read_failure_is_unverifiable() {
    let source = MemoryStore::new("src")
        .with_object("ok.txt", "fine")
        .with_object("broken.txt", "bytes")
        .with_failing_read("broken.txt");
    let target = MemoryStore::new("dst")
        .with_object("ok.txt", "fine")
        .with_object("broken.txt", "bytes");

    let report = compare(source, target, verify_content()).await;

    assert_eq!(report.outcome_of("broken.txt"), Some(Outcome::Unverifiable));
    assert_eq!(report.outcome_of("ok.txt"), Some(Outcome::Matched));
    assert_eq!(report.total_keys, 2);
    assert_eq!(report.matched_keys, 1);
    assert_eq!(report.status(), ComparisonStatus::DifferencesFound);
    assert!(matches!(report.detail("broken.txt"), Some(KeyDetail::Failure { .. })));
}

#[tokio::test]
async fn test_target_read_failure_is_unverifiable() {
    let source = MemoryStore::new("src").with_object("k", "v");
    let target = MemoryStore::new("dst").with_object("k", "v").with_failing_read("k");

    let report = compare(source, target, verify_content()).await;
    assert_eq!(report.outcome_of("k"), Some(Outcome::Unverifiable));
}

#[tokio::test]
async fn test_unread_keys_are_not_affected_without_verification() {
    let source = MemoryStore::new("src").with_object("k", "v").with_failing_read("k");
    let target = MemoryStore::new("dst").with_object("k", "v");

    let report = compare(source, target, CompareOptions::default()).await;
    assert_eq!(report.outcome_of("k"), Some(Outcome::Matched));
}

#[tokio::test]
async fn test_listing_failure_aborts() {
    let source = MemoryStore::new("src")
        .with_object("a", "1")
        .with_object("b", "2")
        .with_object("c", "3")
        .with_page_size(1)
        .with_listing_failure(2, "connection reset");
    let target = MemoryStore::new("dst").with_object("a", "1");

    let source: Arc<dyn ObjectStore> = Arc::new(source);
    let target: Arc<dyn ObjectStore> = Arc::new(target);
    let err = CompareEngine::new(CompareOptions::default())
        .compare(source, target)
        .await
        .unwrap_err();

    match err {
        BucketDiffError::StoreAccess { bucket, key, reason, .. } => {
            assert_eq!(bucket, "src");
            assert_eq!(key, None);
            assert_eq!(reason, "connection reset");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_snapshot_has_no_partial_result() {
    let store = MemoryStore::new("dst")
        .with_object("a", "1")
        .with_listing_failure(1, "throttled");

    let result = SnapshotBuilder::new().build(&store).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_unknown_algorithm_fails_before_listing() {
    let source = MemoryStore::new("src").with_listing_failure(0, "should not be listed");
    let target = MemoryStore::new("dst");
    let options = CompareOptions {
        digest_algorithm: "crc7".to_string(),
        ..verify_content()
    };

    let source: Arc<dyn ObjectStore> = Arc::new(source);
    let target: Arc<dyn ObjectStore> = Arc::new(target);
    let err = CompareEngine::new(options).compare(source, target).await.unwrap_err();
    assert!(matches!(err, BucketDiffError::UnsupportedAlgorithm { .. }));
}
