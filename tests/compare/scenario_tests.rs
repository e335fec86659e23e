// Tests for the reference comparison scenarios

use bucketdiff::compare::{CompareOptions, ComparisonStatus, KeyDetail, Outcome};
use bucketdiff::store::MemoryStore;

use crate::{compare, verify_content};

#[tokio::test]
async fn test_missing_extra_and_matched() {
    let source = MemoryStore::new("src")
        .with_tagged_object("a", vec![0u8; 10], "x")
        .with_tagged_object("b", vec![0u8; 5], "y");
    let target = MemoryStore::new("dst")
        .with_tagged_object("a", vec![0u8; 10], "x")
        .with_tagged_object("c", vec![0u8; 1], "z");

    let report = compare(source, target, CompareOptions::default()).await;

    assert_eq!(report.keys(Outcome::MissingInTarget).collect::<Vec<_>>(), vec!["b"]);
    assert_eq!(report.keys(Outcome::ExtraInTarget).collect::<Vec<_>>(), vec!["c"]);
    assert_eq!(report.keys(Outcome::Matched).collect::<Vec<_>>(), vec!["a"]);
    assert_eq!(report.total_keys, 3);
    assert_eq!(report.matched_keys, 1);
    assert_eq!(report.status(), ComparisonStatus::DifferencesFound);
}

#[tokio::test]
async fn test_size_wins_over_tag() {
    let source = MemoryStore::new("src").with_tagged_object("a", vec![0u8; 10], "x");
    let target = MemoryStore::new("dst").with_tagged_object("a", vec![0u8; 20], "x");

    let report = compare(source, target, CompareOptions::default()).await;

    assert_eq!(report.outcome_of("a"), Some(Outcome::SizeMismatch));
    assert_eq!(report.detail("a"), Some(&KeyDetail::Sizes { source: 10, target: 20 }));
}

#[tokio::test]
async fn test_tag_mismatch_and_ignore() {
    let source = || MemoryStore::new("src").with_tagged_object("a", vec![0u8; 10], "x");
    let target = || MemoryStore::new("dst").with_tagged_object("a", vec![0u8; 10], "y");

    let report = compare(source(), target(), CompareOptions::default()).await;
    assert_eq!(report.outcome_of("a"), Some(Outcome::IntegrityTagMismatch));

    let options = CompareOptions {
        ignore_integrity_tag: true,
        ..CompareOptions::default()
    };
    let report = compare(source(), target(), options).await;
    assert_eq!(report.outcome_of("a"), Some(Outcome::Matched));
    assert_eq!(report.status(), ComparisonStatus::Identical);
}

#[tokio::test]
async fn test_content_mismatch_behind_equal_tags() {
    // Multipart-style tag shared by two different bodies of equal size
    let source = MemoryStore::new("src").with_tagged_object("a", b"0123456789".to_vec(), "abc-2");
    let target = MemoryStore::new("dst").with_tagged_object("a", b"9876543210".to_vec(), "abc-2");

    let report = compare(source, target, verify_content()).await;

    assert_eq!(report.outcome_of("a"), Some(Outcome::ContentMismatch));
    assert_eq!(report.matched_keys, 0);
    match report.detail("a") {
        Some(KeyDetail::Digests { algorithm, source, target }) => {
            assert_eq!(algorithm, "md5");
            assert_ne!(source, target);
            assert_eq!(source, "781e5e245d69b566979b86e28d23f2c7");
        }
        other => panic!("unexpected detail: {:?}", other),
    }
}

#[tokio::test]
async fn test_content_match_when_verifying() {
    let body = vec![7u8; 10_000];
    let source = MemoryStore::new("src").with_tagged_object("big", body.clone(), "etag-1");
    let target = MemoryStore::new("dst").with_tagged_object("big", body, "etag-1");

    let options = CompareOptions {
        chunk_size: 1000,
        digest_algorithm: "sha256".to_string(),
        ..verify_content()
    };
    let report = compare(source, target, options).await;

    assert_eq!(report.outcome_of("big"), Some(Outcome::Matched));
    assert_eq!(report.status(), ComparisonStatus::Identical);
}

#[tokio::test]
async fn test_empty_buckets_are_identical() {
    let report = compare(MemoryStore::new("src"), MemoryStore::new("dst"), CompareOptions::default()).await;

    assert_eq!(report.total_keys, 0);
    assert_eq!(report.matched_keys, 0);
    assert_eq!(report.status(), ComparisonStatus::Identical);
    assert!(report.to_plain_text(false).contains("Buckets are identical."));
}

#[tokio::test]
async fn test_quoted_and_unquoted_tags_match() {
    let source = MemoryStore::new("src").with_tagged_object("a", b"data".to_vec(), "\"8d777f385d3dfec8815d20f7496026dc\"");
    let target = MemoryStore::new("dst").with_tagged_object("a", b"data".to_vec(), "8d777f385d3dfec8815d20f7496026dc");

    let report = compare(source, target, CompareOptions::default()).await;
    assert_eq!(report.outcome_of("a"), Some(Outcome::Matched));
}

#[tokio::test]
async fn test_parallel_verification_matches_sequential() {
    let mut source = MemoryStore::new("src");
    let mut target = MemoryStore::new("dst");
    for i in 0..50 {
        let key = format!("obj-{:02}", i);
        source = source.with_tagged_object(&key, format!("body-{:02}", i).into_bytes(), "t");
        let body = if i % 7 == 0 { format!("BODY-{:02}", i) } else { format!("body-{:02}", i) };
        target = target.with_tagged_object(&key, body.into_bytes(), "t");
    }

    let sequential = compare(source.clone(), target.clone(), verify_content()).await;
    let parallel = compare(
        source,
        target,
        CompareOptions {
            concurrency: 8,
            ..verify_content()
        },
    )
    .await;

    assert_eq!(sequential, parallel);
    assert_eq!(parallel.count(Outcome::ContentMismatch), 8);
    assert_eq!(parallel.matched_keys, 42);
}
