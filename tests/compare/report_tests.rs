// Tests for report rendering

use bucketdiff::compare::{CompareOptions, Outcome, ReportBuilder};
use bucketdiff::store::MemoryStore;

use crate::compare;

#[tokio::test]
async fn test_plain_text_layout() {
    let source = MemoryStore::new("src")
        .with_tagged_object("a", vec![0u8; 10], "x")
        .with_tagged_object("b", vec![0u8; 5], "y");
    let target = MemoryStore::new("dst")
        .with_tagged_object("a", vec![0u8; 10], "x")
        .with_tagged_object("c", vec![0u8; 1], "z");

    let report = compare(source, target, CompareOptions::default()).await;
    let text = report.to_plain_text(false);

    let expected = "\n=== Bucket Comparison Report ===\n\n\
                    Source: src\n\
                    Target: dst\n\
                    Total keys processed: 3\n\
                    Matched keys:         1\n\
                    \nDifferences found:\n\
                    \nMissing In Target (1):\n  - b\n\
                    \nExtra In Target (1):\n  - c\n";
    assert_eq!(text, expected);
}

#[tokio::test]
async fn test_verbose_text_shows_details() {
    let source = MemoryStore::new("src").with_tagged_object("a", vec![0u8; 10], "x");
    let target = MemoryStore::new("dst").with_tagged_object("a", vec![0u8; 10], "y");

    let report = compare(source, target, CompareOptions::default()).await;

    assert!(report.to_plain_text(true).contains("  - a [source x, target y]"));
    assert!(report.to_plain_text(false).contains("  - a\n"));
}

#[test]
fn test_sections_are_sorted() {
    let mut builder = ReportBuilder::new("src", "dst");
    builder.record("zeta", Outcome::SizeMismatch, None);
    builder.record("alpha", Outcome::SizeMismatch, None);
    builder.record("mid", Outcome::MissingInTarget, None);
    let text = builder.finish().to_plain_text(false);

    let missing = text.find("Missing In Target (1):").unwrap();
    let size = text.find("Size Mismatch (2):").unwrap();
    assert!(missing < size);
    assert!(text.find("  - alpha").unwrap() < text.find("  - zeta").unwrap());
}

#[tokio::test]
async fn test_json_report() {
    let source = MemoryStore::new("src")
        .with_object("kept", "k")
        .with_object("gone", "g");
    let target = MemoryStore::new("dst").with_object("kept", "k");

    let report = compare(source, target, CompareOptions::default()).await;
    let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

    assert_eq!(json["metadata"]["source_bucket"], "src");
    assert_eq!(json["metadata"]["target_bucket"], "dst");
    assert_eq!(json["summary"]["total_keys"], 2);
    assert_eq!(json["summary"]["matched_keys"], 1);
    assert_eq!(json["summary"]["counts"]["missing_in_target"], 1);
    assert_eq!(json["status"], "differences_found");
    assert_eq!(json["differences"]["missing_in_target"][0]["key"], "gone");
    assert_eq!(json["differences"]["missing_in_target"][0]["detail"]["kind"], "present");
    assert_eq!(json["differences"]["missing_in_target"][0]["detail"]["size"], 1);
    assert!(json["differences"].get("matched").is_none());
}
