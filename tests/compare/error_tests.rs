// Tests for error messages

use std::path::PathBuf;

use bucketdiff::error::{BucketDiffError, Side};

#[test]
fn test_errors_carry_suggestions() {
    let errors = vec![
        BucketDiffError::store_access("bucket", None, "listing", "AccessDenied"),
        BucketDiffError::Verification {
            key: "k".to_string(),
            side: Side::Target,
            reason: "reset".to_string(),
        },
        BucketDiffError::UnsupportedAlgorithm {
            algorithm: "crc7".to_string(),
        },
        BucketDiffError::InvalidBucketUri {
            uri: "ftp://x".to_string(),
            reason: "unknown scheme".to_string(),
        },
        BucketDiffError::ProfileCredentials {
            profile: "prod".to_string(),
            reason: "profile `prod` was not defined".to_string(),
        },
        BucketDiffError::ConfigError {
            path: PathBuf::from("config.toml"),
            reason: "expected `=`".to_string(),
        },
        BucketDiffError::InvalidPattern {
            pattern: "[".to_string(),
            reason: "unclosed class".to_string(),
        },
    ];

    for err in errors {
        let message = err.to_string();
        assert!(message.contains("Suggestion:"), "{}", message);
    }
}

#[test]
fn test_store_access_message() {
    let err = BucketDiffError::store_access("media", Some("img/1.png"), "opening", "NotFound");
    let first_line = err.to_string().lines().next().unwrap().to_string();
    assert_eq!(first_line, "Failed opening img/1.png in bucket media: NotFound");
    assert!(err.is_per_key());
    assert!(!BucketDiffError::store_access("media", None, "listing", "x").is_per_key());
}

#[test]
fn test_verification_names_side() {
    let err = BucketDiffError::Verification {
        key: "k".to_string(),
        side: Side::Source,
        reason: "reset".to_string(),
    };
    assert!(err.to_string().starts_with("Could not hash source object k: reset"));
}
