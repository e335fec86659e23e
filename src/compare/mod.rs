// Bucket comparison
// Snapshot -> classify -> verify -> report

pub mod classify;
pub mod engine;
pub mod filter;
pub mod report;
pub mod snapshot;
pub mod verify;

pub use classify::{classify_metadata, decide, CompareOptions, Decision, MetadataPass, Outcome, DEFAULT_CHUNK_SIZE};
pub use engine::CompareEngine;
pub use filter::KeyFilter;
pub use report::{ComparisonReport, ComparisonStatus, KeyDetail, ReportBuilder};
pub use snapshot::{BucketSnapshot, SnapshotBuilder};
pub use verify::{ContentCheck, ContentChecker, ContentVerifier};
