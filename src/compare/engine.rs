// Compare engine module
// Lists both buckets, classifies every key and collects the report

use std::io::IsTerminal;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use tracing::{info, warn};

use super::classify::{classify_metadata, CompareOptions, Outcome};
use super::report::{ComparisonReport, KeyDetail, ReportBuilder};
use super::snapshot::{BucketSnapshot, SnapshotBuilder};
use super::verify::{ContentCheck, ContentChecker, ContentVerifier};
use crate::error::{BucketDiffError, Result};
use crate::store::ObjectStore;

/// Engine for comparing two buckets
pub struct CompareEngine {
    options: CompareOptions,
    snapshots: SnapshotBuilder,
    show_progress: bool,
}

impl CompareEngine {
    /// Create an engine with no key filtering and progress bars off
    pub fn new(options: CompareOptions) -> Self {
        Self {
            options,
            snapshots: SnapshotBuilder::new(),
            show_progress: false,
        }
    }

    /// Use a configured snapshot builder (prefix, excludes)
    pub fn with_snapshot_builder(mut self, snapshots: SnapshotBuilder) -> Self {
        self.snapshots = snapshots;
        self
    }

    /// Draw progress bars on stderr when it is a terminal
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress && std::io::stderr().is_terminal();
        self
    }

    /// Compare two buckets end to end.
    ///
    /// A listing failure on either side aborts the run; failures confined to
    /// one key's content check end up in `Unverifiable`.
    pub async fn compare(
        &self,
        source: Arc<dyn ObjectStore>,
        target: Arc<dyn ObjectStore>,
    ) -> Result<ComparisonReport> {
        info!(source = source.bucket(), target = target.bucket(), "comparing buckets");

        // Validates the digest algorithm before any listing starts
        let verifier = ContentVerifier::new(Arc::clone(&source), Arc::clone(&target), &self.options)?;

        let progress = self.multi_progress();
        let source_pb = progress.add(ProgressBar::new_spinner());
        let target_pb = progress.add(ProgressBar::new_spinner());

        let (source_snapshot, target_snapshot) = tokio::try_join!(
            self.snapshots.build_with_progress(source.as_ref(), &source_pb),
            self.snapshots.build_with_progress(target.as_ref(), &target_pb),
        )?;

        Ok(self.classify(&source_snapshot, &target_snapshot, &verifier).await)
    }

    /// Classify every key of two snapshots, running content checks as needed
    pub async fn classify(
        &self,
        source: &BucketSnapshot,
        target: &BucketSnapshot,
        checker: &dyn ContentChecker,
    ) -> ComparisonReport {
        let pass = classify_metadata(source, target, &self.options);
        let mut report = ReportBuilder::new(source.bucket(), target.bucket());

        for (key, outcome, detail) in &pass.decided {
            report.record(key, *outcome, detail.clone());
        }

        if !pass.pending.is_empty() {
            info!(keys = pass.pending.len(), "verifying object contents");

            let pb = self.verify_progress(pass.pending.len() as u64);
            let checks: Vec<(String, Result<ContentCheck>)> = stream::iter(pass.pending.iter())
                .map(|key| {
                    let pb = pb.clone();
                    async move {
                        pb.set_message(key.clone());
                        let result = checker.check(key).await;
                        pb.inc(1);
                        (key.clone(), result)
                    }
                })
                .buffer_unordered(self.options.concurrency.max(1))
                .collect()
                .await;
            pb.finish_and_clear();

            for (key, result) in checks {
                let (outcome, detail) = content_outcome(&key, result);
                report.record(&key, outcome, detail);
            }
        }

        let report = report.finish();
        debug_assert_eq!(report.total_keys, pass.total_keys);

        info!(
            total = report.total_keys,
            matched = report.matched_keys,
            differences = report.differences(),
            "comparison finished"
        );
        report
    }

    fn multi_progress(&self) -> MultiProgress {
        if self.show_progress {
            MultiProgress::new()
        } else {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        }
    }

    fn verify_progress(&self, total: u64) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} objects ({percent}%) | {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        pb
    }
}

/// Map a content check to the key's final outcome
fn content_outcome(key: &str, result: Result<ContentCheck>) -> (Outcome, Option<KeyDetail>) {
    match result {
        Ok(check) if check.is_equal() => (Outcome::Matched, None),
        Ok(check) => (
            Outcome::ContentMismatch,
            Some(KeyDetail::Digests {
                algorithm: check.algorithm.to_string(),
                source: check.source_digest,
                target: check.target_digest,
            }),
        ),
        Err(err) => {
            warn!(key, error = %single_line(&err), "content verification failed");
            (
                Outcome::Unverifiable,
                Some(KeyDetail::Failure {
                    reason: single_line(&err),
                }),
            )
        }
    }
}

fn single_line(err: &BucketDiffError) -> String {
    err.to_string().lines().next().unwrap_or_default().to_string()
}
