// Report module
// Aggregates per-key outcomes and renders the comparison report

use std::collections::{BTreeMap, BTreeSet};
use std::process::ExitCode;

use colored::Colorize;
use humansize::{format_size, BINARY};

use super::classify::Outcome;

/// Why a key landed outside `Matched`
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum KeyDetail {
    /// Size of the object on the only side that has it
    Present { size: u64 },
    Sizes { source: u64, target: u64 },
    Tags { source: Option<String>, target: Option<String> },
    Digests { algorithm: String, source: String, target: String },
    Failure { reason: String },
}

impl KeyDetail {
    fn describe(&self) -> String {
        match self {
            KeyDetail::Present { size } => format_size(*size, BINARY),
            KeyDetail::Sizes { source, target } => format!(
                "source {} ({} B), target {} ({} B)",
                format_size(*source, BINARY),
                source,
                format_size(*target, BINARY),
                target
            ),
            KeyDetail::Tags { source, target } => format!(
                "source {}, target {}",
                source.as_deref().unwrap_or("<none>"),
                target.as_deref().unwrap_or("<none>")
            ),
            KeyDetail::Digests { algorithm, source, target } => {
                format!("{} source {}, target {}", algorithm, source, target)
            }
            KeyDetail::Failure { reason } => reason.clone(),
        }
    }
}

/// Overall verdict of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonStatus {
    Identical,
    DifferencesFound,
}

impl ComparisonStatus {
    pub fn exit_code(self) -> ExitCode {
        match self {
            ComparisonStatus::Identical => ExitCode::SUCCESS,
            ComparisonStatus::DifferencesFound => ExitCode::from(1),
        }
    }
}

/// Accumulates outcomes while a comparison runs
#[derive(Debug)]
pub struct ReportBuilder {
    source_bucket: String,
    target_bucket: String,
    categories: BTreeMap<Outcome, BTreeSet<String>>,
    details: BTreeMap<String, KeyDetail>,
}

impl ReportBuilder {
    pub fn new(source_bucket: &str, target_bucket: &str) -> Self {
        Self {
            source_bucket: source_bucket.to_string(),
            target_bucket: target_bucket.to_string(),
            categories: BTreeMap::new(),
            details: BTreeMap::new(),
        }
    }

    /// Record the outcome of one key; a key recorded twice keeps its latest outcome
    pub fn record(&mut self, key: &str, outcome: Outcome, detail: Option<KeyDetail>) {
        for keys in self.categories.values_mut() {
            keys.remove(key);
        }
        self.categories.entry(outcome).or_default().insert(key.to_string());

        match detail {
            Some(detail) => {
                self.details.insert(key.to_string(), detail);
            }
            None => {
                self.details.remove(key);
            }
        }
    }

    /// Freeze the report; totals are derived from the recorded outcomes
    pub fn finish(mut self) -> ComparisonReport {
        self.categories.retain(|_, keys| !keys.is_empty());
        let total_keys = self.categories.values().map(BTreeSet::len).sum();
        let matched_keys = self.categories.get(&Outcome::Matched).map_or(0, BTreeSet::len);

        ComparisonReport {
            source_bucket: self.source_bucket,
            target_bucket: self.target_bucket,
            total_keys,
            matched_keys,
            categories: self.categories,
            details: self.details,
        }
    }
}

/// Complete, immutable result of comparing two buckets
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ComparisonReport {
    pub source_bucket: String,
    pub target_bucket: String,
    pub total_keys: usize,
    pub matched_keys: usize,
    categories: BTreeMap<Outcome, BTreeSet<String>>,
    details: BTreeMap<String, KeyDetail>,
}

impl ComparisonReport {
    /// Keys in a category, sorted
    pub fn keys(&self, outcome: Outcome) -> impl Iterator<Item = &str> {
        self.categories
            .get(&outcome)
            .into_iter()
            .flat_map(|keys| keys.iter().map(String::as_str))
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.categories.get(&outcome).map_or(0, BTreeSet::len)
    }

    /// Category a key was placed in
    pub fn outcome_of(&self, key: &str) -> Option<Outcome> {
        self.categories
            .iter()
            .find(|(_, keys)| keys.contains(key))
            .map(|(outcome, _)| *outcome)
    }

    pub fn detail(&self, key: &str) -> Option<&KeyDetail> {
        self.details.get(key)
    }

    /// Number of keys outside `Matched`
    pub fn differences(&self) -> usize {
        Outcome::DIFFERENCES.iter().map(|o| self.count(*o)).sum()
    }

    pub fn status(&self) -> ComparisonStatus {
        if self.differences() == 0 {
            ComparisonStatus::Identical
        } else {
            ComparisonStatus::DifferencesFound
        }
    }

    /// Non-empty difference categories in report order
    fn difference_sections(&self) -> impl Iterator<Item = (Outcome, &BTreeSet<String>)> {
        Outcome::DIFFERENCES
            .into_iter()
            .filter_map(|outcome| self.categories.get(&outcome).map(|keys| (outcome, keys)))
    }

    /// Print the report to stdout, colouring headings when attached to a terminal
    pub fn display(&self, verbose: bool) {
        println!("\n{}\n", "=== Bucket Comparison Report ===".bold());
        println!("Source: {}", self.source_bucket);
        println!("Target: {}", self.target_bucket);
        println!("Total keys processed: {}", self.total_keys);
        println!("Matched keys:         {}", self.matched_keys);

        if self.status() == ComparisonStatus::Identical {
            println!("\n{}", "Buckets are identical.".green().bold());
            return;
        }

        println!("\n{}", "Differences found:".yellow().bold());
        for (outcome, keys) in self.difference_sections() {
            println!("\n{} ({}):", outcome.title().red().bold(), keys.len());
            for key in keys {
                println!("{}", self.key_line(key, verbose));
            }
        }
        println!();
    }

    /// Plain-text rendering; identical input gives identical output
    pub fn to_plain_text(&self, verbose: bool) -> String {
        let mut output = String::new();

        output.push_str("\n=== Bucket Comparison Report ===\n\n");
        output.push_str(&format!("Source: {}\n", self.source_bucket));
        output.push_str(&format!("Target: {}\n", self.target_bucket));
        output.push_str(&format!("Total keys processed: {}\n", self.total_keys));
        output.push_str(&format!("Matched keys:         {}\n", self.matched_keys));

        if self.status() == ComparisonStatus::Identical {
            output.push_str("\nBuckets are identical.\n");
            return output;
        }

        output.push_str("\nDifferences found:\n");
        for (outcome, keys) in self.difference_sections() {
            output.push_str(&format!("\n{} ({}):\n", outcome.title(), keys.len()));
            for key in keys {
                output.push_str(&self.key_line(key, verbose));
                output.push('\n');
            }
        }

        output
    }

    fn key_line(&self, key: &str, verbose: bool) -> String {
        match (verbose, self.details.get(key)) {
            (true, Some(detail)) => format!("  - {} [{}]", key, detail.describe()),
            _ => format!("  - {}", key),
        }
    }

    /// Format the report as a JSON document
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        #[derive(serde::Serialize)]
        struct JsonOutput<'a> {
            metadata: Metadata<'a>,
            summary: Summary,
            status: ComparisonStatus,
            differences: BTreeMap<Outcome, Vec<KeyEntry<'a>>>,
        }

        #[derive(serde::Serialize)]
        struct Metadata<'a> {
            timestamp: String,
            source_bucket: &'a str,
            target_bucket: &'a str,
        }

        #[derive(serde::Serialize)]
        struct Summary {
            total_keys: usize,
            matched_keys: usize,
            counts: BTreeMap<Outcome, usize>,
        }

        #[derive(serde::Serialize)]
        struct KeyEntry<'a> {
            key: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            detail: Option<&'a KeyDetail>,
        }

        let output = JsonOutput {
            metadata: Metadata {
                timestamp: chrono::Utc::now().to_rfc3339(),
                source_bucket: &self.source_bucket,
                target_bucket: &self.target_bucket,
            },
            summary: Summary {
                total_keys: self.total_keys,
                matched_keys: self.matched_keys,
                counts: self.categories.iter().map(|(o, keys)| (*o, keys.len())).collect(),
            },
            status: self.status(),
            differences: self
                .difference_sections()
                .map(|(outcome, keys)| {
                    let entries = keys
                        .iter()
                        .map(|key| KeyEntry {
                            key,
                            detail: self.details.get(key),
                        })
                        .collect();
                    (outcome, entries)
                })
                .collect(),
        };

        serde_json::to_string_pretty(&output)
    }
}
