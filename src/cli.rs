//! CLI argument definitions for bucketdiff.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Compare the contents of two object-storage buckets.
///
/// Lists both buckets completely and reports keys missing from the target,
/// extra in the target, differing in size or integrity tag (ETag) and,
/// with --compare-hashes, differing in content.
///
/// Exits 0 when the buckets are identical and 1 when differences are found
/// or the comparison fails.
///
/// ## Examples
///
///   bucketdiff prod-assets backup-assets
///
///   bucketdiff s3://prod-assets s3://dr-assets \
///       --source-profile prod --target-profile dr --compare-hashes
///
///   bucketdiff gs://exports file:///mnt/exports --ignore-etags --format json
#[derive(Parser, Debug)]
#[command(name = "bucketdiff")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Source bucket (name, s3://bucket, gs://bucket or file:///dir)
    pub source_bucket: String,

    /// Target bucket (name, s3://bucket, gs://bucket or file:///dir)
    pub target_bucket: String,

    // === Credentials ===
    /// AWS profile for the source bucket
    #[arg(long)]
    pub source_profile: Option<String>,

    /// AWS profile for the target bucket
    #[arg(long)]
    pub target_profile: Option<String>,

    /// Region of the source bucket (detected when omitted)
    #[arg(long)]
    pub source_region: Option<String>,

    /// Region of the target bucket (detected when omitted)
    #[arg(long)]
    pub target_region: Option<String>,

    /// Custom endpoint for the source bucket (MinIO, R2, ...)
    #[arg(long)]
    pub source_endpoint: Option<String>,

    /// Custom endpoint for the target bucket
    #[arg(long)]
    pub target_endpoint: Option<String>,

    // === Comparison Options ===
    /// Ignore ETag differences (useful for restored or re-uploaded objects).
    /// Needed when comparing file:// directories with S3 or GCS, since local
    /// files carry no tag
    #[arg(long)]
    pub ignore_etags: bool,

    /// Compare actual object contents by hashing both bodies (slower but more accurate)
    #[arg(long)]
    pub compare_hashes: bool,

    /// Digest used by --compare-hashes [default: md5]
    #[arg(long)]
    pub hash_algorithm: Option<String>,

    /// Read size when streaming object bodies, in bytes [default: 4096]
    #[arg(long, value_parser = parse_positive_usize)]
    pub chunk_size: Option<usize>,

    /// Objects hashed concurrently; 0 uses one per CPU [default: 1]
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Only compare keys under this prefix
    #[arg(long)]
    pub prefix: Option<String>,

    /// Skip keys matching this glob (can be specified multiple times)
    #[arg(long = "exclude", short = 'x')]
    pub excludes: Vec<String>,

    // === Output Options ===
    /// Report format
    #[arg(long, value_enum, default_value = "text")]
    pub format: ReportFormat,

    /// Show sizes, tags or digests next to each differing key
    #[arg(short, long)]
    pub verbose: bool,

    /// Print no report and only error logs; the exit status tells the result
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable progress bars
    #[arg(long)]
    pub no_progress: bool,

    /// Config file [default: <config dir>/bucketdiff/config.toml]
    #[arg(long, env = "BUCKETDIFF_CONFIG")]
    pub config: Option<PathBuf>,

    // === Logging Options ===
    /// Log level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

/// Report format argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable text
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Log level argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// Trace level (most verbose)
    Trace,
    /// Debug level
    Debug,
    /// Info level (default)
    Info,
    /// Warning level
    Warn,
    /// Error level (least verbose)
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Parse a positive usize (>= 1).
fn parse_positive_usize(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if value < 1 {
        return Err(format!("{} is not in 1..", value));
    }
    Ok(value)
}
