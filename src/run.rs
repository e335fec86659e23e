//! Main execution logic for the bucketdiff CLI.

use std::io::IsTerminal;

use anyhow::{Context, Result};
use bucketdiff::cli::{Cli, LogLevel, ReportFormat};
use bucketdiff::compare::{CompareEngine, ComparisonReport, ComparisonStatus, KeyFilter, SnapshotBuilder};
use bucketdiff::config::{RunConfig, Settings};
use bucketdiff::store::open_store;
use tracing::{debug, Level};
use tracing_subscriber::fmt;

/// Initialize logging.
pub fn init_logging(level: LogLevel) -> Result<()> {
    let level: Level = level.into();

    fmt::Subscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr) // Log to stderr so stdout is clean for the report
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("failed to install log subscriber")
}

/// Execute one comparison with the provided arguments.
pub async fn execute(args: Cli) -> Result<ComparisonStatus> {
    let settings = Settings::load(args.config.as_deref())?;
    let config = RunConfig::resolve(&args, settings)?;
    debug!(?config, "resolved configuration");

    let filter = KeyFilter::from_patterns(&config.excludes)?;
    let snapshots = SnapshotBuilder::new()
        .with_prefix(config.prefix.as_str())
        .with_filter(filter);

    let (source, target) = tokio::try_join!(
        open_store(&config.source, &config.source_side),
        open_store(&config.target, &config.target_side),
    )?;

    let engine = CompareEngine::new(config.options.clone())
        .with_snapshot_builder(snapshots)
        .with_progress(config.show_progress);

    let report = engine.compare(source, target).await?;
    print_report(&report, &config)?;

    Ok(report.status())
}

fn print_report(report: &ComparisonReport, config: &RunConfig) -> Result<()> {
    if config.quiet {
        return Ok(());
    }

    match config.format {
        ReportFormat::Text => {
            if !std::io::stdout().is_terminal() {
                colored::control::set_override(false);
            }
            report.display(config.verbose);
        }
        ReportFormat::Json => {
            let json = report.to_json().context("failed to serialize report")?;
            println!("{}", json);
        }
    }

    Ok(())
}
