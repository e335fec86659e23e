//! bucketdiff CLI
//!
//! Compares two object-storage buckets and exits non-zero when they differ.

use std::process::ExitCode;

use bucketdiff::cli::{Cli, LogLevel};
use clap::Parser;
use tracing::error;

mod run;

#[tokio::main]
async fn main() -> ExitCode {
    // Usage errors exit 1 like every other failure; --help and --version exit 0
    let args = match Cli::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let level = if args.quiet { LogLevel::Error } else { args.log_level };
    if let Err(err) = run::init_logging(level) {
        eprintln!("Error: {:#}", err);
        return ExitCode::from(1);
    }

    match run::execute(args).await {
        Ok(status) => status.exit_code(),
        Err(err) => {
            error!("{:#}", err);
            ExitCode::from(1)
        }
    }
}
