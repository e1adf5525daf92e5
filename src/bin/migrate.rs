#![deny(clippy::all)]
#![forbid(unsafe_code)]

use clap::Parser;
use colored::Colorize;
use concerto_data::{Error as MigrationError, Migration};
use error_iter::ErrorIter as _;
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Migrate all presets (*.COP) and songs (*.COS) in a directory from one
/// instrument data version to the next. Files are overwritten in place; take a
/// backup first.
#[derive(Parser)]
#[command(name = "migrate", version)]
struct Cli {
    /// Version the files are currently stored in
    #[arg(long = "from")]
    current: u32,

    /// Version to migrate to; must be exactly one above --from
    #[arg(long = "to")]
    target: u32,

    /// Directory holding the files (default: current directory)
    #[arg(default_value = ".")]
    dir: PathBuf,

    /// Record length of the instrument table in songs, if it differs from the
    /// declared layout of the --from version
    #[arg(long)]
    record_length: Option<usize>,

    /// Migrate in memory and report, without writing anything
    #[arg(long)]
    dry_run: bool,

    /// Log every file, including skipped ones
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Migration error")]
    Migration(#[from] MigrationError),

    #[error("{0} of {1} files failed to migrate")]
    Failed(usize, usize),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match migrate(cli) {
        Err(e) => {
            eprintln!("{} {}", "error:".red(), e);

            for cause in e.sources().skip(1) {
                eprintln!("{} {}", "caused by:".bright_red(), cause);
            }

            ExitCode::FAILURE
        }
        Ok(()) => ExitCode::SUCCESS,
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn migrate(cli: Cli) -> Result<(), Error> {
    let mut migration = Migration::new(cli.current, cli.target)?.dry_run(cli.dry_run);
    if let Some(record_length) = cli.record_length {
        migration = migration.song_record_length(record_length);
    }

    let report = migration.run(&cli.dir)?;

    for outcome in report.failures() {
        if let Err(e) = &outcome.result {
            eprintln!(
                "{} {}: {}",
                "failed:".yellow(),
                outcome.path.display(),
                e
            );
            for cause in e.sources().skip(1) {
                eprintln!("  {} {}", "caused by:".bright_red(), cause);
            }
        }
    }

    let total = report.outcomes.len();
    let failed = total - report.migrated();
    let verb = if cli.dry_run { "Checked" } else { "Migrated" };
    println!(
        "{} {} of {} files ({} -> {})",
        verb.green(),
        report.migrated(),
        total,
        migration.step().from,
        migration.step().to()
    );

    if failed > 0 {
        return Err(Error::Failed(failed, total));
    }

    Ok(())
}
