#![deny(clippy::all)]
#![forbid(unsafe_code)]

use clap::Parser;
use colored::Colorize;
use concerto_data::pitch::{PitchTable, NUM_NOTES, PLAYBACK_SAMPLE_RATE};
use error_iter::ErrorIter as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Write the MIDI note frequency table for the VERA PSG as assembly.
#[derive(Parser)]
#[command(name = "pitchtable", version)]
struct Cli {
    /// Output file
    #[arg(short, long, default_value = "pitch_data.asm")]
    output: PathBuf,

    /// Number of MIDI notes in the table, starting at note 0
    #[arg(short, long, default_value_t = NUM_NOTES)]
    notes: usize,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Pitch table error")]
    Table(#[from] concerto_data::Error),

    #[error("Unable to write {}", .0.display())]
    Io(PathBuf, #[source] std::io::Error),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();

    match pitchtable(&cli) {
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

fn pitchtable(cli: &Cli) -> Result<(), Error> {
    let table = PitchTable::new(cli.notes, PLAYBACK_SAMPLE_RATE)?;
    let io_error = |e| Error::Io(cli.output.clone(), e);

    let file = File::create(&cli.output).map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    table.write_asm(&mut writer).map_err(io_error)?;
    writer.flush().map_err(io_error)?;

    info!(notes = cli.notes, path = %cli.output.display(), "Wrote pitch table");

    Ok(())
}
