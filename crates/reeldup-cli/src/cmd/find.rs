//! Implementation of `reeldup` (the duplicate search).
//!
//! Reads the catalog named by `--read`, loads it fail-fast, runs the
//! duplicate search, and writes the report to `--save`. The report is
//! rendered in full before anything is written, so a failed run leaves no
//! partial output.
//!
//! Exit codes: 0 = success (including an empty catalog), 2 = unreadable or
//! malformed input, 1 = rejected configuration or unwritable output.
use std::time::Instant;

use reeldup_core::{find_duplicates, parse_catalog};

use crate::Cli;
use crate::error::CliError;
use crate::format;
use crate::io::{read_input, source_label, target_label, write_output};

/// Runs the duplicate search described by `cli`.
///
/// # Errors
///
/// See the module documentation for the exit code of each failure.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    let started = Instant::now();
    let label = source_label(&cli.read);

    let text = read_input(&cli.read, cli.max_file_size)?;
    let store = parse_catalog(&text, &cli.load_config()).map_err(|error| {
        CliError::MalformedCatalog {
            source: label.clone(),
            error,
        }
    })?;
    tracing::info!(source = %label, records = store.len(), "catalog loaded");

    let output = find_duplicates(&store, &cli.dedup_config())?;

    let target = target_label(&cli.save);
    let report = format::render(&output.clusters, cli.format).map_err(|e| {
        CliError::WriteFailed {
            target: target.clone(),
            detail: e.to_string(),
        }
    })?;
    write_output(&cli.save, &report)?;

    if cli.stats {
        let stats = format::render_stats(&output.stats, &output.clusters).map_err(|e| {
            CliError::WriteFailed {
                target: "stderr".to_owned(),
                detail: e.to_string(),
            }
        })?;
        eprintln!("{stats}");
    }

    tracing::info!(
        target_file = %target,
        pairs = output.clusters.duplicate_count(),
        warnings = output.warnings.len(),
        elapsed_secs = started.elapsed().as_secs_f64(),
        "report written"
    );
    Ok(())
}
