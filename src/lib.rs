//! snapraid-dupls - SnapRAID duplicate report interpreter
//!
//! Reads the output of `snapraid dup -v`: `data:` lines that map disk labels
//! to mount paths, followed by `dup:` lines that report byte-identical file
//! pairs. Prints the full path of every removal candidate that passes the
//! path and size filters, and refuses to finish if any file would be both
//! kept and removed.

pub mod classify;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod input;
pub mod logging;
pub mod pipeline;
pub mod report;

use std::io::Write;

use anyhow::{Context, Result};

use crate::cli::Cli;
use crate::config::Config;
use crate::engine::{DupResolver, PathFilter};
use crate::error::ExitCode;
use crate::input::InputSource;
use crate::pipeline::Pipeline;
use crate::report::Summary;

/// Run the application for parsed command-line arguments.
///
/// Removal candidates go to stdout, the summary to stderr.
///
/// # Errors
///
/// Returns the first fatal condition; `main` maps it to an exit code with
/// [`ExitCode::for_error`].
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let config = Config::load(&cli)?;

    if cli.print_config {
        let rendered = config
            .to_toml()
            .context("Failed to render configuration")?;
        print!("{rendered}");
        return Ok(ExitCode::Success);
    }

    let source = InputSource::from_arg(cli.file.as_deref());

    let stdout = std::io::stdout();
    let stderr = std::io::stderr();
    let mut out = stdout.lock();
    let mut diag = stderr.lock();

    run_report(&config, &source, &mut out, &mut diag)?;
    Ok(ExitCode::Success)
}

/// Process one report end to end and write the summary to `diag`.
///
/// The path filter is compiled before the input is opened, so a bad regex
/// never consumes input.
///
/// # Errors
///
/// Fails on an invalid regex, an unreadable input, a malformed byte size,
/// a keep/remove contradiction, or a failed write. Nothing is written to
/// `diag` in any of these cases.
pub fn run_report<W: Write, E: Write>(
    config: &Config,
    source: &InputSource,
    out: &mut W,
    diag: &mut E,
) -> Result<Summary> {
    let filter = PathFilter::new(&config.regex, config.min_bytes)?;
    let reader = source.open()?;

    let resolver = DupResolver::with_mode(filter, config.consistency);
    let report = Pipeline::new(resolver).run(reader, out, source)?;

    let totals = report.resolution.totals;
    log::info!(
        "{}: {} lines, {} removal candidates, {} bytes",
        source,
        report.lines.lines_read,
        totals.removal_count,
        totals.removal_bytes
    );
    log::info!("Resolver statistics: {:?}", report.resolution.stats);

    let summary = Summary::new(&config.regex, config.min_bytes, source.file_path(), &report);
    summary
        .write_to(diag, config.summary_format)
        .context("Failed to write summary")?;
    Ok(summary)
}
