//! Logging infrastructure for snapraid-dupls.
//!
//! Uses the `log` facade with the `env_logger` backend. Stdout belongs to the
//! removal paths, which are usually piped into `xargs rm`, so every log record
//! goes to stderr and nothing else may ever be written to stdout.
//!
//! Log levels are determined by (in priority order):
//!
//! 1. `RUST_LOG` environment variable (if set)
//! 2. CLI flags: `--quiet` (error only) or `--verbose` (info/debug/trace)
//! 3. Default: warn level
//!
//! Nothing in a well-formed run logs at warn or above, so by default stderr
//! carries only the summary.
//!
//! # What each level shows
//!
//! | Flag    | Level | Records                                                  |
//! |---------|-------|----------------------------------------------------------|
//! | `-q`    | error | nothing; fatal errors are printed by `main` anyway        |
//! | (none)  | warn  | nothing for a clean report                                |
//! | `-v`    | info  | run totals, resolver statistics, redeclared disk labels   |
//! | `-vv`   | debug | disk declarations, undeclared labels, validation counts   |
//! | `-vvv`  | trace | every discarded record with the reason                    |
//!
//! # Build-specific Formatting
//!
//! - **Debug builds**: timestamp and level, plus the module path from `-vv` up
//! - **Release builds**: level and message only
//!
//! # Example
//!
//! ```rust,no_run
//! use snapraid_dupls::logging::init_logging;
//!
//! // -vv
//! init_logging(2, false);
//! log::debug!("Disk 'd1' mounted at '/mnt/disk1'");
//! ```

use env_logger::{Builder, Target};
use log::LevelFilter;
use std::env;
use std::io::Write;

/// Initialize the logging subsystem based on CLI verbosity flags.
///
/// Call once, before the report is read. `run_app` does this first thing, and
/// integration tests call `run_app` repeatedly in one process, so a second
/// call leaves the first logger in place instead of panicking.
///
/// # Arguments
///
/// * `verbose` - Verbosity count from CLI (0=warn, 1=info, 2=debug, 3+=trace)
/// * `quiet` - If true, only show errors (overridden by `RUST_LOG`)
pub fn init_logging(verbose: u8, quiet: bool) {
    let from_env = env::var("RUST_LOG").ok();

    let mut builder = Builder::new();
    builder.target(Target::Stderr);

    match &from_env {
        Some(filters) => {
            builder.parse_filters(filters);
        }
        None => {
            builder.filter_level(level_for(verbose, quiet));
        }
    }

    configure_format(&mut builder, verbose);

    if builder.try_init().is_err() {
        return;
    }

    match from_env {
        Some(filters) => log::debug!("Logging configured from RUST_LOG={filters}"),
        None => log::debug!("Logging at level {}", level_for(verbose, quiet)),
    }
}

/// Map the CLI flags to a level filter.
fn level_for(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::Error;
    }
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn configure_format(builder: &mut Builder, verbose: u8) {
    #[cfg(debug_assertions)]
    {
        let with_module = verbose >= 2;
        builder.format(move |buf, record| {
            let timestamp = buf.timestamp_seconds();
            let level = record.level();
            let style = buf.default_level_style(level);
            write!(buf, "{timestamp} {style}{level:<5}{style:#} ")?;
            if with_module {
                write!(buf, "[{}] ", record.module_path().unwrap_or("unknown"))?;
            }
            writeln!(buf, "{}", record.args())
        });
    }

    #[cfg(not(debug_assertions))]
    {
        let _ = verbose;
        builder.format(|buf, record| {
            let level = record.level();
            let style = buf.default_level_style(level);
            writeln!(buf, "{style}{level:<5}{style:#} {}", record.args())
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level_is_warn() {
        assert_eq!(level_for(0, false), LevelFilter::Warn);
    }

    #[test]
    fn test_verbose_levels() {
        assert_eq!(level_for(1, false), LevelFilter::Info);
        assert_eq!(level_for(2, false), LevelFilter::Debug);
        assert_eq!(level_for(3, false), LevelFilter::Trace);
        assert_eq!(level_for(9, false), LevelFilter::Trace);
    }

    #[test]
    fn test_quiet_overrides_verbose() {
        assert_eq!(level_for(0, true), LevelFilter::Error);
        assert_eq!(level_for(2, true), LevelFilter::Error);
    }

    #[test]
    fn test_init_twice_does_not_panic() {
        init_logging(0, true);
        init_logging(1, false);
    }
}
