//! Command-line interface definitions for snapraid-dupls.
//!
//! # Example
//!
//! ```bash
//! # List every removal candidate in a saved report
//! snapraid-dupls dup.log
//!
//! # Only pairs touching the photo tree, 1 MiB or larger
//! snapraid-dupls --regex '^/mnt/disk1/photos/' --minbytes 1MiB dup.log
//!
//! # Read the report from a pipe
//! snapraid dup -v | snapraid-dupls --regex 'backup'
//! ```

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// List the files a SnapRAID duplicate report says can be deleted.
///
/// Reads `data:` disk declarations and `dup:` pair reports, prints the full
/// path of every removal candidate to stdout and a summary to stderr. Nothing
/// is deleted.
#[derive(Debug, Parser)]
#[command(name = "snapraid-dupls")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Duplicate report to read (standard input when absent or `-`)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Path filter; a pair is kept if either full path matches [default: .*]
    #[arg(long, value_name = "REGEX", allow_hyphen_values = true)]
    pub regex: Option<String>,

    /// Minimum file size, inclusive (e.g. 4096, 1MB, 1MiB) [default: 0]
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
    #[arg(long = "minbytes", value_name = "SIZE", value_parser = parse_size)]
    pub min_bytes: Option<u64>,

    /// Stop at the first record that contradicts an earlier one
    ///
    /// By default contradictions are checked once the whole report is read.
    #[arg(long)]
    pub fail_fast: bool,

    /// Format of the summary written to stderr
    #[arg(long, value_enum, value_name = "FORMAT")]
    pub summary_format: Option<SummaryFormat>,

    /// Configuration file (TOML)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,

    /// Report fatal errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,

    /// Increase verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all log output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Format of the end-of-run summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryFormat {
    /// `# key: value` comment lines
    #[default]
    Text,
    /// A single JSON object
    Json,
}

impl std::fmt::Display for SummaryFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SummaryFormat::Text => write!(f, "text"),
            SummaryFormat::Json => write!(f, "json"),
        }
    }
}

/// Parse a human-readable size string into bytes.
///
/// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
/// Case-insensitive. Numbers without suffix are treated as bytes.
///
/// # Examples
///
/// ```
/// use snapraid_dupls::cli::parse_size;
///
/// assert_eq!(parse_size("1024").unwrap(), 1024);
/// assert_eq!(parse_size("1KB").unwrap(), 1000);
/// assert_eq!(parse_size("1KiB").unwrap(), 1024);
/// assert_eq!(parse_size("1MiB").unwrap(), 1_048_576);
/// ```
/// # Errors
///
/// Returns an error if the string is empty, contains an invalid number,
/// a negative number, an unknown size suffix, or overflows 64 bits.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }
    if s.starts_with('-') {
        return Err("Size cannot be negative".to_string());
    }

    // Find where the number ends and the suffix begins
    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1_000,
        "KIB" => 1_024,
        "MB" | "M" => 1_000_000,
        "MIB" => 1_048_576,
        "GB" | "G" => 1_000_000_000,
        "GIB" => 1_073_741_824,
        "TB" | "T" => 1_000_000_000_000,
        "TIB" => 1_099_511_627_776,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    // Whole numbers stay exact; only fractional sizes go through floating point.
    if let Ok(whole) = num_str.parse::<u64>() {
        return whole
            .checked_mul(multiplier)
            .ok_or_else(|| format!("Size too large: '{s}'"));
    }

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;
    let bytes = num * multiplier as f64;
    if bytes >= u64::MAX as f64 {
        return Err(format!("Size too large: '{s}'"));
    }
    Ok(bytes as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size_bytes() {
        assert_eq!(parse_size("1024").unwrap(), 1024);
        assert_eq!(parse_size("1024B").unwrap(), 1024);
        assert_eq!(parse_size("0").unwrap(), 0);
        assert_eq!(parse_size("18446744073709551615").unwrap(), u64::MAX);
    }

    #[test]
    fn test_parse_size_suffixes() {
        assert_eq!(parse_size("1KB").unwrap(), 1_000);
        assert_eq!(parse_size("1kib").unwrap(), 1_024); // Case insensitive
        assert_eq!(parse_size("10MB").unwrap(), 10_000_000);
        assert_eq!(parse_size("1GiB").unwrap(), 1_073_741_824);
        assert_eq!(parse_size("1TiB").unwrap(), 1_099_511_627_776);
    }

    #[test]
    fn test_parse_size_fractional() {
        assert_eq!(parse_size("1.5MB").unwrap(), 1_500_000);
        assert_eq!(parse_size("0.5GB").unwrap(), 500_000_000);
    }

    #[test]
    fn test_parse_size_errors() {
        assert!(parse_size("").is_err());
        assert!(parse_size("abc").is_err());
        assert!(parse_size("1XB").is_err());
        assert!(parse_size("-1MB").is_err());
        assert!(parse_size("18446744073709551616").is_err());
        assert!(parse_size("20000000TB").is_err());
    }

    #[test]
    fn test_cli_parse_defaults() {
        let cli = Cli::try_parse_from(["snapraid-dupls"]).unwrap();
        assert_eq!(cli.file, None);
        assert_eq!(cli.regex, None);
        assert_eq!(cli.min_bytes, None);
        assert!(!cli.fail_fast);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_cli_parse_all_options() {
        let cli = Cli::try_parse_from([
            "snapraid-dupls",
            "-v",
            "--regex",
            "^/mnt/a",
            "--minbytes",
            "1MiB",
            "--fail-fast",
            "--summary-format",
            "json",
            "--json-errors",
            "dup.log",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 1);
        assert_eq!(cli.regex.as_deref(), Some("^/mnt/a"));
        assert_eq!(cli.min_bytes, Some(1_048_576));
        assert!(cli.fail_fast);
        assert_eq!(cli.summary_format, Some(SummaryFormat::Json));
        assert!(cli.json_errors);
        assert_eq!(cli.file, Some(PathBuf::from("dup.log")));
    }

    #[test]
    fn test_cli_quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["snapraid-dupls", "-v", "-q"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_regex_may_start_with_hyphen() {
        let cli = Cli::try_parse_from(["snapraid-dupls", "--regex", "-foo", "dup.log"]).unwrap();
        assert_eq!(cli.regex.as_deref(), Some("-foo"));
        assert_eq!(cli.file, Some(PathBuf::from("dup.log")));
    }

    #[test]
    fn test_cli_rejects_bad_minbytes() {
        assert!(Cli::try_parse_from(["snapraid-dupls", "--minbytes", "lots"]).is_err());
    }

    #[test]
    fn test_cli_version_flag() {
        let result = Cli::try_parse_from(["snapraid-dupls", "--version"]);
        assert!(result.is_err()); // clap exits on --version
    }
}
