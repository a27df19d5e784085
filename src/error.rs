//! Structured error handling and exit codes.

use std::path::PathBuf;

use serde::Serialize;

/// Every fatal condition a run can hit.
///
/// None of these are retried. Lines that match neither recognized shape are
/// not errors at all; they are ignored by the classifier.
#[derive(Debug, thiserror::Error)]
pub enum DuplsError {
    /// The path filter regex does not compile.
    #[error("invalid path regex '{pattern}': {source}")]
    InvalidRegex {
        /// The pattern as supplied
        pattern: String,
        /// Compilation error from the regex engine
        #[source]
        source: regex::Error,
    },

    /// The named input file could not be opened or read.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Input file path
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Standard input could not be read.
    #[error("I/O error reading standard input: {0}")]
    Stdin(#[source] std::io::Error),

    /// The primary output stream could not be written.
    #[error("I/O error writing output: {0}")]
    Output(#[source] std::io::Error),

    /// A duplicate report whose byte-size field is not an unsigned 64-bit integer.
    #[error("malformed byte size '{value}' on line {line}")]
    MalformedSize {
        /// 1-based input line number
        line: usize,
        /// Raw field text
        value: String,
    },

    /// The accepted byte total no longer fits in 64 bits.
    #[error("total of accepted byte sizes overflows 64 bits at line {line}")]
    ByteTotalOverflow {
        /// 1-based input line number of the record that overflowed
        line: usize,
    },

    /// A full path was asserted both as a kept copy and as a removal candidate.
    #[error("A file to be kept is found to be deleted: {path}{}", describe_conflict(.line, .conflicts))]
    Consistency {
        /// The offending full path
        path: String,
        /// Input line that introduced the conflict (fail-fast mode only)
        line: Option<usize>,
        /// Number of distinct conflicting paths known when the check fired
        conflicts: usize,
    },

    /// The layered configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] figment::Error),
}

fn describe_conflict(line: &Option<usize>, conflicts: &usize) -> String {
    let mut extra = String::new();
    if let Some(line) = line {
        extra.push_str(&format!(" (line {line})"));
    }
    if *conflicts > 1 {
        extra.push_str(&format!(" ({} conflicting paths in total)", conflicts));
    }
    extra
}

impl DuplsError {
    /// Exit code a process should terminate with for this error.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::InvalidRegex { .. } | Self::Config(_) => ExitCode::ConfigError,
            Self::MalformedSize { .. } | Self::ByteTotalOverflow { .. } => {
                ExitCode::MalformedInput
            }
            Self::Consistency { .. } => ExitCode::ConsistencyViolation,
            Self::Io { .. } | Self::Stdin(_) | Self::Output(_) => ExitCode::GeneralError,
        }
    }
}

/// Exit codes for the snapraid-dupls application.
///
/// - 0: Success (summary emitted)
/// - 1: General error (I/O failure or anything unexpected)
/// - 2: Configuration error (bad regex or config file)
/// - 3: Malformed input (unparseable byte-size field, byte total overflow)
/// - 4: Consistency violation (a kept file is also marked for removal)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: the whole log was processed and validated.
    Success = 0,
    /// General error: An unexpected error occurred.
    GeneralError = 1,
    /// Configuration error: the filter or config file is unusable.
    ConfigError = 2,
    /// Malformed input: a duplicate report carried a bad byte size.
    MalformedInput = 3,
    /// Consistency violation: the dedup decisions contradict each other.
    ConsistencyViolation = 4,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "SD000",
            Self::GeneralError => "SD001",
            Self::ConfigError => "SD002",
            Self::MalformedInput => "SD003",
            Self::ConsistencyViolation => "SD004",
        }
    }

    /// Pick the exit code for an error surfaced at the application boundary.
    #[must_use]
    pub fn for_error(err: &anyhow::Error) -> Self {
        err.downcast_ref::<DuplsError>()
            .map_or(Self::GeneralError, DuplsError::exit_code)
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "SD004")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
        }
    }
}
