//! End-of-run summary.
//!
//! Written to stderr once the report has been validated, so it never mixes
//! with the removal paths on stdout. Text output keeps every line a shell
//! comment; for a named input file it ends with a command that reruns the
//! same filter and pipes the candidates into `rm`.

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::cli::SummaryFormat;
use crate::engine::{RemovalTotals, ResolverStats};
use crate::pipeline::{LineStats, PassReport};

/// Name of the binary used in the suggested command.
const PROGRAM: &str = "snapraid-dupls";

/// Summary of a successful run.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    /// Effective path filter
    pub regex: String,
    /// Effective minimum size
    pub min_bytes: u64,
    /// Accepted record count
    pub total_files: u64,
    /// Accepted byte total
    pub total_bytes: u64,
    /// Follow-up command, only for a named input file
    pub suggested_command: Option<String>,
    /// Resolver statistics
    pub stats: ResolverStats,
    /// Line statistics
    pub lines: LineStats,
}

impl Summary {
    /// Build a summary from a finished pass.
    #[must_use]
    pub fn new(regex: &str, min_bytes: u64, input: Option<&Path>, report: &PassReport) -> Self {
        let RemovalTotals {
            removal_count,
            removal_bytes,
        } = report.resolution.totals;
        Self {
            regex: regex.to_string(),
            min_bytes,
            total_files: removal_count,
            total_bytes: removal_bytes,
            suggested_command: input.map(|path| suggested_command(regex, min_bytes, path)),
            stats: report.resolution.stats.clone(),
            lines: report.lines,
        }
    }

    /// Write the summary in the requested format.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, format: SummaryFormat) -> std::io::Result<()> {
        match format {
            SummaryFormat::Text => self.write_text(writer),
            SummaryFormat::Json => {
                serde_json::to_writer_pretty(&mut *writer, self)?;
                writeln!(writer)
            }
        }
    }

    fn write_text<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writeln!(writer, "# File path regex: {}", self.regex)?;
        writeln!(writer, "# File minimum bytes: {}", self.min_bytes)?;
        writeln!(writer, "# Total files: {}", self.total_files)?;
        writeln!(
            writer,
            "# Total bytes: {} ({})",
            self.total_bytes,
            bytesize::ByteSize::b(self.total_bytes)
        )?;
        if let Some(command) = &self.suggested_command {
            writeln!(writer, "# Suggested delete command: {command}")?;
        }
        Ok(())
    }
}

/// Command that reruns this filter on `input` and deletes each candidate.
#[must_use]
pub fn suggested_command(regex: &str, min_bytes: u64, input: &Path) -> String {
    format!(
        "{PROGRAM} --regex={} --minbytes {min_bytes} {} | xargs -I{{}} rm -v '{{}}'",
        escape_posix(regex),
        input.display()
    )
}

fn escape_posix(s: &str) -> String {
    // Wrap in single quotes, escape single quotes as '\''
    format!("'{}'", s.replace('\'', "'\\''"))
}
