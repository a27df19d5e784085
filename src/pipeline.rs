//! The single pass over a duplicate report.
//!
//! Each line is read, classified and applied before the next one is read.
//! Accepted removal candidates are written to the output as they are decided.
//! After the last line the resolver is finalized.
//!
//! Input is handled as bytes end to end: a path is written out exactly as it
//! appeared in the report, whatever its encoding.

use std::io::{BufRead, Write};

use serde::Serialize;

use crate::classify::{LineClassifier, LineKind};
use crate::engine::{Decision, DupResolver, Resolution};
use crate::error::DuplsError;
use crate::input::InputSource;

/// Line-level counters for one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LineStats {
    /// Lines read
    pub lines_read: usize,
    /// Lines matching neither recognized shape
    pub ignored_lines: usize,
}

/// Everything a completed pass produced besides the emitted paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
    /// Totals and resolver statistics
    pub resolution: Resolution,
    /// Line counters
    pub lines: LineStats,
}

/// Drives the classifier and resolver over one input stream.
pub struct Pipeline {
    classifier: LineClassifier,
    resolver: DupResolver,
    lines: LineStats,
}

impl Pipeline {
    /// Create a pipeline around a configured resolver.
    #[must_use]
    pub fn new(resolver: DupResolver) -> Self {
        Self {
            classifier: LineClassifier::new(),
            resolver,
            lines: LineStats::default(),
        }
    }

    /// Consume `reader` to exhaustion, writing one removal path per accepted
    /// record to `out`, then validate the run.
    ///
    /// `source` only labels read errors.
    ///
    /// # Errors
    ///
    /// Stops at the first fatal condition: a read or write failure, a
    /// malformed byte size, or a keep/remove contradiction.
    pub fn run<R: BufRead, W: Write>(
        mut self,
        mut reader: R,
        out: &mut W,
        source: &InputSource,
    ) -> Result<PassReport, DuplsError> {
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let n = reader
                .read_until(b'\n', &mut buf)
                .map_err(|e| source.read_error(e))?;
            if n == 0 {
                break;
            }
            self.lines.lines_read += 1;
            let line_no = self.lines.lines_read;

            self.process_line(trim_line_ending(&buf), line_no, out)?;
        }

        out.flush().map_err(DuplsError::Output)?;

        log::debug!(
            "Read {} lines ({} ignored)",
            self.lines.lines_read,
            self.lines.ignored_lines
        );

        let resolution = self.resolver.finalize()?;
        Ok(PassReport {
            resolution,
            lines: self.lines,
        })
    }

    fn process_line<W: Write>(
        &mut self,
        line: &[u8],
        line_no: usize,
        out: &mut W,
    ) -> Result<(), DuplsError> {
        match self.classifier.classify(line, line_no)? {
            LineKind::DataDeclaration { disk, path } => {
                self.resolver.apply_data_declaration(disk, path);
            }
            LineKind::DuplicateReport(pair) => {
                if let Decision::Accepted(path) =
                    self.resolver.apply_duplicate_report(&pair, line_no)?
                {
                    out.write_all(&path)
                        .and_then(|()| out.write_all(b"\n"))
                        .map_err(DuplsError::Output)?;
                }
            }
            LineKind::Ignored => self.lines.ignored_lines += 1,
        }
        Ok(())
    }
}

/// Strip a trailing `\n` or `\r\n`.
fn trim_line_ending(buf: &[u8]) -> &[u8] {
    let buf = buf.strip_suffix(b"\n").unwrap_or(buf);
    buf.strip_suffix(b"\r").unwrap_or(buf)
}
