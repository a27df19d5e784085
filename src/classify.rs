//! Line classification for SnapRAID duplicate reports.
//!
//! A report is line oriented. Two shapes carry meaning:
//!
//! ```text
//! data:<disk>:<mount path>
//! dup:<disk1>:<path1>:<disk2>:<path2>:<bytes>: dup
//! ```
//!
//! Everything else (headers, comments, progress output) is ignored.
//!
//! Lines are classified as raw bytes. File names on a Unix disk need not be
//! UTF-8, and every captured field is handed on exactly as it appeared.
//!
//! # Example
//!
//! ```
//! use snapraid_dupls::classify::{LineClassifier, LineKind};
//!
//! let classifier = LineClassifier::new();
//! let kind = classifier.classify(b"data:d1:/mnt/disk1", 1).unwrap();
//! assert_eq!(
//!     kind,
//!     LineKind::DataDeclaration { disk: b"d1", path: b"/mnt/disk1" }
//! );
//! ```

use regex::bytes::Regex;

use crate::error::DuplsError;

// `(?-u)` lets `[^:]` match any byte, not just valid UTF-8.

/// Disk mapping declaration, anchored at line start only.
const DATA_PATTERN: &str = r"(?-u)^data:(?P<disk>[^:]+):(?P<path>[^:]+)";

/// Duplicate pair report, anchored at both ends so the trailing `: dup` is required.
const DUP_PATTERN: &str = r"(?-u)^dup:(?P<disk1>[^:]+):(?P<path1>[^:]+):(?P<disk2>[^:]+):(?P<path2>[^:]+):(?P<bytes>[^:]+): dup$";

/// Outcome of classifying one input line.
///
/// Borrowed fields point into the classified line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// `data:<disk>:<path>`
    DataDeclaration {
        /// Disk label
        disk: &'a [u8],
        /// Mount path prefix for the label
        path: &'a [u8],
    },
    /// `dup:<disk1>:<path1>:<disk2>:<path2>:<bytes>: dup`
    DuplicateReport(DuplicatePair<'a>),
    /// Anything else.
    Ignored,
}

/// One reported pair of byte-identical files.
///
/// The first side is the copy to keep, the second the removal candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuplicatePair<'a> {
    /// Disk label of the kept side
    pub disk1: &'a [u8],
    /// Path of the kept side, relative to its disk
    pub path1: &'a [u8],
    /// Disk label of the removal side
    pub disk2: &'a [u8],
    /// Path of the removal side, relative to its disk
    pub path2: &'a [u8],
    /// File size in bytes
    pub bytes: u64,
}

/// Recognizes the two meaningful line shapes.
#[derive(Debug, Clone)]
pub struct LineClassifier {
    data: Regex,
    dup: Regex,
}

impl Default for LineClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl LineClassifier {
    /// Build a classifier.
    ///
    /// # Panics
    ///
    /// Never in practice: both patterns are compile-time constants covered by tests.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data: Regex::new(DATA_PATTERN).expect("data line pattern is valid"),
            dup: Regex::new(DUP_PATTERN).expect("dup line pattern is valid"),
        }
    }

    /// Classify a single line.
    ///
    /// The duplicate-report shape is tried first. `line_no` is only used to
    /// report a malformed byte size.
    ///
    /// # Errors
    ///
    /// Returns [`DuplsError::MalformedSize`] when the line has the shape of a
    /// duplicate report but its byte-size field is not an unsigned 64-bit
    /// base-10 integer.
    pub fn classify<'a>(&self, line: &'a [u8], line_no: usize) -> Result<LineKind<'a>, DuplsError> {
        if let Some(caps) = self.dup.captures(line) {
            // All groups are mandatory, so they are present on a match.
            let field = |name: &str| caps.name(name).map_or(&b""[..], |m| m.as_bytes());
            let raw_bytes = field("bytes");
            let bytes = parse_bytes(raw_bytes).ok_or_else(|| DuplsError::MalformedSize {
                line: line_no,
                value: String::from_utf8_lossy(raw_bytes).into_owned(),
            })?;

            return Ok(LineKind::DuplicateReport(DuplicatePair {
                disk1: field("disk1"),
                path1: field("path1"),
                disk2: field("disk2"),
                path2: field("path2"),
                bytes,
            }));
        }

        if let Some(caps) = self.data.captures(line) {
            let field = |name: &str| caps.name(name).map_or(&b""[..], |m| m.as_bytes());
            return Ok(LineKind::DataDeclaration {
                disk: field("disk"),
                path: field("path"),
            });
        }

        Ok(LineKind::Ignored)
    }
}

/// Strict base-10 parse: digits only, no sign, must fit in u64.
fn parse_bytes(s: &[u8]) -> Option<u64> {
    if s.is_empty() || !s.iter().all(u8::is_ascii_digit) {
        return None;
    }
    s.iter().try_fold(0u64, |acc, &d| {
        acc.checked_mul(10)?.checked_add(u64::from(d - b'0'))
    })
}
