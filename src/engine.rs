//! Duplicate resolution engine.
//!
//! # Overview
//!
//! [`DupResolver`] owns all state for one run:
//! - the disk label → mount path table, built from `data:` declarations
//! - the kept set (first side of every accepted pair)
//! - the removal set (second side of every accepted pair)
//! - running totals for accepted records
//!
//! Records are applied strictly in input order. Once the input is exhausted,
//! [`DupResolver::finalize`] consumes the resolver and checks that no full
//! path was both kept and marked for removal.
//!
//! Labels and paths are raw bytes throughout, so two file names that differ
//! only in non-UTF-8 bytes stay distinct.
//!
//! # Example
//!
//! ```
//! use snapraid_dupls::classify::DuplicatePair;
//! use snapraid_dupls::engine::{Decision, DupResolver, PathFilter};
//!
//! let mut resolver = DupResolver::new(PathFilter::match_all());
//! resolver.apply_data_declaration(b"d1", b"/mnt/a");
//!
//! let pair = DuplicatePair { disk1: b"d1", path1: b"/f.txt", disk2: b"d1", path2: b"/g.txt", bytes: 100 };
//! let decision = resolver.apply_duplicate_report(&pair, 2).unwrap();
//! assert_eq!(decision, Decision::Accepted(b"/mnt/a/g.txt".to_vec()));
//!
//! let resolution = resolver.finalize().unwrap();
//! assert_eq!(resolution.totals.removal_count, 1);
//! assert_eq!(resolution.totals.removal_bytes, 100);
//! ```

use std::collections::{BTreeSet, HashMap, HashSet};

use regex::bytes::Regex;
use serde::{Deserialize, Serialize};

use crate::classify::DuplicatePair;
use crate::error::DuplsError;

/// Filter a duplicate pair must pass to be accepted.
#[derive(Debug, Clone)]
pub struct PathFilter {
    regex: Regex,
    min_bytes: u64,
}

impl PathFilter {
    /// Compile a filter from a regex and an inclusive minimum size.
    ///
    /// # Errors
    ///
    /// Returns [`DuplsError::InvalidRegex`] if `pattern` does not compile.
    pub fn new(pattern: &str, min_bytes: u64) -> Result<Self, DuplsError> {
        let regex = Regex::new(pattern).map_err(|source| DuplsError::InvalidRegex {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self { regex, min_bytes })
    }

    /// A filter that accepts every record.
    #[must_use]
    pub fn match_all() -> Self {
        Self {
            regex: Regex::new(".*").expect("match-all pattern is valid"),
            min_bytes: 0,
        }
    }

    /// The pattern the filter was compiled from.
    #[must_use]
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Inclusive minimum size in bytes.
    #[must_use]
    pub fn min_bytes(&self) -> u64 {
        self.min_bytes
    }

    fn is_large_enough(&self, bytes: u64) -> bool {
        bytes >= self.min_bytes
    }

    /// Either side matching is enough.
    fn touches(&self, kept: &[u8], removal: &[u8]) -> bool {
        self.regex.is_match(kept) || self.regex.is_match(removal)
    }
}

/// When kept/removal contradictions are detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConsistencyMode {
    /// Check once, after the whole input has been applied.
    #[default]
    EndOfStream,
    /// Check on every accepted record and stop at the first contradiction.
    Incremental,
}

/// What happened to one duplicate report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Accepted; carries the removal-candidate full path to emit.
    Accepted(Vec<u8>),
    /// Smaller than the minimum size.
    BelowMinBytes,
    /// Neither full path matched the path filter.
    FilteredOut,
}

/// Counters for the run, including records that were not accepted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolverStats {
    /// `data:` lines applied
    pub disk_declarations: usize,
    /// Duplicate reports seen, accepted or not
    pub duplicate_reports: usize,
    /// Reports discarded by the size threshold
    pub below_min_bytes: usize,
    /// Reports discarded by the path regex
    pub filtered_out: usize,
    /// Disk labels referenced before any declaration
    pub unresolved_disk_refs: usize,
}

/// Final totals for accepted records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RemovalTotals {
    /// Number of accepted records
    pub removal_count: u64,
    /// Sum of accepted byte sizes
    pub removal_bytes: u64,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Totals for accepted records
    pub totals: RemovalTotals,
    /// Run statistics
    pub stats: ResolverStats,
}

/// Interprets disk declarations and duplicate reports for one run.
#[derive(Debug)]
pub struct DupResolver {
    filter: PathFilter,
    mode: ConsistencyMode,
    disks: HashMap<Vec<u8>, Vec<u8>>,
    kept: BTreeSet<Vec<u8>>,
    removal: HashSet<Vec<u8>>,
    undeclared: HashSet<Vec<u8>>,
    totals: RemovalTotals,
    stats: ResolverStats,
}

impl DupResolver {
    /// Create a resolver that validates at end of stream.
    #[must_use]
    pub fn new(filter: PathFilter) -> Self {
        Self::with_mode(filter, ConsistencyMode::EndOfStream)
    }

    /// Create a resolver with an explicit consistency mode.
    #[must_use]
    pub fn with_mode(filter: PathFilter, mode: ConsistencyMode) -> Self {
        Self {
            filter,
            mode,
            disks: HashMap::new(),
            kept: BTreeSet::new(),
            removal: HashSet::new(),
            undeclared: HashSet::new(),
            totals: RemovalTotals::default(),
            stats: ResolverStats::default(),
        }
    }

    /// The filter this run was configured with.
    #[must_use]
    pub fn filter(&self) -> &PathFilter {
        &self.filter
    }

    /// Totals accumulated so far.
    #[must_use]
    pub fn totals(&self) -> RemovalTotals {
        self.totals
    }

    /// Statistics accumulated so far.
    #[must_use]
    pub fn stats(&self) -> &ResolverStats {
        &self.stats
    }

    /// Map a disk label to its mount path. A later declaration for the same
    /// label replaces the earlier one.
    pub fn apply_data_declaration(&mut self, disk: &[u8], path: &[u8]) {
        self.stats.disk_declarations += 1;
        match self.disks.insert(disk.to_vec(), path.to_vec()) {
            Some(previous) if previous != path => {
                log::info!(
                    "Disk '{}' redeclared: '{}' -> '{}'",
                    disk.escape_ascii(),
                    previous.escape_ascii(),
                    path.escape_ascii()
                );
            }
            _ => log::debug!(
                "Disk '{}' mounted at '{}'",
                disk.escape_ascii(),
                path.escape_ascii()
            ),
        }
    }

    /// Apply one duplicate report.
    ///
    /// `line_no` is only used to pinpoint a contradiction in
    /// [`ConsistencyMode::Incremental`].
    ///
    /// # Errors
    ///
    /// Returns [`DuplsError::ByteTotalOverflow`] when an accepted record would
    /// push the byte total past `u64::MAX`.
    ///
    /// In incremental mode, returns [`DuplsError::Consistency`] when the
    /// accepted record contradicts an earlier one. The removal path of that
    /// record must then not be emitted.
    pub fn apply_duplicate_report(
        &mut self,
        pair: &DuplicatePair<'_>,
        line_no: usize,
    ) -> Result<Decision, DuplsError> {
        self.stats.duplicate_reports += 1;

        if !self.filter.is_large_enough(pair.bytes) {
            self.stats.below_min_bytes += 1;
            log::trace!(
                "line {line_no}: {} bytes below minimum {}",
                pair.bytes,
                self.filter.min_bytes
            );
            return Ok(Decision::BelowMinBytes);
        }

        let kept = self.full_path(pair.disk1, pair.path1);
        let removal = self.full_path(pair.disk2, pair.path2);

        if !self.filter.touches(&kept, &removal) {
            self.stats.filtered_out += 1;
            log::trace!(
                "line {line_no}: neither '{}' nor '{}' matches filter",
                kept.escape_ascii(),
                removal.escape_ascii()
            );
            return Ok(Decision::FilteredOut);
        }

        let removal_bytes = self
            .totals
            .removal_bytes
            .checked_add(pair.bytes)
            .ok_or(DuplsError::ByteTotalOverflow { line: line_no })?;

        self.kept.insert(kept.clone());
        self.removal.insert(removal.clone());
        self.totals.removal_count += 1;
        self.totals.removal_bytes = removal_bytes;

        if self.mode == ConsistencyMode::Incremental {
            let conflict = if self.removal.contains(&kept) {
                Some(kept)
            } else if self.kept.contains(&removal) {
                Some(removal.clone())
            } else {
                None
            };
            if let Some(path) = conflict {
                return Err(DuplsError::Consistency {
                    path: display_path(&path),
                    line: Some(line_no),
                    conflicts: 1,
                });
            }
        }

        Ok(Decision::Accepted(removal))
    }

    /// Validate the kept and removal sets against each other and return the
    /// run's totals. Consumes the resolver: nothing can be applied afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`DuplsError::Consistency`] naming the lexicographically
    /// smallest path that is both kept and marked for removal.
    pub fn finalize(self) -> Result<Resolution, DuplsError> {
        let mut conflicts = self.kept.iter().filter(|p| self.removal.contains(*p));
        if let Some(first) = conflicts.next() {
            return Err(DuplsError::Consistency {
                path: display_path(first),
                line: None,
                conflicts: 1 + conflicts.count(),
            });
        }

        log::debug!(
            "Validated {} kept and {} removal paths",
            self.kept.len(),
            self.removal.len()
        );

        Ok(Resolution {
            totals: self.totals,
            stats: self.stats,
        })
    }

    /// Resolve a disk-relative path. Undeclared labels silently resolve to an
    /// empty prefix; they are only counted and logged at debug level.
    fn full_path(&mut self, disk: &[u8], path: &[u8]) -> Vec<u8> {
        match self.disks.get(disk) {
            Some(prefix) => [prefix.as_slice(), path].concat(),
            None => {
                self.stats.unresolved_disk_refs += 1;
                if self.undeclared.insert(disk.to_vec()) {
                    log::debug!(
                        "Disk '{}' referenced before any declaration, using empty prefix",
                        disk.escape_ascii()
                    );
                }
                path.to_vec()
            }
        }
    }
}

/// Render a full path for diagnostics.
fn display_path(path: &[u8]) -> String {
    String::from_utf8_lossy(path).into_owned()
}
