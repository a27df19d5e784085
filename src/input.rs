//! Input stream acquisition.
//!
//! A report is read either from a named file or, when no file (or `-`) is
//! given, from standard input. The opened reader owns the handle, so it is
//! closed on every exit path when the reader is dropped.

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::DuplsError;

/// Where the duplicate report comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// A named report file
    File(PathBuf),
    /// Standard input
    Stdin,
}

impl InputSource {
    /// Build a source from an optional CLI argument. `None` and `-` mean stdin.
    #[must_use]
    pub fn from_arg(arg: Option<&Path>) -> Self {
        match arg {
            Some(path) if path != Path::new("-") => Self::File(path.to_path_buf()),
            _ => Self::Stdin,
        }
    }

    /// The file path, if the report comes from a named file.
    #[must_use]
    pub fn file_path(&self) -> Option<&Path> {
        match self {
            Self::File(path) => Some(path),
            Self::Stdin => None,
        }
    }

    /// Open the source for buffered line reading.
    ///
    /// # Errors
    ///
    /// Returns [`DuplsError::Io`] if the named file cannot be opened.
    pub fn open(&self) -> Result<Box<dyn BufRead>, DuplsError> {
        match self {
            Self::File(path) => {
                let file = File::open(path).map_err(|source| DuplsError::Io {
                    path: path.clone(),
                    source,
                })?;
                log::debug!("Reading duplicate report from {}", path.display());
                Ok(Box::new(BufReader::new(file)))
            }
            Self::Stdin => {
                log::debug!("Reading duplicate report from standard input");
                Ok(Box::new(io::stdin().lock()))
            }
        }
    }

    /// Wrap an I/O error raised while reading from this source.
    #[must_use]
    pub fn read_error(&self, source: io::Error) -> DuplsError {
        match self {
            Self::File(path) => DuplsError::Io {
                path: path.clone(),
                source,
            },
            Self::Stdin => DuplsError::Stdin(source),
        }
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Stdin => write!(f, "<stdin>"),
        }
    }
}
