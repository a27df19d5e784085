//! Application configuration management.
//!
//! Settings are layered, lowest priority first:
//!
//! 1. Built-in defaults ([`Config::default`])
//! 2. A TOML file (`--config PATH`, else the platform config directory)
//! 3. `SNAPRAID_DUPLS_*` environment variables
//! 4. Command-line flags that were actually given

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::cli::{Cli, SummaryFormat};
use crate::engine::ConsistencyMode;
use crate::error::DuplsError;

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "SNAPRAID_DUPLS_";

/// Default path filter: match everything.
pub const DEFAULT_REGEX: &str = ".*";

/// Effective settings for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path filter; a pair is accepted if either full path matches.
    pub regex: String,
    /// Inclusive minimum file size in bytes.
    pub min_bytes: u64,
    /// When contradictions between kept and removed files are detected.
    pub consistency: ConsistencyMode,
    /// Format of the end-of-run summary.
    pub summary_format: SummaryFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            regex: DEFAULT_REGEX.to_string(),
            min_bytes: 0,
            consistency: ConsistencyMode::EndOfStream,
            summary_format: SummaryFormat::Text,
        }
    }
}

impl Config {
    /// Load defaults, the config file and environment overrides, then apply
    /// the CLI flags.
    ///
    /// # Errors
    ///
    /// Returns [`DuplsError::Config`] if an explicitly named config file is
    /// missing, or if any layer holds a value of the wrong type.
    pub fn load(cli: &Cli) -> Result<Self, DuplsError> {
        let file = match &cli.config {
            Some(path) => {
                if !path.exists() {
                    return Err(DuplsError::Config(figment::Error::from(format!(
                        "config file not found: {}",
                        path.display()
                    ))));
                }
                Some(path.clone())
            }
            None => Self::default_path(),
        };

        let mut config = Self::figment(file.as_deref()).extract::<Self>()?;
        config.apply_cli(cli);
        log::debug!("Effective configuration: {config:?}");
        Ok(config)
    }

    /// Layered provider without CLI overrides.
    ///
    /// A missing file is skipped silently.
    #[must_use]
    pub fn figment(file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = file {
            log::debug!("Loading configuration from {}", path.display());
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Overwrite settings with the flags present on the command line.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(regex) = &cli.regex {
            self.regex.clone_from(regex);
        }
        if let Some(min_bytes) = cli.min_bytes {
            self.min_bytes = min_bytes;
        }
        if cli.fail_fast {
            self.consistency = ConsistencyMode::Incremental;
        }
        if let Some(format) = cli.summary_format {
            self.summary_format = format;
        }
    }

    /// Render the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Platform-specific default config file location.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "snapraid-dupls", "snapraid-dupls")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
