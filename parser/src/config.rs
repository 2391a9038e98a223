//! Parser configuration.
//!
//! Settings are read from a YAML file and can be overridden through
//! environment variables:
//!
//! - `COMMAND_GRAMMAR_FALLBACK_HELP` (`true`/`false`, `1`/`0`, `yes`/`no`, `on`/`off`)
//! - `COMMAND_GRAMMAR_MAX_DISPATCH_DEPTH` (non-negative integer)

use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const FALLBACK_HELP_ENV: &str = "COMMAND_GRAMMAR_FALLBACK_HELP";
pub const MAX_DISPATCH_DEPTH_ENV: &str = "COMMAND_GRAMMAR_MAX_DISPATCH_DEPTH";
pub const DEFAULT_MAX_DISPATCH_DEPTH: usize = 16;

/// Errors raised while loading a [`ParserConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing failure.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// An override could not be interpreted.
    #[error("invalid value `{value}` for {key}")]
    InvalidValue { key: String, value: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// How a parse reports failures and how deep dispatch may nest.
///
/// # Examples
///
/// ```
/// use command_grammar_parser::ParserConfig;
///
/// let config: ParserConfig = serde_yaml::from_str("fallback_help: false").unwrap();
/// assert!(!config.fallback_help);
/// assert_eq!(config.max_dispatch_depth, 16);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParserConfig {
    /// Report any failure as the grammar's help text instead of the most
    /// severe error.
    pub fallback_help: bool,
    /// Maximum number of nested redispatches.
    pub max_dispatch_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            fallback_help: true,
            max_dispatch_depth: DEFAULT_MAX_DISPATCH_DEPTH,
        }
    }
}

impl ParserConfig {
    /// Loads configuration from a YAML file. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    /// Applies `COMMAND_GRAMMAR_*` environment overrides.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when a value cannot be parsed.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(FALLBACK_HELP_ENV) {
            self.fallback_help = parse_bool(FALLBACK_HELP_ENV, &raw)?;
        }
        if let Some(raw) = lookup(MAX_DISPATCH_DEPTH_ENV) {
            self.max_dispatch_depth = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                key: MAX_DISPATCH_DEPTH_ENV.to_string(),
                value: raw.clone(),
            })?;
        }
        Ok(self)
    }

    pub fn fallback_help(mut self, enabled: bool) -> Self {
        self.fallback_help = enabled;
        self
    }

    pub fn max_dispatch_depth(mut self, depth: usize) -> Self {
        self.max_dispatch_depth = depth;
        self
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw.to_string(),
        }),
    }
}
