//! Catalog configuration.
//!
//! Defines the YAML-serializable configuration that controls where signature
//! definitions are discovered and how the catalog is built.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! cli_name: artisan
//! discovery_paths:
//!   - commands
//!   - vendor/commands/make.sig
//! exclude:
//!   - debug
//! jobs: 4
//! include_hidden: false
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default configuration file name looked up by the CLI.
pub const DEFAULT_CONFIG_FILE: &str = ".signatures.yml";

fn default_version() -> String {
    "1.0".to_string()
}

fn default_cli_name() -> String {
    "cli".to_string()
}

fn default_include_hidden() -> bool {
    true
}

/// Configuration for building a command catalog.
///
/// Only `version` is required in the file; every other field has a default.
///
/// # Examples
///
/// ```
/// use command_signature_compiler::CatalogConfig;
///
/// let config: CatalogConfig = serde_yaml::from_str("version: \"1.0\"\nexclude: [debug]").unwrap();
/// assert_eq!(config.cli_name, "cli");
/// assert!(config.is_excluded("debug"));
/// assert!(config.include_hidden);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Configuration format version (e.g., `"1.0"`).
    #[serde(default = "default_version")]
    pub version: String,
    /// Name of the CLI application the catalog describes.
    #[serde(default = "default_cli_name")]
    pub cli_name: String,
    /// Files and directories searched for signature definitions.
    #[serde(default)]
    pub discovery_paths: Vec<PathBuf>,
    /// Base command names to leave out of the catalog.
    #[serde(default)]
    pub exclude: Vec<String>,
    /// Number of parallel compile jobs (`None` = adaptive default).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jobs: Option<usize>,
    /// Keep commands whose header is marked hidden. Hidden namespace
    /// commands are always kept so their sub-command routes survive.
    #[serde(default = "default_include_hidden")]
    pub include_hidden: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            version: default_version(),
            cli_name: default_cli_name(),
            discovery_paths: Vec::new(),
            exclude: Vec::new(),
            jobs: None,
            include_hidden: default_include_hidden(),
        }
    }
}

impl CatalogConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::CatalogError::Io) if the file cannot be read, or
    /// [`Yaml`](crate::CatalogError::Yaml) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::CatalogError::Io) if the file cannot be written,
    /// or [`Yaml`](crate::CatalogError::Yaml) if serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Returns `true` if `command` is in the exclusion list.
    pub fn is_excluded(&self, command: &str) -> bool {
        self.exclude.iter().any(|c| c == command)
    }
}
