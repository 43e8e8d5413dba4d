// src/config.rs

//! Configuration file loading
//!
//! The configuration lives in `general.toml` under the platform user
//! configuration directory (e.g. `~/.config/mimeogram/general.toml`).
//!
//! # Example general.toml
//!
//! ```toml
//! [acquire-parts]
//! recurse-directories = true
//! fail-on-invalid = false
//!
//! [apply]
//! review-mode = "partitive"
//!
//! [create]
//! to-clipboard = true
//!
//! [protection]
//! additional-locations = ["~/secrets"]
//! additional-patterns = ["**/*.sqlite"]
//! defaults-disablement = ["node_modules"]
//!
//! [protection.rules-supercession."~/projects/site"]
//! ignore = ["dist/**"]
//! protect = ["config/prod.toml"]
//! ```

use crate::error::{Error, Result};
use crate::updaters::ReviewMode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Application name used for the configuration directory
pub const APPLICATION_NAME: &str = "mimeogram";

/// Configuration file name inside the configuration directory
pub const CONFIGURATION_FILE_NAME: &str = "general.toml";

/// Default HTTP timeout in seconds
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Root of the configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Configuration {
    pub apply: ApplyConfig,
    pub create: CreateConfig,
    pub acquire_parts: AcquirePartsConfig,
    pub update_parts: UpdatePartsConfig,
    pub protection: ProtectionConfig,
    pub tokenizers: TokenizersConfig,
}

/// `[apply]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ApplyConfig {
    /// Read the mimeogram from the clipboard instead of stdin
    pub from_clipboard: bool,
    /// Review mode used when none is given on the command line
    pub review_mode: ReviewMode,
}

/// `[create]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CreateConfig {
    /// Copy the mimeogram to the clipboard instead of printing it
    pub to_clipboard: bool,
    /// Report an estimated token count
    pub count_tokens: bool,
    /// Derive the boundary from the content
    pub deterministic_boundary: bool,
    /// Compose the message in the editor
    pub edit_message: bool,
}

/// `[acquire-parts]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AcquirePartsConfig {
    /// Walk directories recursively instead of one level
    pub recurse_directories: bool,
    /// Abort on the first acquisition failure
    pub fail_on_invalid: bool,
    /// Disregard gitignore rules while walking directories
    pub no_ignores: bool,
    /// Timeout for each HTTP request, in seconds
    pub http_timeout: u64,
}

impl Default for AcquirePartsConfig {
    fn default() -> Self {
        Self {
            recurse_directories: false,
            fail_on_invalid: false,
            no_ignores: false,
            http_timeout: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

/// `[update-parts]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UpdatePartsConfig {
    /// Write protected destinations without asking
    pub disable_protections: bool,
}

/// `[protection]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProtectionConfig {
    /// Extra protected locations; `~` and environment variables are expanded
    pub additional_locations: Vec<String>,
    /// Extra protected glob patterns
    pub additional_patterns: Vec<String>,
    /// Path component names that switch protection off
    pub defaults_disablement: Vec<String>,
    /// Per-directory rules that override everything else below the base
    pub rules_supercession: BTreeMap<String, SupercessionRules>,
}

/// Rules for one supercession base directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupercessionRules {
    /// Globs (relative to the base) that are never protected
    pub ignore: Vec<String>,
    /// Globs (relative to the base) that are always protected
    pub protect: Vec<String>,
}

/// `[tokenizers]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TokenizersConfig {
    /// Tokenizer name
    pub default: String,
    /// Tokenizer variant
    pub variant: Option<String>,
}

impl Default for TokenizersConfig {
    fn default() -> Self {
        Self {
            default: "approximate".to_string(),
            variant: None,
        }
    }
}

impl Configuration {
    /// Load from `path`, or from the default location if `None`
    ///
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match default_configuration_path() {
                Some(path) => path,
                None => {
                    debug!("No user configuration directory; using defaults");
                    return Ok(Self::default());
                }
            },
        };

        if !path.exists() {
            debug!("Configuration file {} not found; using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| Error::ConfigurationInvalidity {
            location: path.display().to_string(),
            reason: e.to_string(),
        })?;
        debug!("Loaded configuration from {}", path.display());
        Self::parse(&content, &path.display().to_string())
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str, location: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ConfigurationInvalidity {
            location: location.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Per-user configuration directory of the application
pub fn user_configuration_directory() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APPLICATION_NAME))
}

/// Default configuration file path
pub fn default_configuration_path() -> Option<PathBuf> {
    user_configuration_directory().map(|dir| dir.join(CONFIGURATION_FILE_NAME))
}
