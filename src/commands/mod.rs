// src/commands/mod.rs
//! Command handlers for the mimeogram CLI

mod apply;
mod create;

pub use apply::cmd_apply;
pub use create::cmd_create;

use anyhow::{Context, Result};
use mimeogram::Configuration;
use std::path::Path;
use tracing::debug;

/// Load configuration from `path`, or from the default location
pub fn load_configuration(path: Option<&Path>) -> Result<Configuration> {
    let config = Configuration::load(path).context("Failed to load configuration")?;
    debug!("Loaded configuration: {:?}", config);
    Ok(config)
}
