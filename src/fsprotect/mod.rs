// src/fsprotect/mod.rs

//! Filesystem protection
//!
//! Before a part is written, its destination is checked against layered
//! rules:
//!
//! - **Platform**: operating system directories and sensitive user directories
//! - **Credentials**: well-known secret stores under the home directory
//! - **Project**: version control metadata and tool directories in any tree
//! - **User configuration**: this application's own configuration directory
//! - **Additions**: locations and patterns from `[protection]` configuration
//!
//! Two overrides sit above the layers: path components listed in
//! `defaults-disablement` switch protection off entirely, and per-directory
//! `rules-supercession` blocks can force paths in or out of protection.
//! The cache is immutable once built and can be shared freely.

mod cache;
mod rules;

pub use cache::ProtectionCache;

use std::path::{Path, PathBuf};
use strum_macros::Display;

/// Why a path is protected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display)]
pub enum Reason {
    /// Hidden tool and editor state inside projects
    Concealment,
    /// Keys, tokens, and other credentials
    Credentials,
    /// Location or pattern added through configuration
    CustomAddition,
    /// Operating system directory
    OsDirectory,
    /// Platform-specific sensitive location or supercession rule
    PlatformSensitive,
    /// This application's configuration
    UserConfiguration,
    /// Version control metadata
    VersionControl,
}

/// Verdict on whether a path may be written without an explicit override
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub path: PathBuf,
    pub active: bool,
    pub reason: Option<Reason>,
}

impl Status {
    /// Status for an unprotected path
    pub fn inactive(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            active: false,
            reason: None,
        }
    }

    /// Status for a protected path
    pub fn active(path: impl Into<PathBuf>, reason: Reason) -> Self {
        Self {
            path: path.into(),
            active: true,
            reason: Some(reason),
        }
    }

    /// Human-readable description for prompts and warnings
    pub fn description(&self) -> String {
        match self.reason {
            Some(reason) if self.active => format!("protected ({reason})"),
            _ => "unprotected".to_string(),
        }
    }
}

/// Something that decides the protection status of destinations
pub trait Protector {
    /// Compute the protection status of `path`
    fn verify(&self, path: &Path) -> Status;
}
