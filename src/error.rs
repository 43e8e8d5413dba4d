// src/error.rs

//! Error types for mimeogram operations

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Boxed cause for failures that can originate from several subsystems
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the mimeogram core
#[derive(Error, Debug)]
pub enum Error {
    /// File read or HTTP fetch failed
    #[error("Could not acquire content from '{location}'")]
    ContentAcquireFailure {
        location: String,
        #[source]
        source: BoxError,
    },

    /// Bytes could not be decoded to text
    #[error("Could not decode content of '{location}' as {charset}")]
    ContentDecodeFailure { location: String, charset: String },

    /// Content is not textual
    #[error("Refusing non-textual content at '{location}' (MIME type: {mimetype})")]
    TextualMimetypeInvalidity { location: String, mimetype: String },

    /// Atomic write or rename failed
    #[error("Could not update content of '{}'", path.display())]
    ContentUpdateFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Location cannot be turned into a usable destination
    #[error("Invalid location '{location}': {reason}")]
    LocationInvalidity { location: String, reason: String },

    /// Scheme outside of file, http, and https
    #[error("URL scheme not supported: {0}")]
    UrlSchemeNoSupport(String),

    /// Nothing to format
    #[error("Cannot create mimeogram without any parts or message")]
    MimeogramFormatEmpty,

    /// Mimeogram text is malformed
    #[error("Could not parse mimeogram: {0}")]
    MimeogramParseFailure(String),

    /// Editor or pager could not be discovered
    #[error("Could not discover a suitable {0}")]
    ProgramAbsence(String),

    /// Editor exited unsuccessfully
    #[error("Editor failure: {0}")]
    EditorFailure(String),

    /// Pager exited unsuccessfully
    #[error("Pager failure: {0}")]
    PagerFailure(String),

    /// User aborted at a prompt
    #[error("Operation cancelled by user: {0}")]
    UserOperateCancellation(String),

    /// Tokenizer configuration is invalid
    #[error("Invalid variant '{variant}' for tokenizer '{name}'")]
    TokenizerVariantInvalidity { name: String, variant: String },

    /// Configuration file or rule set is invalid
    #[error("Invalid configuration at '{location}': {reason}")]
    ConfigurationInvalidity { location: String, reason: String },

    /// Clipboard could not be read or written
    #[error("Clipboard failure: {0}")]
    ClipboardFailure(String),

    /// Console or other ambient I/O error
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    /// Wrap an arbitrary cause as an acquisition failure for `location`
    pub fn acquire(location: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::ContentAcquireFailure {
            location: location.into(),
            source: source.into(),
        }
    }

    /// Wrap an I/O cause as an update failure for `path`
    pub fn update(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::ContentUpdateFailure {
            path: path.into(),
            source,
        }
    }

    /// Returns true if the user deliberately aborted the operation
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::UserOperateCancellation(_))
    }

    /// Message followed by every chained cause, separated by `: `
    pub fn report(&self) -> String {
        let mut report = self.to_string();
        let mut cause = std::error::Error::source(self);
        while let Some(inner) = cause {
            report.push_str(": ");
            report.push_str(&inner.to_string());
            cause = inner.source();
        }
        report
    }
}
