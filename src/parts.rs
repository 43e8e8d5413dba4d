// src/parts.rs

//! Part model shared by acquisition, formatting, parsing, and updates

use crate::linesep::LineSeparator;

/// Location of the synthetic part carrying the human-authored message
pub const MESSAGE_LOCATION: &str = "mimeogram://message";

/// Scheme prefix reserved for synthetic parts
pub const MIMEOGRAM_SCHEME_PREFIX: &str = "mimeogram://";

/// A single file (or message) carried by a mimeogram
///
/// Content always has LF-only newlines; `linesep` records the separator to
/// restore when the part is written back to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    /// Filesystem path, URL, or [`MESSAGE_LOCATION`]
    pub location: String,
    /// MIME type, e.g. `text/plain`
    pub mimetype: String,
    /// Character set name, e.g. `utf-8`
    pub charset: String,
    /// Line separator of the original content
    pub linesep: LineSeparator,
    /// Content with LF-only newlines
    pub content: String,
}

impl Part {
    /// Create a part, folding any CR or CRLF in `content` to LF
    pub fn new(
        location: impl Into<String>,
        mimetype: impl Into<String>,
        charset: impl Into<String>,
        linesep: LineSeparator,
        content: &str,
    ) -> Self {
        Self {
            location: location.into(),
            mimetype: mimetype.into(),
            charset: charset.into(),
            linesep,
            content: LineSeparator::normalize_universal(content),
        }
    }

    /// Create the synthetic message part
    pub fn message(text: &str) -> Self {
        Self::new(MESSAGE_LOCATION, "text/plain", "utf-8", LineSeparator::Lf, text)
    }

    /// Returns true for synthetic parts that never map to a file
    pub fn is_synthetic(&self) -> bool {
        self.location.starts_with(MIMEOGRAM_SCHEME_PREFIX)
    }

    /// Returns true for the message part
    pub fn is_message(&self) -> bool {
        self.location == MESSAGE_LOCATION
    }

    /// Content converted to the part's own line separator
    pub fn native_content(&self) -> String {
        self.linesep.nativize(&self.content)
    }
}
