// src/linesep.rs

//! Line separator detection and conversion
//!
//! Content is held in memory with LF-only newlines. A part remembers the
//! separator it was acquired with so the updater can restore it on disk.

use strum_macros::{Display, EnumString, IntoStaticStr};

/// Line separator kinds recognized in part content
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, IntoStaticStr,
)]
#[strum(ascii_case_insensitive)]
pub enum LineSeparator {
    /// Classic Mac OS carriage return
    #[strum(serialize = "CR")]
    Cr,
    /// Unix line feed
    #[default]
    #[strum(serialize = "LF")]
    Lf,
    /// DOS/Windows carriage return + line feed
    #[strum(serialize = "CRLF")]
    Crlf,
}

impl LineSeparator {
    /// The literal separator text
    #[inline]
    pub const fn value(&self) -> &'static str {
        match self {
            Self::Cr => "\r",
            Self::Lf => "\n",
            Self::Crlf => "\r\n",
        }
    }

    /// Name used in the `linesep` Content-Type parameter
    pub fn name(&self) -> &'static str {
        self.into()
    }

    /// Separator native to the host platform
    pub const fn native() -> Self {
        if cfg!(windows) { Self::Crlf } else { Self::Lf }
    }

    /// Detect the first line separator in raw bytes
    ///
    /// A `\r` immediately followed by `\n` is CRLF, not CR.
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        let mut iter = bytes.iter().peekable();
        while let Some(&byte) = iter.next() {
            match byte {
                b'\r' => {
                    if iter.peek() == Some(&&b'\n') {
                        return Some(Self::Crlf);
                    }
                    return Some(Self::Cr);
                }
                b'\n' => return Some(Self::Lf),
                _ => {}
            }
        }
        None
    }

    /// Map every CRLF and then every remaining CR to LF
    pub fn normalize_universal(text: &str) -> String {
        if !text.contains('\r') {
            return text.to_string();
        }
        text.replace("\r\n", "\n").replace('\r', "\n")
    }

    /// Replace this separator's value with LF
    pub fn normalize(&self, text: &str) -> String {
        match self {
            Self::Lf => text.to_string(),
            _ => text.replace(self.value(), "\n"),
        }
    }

    /// Replace every LF with this separator's value
    pub fn nativize(&self, text: &str) -> String {
        match self {
            Self::Lf => text.to_string(),
            _ => text.replace('\n', self.value()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_detect_prefers_crlf_over_cr() {
        assert_eq!(LineSeparator::detect(b"a\r\nb"), Some(LineSeparator::Crlf));
        assert_eq!(LineSeparator::detect(b"a\rb\r\n"), Some(LineSeparator::Cr));
        assert_eq!(LineSeparator::detect(b"a\nb\r\n"), Some(LineSeparator::Lf));
        assert_eq!(LineSeparator::detect(b"trailing\r"), Some(LineSeparator::Cr));
        assert_eq!(LineSeparator::detect(b"no separators"), None);
        assert_eq!(LineSeparator::detect(b""), None);
    }

    #[test]
    fn test_normalize_universal() {
        assert_eq!(LineSeparator::normalize_universal("a\r\nb\rc\n"), "a\nb\nc\n");
        assert_eq!(LineSeparator::normalize_universal("plain"), "plain");
    }

    #[test]
    fn test_nativize_then_normalize_is_identity() {
        let text = "line1\nline2\n\nline4";
        for sep in [LineSeparator::Cr, LineSeparator::Lf, LineSeparator::Crlf] {
            assert_eq!(sep.normalize(&sep.nativize(text)), text);
        }
        assert_eq!(LineSeparator::Crlf.nativize("a\nb\n"), "a\r\nb\r\n");
        assert_eq!(LineSeparator::Cr.nativize("a\nb"), "a\rb");
    }

    #[test]
    fn test_names_round_trip() {
        assert_eq!(LineSeparator::Crlf.name(), "CRLF");
        assert_eq!(LineSeparator::Lf.to_string(), "LF");
        assert_eq!(LineSeparator::from_str("crlf").unwrap(), LineSeparator::Crlf);
        assert_eq!(LineSeparator::from_str("CR").unwrap(), LineSeparator::Cr);
        assert!(LineSeparator::from_str("NEL").is_err());
    }
}
