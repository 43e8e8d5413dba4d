// src/sniff.rs

//! Text sniffing: decide whether acquired bytes are text and decode them
//!
//! Detection order for the MIME type:
//! 1. HTTP `Content-Type` hint (unless it is the generic octet-stream)
//! 2. Magic bytes of well-known formats
//! 3. Extension of the location
//! 4. Textual content heuristic (no NUL bytes in the leading block)
//! 5. `application/octet-stream`
//!
//! Charsets are tried in order: HTTP hint, byte order mark, strict UTF-8,
//! then the `chardetng` guess. The first decode without errors and with
//! enough plausible characters wins.

use crate::error::{Error, Result};
use crate::linesep::LineSeparator;
use encoding_rs::{Encoding, UTF_8};
use tracing::{debug, warn};

/// Minimum share of plausible characters for a decode to be accepted
pub const DECODE_CONFIDENCE_THRESHOLD: f64 = 0.75;

/// Generic MIME type for unidentified content
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Number of leading bytes inspected by the textual heuristic
const SNIFF_BLOCK_SIZE: usize = 8192;

/// Structured types accepted as text besides `text/*`
const TEXTUAL_APPLICATION_TYPES: &[&str] = &[
    "application/json",
    "application/xml",
    "application/javascript",
    "application/ecmascript",
    "application/toml",
    "application/x-yaml",
    "application/yaml",
    "application/x-sh",
    "application/x-shellscript",
    "application/sql",
    "application/graphql",
    "application/x-httpd-php",
];

/// Outcome of sniffing textual content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SniffedText {
    pub mimetype: String,
    pub charset: String,
    pub linesep: LineSeparator,
    /// Decoded text with LF-only newlines
    pub text: String,
}

/// Decide whether `bytes` are text, then decode them
///
/// `location` names the source in errors and drives extension lookup.
pub fn sniff(bytes: &[u8], location: &str, http_content_type: Option<&str>) -> Result<SniffedText> {
    let (hint_mimetype, hint_charset) = match http_content_type {
        Some(value) => parse_content_type_hint(value),
        None => (None, None),
    };

    let mimetype = hint_mimetype
        .or_else(|| mimetype_from_signature(bytes).map(str::to_string))
        .or_else(|| mimetype_from_location(location).map(str::to_string))
        .or_else(|| looks_textual(bytes).then(|| "text/plain".to_string()))
        .unwrap_or_else(|| OCTET_STREAM.to_string());
    debug!("Detected MIME type {} for {}", mimetype, location);

    if !is_textual_mimetype(&mimetype) {
        return Err(Error::TextualMimetypeInvalidity {
            location: location.to_string(),
            mimetype,
        });
    }

    let (encoding, text) = decode(bytes, location, hint_charset.as_deref())?;

    // Detected on decoded text so multi-byte encodings see whole newlines
    let linesep = match LineSeparator::detect(text.as_bytes()) {
        Some(linesep) => linesep,
        None => {
            let native = LineSeparator::native();
            warn!(
                "No line separator detected in {}; assuming native {}",
                location, native
            );
            native
        }
    };

    Ok(SniffedText {
        mimetype,
        charset: encoding.name().to_ascii_lowercase(),
        linesep,
        text: LineSeparator::normalize_universal(&text),
    })
}

/// Returns true for `text/*` and the accepted structured application types
pub fn is_textual_mimetype(mimetype: &str) -> bool {
    let mimetype = mimetype.trim().to_ascii_lowercase();
    if mimetype.starts_with("text/") {
        return true;
    }
    if TEXTUAL_APPLICATION_TYPES.contains(&mimetype.as_str()) {
        return true;
    }
    mimetype.starts_with("application/")
        && (mimetype.ends_with("+json") || mimetype.ends_with("+xml"))
}

/// Split an HTTP `Content-Type` value into MIME type and charset
fn parse_content_type_hint(value: &str) -> (Option<String>, Option<String>) {
    let mut pieces = value.split(';');
    let mimetype = pieces
        .next()
        .map(|m| m.trim().to_ascii_lowercase())
        .filter(|m| !m.is_empty() && m != OCTET_STREAM);
    let charset = pieces.find_map(|param| {
        let (key, val) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| val.trim().trim_matches('"').to_string())
    });
    (mimetype, charset)
}

/// Identify well-known formats from their magic bytes
fn mimetype_from_signature(bytes: &[u8]) -> Option<&'static str> {
    const SIGNATURES: &[(&[u8], &str)] = &[
        (b"\x89PNG\r\n\x1a\n", "image/png"),
        (b"\xff\xd8\xff", "image/jpeg"),
        (b"GIF87a", "image/gif"),
        (b"GIF89a", "image/gif"),
        (b"%PDF-", "application/pdf"),
        (b"PK\x03\x04", "application/zip"),
        (b"\x1f\x8b", "application/gzip"),
        (b"\x28\xb5\x2f\xfd", "application/zstd"),
        (b"\xfd7zXZ\x00", "application/x-xz"),
        (b"7z\xbc\xaf\x27\x1c", "application/x-7z-compressed"),
        (b"\x7fELF", "application/x-executable"),
        (b"\x00asm", "application/wasm"),
        (b"\xcf\xfa\xed\xfe", "application/x-mach-binary"),
        (b"\xfe\xed\xfa\xcf", "application/x-mach-binary"),
        (b"SQLite format 3\x00", "application/vnd.sqlite3"),
        (b"\xed\xab\xee\xdb", "application/x-rpm"),
        (b"!<arch>\n", "application/x-archive"),
        (b"<?xml", "application/xml"),
    ];
    if is_bzip2(bytes) {
        return Some("application/x-bzip2");
    }
    SIGNATURES
        .iter()
        .find(|(magic, _)| bytes.starts_with(magic))
        .map(|(_, mimetype)| *mimetype)
}

/// `BZh`, a block size digit, then the compressed block magic
fn is_bzip2(bytes: &[u8]) -> bool {
    bytes.len() >= 10
        && bytes.starts_with(b"BZh")
        && (b'1'..=b'9').contains(&bytes[3])
        && &bytes[4..10] == b"1AY&SY"
}

/// Look up a MIME type from the extension of a path or URL
pub fn mimetype_from_location(location: &str) -> Option<&'static str> {
    let path = location
        .split(['?', '#'])
        .next()
        .unwrap_or(location);
    let name = path.rsplit(['/', '\\']).next().unwrap_or(path);
    let (_, extension) = name.rsplit_once('.')?;
    let mimetype = match extension.to_ascii_lowercase().as_str() {
        "txt" | "text" | "log" | "cfg" | "conf" | "ini" | "lock" => "text/plain",
        "md" | "markdown" => "text/markdown",
        "rst" => "text/x-rst",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "csv" => "text/csv",
        "tsv" => "text/tab-separated-values",
        "js" | "mjs" | "cjs" => "application/javascript",
        "ts" | "tsx" => "text/x-typescript",
        "jsx" => "text/jsx",
        "json" => "application/json",
        "xml" | "xsd" | "xsl" => "application/xml",
        "svg" => "image/svg+xml",
        "toml" => "application/toml",
        "yaml" | "yml" => "application/x-yaml",
        "sh" | "bash" | "zsh" => "application/x-sh",
        "sql" => "application/sql",
        "rs" => "text/x-rust",
        "py" | "pyi" => "text/x-python",
        "c" | "h" => "text/x-c",
        "cc" | "cpp" | "cxx" | "hpp" | "hh" => "text/x-c++",
        "go" => "text/x-go",
        "java" => "text/x-java",
        "kt" | "kts" => "text/x-kotlin",
        "rb" => "text/x-ruby",
        "pl" | "pm" => "text/x-perl",
        "php" => "application/x-httpd-php",
        "swift" => "text/x-swift",
        "lua" => "text/x-lua",
        "hs" => "text/x-haskell",
        "f90" | "f95" | "f" => "text/x-fortran",
        "tex" => "text/x-tex",
        "diff" | "patch" => "text/x-diff",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "ico" => "image/vnd.microsoft.icon",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" | "tgz" => "application/gzip",
        "tar" => "application/x-tar",
        "zst" => "application/zstd",
        "xz" => "application/x-xz",
        "wasm" => "application/wasm",
        "so" | "dylib" | "dll" | "exe" | "o" | "a" => "application/octet-stream",
        _ => return None,
    };
    Some(mimetype)
}

/// Heuristic for unidentified content: text has no NUL bytes
fn looks_textual(bytes: &[u8]) -> bool {
    if Encoding::for_bom(bytes).is_some() {
        return true;
    }
    let block = &bytes[..bytes.len().min(SNIFF_BLOCK_SIZE)];
    !block.contains(&0)
}

/// Decode `bytes`, trying candidate charsets in priority order
fn decode(
    bytes: &[u8],
    location: &str,
    hint_charset: Option<&str>,
) -> Result<(&'static Encoding, String)> {
    let mut candidates: Vec<(&'static Encoding, usize)> = Vec::new();
    if let Some(encoding) = hint_charset.and_then(|label| Encoding::for_label(label.as_bytes())) {
        candidates.push((encoding, 0));
    }
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        candidates.push((encoding, bom_len));
    }
    candidates.push((UTF_8, 0));
    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(bytes, true);
    candidates.push((detector.guess(None, true), 0));

    let mut last_tried = UTF_8;
    for (encoding, skip) in candidates {
        last_tried = encoding;
        let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[skip..]);
        if had_errors {
            debug!("Decoding {} as {} produced errors", location, encoding.name());
            continue;
        }
        let confidence = decode_confidence(&text);
        if confidence >= DECODE_CONFIDENCE_THRESHOLD {
            return Ok((encoding, text.into_owned()));
        }
        debug!(
            "Decoding {} as {} has low confidence {:.2}",
            location,
            encoding.name(),
            confidence
        );
    }

    Err(Error::ContentDecodeFailure {
        location: location.to_string(),
        charset: last_tried.name().to_ascii_lowercase(),
    })
}

/// Share of decoded characters that plausibly belong to text
fn decode_confidence(text: &str) -> f64 {
    let mut total = 0usize;
    let mut plausible = 0usize;
    for ch in text.chars() {
        total += 1;
        let control = ch.is_control() && !matches!(ch, '\t' | '\n' | '\r' | '\x0c');
        if !control && ch != char::REPLACEMENT_CHARACTER {
            plausible += 1;
        }
    }
    if total == 0 {
        return 1.0;
    }
    plausible as f64 / total as f64
}
