// src/parsers.rs

//! Mimeogram parsing
//!
//! The parser is tolerant of what chat interfaces do to a bundle: commentary
//! before the first boundary or after the final boundary is discarded, a
//! missing final boundary is accepted, and header blocks without a blank
//! separator line are recovered when possible.

use crate::error::{Error, Result};
use crate::linesep::LineSeparator;
use crate::parts::Part;
use regex::Regex;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::LazyLock;
use tracing::{debug, warn};

static BOUNDARY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?mi)^--====MIMEOGRAM_[0-9a-f]{16,}====(?:--)?[ \t]*$")
        .expect("boundary pattern is valid")
});

/// Split a mimeogram into its parts
///
/// The message part, if present, is returned like any other part; callers
/// recognize it by its `mimeogram://message` location.
pub fn parse_mimeogram(text: &str) -> Result<Vec<Part>> {
    if text.trim().is_empty() {
        return Err(Error::MimeogramParseFailure("empty mimeogram".to_string()));
    }
    let text = LineSeparator::normalize_universal(text);

    let boundary = BOUNDARY_REGEX
        .find(&text)
        .map(|m| {
            let found = m.as_str().trim_end();
            found.strip_suffix("--").unwrap_or(found).to_string()
        })
        .ok_or_else(|| Error::MimeogramParseFailure("no mimeogram boundary found".to_string()))?;
    debug!("Found mimeogram boundary {}", boundary);

    let mut parts = Vec::new();
    for fragment in split_fragments(&text, &boundary) {
        if fragment.trim().is_empty() {
            continue;
        }
        parts.push(parse_part(&fragment)?);
    }
    Ok(parts)
}

/// Collect the text between boundary lines, stopping at the final boundary
fn split_fragments(text: &str, boundary: &str) -> Vec<String> {
    let final_boundary = format!("{boundary}--");
    let mut fragments = Vec::new();
    let mut current: Option<String> = None;
    let mut consumed = 0;
    for line in text.split_inclusive('\n') {
        consumed += line.len();
        let marker = line.trim_end();
        if marker.eq_ignore_ascii_case(&final_boundary) {
            if let Some(fragment) = current.take() {
                fragments.push(fragment);
            }
            if !text[consumed..].trim().is_empty() {
                debug!("Discarding text after final mimeogram boundary");
            }
            return fragments;
        }
        if marker.eq_ignore_ascii_case(boundary) {
            if let Some(fragment) = current.replace(String::new()) {
                fragments.push(fragment);
            }
            continue;
        }
        if let Some(fragment) = current.as_mut() {
            fragment.push_str(line);
        }
    }
    if let Some(fragment) = current {
        debug!("Mimeogram has no final boundary; accepting trailing part");
        fragments.push(fragment);
    }
    fragments
}

/// Parse the headers and content between two boundary lines
fn parse_part(fragment: &str) -> Result<Part> {
    let fragment = fragment.trim_start();
    // The newline joining content to the next boundary belongs to the format
    let fragment = fragment.strip_suffix('\n').unwrap_or(fragment);

    let (header_block, content) = split_headers(fragment)?;
    let headers = parse_headers(header_block);

    let location = headers
        .get("content-location")
        .cloned()
        .ok_or_else(|| {
            Error::MimeogramParseFailure("missing Content-Location header".to_string())
        })?;
    let content_type = headers.get("content-type").ok_or_else(|| {
        Error::MimeogramParseFailure(format!("missing Content-Type header for {location}"))
    })?;
    let (mimetype, charset, linesep) = parse_content_type(content_type, &location)?;

    Ok(Part::new(location, mimetype, charset, linesep, content))
}

/// Split at the first blank line, or recover where headers stop
///
/// Once both required headers are seen, the first line that is not shaped
/// like a header starts the content even without a blank separator. Before
/// that, stray lines stay in the header block and are skipped later.
fn split_headers(fragment: &str) -> Result<(&str, &str)> {
    let mut offset = 0;
    let mut location_seen = false;
    let mut type_seen = false;
    for line in fragment.split_inclusive('\n') {
        if line.trim().is_empty() {
            return Ok((&fragment[..offset], &fragment[offset + line.len()..]));
        }
        if is_header_line(line) {
            let key = line.split(':').next().unwrap_or_default().trim();
            location_seen |= key.eq_ignore_ascii_case("content-location");
            type_seen |= key.eq_ignore_ascii_case("content-type");
        } else if location_seen && type_seen {
            warn!("Part headers are not followed by a blank line");
            return Ok((&fragment[..offset], &fragment[offset..]));
        }
        offset += line.len();
    }
    if offset == 0 {
        return Err(Error::MimeogramParseFailure(
            "could not identify part headers".to_string(),
        ));
    }
    Ok((fragment, ""))
}

/// `Key: value` with a token key and no leading whitespace
fn is_header_line(line: &str) -> bool {
    let Some((key, _)) = line.split_once(':') else {
        return false;
    };
    !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn parse_headers(block: &str) -> HashMap<String, String> {
    let mut headers = HashMap::new();
    for line in block.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line.split_once(':') {
            Some((key, value)) if !key.trim().is_empty() => {
                headers.insert(key.trim().to_ascii_lowercase(), value.trim().to_string());
            }
            _ => warn!("Skipping malformed header line: {}", line),
        }
    }
    headers
}

/// Parse `type/subtype; charset=...; linesep=...`
fn parse_content_type(value: &str, location: &str) -> Result<(String, String, LineSeparator)> {
    let mut pieces = value.split(';');
    let mimetype = pieces.next().map(str::trim).unwrap_or_default();
    if !mimetype.contains('/') {
        return Err(Error::MimeogramParseFailure(format!(
            "invalid Content-Type '{value}' for {location}"
        )));
    }

    let mut charset = "utf-8".to_string();
    let mut linesep = LineSeparator::Lf;
    for param in pieces {
        let Some((key, val)) = param.split_once('=') else {
            continue;
        };
        let val = val.trim().trim_matches('"');
        match key.trim().to_ascii_lowercase().as_str() {
            "charset" => charset = val.to_string(),
            "linesep" => match LineSeparator::from_str(val) {
                Ok(parsed) => linesep = parsed,
                Err(_) => warn!("Unknown line separator '{}' for {}; using LF", val, location),
            },
            _ => {}
        }
    }
    Ok((mimetype.to_string(), charset, linesep))
}
