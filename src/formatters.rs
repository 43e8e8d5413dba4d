// src/formatters.rs

//! Mimeogram serialization
//!
//! ```text
//! --====MIMEOGRAM_<hex>====
//! Content-Location: <location>
//! Content-Type: <mimetype>; charset=<charset>; linesep=<LF|CR|CRLF>
//!
//! <content>
//! --====MIMEOGRAM_<hex>====--
//! ```

use crate::error::{Error, Result};
use crate::parts::Part;
use sha2::{Digest, Sha256};
use tracing::debug;
use uuid::Uuid;

/// Text preceding the hex digits of a boundary
pub const BOUNDARY_PREFIX: &str = "====MIMEOGRAM_";

/// Text following the hex digits of a boundary
pub const BOUNDARY_SUFFIX: &str = "====";

/// Attempts to find a random boundary absent from all content
const RANDOM_BOUNDARY_ATTEMPTS: usize = 8;

/// Serialize `parts` and an optional message into a mimeogram
///
/// With `deterministic_boundary`, the boundary is a SHA-256 digest of the
/// inputs, so identical inputs produce byte-identical output.
pub fn format_mimeogram(
    parts: &[Part],
    message: Option<&str>,
    deterministic_boundary: bool,
) -> Result<String> {
    if parts.is_empty() && message.is_none() {
        return Err(Error::MimeogramFormatEmpty);
    }

    let boundary = if deterministic_boundary {
        deterministic_boundary_for(parts, message)
    } else {
        random_boundary_for(parts, message)
    };
    debug!("Formatting {} part(s) with boundary {}", parts.len(), boundary);

    let message_part = message.map(Part::message);
    let mut lines: Vec<String> = Vec::with_capacity((parts.len() + 1) * 5 + 1);
    for part in message_part.iter().chain(parts) {
        lines.push(format!("--{boundary}"));
        lines.push(format!("Content-Location: {}", part.location));
        lines.push(format!(
            "Content-Type: {}; charset={}; linesep={}",
            part.mimetype,
            part.charset,
            part.linesep.name()
        ));
        lines.push(String::new());
        lines.push(part.content.clone());
    }
    lines.push(format!("--{boundary}--"));
    Ok(lines.join("\n"))
}

/// Boundary derived from a SHA-256 digest of message and parts
pub fn deterministic_boundary_for(parts: &[Part], message: Option<&str>) -> String {
    let mut hasher = Sha256::new();
    if let Some(message) = message {
        hasher.update(message.as_bytes());
    }
    for part in parts {
        hasher.update(part.location.as_bytes());
        hasher.update(part.mimetype.as_bytes());
        hasher.update(part.charset.as_bytes());
        hasher.update(part.linesep.name().as_bytes());
        hasher.update(part.content.as_bytes());
    }
    boundary_from_hex(&hex::encode(hasher.finalize()))
}

/// Fresh random boundary that no content line collides with
fn random_boundary_for(parts: &[Part], message: Option<&str>) -> String {
    let mut boundary = random_boundary();
    for _ in 1..RANDOM_BOUNDARY_ATTEMPTS {
        if !collides(&boundary, parts, message) {
            break;
        }
        debug!("Boundary {} collides with content; regenerating", boundary);
        boundary = random_boundary();
    }
    boundary
}

fn random_boundary() -> String {
    boundary_from_hex(&Uuid::new_v4().simple().to_string())
}

fn boundary_from_hex(hex_digits: &str) -> String {
    format!("{BOUNDARY_PREFIX}{hex_digits}{BOUNDARY_SUFFIX}")
}

fn collides(boundary: &str, parts: &[Part], message: Option<&str>) -> bool {
    let marker = format!("--{boundary}");
    let hit = |text: &str| text.lines().any(|line| line.trim_end().starts_with(&marker));
    message.is_some_and(hit) || parts.iter().any(|part| hit(&part.content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linesep::LineSeparator;

    fn sample_part() -> Part {
        Part::new("test.txt", "text/plain", "utf-8", LineSeparator::Lf, "Sample content")
    }

    #[test]
    fn test_format_empty_fails() {
        let err = format_mimeogram(&[], None, false).unwrap_err();
        assert!(matches!(err, Error::MimeogramFormatEmpty));
    }

    #[test]
    fn test_format_layout() {
        let text = format_mimeogram(&[sample_part()], None, true).unwrap();
        let boundary = deterministic_boundary_for(&[sample_part()], None);
        let expected = format!(
            "--{b}\nContent-Location: test.txt\nContent-Type: text/plain; charset=utf-8; linesep=LF\n\nSample content\n--{b}--",
            b = boundary
        );
        assert_eq!(text, expected);
    }

    #[test]
    fn test_message_only() {
        let text = format_mimeogram(&[], Some("Please review"), false).unwrap();
        assert!(text.contains("Content-Location: mimeogram://message\n"));
        assert!(text.contains("\n\nPlease review\n--====MIMEOGRAM_"));
    }

    #[test]
    fn test_message_precedes_parts() {
        let text = format_mimeogram(&[sample_part()], Some("note"), false).unwrap();
        let message_at = text.find("mimeogram://message").unwrap();
        let part_at = text.find("Content-Location: test.txt").unwrap();
        assert!(message_at < part_at);
    }

    #[test]
    fn test_random_boundary_shape() {
        let boundary = random_boundary();
        let digits = boundary
            .strip_prefix(BOUNDARY_PREFIX)
            .and_then(|b| b.strip_suffix(BOUNDARY_SUFFIX))
            .unwrap();
        assert_eq!(digits.len(), 32);
        assert!(digits.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_deterministic_boundary_depends_on_message() {
        let parts = [sample_part()];
        let first = deterministic_boundary_for(&parts, Some("m"));
        assert_eq!(first, deterministic_boundary_for(&parts, Some("m")));
        assert_ne!(first, deterministic_boundary_for(&parts, Some("m2")));
        assert_eq!(first.len(), BOUNDARY_PREFIX.len() + 64 + BOUNDARY_SUFFIX.len());
    }
}
