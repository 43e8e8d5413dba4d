// src/updaters/writer.rs

//! Atomic file replacement
//!
//! Content is written to a sibling `<path>.tmp` file and then renamed over
//! the destination, so readers observe either the old or the new bytes.

use crate::error::{Error, Result};
use crate::linesep::LineSeparator;
use encoding_rs::{Encoding, UTF_16BE, UTF_16LE};
use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Commit primitive of the atomic writer
pub trait Renamer {
    /// Move `from` over `to`, replacing any existing file
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
}

/// Renamer backed by [`std::fs::rename`]
#[derive(Debug, Clone, Copy, Default)]
pub struct StdRenamer;

impl Renamer for StdRenamer {
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }
}

/// Temporary sibling used while replacing `path`
pub fn temporary_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

/// Convert LF newlines to `linesep`, then encode with `charset`
pub fn encode_text(text: &str, charset: &str, linesep: LineSeparator) -> io::Result<Vec<u8>> {
    let native = linesep.nativize(text);
    let encoding = Encoding::for_label(charset.trim().as_bytes()).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("unknown charset '{charset}'"),
        )
    })?;
    if encoding == UTF_16LE || encoding == UTF_16BE {
        return Ok(encode_utf16(&native, encoding == UTF_16BE));
    }
    let (bytes, used, unmappable) = encoding.encode(&native);
    if used != encoding {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("cannot encode content as {}", encoding.name()),
        ));
    }
    if unmappable {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("content cannot be represented in {}", used.name()),
        ));
    }
    Ok(bytes.into_owned())
}

/// UTF-16 output with a leading byte order mark
fn encode_utf16(text: &str, big_endian: bool) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(2 + text.len() * 2);
    for unit in std::iter::once(0xFEFF).chain(text.encode_utf16()) {
        let pair = if big_endian {
            unit.to_be_bytes()
        } else {
            unit.to_le_bytes()
        };
        bytes.extend_from_slice(&pair);
    }
    bytes
}

/// Write `text` to `path` atomically using the standard renamer
pub fn write_atomic(path: &Path, text: &str, charset: &str, linesep: LineSeparator) -> Result<()> {
    write_atomic_with(&StdRenamer, path, text, charset, linesep)
}

/// Write `text` to `path` atomically, committing through `renamer`
pub fn write_atomic_with(
    renamer: &dyn Renamer,
    path: &Path,
    text: &str,
    charset: &str,
    linesep: LineSeparator,
) -> Result<()> {
    let bytes = encode_text(text, charset, linesep).map_err(|e| Error::update(path, e))?;
    write_bytes_atomic(renamer, path, &bytes)
}

/// Write raw `bytes` to `path` atomically
///
/// The temporary file is removed whether or not the rename succeeded.
pub fn write_bytes_atomic(renamer: &dyn Renamer, path: &Path, bytes: &[u8]) -> Result<()> {
    let temp_path = temporary_path(path);
    let outcome = write_and_commit(renamer, &temp_path, path, bytes);
    if temp_path.exists()
        && let Err(e) = fs::remove_file(&temp_path)
    {
        warn!("Could not remove temporary file {}: {}", temp_path.display(), e);
    }
    outcome.map_err(|e| Error::update(path, e))?;
    debug!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

fn write_and_commit(
    renamer: &dyn Renamer,
    temp_path: &Path,
    path: &Path,
    bytes: &[u8],
) -> io::Result<()> {
    let mut file = fs::File::create(temp_path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    drop(file);
    renamer.rename(temp_path, path)
}
