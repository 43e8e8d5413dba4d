// src/updaters/reverter.rs

//! Ordered rollback of files written during one update run

use super::writer::{StdRenamer, write_bytes_atomic};
use crate::error::{Error, Result};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// State of a destination before the run touched it
#[derive(Debug, Clone, PartialEq, Eq)]
enum Original {
    Present(Vec<u8>),
    Absent,
}

/// Bookkeeping for restoring destinations after a failed run
#[derive(Debug, Default)]
pub struct Reverter {
    originals: HashMap<PathBuf, Original>,
    revisions: Vec<PathBuf>,
}

impl Reverter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember the current bytes of `path`, or that it does not exist
    ///
    /// Only the first call for a path has any effect.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        if self.originals.contains_key(path) {
            return Ok(());
        }
        let original = match fs::read(path) {
            Ok(bytes) => Original::Present(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Original::Absent,
            Err(e) => return Err(Error::update(path, e)),
        };
        self.originals.insert(path.to_path_buf(), original);
        Ok(())
    }

    /// Record that `path` was written
    pub fn append(&mut self, path: &Path) {
        self.revisions.push(path.to_path_buf());
    }

    /// Paths written so far, oldest first
    pub fn revisions(&self) -> &[PathBuf] {
        &self.revisions
    }

    /// Put every written path back, newest first
    ///
    /// Failures are logged and do not stop the remaining restorations.
    /// Returns the number of paths restored successfully.
    pub fn restore(&mut self) -> usize {
        let mut restored = 0;
        while let Some(path) = self.revisions.pop() {
            let outcome = match self.originals.get(&path) {
                Some(Original::Present(bytes)) => write_bytes_atomic(&StdRenamer, &path, bytes),
                Some(Original::Absent) => remove_created(&path),
                None => continue,
            };
            match outcome {
                Ok(()) => {
                    info!("Restored {}", path.display());
                    restored += 1;
                }
                Err(e) => error!("Could not restore {}: {}", path.display(), e),
            }
        }
        restored
    }
}

fn remove_created(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::update(path, e)),
    }
}
