// src/updaters/mod.rs

//! Filesystem updates from parsed parts
//!
//! Parts are applied in order. Each destination is saved before its atomic
//! write; the first failure restores everything written so far, newest
//! first, and the error is returned to the caller. There is no atomicity
//! across files beyond that rollback.

mod reverter;
mod writer;

pub use reverter::Reverter;
pub use writer::{
    Renamer, StdRenamer, encode_text, temporary_path, write_atomic, write_atomic_with,
    write_bytes_atomic,
};

use crate::error::{Error, Result};
use crate::fsprotect::{Protector, Status};
use crate::interactions::{Interactor, Resolution, review_part};
use crate::parts::Part;
use crate::paths::absolutize;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use strum_macros::{Display, EnumString};
use tracing::{debug, info, warn};

/// How parts are reviewed before they are written
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ReviewMode {
    /// Write every unprotected part without asking
    Silent,
    /// Ask about each part on the terminal
    #[default]
    Partitive,
}

/// A part paired with its resolved destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub part: Part,
    /// Absolute filesystem path
    pub destination: PathBuf,
    pub protection: Status,
}

/// Settings for one update run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOptions {
    pub mode: ReviewMode,
    /// Directory that relative locations are resolved against
    pub base: PathBuf,
    /// Write protected destinations without an override
    pub disable_protections: bool,
}

impl UpdateOptions {
    pub fn new(mode: ReviewMode, base: impl Into<PathBuf>) -> Self {
        Self {
            mode,
            base: base.into(),
            disable_protections: false,
        }
    }
}

/// Counts reported after a successful run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    pub applied: usize,
    pub ignored: usize,
    pub protected: usize,
}

/// Drives review, protection checks, atomic writes, and rollback
pub struct PartsUpdater<'a> {
    options: UpdateOptions,
    protector: &'a dyn Protector,
    renamer: &'a dyn Renamer,
}

impl<'a> PartsUpdater<'a> {
    pub fn new(options: UpdateOptions, protector: &'a dyn Protector) -> Self {
        Self {
            options,
            protector,
            renamer: &StdRenamer,
        }
    }

    /// Commit writes through `renamer` instead of [`std::fs::rename`]
    pub fn with_renamer(mut self, renamer: &'a dyn Renamer) -> Self {
        self.renamer = renamer;
        self
    }

    /// Apply `parts` in order
    pub fn update(&self, parts: &[Part], interactor: &mut dyn Interactor) -> Result<UpdateSummary> {
        let mut reverter = Reverter::new();
        let mut summary = UpdateSummary::default();

        for part in parts {
            if part.is_synthetic() {
                debug!("Skipping synthetic part {}", part.location);
                continue;
            }
            if let Err(e) = self.update_part(part, interactor, &mut reverter, &mut summary) {
                let written = reverter.revisions().len();
                if written > 0 {
                    warn!("Update failed; restoring {} file(s)", written);
                    reverter.restore();
                }
                return Err(e);
            }
        }

        info!(
            "Applied {} part(s), ignored {}, skipped {} protected",
            summary.applied, summary.ignored, summary.protected
        );
        Ok(summary)
    }

    fn update_part(
        &self,
        part: &Part,
        interactor: &mut dyn Interactor,
        reverter: &mut Reverter,
        summary: &mut UpdateSummary,
    ) -> Result<()> {
        let destination = resolve_destination(&part.location, &self.options.base)?;
        let protection = self.protector.verify(&destination);
        let target = Target {
            part: part.clone(),
            destination: protection.path.clone(),
            protection,
        };

        let interactive = self.options.mode == ReviewMode::Partitive && interactor.stdin_is_tty();
        let resolution = if interactive {
            review_part(interactor, &target, self.options.disable_protections)?
        } else if target.protection.active && !self.options.disable_protections {
            warn!(
                "Skipping {} which is {}",
                target.destination.display(),
                target.protection.description()
            );
            summary.protected += 1;
            return Ok(());
        } else {
            Resolution::Apply(part.content.clone())
        };

        let content = match resolution {
            Resolution::Apply(content) => content,
            Resolution::Ignore => {
                debug!("Ignoring {}", target.destination.display());
                summary.ignored += 1;
                return Ok(());
            }
        };

        self.write(&target, &content, reverter)?;
        summary.applied += 1;
        Ok(())
    }

    fn write(&self, target: &Target, content: &str, reverter: &mut Reverter) -> Result<()> {
        let destination = &target.destination;
        if let Some(parent) = destination.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| Error::update(parent, e))?;
        }
        reverter.save(destination)?;
        write_atomic_with(
            self.renamer,
            destination,
            content,
            &target.part.charset,
            target.part.linesep,
        )?;
        reverter.append(destination);
        info!("Updated {}", destination.display());
        Ok(())
    }
}

/// Map a part location to an absolute filesystem path
///
/// Relative paths are joined to `base`; `file://` URLs are converted; any
/// other URL scheme is rejected.
pub fn resolve_destination(location: &str, base: &Path) -> Result<PathBuf> {
    let invalid = |reason: &str| Error::LocationInvalidity {
        location: location.to_string(),
        reason: reason.to_string(),
    };
    if location.trim().is_empty() {
        return Err(invalid("empty location"));
    }
    match url::Url::parse(location) {
        Ok(url) if url.scheme() == "file" => url
            .to_file_path()
            .map_err(|_| invalid("file URL does not name a local path")),
        // A one-letter scheme is a Windows drive letter
        Ok(url) if url.scheme().len() > 1 => Err(invalid(&format!(
            "cannot write to '{}' URLs",
            url.scheme()
        ))),
        _ => Ok(absolutize(location, base)),
    }
}
