// src/interactions/mod.rs

//! Per-part review before a write
//!
//! [`review_part`] runs the prompt loop against any [`Interactor`]:
//!
//! | Key | Effect                                               |
//! |-----|------------------------------------------------------|
//! | `a` | apply the working content                            |
//! | `i` | ignore the part                                      |
//! | `v` | view the working content                             |
//! | `d` | diff the destination against the working content     |
//! | `e` | edit the working content                             |
//! | `s` | pick changes hunk by hunk against the destination    |
//! | `p` | toggle the override for a protected destination      |

mod segments;
mod terminal;

pub use segments::select_segments;
pub use terminal::TerminalInteractor;

use crate::error::{Error, Result};
use crate::linesep::LineSeparator;
use crate::updaters::Target;
use encoding_rs::{Encoding, UTF_8};
use std::fs;
use std::io;
use tracing::{info, warn};

/// Choice made at the part prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Apply,
    Ignore,
    View,
    Diff,
    Edit,
    Select,
    Protect,
}

impl Action {
    /// Parse a single-letter answer
    pub fn from_key(answer: &str) -> Option<Self> {
        match answer.trim().to_ascii_lowercase().as_str() {
            "a" | "apply" => Some(Self::Apply),
            "i" | "ignore" => Some(Self::Ignore),
            "v" | "view" => Some(Self::View),
            "d" | "diff" => Some(Self::Diff),
            "e" | "edit" => Some(Self::Edit),
            "s" | "select" => Some(Self::Select),
            "p" | "protect" => Some(Self::Protect),
            _ => None,
        }
    }
}

/// Answer for one changed hunk during segment selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentChoice {
    /// Take the incoming lines
    Accept,
    /// Keep the destination's lines
    Reject,
    /// Show the hunk, then ask again
    View,
}

/// Outcome of reviewing a part
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Apply(String),
    Ignore,
}

/// Capabilities needed to review parts with a human
pub trait Interactor {
    /// Whether answers can be read from a terminal
    fn stdin_is_tty(&self) -> bool;

    /// Ask what to do with `target`; `locked` is set while a protected
    /// destination has no override
    fn prompt_action(&mut self, target: &Target, locked: bool) -> Result<Action>;

    fn show_content(&mut self, target: &Target, content: &str) -> Result<()>;

    fn show_diff(&mut self, target: &Target, current: &str, revision: &str) -> Result<()>;

    /// Return `content` as modified by the user
    fn edit(&mut self, target: &Target, content: &str) -> Result<String>;

    fn choose_segment(
        &mut self,
        target: &Target,
        current: &str,
        incoming: &str,
    ) -> Result<SegmentChoice>;
}

/// Run the review loop for one part
///
/// Assumes stdin is a terminal; callers fall back to unattended handling
/// otherwise.
pub fn review_part(
    interactor: &mut dyn Interactor,
    target: &Target,
    disable_protections: bool,
) -> Result<Resolution> {
    let protected = target.protection.active && !disable_protections;
    let mut overridden = !protected;
    let mut content = target.part.content.clone();

    loop {
        match interactor.prompt_action(target, !overridden)? {
            Action::Apply if !overridden => warn!(
                "{} is {}; press 'p' to override before applying",
                target.destination.display(),
                target.protection.description()
            ),
            Action::Apply => return Ok(Resolution::Apply(content)),
            Action::Ignore => return Ok(Resolution::Ignore),
            Action::View => interactor.show_content(target, &content)?,
            Action::Diff => {
                let current = current_content(target)?;
                interactor.show_diff(target, &current, &content)?;
            }
            Action::Edit => content = interactor.edit(target, &content)?,
            Action::Select => {
                let current = current_content(target)?;
                content = select_segments(interactor, target, &current, &content)?;
            }
            Action::Protect if protected => {
                overridden = !overridden;
                info!(
                    "Protection override for {} {}",
                    target.destination.display(),
                    if overridden { "enabled" } else { "disabled" }
                );
            }
            Action::Protect => info!("{} is not protected", target.destination.display()),
        }
    }
}

/// Destination content decoded with the part's charset, or empty if absent
pub fn current_content(target: &Target) -> Result<String> {
    let bytes = match fs::read(&target.destination) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(String::new()),
        Err(e) => {
            return Err(Error::acquire(
                target.destination.display().to_string(),
                e,
            ));
        }
    };
    let encoding = Encoding::for_label(target.part.charset.as_bytes()).unwrap_or(UTF_8);
    let (text, _, _) = encoding.decode(&bytes);
    Ok(LineSeparator::normalize_universal(&text))
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedInteractor;
    use super::*;
    use crate::fsprotect::{Reason, Status};
    use crate::parts::Part;
    use std::path::Path;
    use tempfile::TempDir;

    fn target(dir: &Path, content: &str, protection: Option<Reason>) -> Target {
        let destination = dir.join("file.txt");
        let part = Part::new(
            "file.txt",
            "text/plain",
            "utf-8",
            LineSeparator::Lf,
            content,
        );
        let protection = match protection {
            Some(reason) => Status::active(&destination, reason),
            None => Status::inactive(&destination),
        };
        Target {
            part,
            destination,
            protection,
        }
    }

    #[test]
    fn test_action_keys() {
        assert_eq!(Action::from_key("A\n"), Some(Action::Apply));
        assert_eq!(Action::from_key("select"), Some(Action::Select));
        assert_eq!(Action::from_key("x"), None);
    }

    #[test]
    fn test_apply_and_ignore() {
        let temp = TempDir::new().unwrap();
        let target = target(temp.path(), "new\n", None);
        let mut interactor = ScriptedInteractor::new([Action::View, Action::Apply]);
        let resolution = review_part(&mut interactor, &target, false).unwrap();
        assert_eq!(resolution, Resolution::Apply("new\n".to_string()));
        assert_eq!(interactor.shown, vec!["new\n".to_string()]);

        let mut interactor = ScriptedInteractor::new([Action::Ignore]);
        assert_eq!(
            review_part(&mut interactor, &target, false).unwrap(),
            Resolution::Ignore
        );
    }

    #[test]
    fn test_edit_replaces_working_content() {
        let temp = TempDir::new().unwrap();
        let target = target(temp.path(), "draft\n", None);
        let mut interactor = ScriptedInteractor::new([Action::Edit, Action::Apply]);
        interactor.edits.push_back("final\n".to_string());
        let resolution = review_part(&mut interactor, &target, false).unwrap();
        assert_eq!(resolution, Resolution::Apply("final\n".to_string()));
    }

    #[test]
    fn test_protected_requires_override() {
        let temp = TempDir::new().unwrap();
        let target = target(temp.path(), "x", Some(Reason::VersionControl));
        let mut interactor =
            ScriptedInteractor::new([Action::Apply, Action::Protect, Action::Apply]);
        let resolution = review_part(&mut interactor, &target, false).unwrap();
        assert_eq!(resolution, Resolution::Apply("x".to_string()));
        assert_eq!(interactor.locked_prompts, 2);
    }

    #[test]
    fn test_disabled_protections_unlock() {
        let temp = TempDir::new().unwrap();
        let target = target(temp.path(), "x", Some(Reason::Credentials));
        let mut interactor = ScriptedInteractor::new([Action::Apply]);
        assert!(review_part(&mut interactor, &target, true).is_ok());
        assert_eq!(interactor.locked_prompts, 0);
    }

    #[test]
    fn test_exhausted_prompt_is_cancellation() {
        let temp = TempDir::new().unwrap();
        let target = target(temp.path(), "x", None);
        let mut interactor = ScriptedInteractor::new([]);
        let err = review_part(&mut interactor, &target, false).unwrap_err();
        assert!(err.is_cancellation());
    }

    #[test]
    fn test_diff_against_destination() {
        let temp = TempDir::new().unwrap();
        let target = target(temp.path(), "b\n", None);
        fs::write(&target.destination, "a\r\n").unwrap();
        let mut interactor = ScriptedInteractor::new([Action::Diff, Action::Ignore]);
        review_part(&mut interactor, &target, false).unwrap();
        assert_eq!(
            interactor.diffs,
            vec![("a\n".to_string(), "b\n".to_string())]
        );
    }

    #[test]
    fn test_current_content_of_missing_file() {
        let temp = TempDir::new().unwrap();
        let target = target(temp.path(), "x", None);
        assert_eq!(current_content(&target).unwrap(), "");
    }
}
