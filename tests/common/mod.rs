// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use mimeogram::fsprotect::{Protector, Status};
use mimeogram::interactions::{Action, Interactor, SegmentChoice};
use mimeogram::updaters::{Renamer, Target};
use mimeogram::{Error, LineSeparator, Part, Result};
use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};

/// Text part with UTF-8 charset
pub fn text_part(location: &str, linesep: LineSeparator, content: &str) -> Part {
    Part::new(location, "text/plain", "utf-8", linesep, content)
}

/// Protector that treats every path as unprotected
pub struct AllowAll;

impl Protector for AllowAll {
    fn verify(&self, path: &Path) -> Status {
        Status::inactive(path)
    }
}

/// Renamer that refuses to commit writes to one file name
pub struct FailingRenamer {
    pub file_name: String,
}

impl FailingRenamer {
    pub fn for_name(file_name: &str) -> Self {
        Self {
            file_name: file_name.to_string(),
        }
    }
}

impl Renamer for FailingRenamer {
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        if to.file_name().is_some_and(|n| n == self.file_name.as_str()) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "injected rename failure",
            ));
        }
        std::fs::rename(from, to)
    }
}

/// Interactor without a terminal; prompting is a test failure
pub struct Unattended;

impl Interactor for Unattended {
    fn stdin_is_tty(&self) -> bool {
        false
    }

    fn prompt_action(&mut self, _target: &Target, _locked: bool) -> Result<Action> {
        panic!("unattended interactor was prompted");
    }

    fn show_content(&mut self, _target: &Target, _content: &str) -> Result<()> {
        Ok(())
    }

    fn show_diff(&mut self, _target: &Target, _current: &str, _revision: &str) -> Result<()> {
        Ok(())
    }

    fn edit(&mut self, _target: &Target, content: &str) -> Result<String> {
        Ok(content.to_string())
    }

    fn choose_segment(&mut self, _: &Target, _: &str, _: &str) -> Result<SegmentChoice> {
        Ok(SegmentChoice::Accept)
    }
}

/// Terminal interactor that replays answers and records prompted targets
#[derive(Default)]
pub struct Scripted {
    pub actions: VecDeque<Action>,
    pub segments: VecDeque<SegmentChoice>,
    pub prompted: Vec<PathBuf>,
    /// Prompt number (1-based) answered with a Ctrl-C style interrupt
    pub interrupt_at: Option<usize>,
}

impl Scripted {
    pub fn new(actions: impl IntoIterator<Item = Action>) -> Self {
        Self {
            actions: actions.into_iter().collect(),
            ..Default::default()
        }
    }

    /// Interrupt the `prompt`-th prompt instead of answering it
    pub fn interrupting_at(mut self, prompt: usize) -> Self {
        self.interrupt_at = Some(prompt);
        self
    }
}

impl Interactor for Scripted {
    fn stdin_is_tty(&self) -> bool {
        true
    }

    fn prompt_action(&mut self, target: &Target, _locked: bool) -> Result<Action> {
        self.prompted.push(target.destination.clone());
        if self.interrupt_at == Some(self.prompted.len()) {
            return Err(Error::UserOperateCancellation(
                "interrupted at prompt".to_string(),
            ));
        }
        self.actions
            .pop_front()
            .ok_or_else(|| Error::UserOperateCancellation("end of script".to_string()))
    }

    fn show_content(&mut self, _target: &Target, _content: &str) -> Result<()> {
        Ok(())
    }

    fn show_diff(&mut self, _target: &Target, _current: &str, _revision: &str) -> Result<()> {
        Ok(())
    }

    fn edit(&mut self, _target: &Target, content: &str) -> Result<String> {
        Ok(content.to_string())
    }

    fn choose_segment(&mut self, _: &Target, _: &str, _: &str) -> Result<SegmentChoice> {
        self.segments
            .pop_front()
            .ok_or_else(|| Error::UserOperateCancellation("end of script".to_string()))
    }
}
