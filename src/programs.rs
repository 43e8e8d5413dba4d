// src/programs.rs

//! Editor and pager discovery and invocation

use crate::error::{Error, Result};
use crate::linesep::LineSeparator;
use std::fs;
use std::io::{self, Write};
use std::process::{Command, Stdio};
use tracing::{debug, warn};

const EDITOR_VARIABLES: &[&str] = &["VISUAL", "EDITOR"];
const EDITOR_FALLBACKS: &[&str] = &["nano", "vim", "vi", "notepad"];
const PAGER_VARIABLES: &[&str] = &["PAGER"];
const PAGER_FALLBACKS: &[&str] = &["less", "more"];

/// External program with its leading arguments, e.g. `code --wait`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub command: String,
    pub args: Vec<String>,
}

impl Program {
    /// Split a command line on whitespace
    pub fn parse(command_line: &str) -> Option<Self> {
        let mut words = command_line.split_whitespace().map(str::to_string);
        let command = words.next()?;
        Some(Self {
            command,
            args: words.collect(),
        })
    }

    /// Edit `content` in a temporary file named with `suffix`
    ///
    /// The edited text is returned with LF newlines.
    pub fn edit(&self, content: &str, suffix: &str) -> Result<String> {
        let failure = |e: io::Error| Error::EditorFailure(e.to_string());

        let mut file = tempfile::Builder::new()
            .prefix("mimeogram-")
            .suffix(suffix)
            .tempfile()
            .map_err(failure)?;
        file.write_all(content.as_bytes()).map_err(failure)?;
        file.flush().map_err(failure)?;

        debug!("Launching editor {} on {}", self.command, file.path().display());
        let status = Command::new(&self.command)
            .args(&self.args)
            .arg(file.path())
            .status()
            .map_err(|e| Error::EditorFailure(format!("{}: {e}", self.command)))?;
        if !status.success() {
            return Err(Error::EditorFailure(format!(
                "{} exited with {status}",
                self.command
            )));
        }

        let edited = fs::read_to_string(file.path()).map_err(failure)?;
        Ok(LineSeparator::normalize_universal(&edited))
    }

    /// Display `content` through the pager
    pub fn page(&self, content: &str) -> Result<()> {
        let mut child = Command::new(&self.command)
            .args(&self.args)
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|e| Error::PagerFailure(format!("{}: {e}", self.command)))?;

        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(content.as_bytes()) {
                // Quitting the pager early closes the pipe
                Err(e) if e.kind() != io::ErrorKind::BrokenPipe => {
                    return Err(Error::PagerFailure(e.to_string()));
                }
                _ => {}
            }
        }

        let status = child
            .wait()
            .map_err(|e| Error::PagerFailure(e.to_string()))?;
        if !status.success() {
            return Err(Error::PagerFailure(format!(
                "{} exited with {status}",
                self.command
            )));
        }
        Ok(())
    }
}

/// Find the user's editor
pub fn discover_editor() -> Result<Program> {
    discover_from("editor", EDITOR_VARIABLES, EDITOR_FALLBACKS, |name| {
        std::env::var(name).ok()
    })
}

/// Find the user's pager
pub fn discover_pager() -> Result<Program> {
    discover_from("pager", PAGER_VARIABLES, PAGER_FALLBACKS, |name| {
        std::env::var(name).ok()
    })
}

fn discover_from(
    species: &str,
    variables: &[&str],
    fallbacks: &[&str],
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Program> {
    for variable in variables {
        let Some(program) = lookup(variable).as_deref().and_then(Program::parse) else {
            continue;
        };
        if which::which(&program.command).is_ok() {
            return Ok(program);
        }
        warn!(
            "${} names {} which could not be found",
            variable, program.command
        );
    }
    fallbacks
        .iter()
        .find(|name| which::which(name).is_ok())
        .and_then(|name| Program::parse(name))
        .ok_or_else(|| Error::ProgramAbsence(species.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_with_arguments() {
        let program = Program::parse("  code --wait ").unwrap();
        assert_eq!(program.command, "code");
        assert_eq!(program.args, vec!["--wait"]);
        assert!(Program::parse("   ").is_none());
    }

    #[test]
    #[cfg(unix)]
    fn test_discover_prefers_variable() {
        let program = discover_from("editor", &["EDITOR"], &[], |_| Some("sh -e".into())).unwrap();
        assert_eq!(program.command, "sh");
        assert_eq!(program.args, vec!["-e"]);
    }

    #[test]
    fn test_discover_reports_absence() {
        let err = discover_from(
            "pager",
            &["PAGER"],
            &["definitely-not-a-real-pager-xyz"],
            |_| Some("also-not-a-real-program-xyz".into()),
        )
        .unwrap_err();
        assert!(matches!(err, Error::ProgramAbsence(species) if species == "pager"));
    }

    #[test]
    #[cfg(unix)]
    fn test_edit_returns_file_content() {
        let program = Program::parse("true").unwrap();
        let edited = program.edit("line\r\n", ".txt").unwrap();
        assert_eq!(edited, "line\n");
    }

    #[test]
    #[cfg(unix)]
    fn test_editor_failure() {
        let program = Program::parse("false").unwrap();
        assert!(matches!(
            program.edit("x", ".txt"),
            Err(Error::EditorFailure(_))
        ));
    }

    #[test]
    #[cfg(unix)]
    fn test_pager_failure() {
        let program = Program::parse("false").unwrap();
        assert!(matches!(program.page("x"), Err(Error::PagerFailure(_))));
    }
}
