// src/clipboard.rs

//! Command-based clipboard access
//!
//! The provider is picked from the clipboard tools available on the host;
//! content is exchanged over the tool's stdin and stdout.

use crate::error::{Error, Result};
use std::io::Write;
use std::process::{Command as ProcessCommand, Stdio};
use tracing::debug;

/// External program invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Command {
    program: &'static str,
    args: &'static [&'static str],
}

/// Pair of programs that read and write the clipboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CommandPair {
    read: Command,
    write: Command,
}

const PASTEBOARD: CommandPair = CommandPair {
    read: Command { program: "pbpaste", args: &[] },
    write: Command { program: "pbcopy", args: &[] },
};

const WAYLAND: CommandPair = CommandPair {
    read: Command { program: "wl-paste", args: &["--no-newline"] },
    write: Command { program: "wl-copy", args: &["--type", "text/plain"] },
};

const XCLIP: CommandPair = CommandPair {
    read: Command { program: "xclip", args: &["-o", "-selection", "clipboard"] },
    write: Command { program: "xclip", args: &["-i", "-selection", "clipboard"] },
};

const XSEL: CommandPair = CommandPair {
    read: Command { program: "xsel", args: &["-o", "-b"] },
    write: Command { program: "xsel", args: &["-i", "-b"] },
};

const WINDOWS: CommandPair = CommandPair {
    read: Command {
        program: "powershell",
        args: &["-NoProfile", "-Command", "Get-Clipboard -Raw"],
    },
    write: Command { program: "clip.exe", args: &[] },
};

/// Clipboard tool family found on this host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardProvider {
    Pasteboard,
    Wayland,
    XClip,
    XSel,
    Windows,
    None,
}

impl ClipboardProvider {
    /// Pick the provider for the current environment
    pub fn detect() -> Self {
        let exists = |program: &str| which::which(program).is_ok();
        let env_set = |name: &str| std::env::var_os(name).is_some_and(|v| !v.is_empty());

        let provider = if cfg!(windows) {
            Self::Windows
        } else if cfg!(target_os = "macos") && exists("pbcopy") && exists("pbpaste") {
            Self::Pasteboard
        } else if env_set("WAYLAND_DISPLAY") && exists("wl-copy") && exists("wl-paste") {
            Self::Wayland
        } else if env_set("DISPLAY") && exists("xclip") {
            Self::XClip
        } else if env_set("DISPLAY") && exists("xsel") {
            Self::XSel
        } else if exists("clip.exe") && exists("powershell.exe") {
            // WSL
            Self::Windows
        } else {
            Self::None
        };
        debug!("Using clipboard provider {}", provider.name());
        provider
    }

    /// Short provider name for diagnostics
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pasteboard => "pasteboard",
            Self::Wayland => "wayland",
            Self::XClip => "xclip",
            Self::XSel => "xsel",
            Self::Windows => "windows",
            Self::None => "none",
        }
    }

    fn commands(&self) -> Option<CommandPair> {
        match self {
            Self::Pasteboard => Some(PASTEBOARD),
            Self::Wayland => Some(WAYLAND),
            Self::XClip => Some(XCLIP),
            Self::XSel => Some(XSEL),
            Self::Windows => Some(WINDOWS),
            Self::None => None,
        }
    }

    /// Read the clipboard as text
    pub fn read(&self) -> Result<String> {
        let commands = self.commands().ok_or_else(no_provider)?;
        let output = run(commands.read, None)?;
        Ok(output.unwrap_or_default())
    }

    /// Replace the clipboard content with `content`
    pub fn write(&self, content: &str) -> Result<()> {
        let commands = self.commands().ok_or_else(no_provider)?;
        run(commands.write, Some(content)).map(|_| ())
    }
}

fn no_provider() -> Error {
    Error::ClipboardFailure("no clipboard tool found on this system".to_string())
}

fn run(command: Command, input: Option<&str>) -> Result<Option<String>> {
    let failure =
        |reason: String| Error::ClipboardFailure(format!("{}: {reason}", command.program));

    let mut child = ProcessCommand::new(command.program)
        .args(command.args)
        .stdin(if input.is_some() { Stdio::piped() } else { Stdio::null() })
        .stdout(if input.is_some() { Stdio::null() } else { Stdio::piped() })
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| failure(e.to_string()))?;

    if let Some(input) = input {
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| failure("stdin unavailable".to_string()))?;
        stdin
            .write_all(input.as_bytes())
            .map_err(|e| failure(e.to_string()))?;
    }

    let output = child.wait_with_output().map_err(|e| failure(e.to_string()))?;
    if !output.status.success() {
        return Err(failure(format!("exited with {}", output.status)));
    }
    if input.is_some() {
        return Ok(None);
    }
    String::from_utf8(output.stdout)
        .map(Some)
        .map_err(|e| failure(e.to_string()))
}
