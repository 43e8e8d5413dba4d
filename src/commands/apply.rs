// src/commands/apply.rs
//! Apply a mimeogram to the filesystem

use crate::cli::ApplyArgs;
use anyhow::{Context, Result};
use mimeogram::clipboard::ClipboardProvider;
use mimeogram::paths::absolutize_from_cwd;
use mimeogram::{
    Configuration, Error, PartsUpdater, ProtectionCache, ReviewMode, TerminalInteractor,
    UpdateOptions, parse_mimeogram,
};
use std::io::{self, IsTerminal, Read};
use std::path::Path;
use tracing::{debug, info};

/// Sources a mimeogram can be read from
pub trait ContentAcquirer {
    fn stdin_is_tty(&self) -> bool;
    fn acquire_stdin(&self) -> mimeogram::Result<String>;
    fn acquire_file(&self, path: &Path) -> mimeogram::Result<String>;
    fn acquire_clipboard(&self) -> mimeogram::Result<String>;
}

/// Process stdin, the filesystem, and the system clipboard
pub struct StandardContentAcquirer;

impl ContentAcquirer for StandardContentAcquirer {
    fn stdin_is_tty(&self) -> bool {
        io::stdin().is_terminal()
    }

    fn acquire_stdin(&self) -> mimeogram::Result<String> {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .map_err(|e| Error::acquire("stdin", e))?;
        Ok(text)
    }

    fn acquire_file(&self, path: &Path) -> mimeogram::Result<String> {
        std::fs::read_to_string(path).map_err(|e| Error::acquire(path.display().to_string(), e))
    }

    fn acquire_clipboard(&self) -> mimeogram::Result<String> {
        ClipboardProvider::detect().read()
    }
}

/// Read, parse, review, and write the parts of a mimeogram
pub fn cmd_apply(args: &ApplyArgs, config: &Configuration) -> Result<()> {
    let text = read_mimeogram(&StandardContentAcquirer, args, config)?;
    let parts = parse_mimeogram(&text)?;
    debug!("Parsed {} part(s)", parts.len());

    if let Some(message) = parts.iter().find(|p| p.is_message()) {
        eprintln!("Message:\n{}\n", message.content);
    }

    let protector = ProtectionCache::from_config(&config.protection)?;
    let base = match &args.base {
        Some(base) => absolutize_from_cwd(base),
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };
    let mode = args
        .mode
        .map(ReviewMode::from)
        .unwrap_or(config.apply.review_mode);
    let mut options = UpdateOptions::new(mode, base);
    options.disable_protections = args.force || config.update_parts.disable_protections;
    info!("Applying mimeogram in {} mode", mode);

    let mut interactor = TerminalInteractor::new();
    let summary = PartsUpdater::new(options, &protector).update(&parts, &mut interactor)?;
    eprintln!(
        "Applied {} part(s); ignored {}; skipped {} protected",
        summary.applied, summary.ignored, summary.protected
    );
    Ok(())
}

/// Pick the mimeogram source: clipboard, file, or stdin
///
/// Without a file and with a terminal on stdin, the clipboard is used.
fn read_mimeogram(
    acquirer: &dyn ContentAcquirer,
    args: &ApplyArgs,
    config: &Configuration,
) -> Result<String> {
    let file = args.file.as_deref().filter(|f| *f != Path::new("-"));
    let text = match file {
        Some(path) => acquirer.acquire_file(path)?,
        None if args.from_clipboard || config.apply.from_clipboard => {
            acquirer.acquire_clipboard()?
        }
        None if acquirer.stdin_is_tty() => acquirer
            .acquire_clipboard()
            .context("No mimeogram piped to stdin and the clipboard is unavailable")?,
        None => acquirer.acquire_stdin()?,
    };
    Ok(text)
}
