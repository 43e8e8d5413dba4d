// src/cli.rs
//! CLI definitions for mimeogram
//!
//! The command implementations are in the `commands` module.

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use mimeogram::ReviewMode;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mimeogram")]
#[command(version)]
#[command(about = "Exchange collections of files with chat interfaces", long_about = None)]
pub struct Cli {
    /// Configuration file (default: <config dir>/mimeogram/general.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub configfile: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Bundle files and URLs into a mimeogram
    Create(CreateArgs),

    /// Apply a mimeogram to the filesystem
    Apply(ApplyArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CreateArgs {
    /// Files, directories, or HTTP(S) URLs
    #[arg(value_name = "SOURCES")]
    pub sources: Vec<String>,

    /// Message to include as the first part
    #[arg(short, long)]
    pub message: Option<String>,

    /// Compose the message in the editor
    #[arg(long)]
    pub edit_message: bool,

    /// Descend into subdirectories
    #[arg(short, long)]
    pub recurse: bool,

    /// Include files excluded by gitignore rules
    #[arg(long)]
    pub no_ignores: bool,

    /// Fail on the first source that cannot be acquired
    #[arg(long)]
    pub strict: bool,

    /// Derive the boundary from the content for reproducible output
    #[arg(long)]
    pub deterministic_boundary: bool,

    /// Copy the mimeogram to the clipboard instead of printing it
    #[arg(long)]
    pub to_clipboard: bool,

    /// Report an estimated token count on stderr
    #[arg(long)]
    pub count_tokens: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ApplyArgs {
    /// Mimeogram file, or `-` for stdin (default)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Read the mimeogram from the clipboard
    #[arg(long, conflicts_with = "file")]
    pub from_clipboard: bool,

    /// Review mode (default from configuration: partitive)
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Directory that relative locations are resolved against
    #[arg(long, value_name = "DIR")]
    pub base: Option<PathBuf>,

    /// Write protected destinations without asking
    #[arg(long)]
    pub force: bool,
}

/// Review mode as spelled on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Silent,
    Partitive,
}

impl From<ModeArg> for ReviewMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Silent => ReviewMode::Silent,
            ModeArg::Partitive => ReviewMode::Partitive,
        }
    }
}
