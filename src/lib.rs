// src/lib.rs

//! Mimeogram: text bundles of files for exchange with chat interfaces
//!
//! A mimeogram packs files (and an optional message) into one plain-text
//! payload delimited MIME-style, so a working set can be pasted into a
//! model's chat window and the returned bundle applied back to disk.
//!
//! # Architecture
//!
//! - Acquisition: paths and URLs become [`Part`]s after text sniffing
//! - Formatting and parsing: the wire format with random or content-derived
//!   boundaries
//! - Updates: protection checks, optional per-part review, atomic writes,
//!   and ordered rollback of already written files on failure

pub mod acquirers;
pub mod clipboard;
pub mod config;
pub mod diff;
mod error;
pub mod formatters;
pub mod fsprotect;
pub mod interactions;
pub mod linesep;
pub mod parsers;
pub mod parts;
pub mod paths;
pub mod programs;
pub mod sniff;
pub mod tokenizers;
pub mod updaters;

pub use acquirers::{AcquireOptions, acquire_parts};
pub use config::Configuration;
pub use error::{BoxError, Error, Result};
pub use formatters::format_mimeogram;
pub use fsprotect::{ProtectionCache, Protector, Reason, Status};
pub use interactions::{Interactor, Resolution, TerminalInteractor, review_part};
pub use linesep::LineSeparator;
pub use parsers::parse_mimeogram;
pub use parts::Part;
pub use tokenizers::Tokenizer;
pub use updaters::{PartsUpdater, ReviewMode, Target, UpdateOptions, UpdateSummary};
