// src/commands/create.rs
//! Bundle sources into a mimeogram

use crate::cli::CreateArgs;
use anyhow::{Context, Result};
use mimeogram::clipboard::ClipboardProvider;
use mimeogram::programs;
use mimeogram::{AcquireOptions, Configuration, Tokenizer, acquire_parts, format_mimeogram};
use tracing::info;

/// Acquire parts, format them, and deliver the mimeogram
pub fn cmd_create(args: &CreateArgs, config: &Configuration) -> Result<()> {
    let options = acquire_options(args, config);
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;
    let parts = runtime.block_on(acquire_parts(&options, &args.sources))?;
    info!("Acquired {} part(s)", parts.len());

    let message = if args.edit_message || config.create.edit_message {
        let editor = programs::discover_editor()?;
        let draft = args.message.as_deref().unwrap_or_default();
        Some(editor.edit(draft, ".md").context("Failed to compose message")?)
    } else {
        args.message.clone()
    };
    let message = message.filter(|m| !m.trim().is_empty());

    let deterministic = args.deterministic_boundary || config.create.deterministic_boundary;
    let text = format_mimeogram(&parts, message.as_deref(), deterministic)?;

    if args.count_tokens || config.create.count_tokens {
        let tokenizer = Tokenizer::from_section(&config.tokenizers)?;
        eprintln!("Estimated tokens: {}", tokenizer.count(&text));
    }

    if args.to_clipboard || config.create.to_clipboard {
        ClipboardProvider::detect()
            .write(&text)
            .context("Failed to copy mimeogram to clipboard")?;
        eprintln!("Copied mimeogram with {} part(s) to clipboard", parts.len());
    } else {
        println!("{text}");
    }
    Ok(())
}

/// Configuration merged with flags; flags can only switch options on
fn acquire_options(args: &CreateArgs, config: &Configuration) -> AcquireOptions {
    let mut options = AcquireOptions::from(&config.acquire_parts);
    options.recurse_directories |= args.recurse;
    options.strict |= args.strict;
    options.no_ignores |= args.no_ignores;
    options
}
