//! Encode command - produce full-profile wire bytes for a document

use anyhow::{Context, Result};
use colored::Colorize;
use framelink_runtime::{encode_full, hex_dump, load_from_path};
use std::fs;

/// Encode the document's root frame with the full codec profile. The core
/// codec is pure; this command is the caller that decides persistence.
pub fn encode(frame_path: &str, output: Option<&str>) -> Result<()> {
    let (arena, root) = load_from_path(frame_path)
        .with_context(|| format!("Failed to load frame document: {}", frame_path))?;

    let globals = arena.get(root).names.clone();
    let bytes = encode_full(arena.get(root), &globals);

    match output {
        Some(path) => {
            fs::write(path, &bytes)
                .with_context(|| format!("Failed to write payload: {}", path))?;
            println!("wrote {} bytes to {}", bytes.len(), path);
        }
        None => {
            println!("{}", "Payload generated:".cyan());
            println!("{}", hex_dump(&bytes));
        }
    }
    Ok(())
}
