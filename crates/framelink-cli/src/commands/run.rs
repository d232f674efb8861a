//! Run command - process an instruction stream

use anyhow::{Context, Result};
use colored::Colorize;
use framelink_runtime::{load_from_path, Dispatcher};
use std::fs;
use std::io;

/// Load the frame document, then drive the dispatcher through the whole
/// instruction stream. With `debug`, every record and the resulting frame
/// state are traced to stdout.
pub fn run(stream_path: &str, frame_path: &str, debug: bool) -> Result<()> {
    let (arena, root) = load_from_path(frame_path)
        .with_context(|| format!("Failed to load frame document: {}", frame_path))?;
    let stream = fs::read(stream_path)
        .with_context(|| format!("Failed to read instruction stream: {}", stream_path))?;

    let mut dispatcher = Dispatcher::new(arena, root);
    if debug {
        println!("{}", "Started in debugger mode...".yellow());
        dispatcher = dispatcher.with_trace(Box::new(io::stdout()));
    }

    let processed = dispatcher
        .run(&stream)
        .with_context(|| format!("Instruction stream aborted: {}", stream_path))?;

    println!(
        "processed {} records, ended at frame {} (depth {})",
        processed,
        dispatcher.current_frame_id(),
        dispatcher.depth()
    );
    Ok(())
}
