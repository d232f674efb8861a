//! Frame-tree loader
//!
//! Builds the root frame (and, recursively, every nested frame) from the
//! structured JSON document the peer toolchain produces: a `co_code` hex
//! string plus arrays for the four named slots and the constants table,
//! where constants may be strings, numbers, booleans, nulls, or nested
//! frame objects.
//!
//! Only the *arity* of the four named slots is kept: their elements are
//! initialized to null placeholders and later populated by bindings and
//! slot-only decodes. Constants keep their declared values; nested objects
//! allocate child frames into the arena.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::frame::{Frame, FrameArena, FrameId};
use crate::value::Value;

/// Frame document as the peer serializes it.
#[derive(Debug, Deserialize)]
pub struct FrameDoc {
    /// Instruction bytes as a hex-pair string
    pub co_code: String,
    #[serde(default)]
    pub co_names: Vec<serde_json::Value>,
    #[serde(default)]
    pub co_varnames: Vec<serde_json::Value>,
    #[serde(default)]
    pub co_freevars: Vec<serde_json::Value>,
    #[serde(default)]
    pub co_cellvars: Vec<serde_json::Value>,
    #[serde(default)]
    pub co_consts: Vec<serde_json::Value>,
}

/// Load-time failure. Distinct from wire-protocol errors: a bad document
/// never reaches the dispatcher.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read frame document: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse frame document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("instruction stream is not a hex string: {0}")]
    BadHex(String),

    #[error("integer constant {0} does not fit in 32 bits")]
    IntRange(i64),
}

/// Parse a document from a JSON string and build its frame tree.
/// Returns the arena and the root frame's handle.
pub fn load_from_str(json: &str) -> Result<(FrameArena, FrameId), LoadError> {
    let doc: FrameDoc = serde_json::from_str(json)?;
    let mut arena = FrameArena::new();
    let root = load_frame_tree(doc, &mut arena)?;
    Ok((arena, root))
}

/// Read a document from disk and build its frame tree.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<(FrameArena, FrameId), LoadError> {
    let json = fs::read_to_string(path)?;
    load_from_str(&json)
}

/// Allocate the document's frame tree into `arena`, children first, and
/// return the handle of the document's own frame.
pub fn load_frame_tree(doc: FrameDoc, arena: &mut FrameArena) -> Result<FrameId, LoadError> {
    let mut frame = Frame::new(decode_hex(&doc.co_code)?);

    // arity only; the declared elements are placeholders until the peer
    // ships real values
    frame.names = vec![Value::Null; doc.co_names.len()];
    frame.locals = vec![Value::Null; doc.co_varnames.len()];
    frame.freevars = vec![Value::Null; doc.co_freevars.len()];
    frame.cellvars = vec![Value::Null; doc.co_cellvars.len()];

    for item in doc.co_consts {
        match item {
            serde_json::Value::String(s) => frame.consts.push(Value::Str(s)),
            serde_json::Value::Bool(b) => frame.consts.push(Value::Bool(b)),
            serde_json::Value::Null => frame.consts.push(Value::Null),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    let i = i32::try_from(i).map_err(|_| LoadError::IntRange(i))?;
                    frame.consts.push(Value::Int(i));
                } else {
                    frame.consts.push(Value::Float(n.as_f64().unwrap_or(0.0) as f32));
                }
            }
            item @ serde_json::Value::Object(_) => {
                let child_doc: FrameDoc = serde_json::from_value(item)?;
                let child = load_frame_tree(child_doc, arena)?;
                frame.consts.push(Value::Frame(child));
            }
            // arrays have no value mapping; the peer never emits them
            serde_json::Value::Array(_) => {}
        }
    }

    Ok(arena.alloc(frame))
}

/// Expand a hex-pair string into raw bytes.
fn decode_hex(hex: &str) -> Result<Vec<u8>, LoadError> {
    let hex = hex.trim();
    if hex.len() % 2 != 0 {
        return Err(LoadError::BadHex(format!(
            "odd number of hex digits ({})",
            hex.len()
        )));
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| LoadError::BadHex(format!("invalid hex pair {:?}", &hex[i..i + 2])))
        })
        .collect()
}
