//! Framelink Runtime - frame exchange core
//!
//! This library models an executable frame (an instruction stream plus
//! five positional value slots and a constants table that may hold nested
//! frames) and exchanges frame state with an external peer over a
//! compact, delimiter-framed binary wire format:
//! - Frame model and index-stable frame arena
//! - Tagged-union binary codec (full and slot-only profiles)
//! - Navigation stack tracking the active call chain
//! - Opcode dispatcher driving frame transitions from a record stream
//! - JSON frame-tree loader for the peer's document format

/// Framelink runtime version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Public API modules
pub mod frame;
pub mod loader;
pub mod record;
pub mod value;
pub mod vm;
pub mod wire;

// Re-export commonly used types
pub use frame::{Frame, FrameArena, FrameId, Slot};
pub use loader::{load_from_path, load_from_str, FrameDoc, LoadError};
pub use record::{split_records, RecordWriter, RECORD_SEPARATOR};
pub use value::{ProtocolError, Value};
pub use vm::{Dispatcher, Navigator, Opcode};
pub use wire::{decode_slots_only, encode_full, encode_slots_only, hex_dump};
