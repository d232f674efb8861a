//! Runtime value representation
//!
//! Shared value representation for frame slots and the wire codec.
//! - Null, Int, Float, Bool: immediate values
//! - Str: owned UTF-8 string
//! - Frame: handle to a nested frame living in the [`FrameArena`](crate::FrameArena)
//!
//! A `Frame` value is only meaningful inside a frame's `consts` slot; the
//! wire codec refuses to serialize it anywhere (it emits a placeholder byte
//! instead, see the `wire` module).

use std::fmt;
use thiserror::Error;

use crate::frame::FrameId;

/// A single slot element.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent / placeholder value
    Null,
    /// 32-bit signed integer
    Int(i32),
    /// 32-bit float
    Float(f32),
    /// Boolean
    Bool(bool),
    /// UTF-8 string
    Str(String),
    /// Handle to a nested frame (valid only inside `consts`)
    Frame(FrameId),
}

impl Value {
    /// Human-readable kind name, used in error messages and traces.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Str(_) => "string",
            Value::Frame(_) => "frame",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Str(s) => write!(f, "{}", s),
            Value::Frame(id) => write!(f, "<frame {}>", id),
        }
    }
}

/// Fatal protocol error.
///
/// Every variant aborts processing of the current instruction stream; there
/// is no local recovery. Callers report the error and restart from a clean
/// state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Decoder saw a tag byte whose low 3 bits are not in the mapping table
    #[error("unknown value tag {tag:#04x}")]
    UnknownValueTag { tag: u8 },

    /// Section or element bytes inconsistent with the framing rules
    #[error("malformed section: {detail}")]
    MalformedSection { detail: String },

    /// Pop or peek on an empty navigation stack (including popping past the root)
    #[error("navigation stack is empty")]
    EmptyStack,

    /// Slot element used as a call target is not an integer index into `consts`
    #[error("element {index} of {slot} is not an index into consts (found {found})")]
    NotAnIndex {
        slot: &'static str,
        index: usize,
        found: &'static str,
    },

    /// `consts` element addressed by a call target does not hold a nested frame
    #[error("constant {index} does not hold a nested frame (found {found})")]
    NotAFrame {
        index: usize,
        found: &'static str,
    },

    /// Record opcode outside the dispatched set
    #[error("unknown instruction {opcode:#04x}")]
    UnknownInstruction { opcode: u8 },

    /// Slot or consts access beyond the sequence length
    #[error("index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },
}
