//! Frame model
//!
//! A frame is the recursive unit of executable context: an opaque
//! instruction stream plus five positional slots. Element order inside a
//! slot is the addressing scheme: access is always by 0-based position,
//! never by name.
//!
//! Frames form a tree rooted at the document's top-level frame: nested
//! frames live in their parent's `consts` slot and are addressed through
//! [`FrameId`] handles into an index-stable [`FrameArena`]. The arena owns
//! every frame of a loaded tree for the process's lifetime; ids stay valid
//! from allocation until the whole arena is dropped.

use std::fmt;

use crate::value::Value;

/// Handle to a frame inside a [`FrameArena`].
///
/// Ids are minted by [`FrameArena::alloc`] and are only meaningful for the
/// arena that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameId(u32);

impl FrameId {
    /// Raw arena index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Slot selector, as carried on the wire (one byte).
///
/// `Globals` is process-wide and not owned by any frame; the other four
/// are frame-owned. Byte values are fixed by the wire protocol.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Globals = 0,
    Names = 1,
    Locals = 2,
    Freevars = 3,
    Cellvars = 4,
}

impl Slot {
    /// Number of addressable slots.
    pub const COUNT: usize = 5;

    /// Slot name for error messages and traces.
    pub fn name(self) -> &'static str {
        match self {
            Slot::Globals => "globals",
            Slot::Names => "names",
            Slot::Locals => "locals",
            Slot::Freevars => "freevars",
            Slot::Cellvars => "cellvars",
        }
    }
}

impl TryFrom<u8> for Slot {
    type Error = ();

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            0 => Ok(Slot::Globals),
            1 => Ok(Slot::Names),
            2 => Ok(Slot::Locals),
            3 => Ok(Slot::Freevars),
            4 => Ok(Slot::Cellvars),
            _ => Err(()),
        }
    }
}

/// A single frame: instruction bytes plus five positional value slots.
///
/// The instruction stream is externally produced and opaque here; it is
/// carried through the full codec profile but never interpreted. `consts`
/// is the only slot allowed to hold [`Value::Frame`] handles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    /// Opaque instruction bytes
    pub instructions: Vec<u8>,
    /// Names slot
    pub names: Vec<Value>,
    /// Local-variables slot
    pub locals: Vec<Value>,
    /// Free-variables slot
    pub freevars: Vec<Value>,
    /// Cell-variables slot
    pub cellvars: Vec<Value>,
    /// Constants table; nested frames live here
    pub consts: Vec<Value>,
}

impl Frame {
    /// Create an empty frame carrying the given instruction bytes.
    pub fn new(instructions: Vec<u8>) -> Self {
        Self {
            instructions,
            ..Self::default()
        }
    }

    /// Borrow a frame-owned slot. Returns `None` for [`Slot::Globals`],
    /// which is not frame-owned.
    pub fn slot(&self, slot: Slot) -> Option<&[Value]> {
        match slot {
            Slot::Globals => None,
            Slot::Names => Some(&self.names),
            Slot::Locals => Some(&self.locals),
            Slot::Freevars => Some(&self.freevars),
            Slot::Cellvars => Some(&self.cellvars),
        }
    }

    /// Render the frame the way the debug trace shows it: one line per
    /// slot, plus the shared globals passed in by the caller.
    pub fn render(&self, globals: &[Value]) -> String {
        fn line(label: &str, values: &[Value]) -> String {
            let items: Vec<String> = values.iter().map(|v| v.to_string()).collect();
            format!("{}: [{}]", label, items.join(", "))
        }

        let mut out = String::new();
        out.push_str(&format!("instructions: {} bytes\n", self.instructions.len()));
        out.push_str(&line("globals", globals));
        out.push('\n');
        out.push_str(&line("names", &self.names));
        out.push('\n');
        out.push_str(&line("locals", &self.locals));
        out.push('\n');
        out.push_str(&line("freevars", &self.freevars));
        out.push('\n');
        out.push_str(&line("cellvars", &self.cellvars));
        out.push('\n');
        out.push_str(&line("consts", &self.consts));
        out
    }
}

/// Index-stable arena owning every frame of a loaded tree.
///
/// Frames are allocated leaves-first by the loader and never deallocated
/// individually; the whole tree lives and dies together, so a [`FrameId`]
/// stays valid for the arena's entire lifetime.
#[derive(Debug, Default)]
pub struct FrameArena {
    frames: Vec<Frame>,
}

impl FrameArena {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move a frame into the arena and return its handle.
    pub fn alloc(&mut self, frame: Frame) -> FrameId {
        let id = FrameId(self.frames.len() as u32);
        self.frames.push(frame);
        id
    }

    /// Borrow a frame. Ids are only minted by [`alloc`](Self::alloc), so a
    /// stale or foreign id is a caller bug.
    pub fn get(&self, id: FrameId) -> &Frame {
        &self.frames[id.index()]
    }

    /// Mutably borrow a frame.
    pub fn get_mut(&mut self, id: FrameId) -> &mut Frame {
        &mut self.frames[id.index()]
    }

    /// Number of frames allocated.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the arena holds no frames.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}
