//! Opcode dispatcher
//!
//! Consumes a record-delimited control stream and drives frame
//! transitions: slot-only decodes into the active frame, pushes and pops
//! of the navigation stack, and slot bindings. The active frame is always
//! the stack top; the bottom element is the root frame, pushed once at
//! construction.
//!
//! Processing is single-threaded and synchronous: one record runs to
//! completion before the next is read, and the first fatal error aborts
//! the whole stream.

mod navigator;
mod opcode;

pub use navigator::Navigator;
pub use opcode::Opcode;

use std::io::Write;

use crate::frame::{Frame, FrameArena, FrameId, Slot};
use crate::record::split_records;
use crate::value::{ProtocolError, Value};
use crate::wire;

/// Drives a frame tree through a control instruction stream.
///
/// Owns the arena, the process-wide globals, and the navigation stack.
/// Globals are seeded from the root frame's names at construction and
/// afterwards mutated in place by slot-only decodes like any other slot.
pub struct Dispatcher {
    arena: FrameArena,
    globals: Vec<Value>,
    navigator: Navigator,
    current: FrameId,
    trace: Option<Box<dyn Write>>,
}

impl Dispatcher {
    /// Create a dispatcher rooted at `root`, which is pushed as the
    /// navigation floor and becomes the active frame.
    pub fn new(arena: FrameArena, root: FrameId) -> Self {
        let globals = arena.get(root).names.clone();
        let mut navigator = Navigator::new();
        navigator.push(root);
        Self {
            arena,
            globals,
            navigator,
            current: root,
            trace: None,
        }
    }

    /// Route a human-readable trace of every record to `writer`.
    pub fn with_trace(mut self, writer: Box<dyn Write>) -> Self {
        self.trace = Some(writer);
        self
    }

    /// Active frame handle (navigation stack top).
    pub fn current_frame_id(&self) -> FrameId {
        self.current
    }

    /// Active frame.
    pub fn current_frame(&self) -> &Frame {
        self.arena.get(self.current)
    }

    /// Process-wide globals.
    pub fn globals(&self) -> &[Value] {
        &self.globals
    }

    /// Frame arena backing this dispatcher.
    pub fn arena(&self) -> &FrameArena {
        &self.arena
    }

    /// Current call nesting depth.
    pub fn depth(&self) -> usize {
        self.navigator.depth()
    }

    /// Consume an entire instruction stream. Returns the number of records
    /// processed; the first fatal error aborts the run and no further
    /// records are read.
    pub fn run(&mut self, stream: &[u8]) -> Result<usize, ProtocolError> {
        let mut processed = 0;
        for record in split_records(stream) {
            self.execute_record(record)?;
            processed += 1;
        }
        Ok(processed)
    }

    fn execute_record(&mut self, record: &[u8]) -> Result<(), ProtocolError> {
        let opcode = Opcode::try_from(record[0])
            .map_err(|_| ProtocolError::UnknownInstruction { opcode: record[0] })?;

        match opcode {
            Opcode::Init => {
                self.trace_line(format!("-> {} (stream start)", opcode.mnemonic()));
            }
            Opcode::Call => {
                if record.len() < 3 {
                    return Err(ProtocolError::MalformedSection {
                        detail: format!("call record is {} bytes, expected at least 3", record.len()),
                    });
                }
                let slot = self.slot_from_byte(record[1])?;
                let index = record[2] as usize;
                // byte 3 is reserved; the payload starts at byte 4
                let payload = record.get(4..).unwrap_or(&[]);

                self.trace_line(format!(
                    "-> {} via {}[{}], payload {} bytes",
                    opcode.mnemonic(),
                    slot.name(),
                    index,
                    payload.len()
                ));

                wire::decode_slots_only(
                    payload,
                    self.arena.get_mut(self.current),
                    &mut self.globals,
                )?;
                let target = self.resolve_frame_ref(slot, index)?;
                self.navigator.push(target);
                self.current = target;
                self.trace_line(format!(
                    "entered frame {} (depth {})",
                    target,
                    self.navigator.depth()
                ));
                self.trace_frame();
            }
            Opcode::Return => {
                self.trace_line(format!("-> {}", opcode.mnemonic()));
                self.navigator.pop()?;
                self.current = self.navigator.peek()?;
                self.trace_line(format!(
                    "back in frame {} (depth {})",
                    self.current,
                    self.navigator.depth()
                ));
                self.trace_frame();
            }
            Opcode::MakeBinding => {
                if record.len() < 4 {
                    return Err(ProtocolError::MalformedSection {
                        detail: format!(
                            "binding record is {} bytes, expected 4",
                            record.len()
                        ),
                    });
                }
                let consts_index = record[1];
                let slot = self.slot_from_byte(record[2])?;
                let index = record[3] as usize;

                self.trace_line(format!(
                    "-> {} consts[{}] into {}[{}]",
                    opcode.mnemonic(),
                    consts_index,
                    slot.name(),
                    index
                ));
                self.store_binding(slot, index, Value::Int(consts_index as i32))?;
            }
        }
        Ok(())
    }

    /// Resolve a call target through the two-level indirection: the slot
    /// element at `index` must be a non-negative integer, used as a
    /// position into the active frame's `consts`, which must hold a
    /// nested-frame handle there.
    pub fn resolve_frame_ref(&self, slot: Slot, index: usize) -> Result<FrameId, ProtocolError> {
        let frame = self.arena.get(self.current);
        let values: &[Value] = match slot {
            Slot::Globals => &self.globals,
            Slot::Names => &frame.names,
            Slot::Locals => &frame.locals,
            Slot::Freevars => &frame.freevars,
            Slot::Cellvars => &frame.cellvars,
        };
        let value = values.get(index).ok_or(ProtocolError::IndexOutOfRange {
            index,
            len: values.len(),
        })?;
        // negative integers cannot address consts
        let consts_index = match value {
            Value::Int(i) if *i >= 0 => *i as usize,
            other => {
                return Err(ProtocolError::NotAnIndex {
                    slot: slot.name(),
                    index,
                    found: other.kind(),
                })
            }
        };
        let target = frame
            .consts
            .get(consts_index)
            .ok_or(ProtocolError::IndexOutOfRange {
                index: consts_index,
                len: frame.consts.len(),
            })?;
        match target {
            Value::Frame(id) => Ok(*id),
            other => Err(ProtocolError::NotAFrame {
                index: consts_index,
                found: other.kind(),
            }),
        }
    }

    fn slot_from_byte(&self, byte: u8) -> Result<Slot, ProtocolError> {
        Slot::try_from(byte).map_err(|_| ProtocolError::IndexOutOfRange {
            index: byte as usize,
            len: Slot::COUNT,
        })
    }

    fn store_binding(
        &mut self,
        slot: Slot,
        index: usize,
        value: Value,
    ) -> Result<(), ProtocolError> {
        let values: &mut Vec<Value> = match slot {
            Slot::Globals => &mut self.globals,
            Slot::Names => &mut self.arena.get_mut(self.current).names,
            Slot::Locals => &mut self.arena.get_mut(self.current).locals,
            Slot::Freevars => &mut self.arena.get_mut(self.current).freevars,
            Slot::Cellvars => &mut self.arena.get_mut(self.current).cellvars,
        };
        let len = values.len();
        let element = values
            .get_mut(index)
            .ok_or(ProtocolError::IndexOutOfRange { index, len })?;
        *element = value;
        Ok(())
    }

    fn trace_line(&mut self, line: String) {
        if let Some(writer) = self.trace.as_mut() {
            let _ = writeln!(writer, "{}", line);
        }
    }

    fn trace_frame(&mut self) {
        if self.trace.is_some() {
            let rendered = self.arena.get(self.current).render(&self.globals);
            self.trace_line(rendered);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordWriter;

    /// Root frame with one child in consts and null-padded slots.
    fn two_frame_arena() -> (FrameArena, FrameId, FrameId) {
        let mut arena = FrameArena::new();
        let child = arena.alloc(Frame::new(vec![0x01]));

        let mut root = Frame::new(vec![0x02]);
        root.names = vec![Value::Null, Value::Null];
        root.locals = vec![Value::Null];
        root.consts = vec![Value::Str("c".to_string()), Value::Frame(child)];
        let root = arena.alloc(root);
        (arena, root, child)
    }

    #[test]
    fn test_globals_seeded_from_root_names() {
        let (mut arena, root, _) = two_frame_arena();
        arena.get_mut(root).names = vec![Value::Int(50)];
        let dispatcher = Dispatcher::new(arena, root);
        assert_eq!(dispatcher.globals(), &[Value::Int(50)]);
    }

    #[test]
    fn test_init_has_no_effect() {
        let (arena, root, _) = two_frame_arena();
        let mut dispatcher = Dispatcher::new(arena, root);
        let stream = RecordWriter::new().init().into_bytes();
        assert_eq!(dispatcher.run(&stream).unwrap(), 1);
        assert_eq!(dispatcher.depth(), 1);
        assert_eq!(dispatcher.current_frame_id(), root);
    }

    #[test]
    fn test_binding_then_call_enters_child() {
        let (arena, root, child) = two_frame_arena();
        let mut dispatcher = Dispatcher::new(arena, root);
        let stream = RecordWriter::new()
            .init()
            .make_binding(1, Slot::Names, 0)
            .call(Slot::Names, 0, &[])
            .into_bytes();

        assert_eq!(dispatcher.run(&stream).unwrap(), 3);
        assert_eq!(dispatcher.current_frame_id(), child);
        assert_eq!(dispatcher.depth(), 2);
    }

    #[test]
    fn test_return_restores_parent() {
        let (arena, root, _) = two_frame_arena();
        let mut dispatcher = Dispatcher::new(arena, root);
        let stream = RecordWriter::new()
            .make_binding(1, Slot::Names, 0)
            .call(Slot::Names, 0, &[])
            .ret()
            .into_bytes();

        dispatcher.run(&stream).unwrap();
        assert_eq!(dispatcher.current_frame_id(), root);
        assert_eq!(dispatcher.depth(), 1);
    }

    #[test]
    fn test_return_past_root_is_empty_stack() {
        let (arena, root, _) = two_frame_arena();
        let mut dispatcher = Dispatcher::new(arena, root);
        let stream = RecordWriter::new().ret().into_bytes();
        assert_eq!(dispatcher.run(&stream), Err(ProtocolError::EmptyStack));
    }

    #[test]
    fn test_unknown_opcode_stops_processing() {
        let (arena, root, _) = two_frame_arena();
        let mut dispatcher = Dispatcher::new(arena, root);
        let stream = RecordWriter::new()
            .raw(0xFF, &[])
            .make_binding(1, Slot::Names, 0)
            .into_bytes();

        assert_eq!(
            dispatcher.run(&stream),
            Err(ProtocolError::UnknownInstruction { opcode: 0xFF })
        );
        // the binding record after the bad opcode must not have run
        assert_eq!(dispatcher.current_frame().names[0], Value::Null);
    }

    #[test]
    fn test_binding_writes_consts_index() {
        let (arena, root, _) = two_frame_arena();
        let mut dispatcher = Dispatcher::new(arena, root);
        let stream = RecordWriter::new()
            .make_binding(1, Slot::Locals, 0)
            .into_bytes();

        dispatcher.run(&stream).unwrap();
        assert_eq!(dispatcher.current_frame().locals[0], Value::Int(1));
    }

    #[test]
    fn test_binding_into_globals() {
        let (arena, root, _) = two_frame_arena();
        let mut dispatcher = Dispatcher::new(arena, root);
        let stream = RecordWriter::new()
            .make_binding(0, Slot::Globals, 1)
            .into_bytes();

        dispatcher.run(&stream).unwrap();
        assert_eq!(dispatcher.globals()[1], Value::Int(0));
    }

    #[test]
    fn test_binding_past_slot_length_fails() {
        let (arena, root, _) = two_frame_arena();
        let mut dispatcher = Dispatcher::new(arena, root);
        let stream = RecordWriter::new()
            .make_binding(0, Slot::Locals, 9)
            .into_bytes();

        assert_eq!(
            dispatcher.run(&stream),
            Err(ProtocolError::IndexOutOfRange { index: 9, len: 1 })
        );
    }

    #[test]
    fn test_resolve_requires_integer_element() {
        let (mut arena, root, _) = two_frame_arena();
        arena.get_mut(root).names[0] = Value::Str("nope".to_string());
        let dispatcher = Dispatcher::new(arena, root);
        let err = dispatcher.resolve_frame_ref(Slot::Names, 0).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::NotAnIndex {
                slot: "names",
                index: 0,
                found: "string"
            }
        );
    }

    #[test]
    fn test_resolve_requires_frame_constant() {
        let (mut arena, root, _) = two_frame_arena();
        // names[0] points at consts[0], which holds a string
        arena.get_mut(root).names[0] = Value::Int(0);
        let dispatcher = Dispatcher::new(arena, root);
        let err = dispatcher.resolve_frame_ref(Slot::Names, 0).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::NotAFrame {
                index: 0,
                found: "string"
            }
        );
    }

    #[test]
    fn test_resolve_negative_index_rejected() {
        let (mut arena, root, _) = two_frame_arena();
        arena.get_mut(root).names[0] = Value::Int(-1);
        let dispatcher = Dispatcher::new(arena, root);
        assert!(matches!(
            dispatcher.resolve_frame_ref(Slot::Names, 0),
            Err(ProtocolError::NotAnIndex { .. })
        ));
    }

    #[test]
    fn test_call_payload_updates_slots_before_resolving() {
        let (arena, root, child) = two_frame_arena();
        let mut dispatcher = Dispatcher::new(arena, root);

        // payload rewrites names so that names[1] = Int(1) -> consts[1] = child
        let mut source = Frame::default();
        source.names = vec![Value::Null, Value::Int(1)];
        let payload = wire::encode_slots_only(&source, &[Value::Int(7)]);

        let stream = RecordWriter::new()
            .call(Slot::Names, 1, &payload)
            .into_bytes();
        dispatcher.run(&stream).unwrap();
        assert_eq!(dispatcher.current_frame_id(), child);
        assert_eq!(dispatcher.globals(), &[Value::Int(7)]);
    }

    #[test]
    fn test_truncated_call_record() {
        let (arena, root, _) = two_frame_arena();
        let mut dispatcher = Dispatcher::new(arena, root);
        let stream = RecordWriter::new().raw(0x83, &[0x01]).into_bytes();
        assert!(matches!(
            dispatcher.run(&stream),
            Err(ProtocolError::MalformedSection { .. })
        ));
    }

    #[test]
    fn test_invalid_slot_byte() {
        let (arena, root, _) = two_frame_arena();
        let mut dispatcher = Dispatcher::new(arena, root);
        let stream = RecordWriter::new().raw(0x84, &[0, 7, 0]).into_bytes();
        assert_eq!(
            dispatcher.run(&stream),
            Err(ProtocolError::IndexOutOfRange { index: 7, len: 5 })
        );
    }
}
