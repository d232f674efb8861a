//! Binary wire codec
//!
//! Serializes a frame's state into a compact, delimiter-framed byte stream
//! and back. Sections are separated by `RS` (`0x1D`); elements inside a
//! section are separated by `US` (`0x1F`); each element is a tag byte plus
//! a type-specific payload (see `codec`).
//!
//! Two profiles share the element rules:
//! - **full**: instruction bytes + all six value sections, used for
//!   persisted frame snapshots ([`encode_full`]);
//! - **slot-only**: the five named slots, used for live call payloads
//!   ([`encode_slots_only`] / [`decode_slots_only`]).
//!
//! Every counted section starts with a 4-byte little-endian element count,
//! which the decoder validates against the elements actually found. The
//! consts section of the full profile is uncounted and `US`-joined.
//!
//! Payloads are not escaped. A string containing `RS`/`US`, or an integer
//! whose little-endian bytes collide with a delimiter, corrupts framing;
//! callers control the values they put on the wire.

mod codec;
mod tag;

use crate::frame::Frame;
use crate::value::{ProtocolError, Value};

use codec::{decode_value, encode_value};

/// Section separator.
pub const RS: u8 = 0x1D;
/// Element separator.
pub const US: u8 = 0x1F;

/// Append a counted section: 4-byte LE count, then `US` + element for
/// every value.
fn encode_section(values: &[Value], out: &mut Vec<u8>) {
    out.extend_from_slice(&(values.len() as u32).to_le_bytes());
    for value in values {
        out.push(US);
        encode_value(value, out);
    }
}

/// Append the uncounted consts section: `US`-joined elements, no leading
/// separator.
fn encode_consts(values: &[Value], out: &mut Vec<u8>) {
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            out.push(US);
        }
        encode_value(value, out);
    }
}

/// Decode one counted section into values.
fn decode_section(segment: &[u8]) -> Result<Vec<Value>, ProtocolError> {
    let mut chunks = segment.split(|&b| b == US);
    // split always yields at least one chunk
    let head = chunks.next().unwrap_or(&[]);
    if head.len() != 4 {
        return Err(ProtocolError::MalformedSection {
            detail: format!("count prefix is {} bytes, expected 4", head.len()),
        });
    }
    let declared = u32::from_le_bytes(head.try_into().unwrap()) as usize;

    let mut values = Vec::new();
    for chunk in chunks {
        if chunk.is_empty() {
            continue;
        }
        values.push(decode_value(chunk)?);
    }
    if values.len() != declared {
        return Err(ProtocolError::MalformedSection {
            detail: format!("declared {} elements, found {}", declared, values.len()),
        });
    }
    Ok(values)
}

/// Encode a complete frame snapshot: instruction bytes, the five counted
/// slot sections, and the uncounted consts section, each terminated by
/// `RS`.
///
/// Pure: persistence of the result is the caller's business.
pub fn encode_full(frame: &Frame, globals: &[Value]) -> Vec<u8> {
    let mut out = Vec::new();
    out.push(RS);
    out.extend_from_slice(&frame.instructions);
    out.push(RS);
    for section in [
        globals,
        &frame.names[..],
        &frame.locals[..],
        &frame.freevars[..],
        &frame.cellvars[..],
    ] {
        encode_section(section, &mut out);
        out.push(RS);
    }
    encode_consts(&frame.consts, &mut out);
    out.push(RS);
    out
}

/// Encode only the five named slots, the live call-payload profile.
pub fn encode_slots_only(frame: &Frame, globals: &[Value]) -> Vec<u8> {
    let mut out = Vec::new();
    out.push(RS);
    for section in [
        globals,
        &frame.names[..],
        &frame.locals[..],
        &frame.freevars[..],
        &frame.cellvars[..],
    ] {
        encode_section(section, &mut out);
        out.push(RS);
    }
    out
}

/// Decode a slot-only payload in place: segment 0 replaces the globals,
/// segments 1-4 the frame's names/locals/freevars/cellvars. Empty or
/// missing segments leave the corresponding slot untouched; segments
/// beyond the fifth are ignored. `instructions` and `consts` are never
/// modified.
pub fn decode_slots_only(
    bytes: &[u8],
    frame: &mut Frame,
    globals: &mut Vec<Value>,
) -> Result<(), ProtocolError> {
    // Payloads open with a section separator; drop it so segment numbering
    // starts at the globals section.
    let bytes = match bytes.first() {
        Some(&RS) => &bytes[1..],
        _ => bytes,
    };

    for (i, segment) in bytes.split(|&b| b == RS).enumerate() {
        if i > 4 {
            break;
        }
        if segment.is_empty() {
            continue;
        }
        let values = decode_section(segment)?;
        match i {
            0 => *globals = values,
            1 => frame.names = values,
            2 => frame.locals = values,
            3 => frame.freevars = values,
            _ => frame.cellvars = values,
        }
    }
    Ok(())
}

/// Space-separated lowercase hex rendering of a payload, for traces.
pub fn hex_dump(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
