//! Element-level encoding and decoding
//!
//! One element is a tag byte followed by a type-specific payload:
//! - `Int`: 4 raw little-endian bytes
//! - `Float`: ASCII decimal text
//! - `Str`: raw string bytes, no length prefix
//! - `Bool`: one ASCII `'1'` or `'0'`
//! - `Null` / `Frame`: a single `0x00` placeholder byte
//!
//! Nested frames are never serialized recursively: a `Frame` value encodes
//! as the placeholder and decodes back as `Null`. The tree itself only
//! travels as a structured document, never on this wire.

use crate::value::{ProtocolError, Value};

use super::tag::{ValueTag, TAG_MASK};

/// Append one encoded element (tag byte + payload) to `bytes`.
pub(super) fn encode_value(value: &Value, bytes: &mut Vec<u8>) {
    bytes.push(ValueTag::of(value) as u8);
    match value {
        Value::Null | Value::Frame(_) => {
            bytes.push(0x00);
        }
        Value::Int(i) => {
            bytes.extend_from_slice(&i.to_le_bytes());
        }
        Value::Float(x) => {
            bytes.extend_from_slice(x.to_string().as_bytes());
        }
        Value::Str(s) => {
            bytes.extend_from_slice(s.as_bytes());
        }
        Value::Bool(b) => {
            bytes.push(if *b { b'1' } else { b'0' });
        }
    }
}

/// Decode one element. `element` is everything between two unit
/// separators: byte 0 is the tag, the rest is the payload.
pub(super) fn decode_value(element: &[u8]) -> Result<Value, ProtocolError> {
    if element.is_empty() {
        return Err(ProtocolError::MalformedSection {
            detail: "empty element".to_string(),
        });
    }
    let raw = element[0];
    let tag = ValueTag::try_from(raw & TAG_MASK)
        .map_err(|_| ProtocolError::UnknownValueTag { tag: raw })?;
    let payload = &element[1..];

    match tag {
        ValueTag::Null => Ok(Value::Null),
        // Placeholder only; the nested tree is not on the wire.
        ValueTag::Frame => Ok(Value::Null),
        ValueTag::Int => {
            let bytes: [u8; 4] =
                payload
                    .try_into()
                    .map_err(|_| ProtocolError::MalformedSection {
                        detail: format!(
                            "integer payload is {} bytes, expected 4",
                            payload.len()
                        ),
                    })?;
            Ok(Value::Int(i32::from_le_bytes(bytes)))
        }
        ValueTag::Float => {
            let text =
                std::str::from_utf8(payload).map_err(|_| ProtocolError::MalformedSection {
                    detail: "float payload is not ASCII text".to_string(),
                })?;
            let parsed = text.parse().map_err(|_| ProtocolError::MalformedSection {
                detail: format!("float payload {:?} is not a decimal number", text),
            })?;
            Ok(Value::Float(parsed))
        }
        ValueTag::Str => {
            let s = String::from_utf8(payload.to_vec()).map_err(|_| {
                ProtocolError::MalformedSection {
                    detail: "string payload is not valid UTF-8".to_string(),
                }
            })?;
            Ok(Value::Str(s))
        }
        ValueTag::Bool => match payload {
            b"1" => Ok(Value::Bool(true)),
            b"0" => Ok(Value::Bool(false)),
            _ => Err(ProtocolError::MalformedSection {
                detail: format!(
                    "boolean payload {:?} is not '1' or '0'",
                    String::from_utf8_lossy(payload)
                ),
            }),
        },
    }
}
