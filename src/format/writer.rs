//! Document encoding with pluggable symbol, instance and reference hooks.
//!
//! This module is the inverse of [`crate::format::reader`]: it serializes a
//! [`Value`] tree back into document bytes. Output is canonical, meaning the
//! shortest compressed integer forms are used and repeated symbols within a
//! document are emitted as memo back-references, so decoding and re-encoding
//! an untouched document reproduces it byte for byte.
//!
//! # Architecture
//!
//! The encoder appends to a caller-supplied buffer and keeps a per-document
//! memo mapping each written symbol to its definition index. The caller's
//! [`WriteHooks`] fire at symbol definition sites, before each instance, and
//! before each reference; the record layer uses these to veto writes that
//! would store an unknown type and to substitute placeholder instances for
//! types that no longer exist. Recognized reference shapes are re-serialized
//! from their fields as fresh payload documents, while opaque payloads are
//! copied through verbatim.
//!
//! # Key Components
//!
//! - [`WriteHooks`] - Interception points for symbols, instances, references
//! - [`write_document`] - Append one document to a buffer
//! - [`encode_value`] - Serialize a standalone value with identity hooks
//!
//! # Usage Examples
//!
//! ```rust
//! use reclass::format::{decode_value, encode_value, Value};
//!
//! let value = Value::Tuple(vec![Value::Int(7), Value::Str("abc".to_string())]);
//! let bytes = encode_value(&value)?;
//! assert_eq!(decode_value(&bytes)?, value);
//! # Ok::<(), reclass::Error>(())
//! ```

use std::collections::HashMap;

use crate::{
    format::{io::put_le, IdentityHooks, Instance, Tag, Value, MAX_DEPTH},
    record::PersistentRef,
    typesystem::TypeName,
    Error, Result,
};

/// Interception points applied while encoding a document.
///
/// The default implementations accept everything unchanged. The record layer
/// installs an implementation that refuses to write symbols no registry
/// knows and that substitutes placeholder instances for broken types.
pub trait WriteHooks {
    /// Called once per symbol definition site, before the symbol is written.
    ///
    /// Returning an error aborts the encode; memoized repeats of an already
    /// written symbol do not trigger the hook again.
    ///
    /// # Errors
    ///
    /// Implementations return an error to veto writing the symbol.
    fn save_symbol(&mut self, _name: &TypeName) -> Result<()> {
        Ok(())
    }

    /// Called for each instance before it is written.
    ///
    /// Returning `Some` writes the replacement instance instead of the
    /// original. The replacement is written as-is; the hook is not re-applied
    /// to it.
    fn save_instance(&mut self, _instance: &Instance) -> Option<Instance> {
        None
    }

    /// Called for each reference before its payload is written.
    ///
    /// # Errors
    ///
    /// Implementations return an error to veto writing the reference.
    fn save_reference(&mut self, _reference: &PersistentRef) -> Result<()> {
        Ok(())
    }
}

/// Append one document encoding `value` to the buffer.
///
/// The document's symbol memo starts empty, so the first occurrence of each
/// symbol is written in full and later occurrences become back-references.
///
/// # Arguments
///
/// * `buf` - Output buffer, appended to
/// * `value` - The value tree to serialize
/// * `hooks` - Symbol, instance and reference interception points
///
/// # Errors
///
/// Returns [`crate::Error::RecursionLimit`] for values nested past the depth
/// limit, [`crate::Error::Malformed`] for lengths beyond the compressed
/// integer range, and any error raised by the hooks.
pub fn write_document(buf: &mut Vec<u8>, value: &Value, hooks: &mut dyn WriteHooks) -> Result<()> {
    let mut encoder = Encoder {
        buf,
        hooks,
        memo: HashMap::new(),
    };
    encoder.write_value(value, 0)
}

/// Serialize a single standalone value with identity hooks.
///
/// # Errors
///
/// Returns the same errors as [`write_document`].
pub fn encode_value(value: &Value) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut hooks = IdentityHooks;
    write_document(&mut buf, value, &mut hooks)?;
    Ok(buf)
}

/// Encoding state for one document: the output buffer, the hooks, and the
/// memo of already written symbols.
struct Encoder<'b, 'h> {
    buf: &'b mut Vec<u8>,
    hooks: &'h mut dyn WriteHooks,
    memo: HashMap<TypeName, u32>,
}

impl Encoder<'_, '_> {
    fn write_value(&mut self, value: &Value, depth: usize) -> Result<()> {
        if depth >= MAX_DEPTH {
            return Err(Error::RecursionLimit(MAX_DEPTH));
        }

        match value {
            Value::None => {
                self.buf.push(Tag::None.byte());
                Ok(())
            }
            Value::Bool(true) => {
                self.buf.push(Tag::True.byte());
                Ok(())
            }
            Value::Bool(false) => {
                self.buf.push(Tag::False.byte());
                Ok(())
            }
            Value::Int(number) => {
                self.buf.push(Tag::Int.byte());
                put_le(self.buf, *number);
                Ok(())
            }
            Value::Float(number) => {
                self.buf.push(Tag::Float.byte());
                put_le(self.buf, *number);
                Ok(())
            }
            Value::Str(text) => {
                self.buf.push(Tag::Str.byte());
                write_compressed_str(self.buf, text)
            }
            Value::Bytes(bytes) => {
                self.buf.push(Tag::Bytes.byte());
                write_compressed_count(self.buf, bytes.len())?;
                self.buf.extend_from_slice(bytes);
                Ok(())
            }
            Value::Tuple(items) => {
                self.buf.push(Tag::Tuple.byte());
                self.write_sequence(items, depth)
            }
            Value::List(items) => {
                self.buf.push(Tag::List.byte());
                self.write_sequence(items, depth)
            }
            Value::Map(entries) => {
                self.buf.push(Tag::Map.byte());
                write_compressed_count(self.buf, entries.len())?;
                for (key, entry) in entries {
                    self.write_value(key, depth + 1)?;
                    self.write_value(entry, depth + 1)?;
                }
                Ok(())
            }
            Value::Symbol(name) => self.write_symbol(name),
            Value::Object(instance) => match self.hooks.save_instance(instance) {
                Some(replacement) => self.write_instance(&replacement, depth),
                None => self.write_instance(instance, depth),
            },
            Value::Reference(reference) => self.write_reference(reference, depth),
        }
    }

    fn write_sequence(&mut self, items: &[Value], depth: usize) -> Result<()> {
        write_compressed_count(self.buf, items.len())?;
        for item in items {
            self.write_value(item, depth + 1)?;
        }
        Ok(())
    }

    /// Write a symbol, as a full definition on first occurrence and as a
    /// memo back-reference afterwards.
    fn write_symbol(&mut self, name: &TypeName) -> Result<()> {
        if let Some(&index) = self.memo.get(name) {
            self.buf.push(Tag::SymbolBack.byte());
            return write_compressed_uint(self.buf, index);
        }

        self.hooks.save_symbol(name)?;

        self.buf.push(Tag::Symbol.byte());
        write_compressed_str(self.buf, name.namespace())?;
        write_compressed_str(self.buf, name.name())?;

        let Ok(index) = u32::try_from(self.memo.len()) else {
            return Err(malformed_error!("Symbol memo overflow"));
        };
        self.memo.insert(name.clone(), index);
        Ok(())
    }

    fn write_instance(&mut self, instance: &Instance, depth: usize) -> Result<()> {
        self.buf.push(Tag::Object.byte());
        self.write_symbol(&instance.class)?;
        write_compressed_count(self.buf, instance.args.len())?;
        for arg in &instance.args {
            self.write_value(arg, depth + 1)?;
        }
        self.write_value(&instance.state, depth + 1)
    }

    /// Write a reference, re-serializing recognized shapes and copying
    /// opaque payloads through untouched.
    fn write_reference(&mut self, reference: &PersistentRef, depth: usize) -> Result<()> {
        self.hooks.save_reference(reference)?;
        self.buf.push(Tag::Ref.byte());

        if let PersistentRef::Opaque(raw) = reference {
            write_compressed_count(self.buf, raw.len())?;
            self.buf.extend_from_slice(raw);
            return Ok(());
        }

        let Some(payload_value) = reference.payload_value() else {
            return Err(malformed_error!("Reference has no payload value"));
        };

        // The payload is its own document with its own memo; hooks stay
        // active so payload class identifiers face the same write checks.
        let mut payload = Vec::new();
        let mut encoder = Encoder {
            buf: &mut payload,
            hooks: &mut *self.hooks,
            memo: HashMap::new(),
        };
        encoder.write_value(&payload_value, depth + 1)?;

        write_compressed_count(self.buf, payload.len())?;
        self.buf.extend_from_slice(&payload);
        Ok(())
    }
}

/// Write a compressed unsigned integer in its shortest form.
fn write_compressed_uint(buf: &mut Vec<u8>, value: u32) -> Result<()> {
    match value {
        0x00..=0x7F => {
            let [_, _, _, low] = value.to_be_bytes();
            buf.push(low);
            Ok(())
        }
        0x80..=0x3FFF => {
            let [_, _, high, low] = value.to_be_bytes();
            buf.push(0x80 | high);
            buf.push(low);
            Ok(())
        }
        0x4000..=0x1FFF_FFFF => {
            let [first, second, third, fourth] = value.to_be_bytes();
            buf.push(0xC0 | first);
            buf.push(second);
            buf.push(third);
            buf.push(fourth);
            Ok(())
        }
        _ => Err(malformed_error!(
            "Value {:#x} exceeds the compressed integer range",
            value
        )),
    }
}

/// Write a count after checking it fits the compressed integer range.
fn write_compressed_count(buf: &mut Vec<u8>, count: usize) -> Result<()> {
    let Ok(value) = u32::try_from(count) else {
        return Err(malformed_error!(
            "Count {} exceeds the compressed integer range",
            count
        ));
    };
    write_compressed_uint(buf, value)
}

/// Write a length-prefixed UTF-8 string.
fn write_compressed_str(buf: &mut Vec<u8>, text: &str) -> Result<()> {
    write_compressed_count(buf, text.len())?;
    buf.extend_from_slice(text.as_bytes());
    Ok(())
}
