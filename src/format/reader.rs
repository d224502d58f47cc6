//! Document decoding with pluggable symbol and reference hooks.
//!
//! This module turns record bytes into [`Value`] trees. Decoding is driven by
//! the one-byte tags in [`crate::format::Tag`]; each document carries its own
//! symbol memo, and every symbol definition site passes through the caller's
//! [`ReadHooks`] before it is memoized, so a rewriting hook sees each distinct
//! type identifier exactly once per document.
//!
//! # Architecture
//!
//! [`read_document`] consumes exactly one document from the parser and leaves
//! the position on the byte that follows, which lets the record layer read
//! the class metadata document and the state document back to back from one
//! buffer. Reference payloads are sliced out and decoded with a fresh parser
//! and a fresh memo; their raw bytes are kept alongside the decoded value so
//! unrecognized payloads can be re-emitted verbatim.
//!
//! # Key Components
//!
//! - [`ReadHooks`] - Interception points for symbols and references
//! - [`Document`] - A decoded value plus the forced-upgrade flag
//! - [`read_document`] - Decode one document from a parser
//! - [`decode_value`] - Decode a standalone value with identity hooks
//!
//! # Usage Examples
//!
//! ```rust
//! use reclass::format::decode_value;
//! use reclass::format::Value;
//!
//! // A one-element tuple holding the integer 7
//! let data = [0x07, 0x01, 0x03, 0x07, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
//! let value = decode_value(&data)?;
//! assert_eq!(value, Value::Tuple(vec![Value::Int(7)]));
//! # Ok::<(), reclass::Error>(())
//! ```
//!
//! # Error Handling
//!
//! Damaged structure (unknown tags, memo indexes past the memo, non-dotted
//! legacy identifiers, trailing payload bytes) returns
//! [`crate::Error::Malformed`]; truncation returns
//! [`crate::Error::OutOfBounds`]; nesting past the depth limit returns
//! [`crate::Error::RecursionLimit`].

use crate::{
    format::{IdentityHooks, Instance, Parser, Tag, Value, MAX_DEPTH},
    record::PersistentRef,
    typesystem::TypeName,
    Error, Result,
};

/// Interception points applied while decoding a document.
///
/// The default implementations are identity transforms: symbols pass through
/// unchanged and reference payloads are classified into their standard shapes
/// without rewriting. The record layer installs a resolver-backed
/// implementation to perform renames during the decode pass.
pub trait ReadHooks {
    /// Called once per symbol definition site with the stored identifier.
    ///
    /// The returned identifier replaces the stored one in the decoded value
    /// and in the document memo, so later back-references see the replacement.
    fn load_symbol(&mut self, name: TypeName) -> TypeName {
        name
    }

    /// Called for each reference with its decoded payload and raw bytes.
    ///
    /// The default classifies the payload into one of the recognized
    /// reference shapes, falling back to an opaque byte-preserving form.
    fn load_reference(&mut self, payload: Value, raw: &[u8]) -> PersistentRef {
        PersistentRef::classify(payload, raw)
    }
}

/// A decoded document.
pub struct Document {
    /// The document's value tree.
    pub value: Value,
    /// Set when the document used a compatibility spelling that only a
    /// re-encode can modernize, regardless of whether any symbol changed.
    pub upgraded: bool,
}

/// Decode exactly one document from the parser.
///
/// The parser position is left on the first byte after the document, so a
/// second document can be read from the same buffer. The document's symbol
/// memo starts empty and is discarded when the document ends.
///
/// # Arguments
///
/// * `parser` - Cursor over the record bytes, positioned at the document start
/// * `hooks` - Symbol and reference interception points
///
/// # Errors
///
/// Returns [`crate::Error::Malformed`], [`crate::Error::OutOfBounds`] or
/// [`crate::Error::RecursionLimit`] when the document bytes are damaged.
pub fn read_document(parser: &mut Parser<'_>, hooks: &mut dyn ReadHooks) -> Result<Document> {
    read_document_at(parser, hooks, 0)
}

/// Decode one document starting at the given nesting depth.
///
/// Reference payloads re-enter through this function with the depth they were
/// encountered at, so a chain of nested payloads shares one depth budget.
fn read_document_at(
    parser: &mut Parser<'_>,
    hooks: &mut dyn ReadHooks,
    depth: usize,
) -> Result<Document> {
    let mut decoder = Decoder {
        parser,
        hooks,
        memo: Vec::new(),
        upgraded: false,
    };

    let value = decoder.read_value(depth)?;
    Ok(Document {
        value,
        upgraded: decoder.upgraded,
    })
}

/// Decode a single standalone value with identity hooks.
///
/// The input must contain exactly one document; trailing bytes are rejected.
///
/// # Errors
///
/// Returns [`crate::Error::Empty`] for empty input and the usual decode
/// errors for damaged bytes.
pub fn decode_value(data: &[u8]) -> Result<Value> {
    if data.is_empty() {
        return Err(Error::Empty);
    }

    let mut parser = Parser::new(data);
    let mut hooks = IdentityHooks;
    let document = read_document(&mut parser, &mut hooks)?;

    if parser.has_more_data() {
        return Err(malformed_error!(
            "Trailing bytes after document value at offset {}",
            parser.pos()
        ));
    }

    Ok(document.value)
}

/// Decoding state for one document: the cursor, the hooks, and the memo.
struct Decoder<'p, 'a, 'h> {
    parser: &'p mut Parser<'a>,
    hooks: &'h mut dyn ReadHooks,
    memo: Vec<TypeName>,
    upgraded: bool,
}

impl Decoder<'_, '_, '_> {
    fn read_value(&mut self, depth: usize) -> Result<Value> {
        if depth >= MAX_DEPTH {
            return Err(Error::RecursionLimit(MAX_DEPTH));
        }

        let tag_byte = self.parser.read_le::<u8>()?;
        let Some(tag) = Tag::from_byte(tag_byte) else {
            return Err(malformed_error!(
                "Unknown value tag - {:#04x} at offset {}",
                tag_byte,
                self.parser.pos() - 1
            ));
        };

        match tag {
            Tag::None => Ok(Value::None),
            Tag::True => Ok(Value::Bool(true)),
            Tag::False => Ok(Value::Bool(false)),
            Tag::Int => Ok(Value::Int(self.parser.read_le::<i64>()?)),
            Tag::Float => Ok(Value::Float(self.parser.read_le::<f64>()?)),
            Tag::Str => Ok(Value::Str(self.parser.read_compressed_string_utf8()?)),
            Tag::Bytes => {
                let length = self.parser.read_compressed_uint()? as usize;
                Ok(Value::Bytes(self.parser.read_bytes(length)?.to_vec()))
            }
            Tag::Tuple => Ok(Value::Tuple(self.read_sequence(depth)?)),
            Tag::List => Ok(Value::List(self.read_sequence(depth)?)),
            Tag::Map => {
                let count = self.parser.read_compressed_uint()? as usize;
                // Every entry takes at least two bytes, so remaining() bounds
                // any honest count.
                let mut entries = Vec::with_capacity(count.min(self.parser.remaining()));
                for _ in 0..count {
                    let key = self.read_value(depth + 1)?;
                    let value = self.read_value(depth + 1)?;
                    entries.push((key, value));
                }
                Ok(Value::Map(entries))
            }
            Tag::Symbol => {
                let namespace = self.parser.read_compressed_string_utf8()?;
                let name = self.parser.read_compressed_string_utf8()?;
                if namespace.is_empty() || name.is_empty() {
                    return Err(malformed_error!(
                        "Symbol with empty namespace or name at offset {}",
                        self.parser.pos()
                    ));
                }

                Ok(Value::Symbol(
                    self.define_symbol(TypeName::new(namespace, name)),
                ))
            }
            Tag::SymbolBack => {
                let index = self.parser.read_compressed_uint()? as usize;
                match self.memo.get(index) {
                    Some(name) => Ok(Value::Symbol(name.clone())),
                    None => Err(malformed_error!(
                        "Symbol back-reference {} past memo of {} entries",
                        index,
                        self.memo.len()
                    )),
                }
            }
            Tag::Object => {
                let class_value = self.read_value(depth + 1)?;
                let Value::Symbol(class) = class_value else {
                    return Err(malformed_error!(
                        "Object class must be a symbol, found {}",
                        class_value.kind()
                    ));
                };

                let argc = self.parser.read_compressed_uint()? as usize;
                let mut args = Vec::with_capacity(argc.min(self.parser.remaining()));
                for _ in 0..argc {
                    args.push(self.read_value(depth + 1)?);
                }

                let state = self.read_value(depth + 1)?;
                Ok(Value::Object(Box::new(Instance::new(class, args, state))))
            }
            Tag::Ref => {
                let length = self.parser.read_compressed_uint()? as usize;
                let raw = self.parser.read_bytes(length)?;
                let payload = self.read_reference_payload(raw, depth + 1)?;
                Ok(Value::Reference(self.hooks.load_reference(payload, raw)))
            }
            Tag::LegacySymbol => {
                let dotted = self.parser.read_compressed_string_utf8()?;
                let Ok(name) = TypeName::parse_dotted(&dotted) else {
                    return Err(malformed_error!(
                        "Legacy symbol is not a dotted path - {:?}",
                        dotted
                    ));
                };

                self.upgraded = true;
                Ok(Value::Symbol(self.define_symbol(name)))
            }
        }
    }

    /// Read a count-prefixed sequence of values.
    fn read_sequence(&mut self, depth: usize) -> Result<Vec<Value>> {
        let count = self.parser.read_compressed_uint()? as usize;
        // Every element takes at least one byte, so remaining() bounds any
        // honest count.
        let mut items = Vec::with_capacity(count.min(self.parser.remaining()));
        for _ in 0..count {
            items.push(self.read_value(depth + 1)?);
        }
        Ok(items)
    }

    /// Pass a symbol definition through the hook and memoize the result.
    fn define_symbol(&mut self, name: TypeName) -> TypeName {
        let resolved = self.hooks.load_symbol(name);
        self.memo.push(resolved.clone());
        resolved
    }

    /// Decode a reference payload as its own document.
    ///
    /// The payload gets a fresh parser and memo and identity symbol handling;
    /// any rewriting of payload identifiers happens in the reference layer,
    /// not here. A compatibility spelling inside the payload still forces the
    /// enclosing record to upgrade.
    fn read_reference_payload(&mut self, raw: &[u8], depth: usize) -> Result<Value> {
        let mut inner = Parser::new(raw);
        let mut identity = IdentityHooks;
        let document = read_document_at(&mut inner, &mut identity, depth)?;

        if inner.has_more_data() {
            return Err(malformed_error!(
                "Trailing bytes after reference payload value at offset {}",
                inner.pos()
            ));
        }

        if document.upgraded {
            self.upgraded = true;
        }

        Ok(document.value)
    }
}
