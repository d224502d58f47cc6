//! Record wire format: tags, values, and the decode/encode primitives.
//!
//! A stored record is two back-to-back documents in one buffer: a class
//! metadata document describing how to reconstruct the object, then a state
//! document holding its data. Each document is a single tagged value tree
//! with a private symbol memo; nothing may follow the second document.
//!
//! # Wire Layout
//!
//! Every value starts with a one-byte tag. Multi-byte numbers are
//! little-endian; variable lengths and counts use a compressed unsigned
//! integer whose leading bits select a 1, 2 or 4 byte width (see
//! [`Parser::read_compressed_uint`]); strings are compressed-length-prefixed
//! UTF-8.
//!
//! | Tag    | Value                | Payload                                       |
//! |--------|----------------------|-----------------------------------------------|
//! | `0x00` | none                 | -                                             |
//! | `0x01` | true                 | -                                             |
//! | `0x02` | false                | -                                             |
//! | `0x03` | int                  | `i64`, little-endian                          |
//! | `0x04` | float                | `f64` bit pattern, little-endian              |
//! | `0x05` | str                  | compressed length, UTF-8 bytes                |
//! | `0x06` | bytes                | compressed length, raw bytes                  |
//! | `0x07` | tuple                | compressed count, values                      |
//! | `0x08` | list                 | compressed count, values                      |
//! | `0x09` | map                  | compressed pair count, key/value pairs        |
//! | `0x0A` | symbol               | namespace string, name string                 |
//! | `0x0B` | symbol back-ref      | compressed memo index                         |
//! | `0x0C` | object               | class symbol, compressed argc, args, state    |
//! | `0x0D` | reference            | compressed payload length, payload document   |
//! | `0x0E` | legacy symbol        | single dotted string (read-only)              |
//!
//! # Symbol Memo
//!
//! Each symbol definition (`0x0A` or `0x0E`) appends its identifier to the
//! document's memo; `0x0B` refers back to an earlier definition by index.
//! The memo is per document, so reference payloads, which are documents of
//! their own, never share memo state with their enclosing document. The
//! encoder always emits the shortest compressed forms and memoizes repeated
//! symbols, which makes decode-then-encode of its own output byte-identical.
//!
//! # Legacy Symbols
//!
//! Tag `0x0E` is a compatibility spelling produced by older writers: the
//! namespace and name joined with a dot in a single string. The decoder
//! accepts it, splits on the last dot, and flags the document as requiring
//! an upgrade; the encoder never produces it.
//!
//! # Hooks
//!
//! Decoding and encoding are mechanical; all rewriting policy lives behind
//! [`ReadHooks`] and [`WriteHooks`]. The defaults ([`IdentityHooks`]) change
//! nothing, which is what reference payloads use internally.
//!
//! # Thread Safety
//!
//! Decoders and encoders are single-use values over caller-owned buffers;
//! distinct records can be processed on distinct threads without shared
//! state.

pub mod io;

mod parser;
mod reader;
mod value;
mod writer;

pub use parser::Parser;
pub use reader::{decode_value, read_document, Document, ReadHooks};
pub use value::{Instance, Tag, Value};
pub use writer::{encode_value, write_document, WriteHooks};

/// Maximum value nesting depth accepted by the decoder and encoder.
///
/// Reference payloads count toward the depth of the document that contains
/// them, so chained payloads cannot restart the budget.
pub(crate) const MAX_DEPTH: usize = 128;

/// Hook implementation that rewrites nothing.
///
/// Used wherever a document should pass through unchanged: standalone value
/// decoding, reference payload parsing, and tests.
pub struct IdentityHooks;

impl ReadHooks for IdentityHooks {}

impl WriteHooks for IdentityHooks {}
