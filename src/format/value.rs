//! Wire tags and the in-memory value model for record documents.
//!
//! Every serialized value starts with a one-byte [`Tag`] selecting its shape;
//! decoding produces the owned [`Value`] tree that the rewriting layer
//! inspects and transforms. Class instances carry their type identifier,
//! construction arguments and state as an [`Instance`].

use strum::{EnumCount, EnumIter};

use crate::{record::PersistentRef, typesystem::TypeName};

/// One-byte wire tags identifying the shape of the value that follows.
///
/// Tags `0x00` through `0x0D` are produced by the encoder; `0x0E` is a
/// read-only compatibility spelling for type identifiers stored as a single
/// dotted string by older writers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, EnumCount)]
#[repr(u8)]
pub enum Tag {
    /// The absent value
    None = 0x00,
    /// Boolean true
    True = 0x01,
    /// Boolean false
    False = 0x02,
    /// Signed 64-bit integer, little-endian
    Int = 0x03,
    /// IEEE 754 double, little-endian bit pattern
    Float = 0x04,
    /// Length-prefixed UTF-8 string
    Str = 0x05,
    /// Length-prefixed raw bytes
    Bytes = 0x06,
    /// Fixed-order sequence with element count
    Tuple = 0x07,
    /// Growable sequence with element count
    List = 0x08,
    /// Key-value pairs with pair count, preserved in wire order
    Map = 0x09,
    /// Type identifier definition, appending to the document memo
    Symbol = 0x0A,
    /// Back-reference to an earlier symbol by memo index
    SymbolBack = 0x0B,
    /// Class instance with type identifier, arguments and state
    Object = 0x0C,
    /// Cross-record reference wrapping a nested payload document
    Ref = 0x0D,
    /// Legacy dotted-string type identifier, read-only
    LegacySymbol = 0x0E,
}

impl Tag {
    /// Convert a wire byte into a tag, or `None` if the byte is not a
    /// recognized tag.
    #[must_use]
    pub fn from_byte(value: u8) -> Option<Tag> {
        match value {
            0x00 => Some(Tag::None),
            0x01 => Some(Tag::True),
            0x02 => Some(Tag::False),
            0x03 => Some(Tag::Int),
            0x04 => Some(Tag::Float),
            0x05 => Some(Tag::Str),
            0x06 => Some(Tag::Bytes),
            0x07 => Some(Tag::Tuple),
            0x08 => Some(Tag::List),
            0x09 => Some(Tag::Map),
            0x0A => Some(Tag::Symbol),
            0x0B => Some(Tag::SymbolBack),
            0x0C => Some(Tag::Object),
            0x0D => Some(Tag::Ref),
            0x0E => Some(Tag::LegacySymbol),
            _ => None,
        }
    }

    /// Returns the wire byte for this tag.
    #[must_use]
    pub fn byte(self) -> u8 {
        self as u8
    }
}

/// Decoded in-memory representation of a serialized value.
///
/// `Value` is an owned tree; container variants hold their children directly
/// and comparisons are structural. Map entries keep their wire order, so a
/// decode and re-encode of an untouched document is byte-identical.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The absent value
    None,
    /// Boolean
    Bool(bool),
    /// Signed 64-bit integer
    Int(i64),
    /// IEEE 754 double
    Float(f64),
    /// UTF-8 string
    Str(String),
    /// Raw bytes
    Bytes(Vec<u8>),
    /// Fixed-order sequence
    Tuple(Vec<Value>),
    /// Growable sequence
    List(Vec<Value>),
    /// Key-value pairs in wire order
    Map(Vec<(Value, Value)>),
    /// Type identifier
    Symbol(TypeName),
    /// Class instance
    Object(Box<Instance>),
    /// Cross-record reference
    Reference(PersistentRef),
}

impl Value {
    /// Short name for the value's shape, used in error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Value::None => "none",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Bytes(_) => "bytes",
            Value::Tuple(_) => "tuple",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Symbol(_) => "symbol",
            Value::Object(_) => "object",
            Value::Reference(_) => "reference",
        }
    }

    /// Returns the type identifier if this value is a symbol.
    #[must_use]
    pub fn as_symbol(&self) -> Option<&TypeName> {
        match self {
            Value::Symbol(name) => Some(name),
            _ => None,
        }
    }
}

/// A class instance: type identifier, construction arguments and state.
///
/// Instances are how records spell "an object of class C built with these
/// arguments, carrying this state". The class identifier participates in
/// symbol rewriting like any other symbol; the arguments and state are
/// arbitrary value trees.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    /// Type identifier of the instance's class
    pub class: TypeName,
    /// Construction arguments
    pub args: Vec<Value>,
    /// Instance state
    pub state: Value,
}

impl Instance {
    /// Create a new instance.
    ///
    /// # Arguments
    ///
    /// * `class` - Type identifier of the instance's class
    /// * `args` - Construction arguments
    /// * `state` - Instance state
    #[must_use]
    pub fn new(class: TypeName, args: Vec<Value>, state: Value) -> Self {
        Instance { class, args, state }
    }
}
