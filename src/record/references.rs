//! Classified cross-record references.
//!
//! A reference payload is a small document naming another record. Two shapes
//! carry a rewritable class identifier and are understood structurally: the
//! plain `(oid, class)` tuple and the multi-database list form. Everything
//! else, bare oid bytes, weak reference markers, unknown mode tags, wrong
//! arities, is kept as opaque bytes and re-emitted verbatim, so unrecognized
//! payloads survive a rewrite untouched.
//!
//! Recognizing a shape never loads the target record; only the identifier
//! embedded in the payload is eligible for rewriting.

use crate::{format::Value, record::Oid, typesystem::TypeName};

/// A cross-record reference in one of its payload shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum PersistentRef {
    /// Same-store reference: target oid plus an optional class identifier.
    Simple {
        /// Identifier of the target record
        oid: Oid,
        /// Class identifier of the target, when the writer stored one
        class_info: Option<TypeName>,
    },
    /// Reference into a named sibling database.
    MultiDatabase {
        /// Name of the database holding the target
        database: String,
        /// Identifier of the target record
        oid: Oid,
        /// Class identifier of the target, when the writer stored one
        class_info: Option<TypeName>,
    },
    /// Unrecognized payload, preserved byte for byte.
    Opaque(Vec<u8>),
}

impl PersistentRef {
    /// Classify a decoded payload, falling back to an opaque copy of the raw
    /// bytes when the shape is not recognized.
    #[must_use]
    pub fn classify(payload: Value, raw: &[u8]) -> PersistentRef {
        match Self::recognize(payload) {
            Some(reference) => reference,
            None => PersistentRef::Opaque(raw.to_vec()),
        }
    }

    fn recognize(payload: Value) -> Option<PersistentRef> {
        match payload {
            Value::Tuple(items) => {
                let [oid_part, class_part] = <[Value; 2]>::try_from(items).ok()?;
                Some(PersistentRef::Simple {
                    oid: Self::oid_part(&oid_part)?,
                    class_info: Self::class_part(class_part)?,
                })
            }
            Value::List(items) => {
                let [mode, body] = <[Value; 2]>::try_from(items).ok()?;
                if !matches!(&mode, Value::Str(tag) if tag == "m") {
                    return None;
                }

                let Value::Tuple(parts) = body else {
                    return None;
                };
                let [database, oid_part, class_part] = <[Value; 3]>::try_from(parts).ok()?;
                let Value::Str(database) = database else {
                    return None;
                };

                Some(PersistentRef::MultiDatabase {
                    database,
                    oid: Self::oid_part(&oid_part)?,
                    class_info: Self::class_part(class_part)?,
                })
            }
            _ => None,
        }
    }

    /// An oid field must be exactly 8 raw bytes.
    fn oid_part(value: &Value) -> Option<Oid> {
        match value {
            Value::Bytes(bytes) => Oid::from_slice(bytes),
            _ => None,
        }
    }

    /// A class field is a symbol or the absent value.
    fn class_part(value: Value) -> Option<Option<TypeName>> {
        match value {
            Value::Symbol(name) => Some(Some(name)),
            Value::None => Some(None),
            _ => None,
        }
    }

    /// The payload value to re-serialize, `None` for opaque references whose
    /// original bytes are written instead.
    #[must_use]
    pub(crate) fn payload_value(&self) -> Option<Value> {
        match self {
            PersistentRef::Simple { oid, class_info } => Some(Value::Tuple(vec![
                Value::Bytes(oid.to_bytes().to_vec()),
                Self::class_value(class_info),
            ])),
            PersistentRef::MultiDatabase {
                database,
                oid,
                class_info,
            } => Some(Value::List(vec![
                Value::Str("m".to_string()),
                Value::Tuple(vec![
                    Value::Str(database.clone()),
                    Value::Bytes(oid.to_bytes().to_vec()),
                    Self::class_value(class_info),
                ]),
            ])),
            PersistentRef::Opaque(_) => None,
        }
    }

    fn class_value(class_info: &Option<TypeName>) -> Value {
        match class_info {
            Some(name) => Value::Symbol(name.clone()),
            None => Value::None,
        }
    }

    /// The target oid, when the shape carries one.
    #[must_use]
    pub fn oid(&self) -> Option<Oid> {
        match self {
            PersistentRef::Simple { oid, .. } | PersistentRef::MultiDatabase { oid, .. } => {
                Some(*oid)
            }
            PersistentRef::Opaque(_) => None,
        }
    }

    /// The embedded class identifier, when the shape carries one.
    #[must_use]
    pub fn class_info(&self) -> Option<&TypeName> {
        match self {
            PersistentRef::Simple { class_info, .. }
            | PersistentRef::MultiDatabase { class_info, .. } => class_info.as_ref(),
            PersistentRef::Opaque(_) => None,
        }
    }
}
