//! Record-level decoding, rewriting, and re-encoding.
//!
//! [`RecordCodec`] drives one rewrite run. Fed records one at a time, it
//! decodes the two documents of each record, applies the resolver's renaming
//! policy to every type identifier it meets, and re-encodes only when
//! something actually changed. Records that need no change cost a decode and
//! nothing else.
//!
//! # Architecture
//!
//! A record is class metadata followed by state. Both documents decode
//! through the same resolver-backed read hooks, so symbols and reference
//! payloads are rewritten in-flight wherever they appear, constructor
//! arguments included, and one dirty flag accumulates across the record.
//! The record's oid enters afterwards: [`RecordCodec::process`] applies a
//! per-record override to the class document's top-level identifier, which
//! is what lets an override pin one record's class specifically.
//!
//! On the write side the codec's hooks enforce the storage guard: every
//! symbol written must be known to the live registry or the broken
//! placeholder registry, and instances of broken types are substituted with
//! their rebuild form. A record that fails the guard is reported and left in
//! the store unchanged; damaged bytes, by contrast, abort the run.
//!
//! # Key Components
//!
//! - [`RecordCodec::process`] - The per-record entry point
//! - [`RecordCodec::decode`] / [`RecordCodec::encode`] - The two halves,
//!   public for callers that transform values in between
//! - [`DecodedRecord`] - Decoded documents plus the change flags
//! - [`RecordCodec::discovered_rules`] - Implicit renames found so far
//!
//! # Usage Examples
//!
//! ```rust
//! use reclass::format::{encode_value, Value};
//! use reclass::{Oid, Rebuild, RecordCodec, RenameRules, TypeName, TypeRegistry};
//! use std::sync::Arc;
//!
//! // The Document class moved from app.old to app.new
//! let live = TypeRegistry::new();
//! live.register_type(TypeName::new("app.new", "Document"), Rebuild::Constructor);
//!
//! let mut rules = RenameRules::new();
//! rules.merge_source([("app.old Document", "app.new Document")])?;
//!
//! // A stored record: class metadata document, then state document
//! let mut record = encode_value(&Value::Symbol(TypeName::new("app.old", "Document")))?;
//! record.extend(encode_value(&Value::None)?);
//!
//! let mut codec = RecordCodec::new(rules, Arc::new(live));
//! let updated = codec.process(Oid::new(1), &record)?;
//! assert!(updated.is_some(), "the class identifier was rewritten");
//! # Ok::<(), reclass::Error>(())
//! ```
//!
//! # Integration
//!
//! The codec neither iterates storage nor writes it; the caller walks its
//! store, hands each record to [`RecordCodec::process`], stores the
//! replacement bytes when one comes back, and afterwards drains
//! [`RecordCodec::diagnostics`] and persists
//! [`RecordCodec::discovered_rules`].

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::{
    diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticSeverity, Diagnostics},
    format::{read_document, write_document, Instance, Parser, ReadHooks, Value, WriteHooks},
    record::{Oid, PersistentRef, RenameRules, SymbolResolver},
    typesystem::{BrokenRegistry, TypeName, TypeRegistry},
    Error, Result,
};

/// A decoded record: both documents plus what the decode pass learned.
pub struct DecodedRecord {
    /// The class metadata document, with identifier rewrites already applied.
    /// The per-record override step happens in [`RecordCodec::process`],
    /// which knows the record's oid.
    pub class_meta: Value,
    /// The state document, with identifier rewrites already applied.
    pub state: Value,
    /// True when decoding changed an identifier in either document.
    pub dirty: bool,
    /// True when either document used a compatibility spelling that only a
    /// re-encode can modernize.
    pub forced_upgrade: bool,
}

/// Decodes, rewrites, and re-encodes store records one at a time.
pub struct RecordCodec {
    resolver: SymbolResolver,
    diagnostics: Arc<Diagnostics>,
}

impl RecordCodec {
    /// Create a codec over a rule table and a shared live registry.
    #[must_use]
    pub fn new(rules: RenameRules, live: Arc<TypeRegistry>) -> Self {
        let diagnostics = Arc::new(Diagnostics::new());
        RecordCodec {
            resolver: SymbolResolver::new(rules, live, diagnostics.clone()),
            diagnostics,
        }
    }

    /// Decode a record into its two documents, rewriting identifiers in both.
    ///
    /// Only the per-record override is left for [`RecordCodec::process`],
    /// which has the oid the override keys on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Empty`] for empty input and [`Error::Malformed`] or
    /// [`Error::OutOfBounds`] for damaged bytes, including trailing bytes
    /// after the state document. These are fatal; a damaged record must stop
    /// a run rather than be rewritten.
    pub fn decode(&mut self, input: &[u8]) -> Result<DecodedRecord> {
        if input.is_empty() {
            return Err(Error::Empty);
        }

        let mut parser = Parser::new(input);

        let mut hooks = RewriteRead {
            resolver: &mut self.resolver,
            dirty: false,
        };
        let class_doc = read_document(&mut parser, &mut hooks)?;
        let state_doc = read_document(&mut parser, &mut hooks)?;
        let dirty = hooks.dirty;

        if parser.has_more_data() {
            return Err(malformed_error!(
                "Trailing bytes after record state at offset {}",
                parser.pos()
            ));
        }

        Ok(DecodedRecord {
            class_meta: class_doc.value,
            state: state_doc.value,
            dirty,
            forced_upgrade: class_doc.upgraded || state_doc.upgraded,
        })
    }

    /// Encode a record from its two documents, enforcing the storage guard.
    ///
    /// Instances of broken types are substituted with their rebuild form
    /// before writing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TypeNotFound`] when a symbol would be written that
    /// neither the live registry nor the broken placeholder registry knows.
    pub fn encode(&mut self, class_meta: &Value, state: &Value) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        let mut hooks = RewriteWrite {
            resolver: &mut self.resolver,
        };
        write_document(&mut output, class_meta, &mut hooks)?;
        write_document(&mut output, state, &mut hooks)?;
        Ok(output)
    }

    /// Process one record: decode, rewrite, and re-encode when needed.
    ///
    /// Returns `Ok(Some(bytes))` with the replacement record when an
    /// identifier changed or the stored encoding required an upgrade, and
    /// `Ok(None)` for a record that should stay as it is. A record that
    /// cannot be re-encoded (its rewritten form names an unknown type) is
    /// reported through the diagnostics sink and also returns `Ok(None)`,
    /// leaving the stored bytes in place.
    ///
    /// # Errors
    ///
    /// Propagates the fatal decode errors of [`RecordCodec::decode`].
    pub fn process(&mut self, oid: Oid, input: &[u8]) -> Result<Option<Vec<u8>>> {
        let record = self.decode(input)?;
        let (class_meta, meta_dirty) = self.normalize_class_meta(oid, record.class_meta);

        if !record.dirty && !meta_dirty && !record.forced_upgrade {
            return Ok(None);
        }

        match self.encode(&class_meta, &record.state) {
            Ok(output) => Ok(Some(output)),
            Err(error) => {
                self.diagnostics.push(
                    Diagnostic::new(
                        DiagnosticSeverity::Error,
                        DiagnosticCategory::Record,
                        format!("Could not rewrite record - {error}"),
                    )
                    .with_oid(oid),
                );
                Ok(None)
            }
        }
    }

    /// Apply the per-record override to the class metadata document.
    ///
    /// Identifier resolution already happened while decoding; what remains
    /// is the one step that needs the record's oid. Two shapes carry a class
    /// identifier the override can replace: a bare symbol, and a two-element
    /// tuple whose first element is a symbol. Anything else passes through
    /// untouched.
    fn normalize_class_meta(&mut self, oid: Oid, class_meta: Value) -> (Value, bool) {
        let Some(target) = self.resolver.rules().override_for(oid) else {
            return (class_meta, false);
        };
        let target = target.clone();

        match class_meta {
            Value::Symbol(_) => (Value::Symbol(target), true),
            Value::Tuple(items) => match <[Value; 2]>::try_from(items) {
                Ok([Value::Symbol(_), args]) => {
                    (Value::Tuple(vec![Value::Symbol(target), args]), true)
                }
                Ok([first, args]) => (Value::Tuple(vec![first, args]), false),
                Err(items) => (Value::Tuple(items), false),
            },
            other => (other, false),
        }
    }

    /// The implicit rules discovered so far, as `"namespace name"` pairs.
    ///
    /// Callers persist these alongside their explicit rules so the next run
    /// takes the fast path.
    #[must_use]
    pub fn discovered_rules(&self) -> BTreeMap<String, String> {
        self.resolver.rules().discovered_pairs()
    }

    /// The diagnostics collected across all processed records.
    #[must_use]
    pub fn diagnostics(&self) -> &Arc<Diagnostics> {
        &self.diagnostics
    }

    /// The rule table, including discovered rules.
    #[must_use]
    pub fn rules(&self) -> &RenameRules {
        self.resolver.rules()
    }

    /// The broken placeholder registry accumulated over this run.
    #[must_use]
    pub fn broken(&self) -> &BrokenRegistry {
        self.resolver.broken()
    }

    /// The shared live registry.
    #[must_use]
    pub fn live(&self) -> &TypeRegistry {
        self.resolver.live()
    }
}

/// Read hooks that rewrite identifiers through the resolver as they load.
struct RewriteRead<'r> {
    resolver: &'r mut SymbolResolver,
    dirty: bool,
}

impl ReadHooks for RewriteRead<'_> {
    fn load_symbol(&mut self, name: TypeName) -> TypeName {
        let (resolved, dirty) = self.resolver.resolve(name, None);
        self.dirty |= dirty;
        resolved
    }

    fn load_reference(&mut self, payload: Value, raw: &[u8]) -> PersistentRef {
        let reference = PersistentRef::classify(payload, raw);
        let (reference, dirty) = self.resolver.resolve_reference(reference);
        self.dirty |= dirty;
        reference
    }
}

/// Write hooks that enforce the storage guard and substitute broken types.
struct RewriteWrite<'r> {
    resolver: &'r mut SymbolResolver,
}

impl WriteHooks for RewriteWrite<'_> {
    fn save_symbol(&mut self, name: &TypeName) -> Result<()> {
        if self.resolver.knows(name) {
            Ok(())
        } else {
            Err(Error::TypeNotFound(name.clone()))
        }
    }

    fn save_instance(&mut self, instance: &Instance) -> Option<Instance> {
        self.resolver.broken_substitute(instance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{format::encode_value, typesystem::Rebuild};

    fn record_bytes(class_meta: &Value, state: &Value) -> Vec<u8> {
        let mut record = encode_value(class_meta).unwrap();
        record.extend(encode_value(state).unwrap());
        record
    }

    fn registry_with(names: &[(&str, &str)]) -> Arc<TypeRegistry> {
        let live = TypeRegistry::new();
        for (namespace, name) in names {
            live.register_type(TypeName::new(*namespace, *name), Rebuild::Constructor);
        }
        Arc::new(live)
    }

    #[test]
    fn test_decode_splits_documents() {
        let live = registry_with(&[("app.models", "Document")]);
        let mut codec = RecordCodec::new(RenameRules::new(), live);

        let record = record_bytes(
            &Value::Symbol(TypeName::new("app.models", "Document")),
            &Value::Map(vec![(Value::Str("size".to_string()), Value::Int(3))]),
        );

        let decoded = codec.decode(&record).unwrap();
        assert_eq!(
            decoded.class_meta,
            Value::Symbol(TypeName::new("app.models", "Document"))
        );
        assert_eq!(
            decoded.state,
            Value::Map(vec![(Value::Str("size".to_string()), Value::Int(3))])
        );
        assert!(!decoded.dirty);
        assert!(!decoded.forced_upgrade);
    }

    #[test]
    fn test_decode_resolves_inside_constructor_args() {
        let live = registry_with(&[("app.new", "Document")]);
        let mut rules = RenameRules::new();
        rules
            .merge_source([("app.old Document", "app.new Document")])
            .unwrap();
        let mut codec = RecordCodec::new(rules, live);

        // The class document names the type twice: as the class identifier
        // and again inside the constructor arguments
        let record = record_bytes(
            &Value::Tuple(vec![
                Value::Symbol(TypeName::new("app.old", "Document")),
                Value::Tuple(vec![Value::Symbol(TypeName::new("app.old", "Document"))]),
            ]),
            &Value::None,
        );

        let decoded = codec.decode(&record).unwrap();
        assert!(decoded.dirty);
        assert_eq!(
            decoded.class_meta,
            Value::Tuple(vec![
                Value::Symbol(TypeName::new("app.new", "Document")),
                Value::Tuple(vec![Value::Symbol(TypeName::new("app.new", "Document"))]),
            ])
        );
    }

    #[test]
    fn test_decode_empty_input() {
        let mut codec = RecordCodec::new(RenameRules::new(), Arc::new(TypeRegistry::new()));
        assert!(matches!(codec.decode(&[]), Err(Error::Empty)));
    }

    #[test]
    fn test_decode_trailing_bytes_fatal() {
        let mut codec = RecordCodec::new(RenameRules::new(), registry_with(&[]));
        let mut record = record_bytes(&Value::None, &Value::None);
        record.push(0x00);

        assert!(matches!(
            codec.decode(&record),
            Err(Error::Malformed { .. })
        ));
    }

    #[test]
    fn test_decode_single_document_fatal() {
        let mut codec = RecordCodec::new(RenameRules::new(), registry_with(&[]));
        let record = encode_value(&Value::None).unwrap();

        // The state document is missing entirely
        assert!(matches!(codec.decode(&record), Err(Error::OutOfBounds)));
    }

    #[test]
    fn test_normalize_bare_symbol_with_override() {
        let live = registry_with(&[("app.new", "Document")]);
        let mut rules = RenameRules::new();
        rules.set_override(Oid::new(7), TypeName::new("app.new", "Document"));
        let mut codec = RecordCodec::new(rules, live);

        let (normalized, dirty) = codec.normalize_class_meta(
            Oid::new(7),
            Value::Symbol(TypeName::new("app.old", "Document")),
        );

        assert!(dirty);
        assert_eq!(
            normalized,
            Value::Symbol(TypeName::new("app.new", "Document"))
        );
    }

    #[test]
    fn test_normalize_tuple_shape_with_override() {
        let live = registry_with(&[("app.new", "Document")]);
        let mut rules = RenameRules::new();
        rules.set_override(Oid::new(7), TypeName::new("app.new", "Document"));
        let mut codec = RecordCodec::new(rules, live);

        let args = Value::Tuple(vec![Value::Int(1)]);
        let (normalized, dirty) = codec.normalize_class_meta(
            Oid::new(7),
            Value::Tuple(vec![
                Value::Symbol(TypeName::new("app.old", "Document")),
                args.clone(),
            ]),
        );

        assert!(dirty);
        assert_eq!(
            normalized,
            Value::Tuple(vec![
                Value::Symbol(TypeName::new("app.new", "Document")),
                args
            ])
        );

        // No override for this oid: pass through unchanged. Rule hits happen
        // during decode, not here.
        let (normalized, dirty) = codec.normalize_class_meta(
            Oid::new(8),
            Value::Symbol(TypeName::new("app.old", "Document")),
        );
        assert!(!dirty);
        assert_eq!(
            normalized,
            Value::Symbol(TypeName::new("app.old", "Document"))
        );
    }

    #[test]
    fn test_normalize_leaves_unrecognized_shapes() {
        let mut codec = RecordCodec::new(RenameRules::new(), registry_with(&[]));

        // Wrong arity
        let three = Value::Tuple(vec![Value::None, Value::None, Value::None]);
        let (normalized, dirty) = codec.normalize_class_meta(Oid::new(1), three.clone());
        assert!(!dirty);
        assert_eq!(normalized, three);

        // First element is not a symbol
        let odd = Value::Tuple(vec![Value::Int(1), Value::None]);
        let (normalized, dirty) = codec.normalize_class_meta(Oid::new(1), odd.clone());
        assert!(!dirty);
        assert_eq!(normalized, odd);

        // Not a tuple at all
        let (normalized, dirty) = codec.normalize_class_meta(Oid::new(1), Value::Int(9));
        assert!(!dirty);
        assert_eq!(normalized, Value::Int(9));
    }

    #[test]
    fn test_process_clean_record_returns_none() {
        let live = registry_with(&[("app.models", "Document")]);
        let mut codec = RecordCodec::new(RenameRules::new(), live);

        let record = record_bytes(
            &Value::Symbol(TypeName::new("app.models", "Document")),
            &Value::Int(3),
        );

        assert!(codec.process(Oid::new(1), &record).unwrap().is_none());
        assert!(!codec.diagnostics().has_any());
    }

    #[test]
    fn test_process_encode_failure_skips_record() {
        // The rule target exists in no registry, so the rewritten record
        // cannot be stored
        let mut rules = RenameRules::new();
        rules
            .merge_source([("app.old Document", "app.nowhere Document")])
            .unwrap();
        let mut codec = RecordCodec::new(rules, registry_with(&[]));

        let record = record_bytes(
            &Value::Symbol(TypeName::new("app.old", "Document")),
            &Value::None,
        );

        let result = codec.process(Oid::new(0x1AF), &record).unwrap();
        assert!(result.is_none());
        assert_eq!(codec.diagnostics().error_count(), 1);

        let errors = codec.diagnostics().errors();
        assert_eq!(errors[0].oid, Some(Oid::new(0x1AF)));
        assert!(errors[0].message.contains("app.nowhere Document"));
    }

    #[test]
    fn test_accessors_reflect_run_state() {
        let live = registry_with(&[("app.models", "Document")]);
        let mut codec = RecordCodec::new(RenameRules::new(), live);

        let record = record_bytes(
            &Value::Symbol(TypeName::new("app.gone", "Widget")),
            &Value::None,
        );
        // Missing type: tolerated, placeholder registered, record unchanged
        assert!(codec.process(Oid::new(1), &record).unwrap().is_none());

        assert!(codec.broken().contains(&TypeName::new("app.gone", "Widget")));
        assert!(codec.live().contains(&TypeName::new("app.models", "Document")));
        assert!(codec.discovered_rules().is_empty());
        assert_eq!(codec.diagnostics().warning_count(), 1);
    }
}
