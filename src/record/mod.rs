//! Record rewriting: rules, resolution, references, and the codec.
//!
//! This module holds everything that operates on whole records. The
//! [`RecordCodec`] is the entry point for a rewrite run; behind it sit the
//! [`RenameRules`] table of explicit, override and discovered mappings, the
//! [`SymbolResolver`] that applies them in precedence order, and the
//! [`PersistentRef`] shapes used to rewrite identifiers embedded in
//! cross-record reference payloads. [`Oid`] identifies records within the
//! caller's store.
//!
//! # How the Pieces Fit
//!
//! The caller builds a rule table and a live [`crate::typesystem::TypeRegistry`],
//! constructs one codec, and feeds it records sequentially. The codec decodes
//! via [`crate::format`] with resolver-backed hooks, accumulates discovered
//! rules and broken placeholders as it goes, and re-encodes exactly the
//! records whose bytes need to change.

mod codec;
mod oid;
mod references;
mod resolver;
mod rules;

pub use codec::{DecodedRecord, RecordCodec};
pub use oid::Oid;
pub use references::PersistentRef;
pub use resolver::SymbolResolver;
pub use rules::RenameRules;
