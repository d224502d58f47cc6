// Copyright 2025 The reclass developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # reclass
//!
//! [![Crates.io](https://img.shields.io/crates/v/reclass.svg)](https://crates.io/crates/reclass)
//! [![Documentation](https://docs.rs/reclass/badge.svg)](https://docs.rs/reclass)
//! [![License](https://img.shields.io/badge/license-Apache--2.0-blue.svg)](https://www.apache.org/licenses/LICENSE-2.0)
//!
//! A record rewriting engine for persistent object stores. When classes are
//! renamed or moved, every record that serialized one of them still carries
//! the old identifier. `reclass` decodes each stored record, rewrites the
//! type identifiers it meets according to a renaming policy, and re-encodes
//! the record only when something actually changed.
//!
//! ## Features
//!
//! - **🔁 Rule-driven renaming** - Explicit rename tables and per-record overrides, merged from any number of sources
//! - **🔍 Implicit discovery** - Renames encoded as aliases in the live type registry are detected, applied, and reported for persisting
//! - **🧩 Broken-type tolerance** - Classes that no longer exist become placeholders instead of failures, and their records survive byte-for-byte
//! - **🔗 Reference rewriting** - Identifiers inside cross-record reference payloads are rewritten in place, including multi-database forms
//! - **🛡️ Storage guard** - No record is written back unless every identifier it names is known to a registry
//! - **📊 Run diagnostics** - Thread-safe collection of per-record findings with severity, category, and record identity
//!
//! ## Quick Start
//!
//! Add `reclass` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! reclass = "0.2"
//! ```
//!
//! ### Using the Prelude
//!
//! For convenient access to the most commonly used types, import the prelude:
//!
//! ```rust
//! use reclass::prelude::*;
//! use std::sync::Arc;
//!
//! // The live type system: Document now lives in app.models
//! let live = TypeRegistry::new();
//! live.register_type(TypeName::new("app.models", "Document"), Rebuild::Constructor);
//!
//! // One explicit rename covers records stored before the move
//! let mut rules = RenameRules::new();
//! rules.merge_source([("app.legacy Document", "app.models Document")])?;
//!
//! let mut codec = RecordCodec::new(rules, Arc::new(live));
//!
//! // A stored record is two documents: class metadata, then state
//! let mut record = encode_value(&Value::Symbol(TypeName::new("app.legacy", "Document")))?;
//! record.extend(encode_value(&Value::None)?);
//!
//! let updated = codec.process(Oid::new(42), &record)?;
//! assert!(updated.is_some(), "the legacy identifier was rewritten");
//! # Ok::<(), reclass::Error>(())
//! ```
//!
//! ### Basic Usage
//!
//! The caller owns storage. A migration walks the store, hands each record to
//! [`RecordCodec::process`], and writes back whatever comes back as `Some`:
//!
//! ```rust
//! use reclass::format::{encode_value, Value};
//! use reclass::{Oid, Rebuild, RecordCodec, RenameRules, TypeName, TypeRegistry};
//! use std::sync::Arc;
//!
//! let live = TypeRegistry::new();
//! live.register_type(TypeName::new("app.models", "Folder"), Rebuild::Constructor);
//!
//! let mut rules = RenameRules::new();
//! rules.merge_source([("app.legacy Folder", "app.models Folder")])?;
//! let mut codec = RecordCodec::new(rules, Arc::new(live));
//!
//! let mut store = vec![(Oid::new(1), {
//!     let mut record = encode_value(&Value::Symbol(TypeName::new("app.legacy", "Folder")))?;
//!     record.extend(encode_value(&Value::Map(vec![]))?);
//!     record
//! })];
//!
//! for (oid, record) in &mut store {
//!     if let Some(replacement) = codec.process(*oid, record)? {
//!         *record = replacement;
//!     }
//! }
//!
//! // A second pass over the rewritten store finds nothing left to do
//! for (oid, record) in &store {
//!     assert!(codec.process(*oid, record)?.is_none());
//! }
//! # Ok::<(), reclass::Error>(())
//! ```
//!
//! ## Architecture
//!
//! `reclass` is organized into a few focused modules:
//!
//! - [`prelude`] - Convenient re-exports of commonly used types and traits
//! - [`format`] - The record wire format: values, documents, and the hookable reader and writer
//! - [`record`] - Record-level machinery: the codec, the renaming policy, oids, and reference payloads
//! - [`typesystem`] - Type identifiers, the live registry, and broken placeholder types
//! - [`diagnostics`] - Thread-safe collection of findings across a run
//! - [`Error`] and [`Result`] - Error handling across the crate
//!
//! ### The Rewrite Pipeline
//!
//! [`RecordCodec`] is the entry point. Each record decodes into two
//! documents, class metadata and state; identifiers in both are resolved
//! in-flight through read hooks, and [`RecordCodec::process`] applies the
//! record's oid override afterwards to the class document's top-level
//! identifier. Resolution consults, in order, the oid override table (a
//! reference payload carries its target oid), the explicit rename table,
//! and the live registry; registry aliases become discovered rules, and
//! names nobody knows become broken placeholders. On the way out, write
//! hooks refuse to store any identifier no registry knows.
//!
//! ## Advanced Usage
//!
//! ### Discovering Renames from the Registry
//!
//! When the live registry already maps an old name to its replacement, no
//! explicit rule is needed. The rename is discovered during processing and
//! reported so it can be persisted for the next run:
//!
//! ```rust
//! use reclass::format::{encode_value, Value};
//! use reclass::{Oid, Rebuild, RecordCodec, RenameRules, TypeName, TypeRegistry};
//! use std::sync::Arc;
//!
//! let live = TypeRegistry::new();
//! live.register_type(TypeName::new("app.new", "Document"), Rebuild::Constructor);
//! live.register_alias(
//!     TypeName::new("app.old", "Document"),
//!     TypeName::new("app.new", "Document"),
//! );
//!
//! let mut codec = RecordCodec::new(RenameRules::new(), Arc::new(live));
//!
//! let mut record = encode_value(&Value::Symbol(TypeName::new("app.old", "Document")))?;
//! record.extend(encode_value(&Value::None)?);
//! assert!(codec.process(Oid::new(1), &record)?.is_some());
//!
//! let discovered = codec.discovered_rules();
//! assert_eq!(discovered["app.old Document"], "app.new Document");
//! # Ok::<(), reclass::Error>(())
//! ```
//!
//! ### Tolerating Missing Types
//!
//! Records whose classes no longer exist anywhere are left untouched. The
//! missing name is registered as a broken placeholder, reported once as a
//! warning, and the record survives byte-for-byte:
//!
//! ```rust
//! use reclass::format::{encode_value, Value};
//! use reclass::{Oid, RecordCodec, RenameRules, TypeName, TypeRegistry};
//! use std::sync::Arc;
//!
//! let mut codec = RecordCodec::new(RenameRules::new(), Arc::new(TypeRegistry::new()));
//!
//! let mut record = encode_value(&Value::Symbol(TypeName::new("app.gone", "Widget")))?;
//! record.extend(encode_value(&Value::None)?);
//!
//! assert!(codec.process(Oid::new(7), &record)?.is_none());
//! assert!(codec.broken().contains(&TypeName::new("app.gone", "Widget")));
//! assert_eq!(codec.diagnostics().warning_count(), 1);
//! # Ok::<(), reclass::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`](Result). Damaged bytes are
//! fatal; a record that merely cannot be rewritten is reported through the
//! diagnostics sink and left in place:
//!
//! ```rust
//! use reclass::{Error, Oid, RecordCodec, RenameRules, TypeRegistry};
//! use std::sync::Arc;
//!
//! let mut codec = RecordCodec::new(RenameRules::new(), Arc::new(TypeRegistry::new()));
//!
//! match codec.process(Oid::new(9), &[0xFF, 0x00, 0x01]) {
//!     Ok(Some(_)) => println!("record rewritten"),
//!     Ok(None) => println!("record already current"),
//!     Err(Error::Malformed { message, .. }) => println!("damaged record: {message}"),
//!     Err(e) => println!("error: {e}"),
//! }
//! ```
//!
//! ## Performance
//!
//! The engine is built for store-scale runs:
//!
//! - Clean records cost a decode and nothing else; re-encoding happens only on change
//! - Each distinct identifier resolves once per document thanks to the wire format's symbol memo
//! - The live registry is lock-free and shared across codecs via [`std::sync::Arc`]
//!
//! ## Testing
//!
//! The test suite covers the wire format bit layouts, the resolution policy,
//! and end-to-end rewriting over crafted stores:
//!
//! ```bash
//! cargo test
//! cargo bench  # criterion benchmarks over representative records
//! ```
#[macro_use]
pub(crate) mod error;

/// Convenient re-exports of the most commonly used types and traits.
///
/// This module provides a curated selection of the most frequently used types
/// from across the reclass library, allowing for convenient glob imports.
///
/// # Example
///
/// ```rust
/// use reclass::prelude::*;
/// use std::sync::Arc;
///
/// let live = TypeRegistry::new();
/// live.register_type(TypeName::new("app.models", "Document"), Rebuild::Constructor);
/// let mut codec = RecordCodec::new(RenameRules::new(), Arc::new(live));
/// # let _ = &mut codec;
/// ```
pub mod prelude;

/// Collection and reporting of findings across a rewrite run.
///
/// Missing types, discovered renames, and records that could not be rewritten
/// are reported here instead of aborting the run. The sink is thread-safe and
/// append-only.
///
/// # Key Types
///
/// - [`diagnostics::Diagnostics`] - The shared, lock-free sink
/// - [`diagnostics::Diagnostic`] - One finding, with optional record identity
/// - [`diagnostics::DiagnosticSeverity`] - Error, warning, or info
/// - [`diagnostics::DiagnosticCategory`] - What part of processing reported it
pub mod diagnostics;

/// The record wire format: values, documents, and the hookable codec.
///
/// A stored record is two serialized documents back to back, each with a
/// private symbol memo. This module decodes them into [`format::Value`] trees
/// and encodes value trees back into bytes. The reader and writer accept
/// hooks ([`format::ReadHooks`], [`format::WriteHooks`]) through which the
/// record layer rewrites type identifiers and guards what reaches storage.
///
/// # Key Types
///
/// - [`format::Value`] - The decoded value tree
/// - [`format::read_document`] / [`format::write_document`] - One document at a time
/// - [`format::decode_value`] / [`format::encode_value`] - Whole-buffer convenience forms
/// - [`format::Parser`] - Cursor-based reading of untrusted bytes
pub mod format;

/// Record-level machinery: the codec, the renaming policy, and references.
///
/// This is where the crate's purpose lives. [`record::RecordCodec`] processes
/// records one at a time; [`record::RenameRules`] holds explicit renames and
/// per-record overrides; [`record::SymbolResolver`] applies the resolution
/// order and tracks what it discovered; [`record::PersistentRef`] models the
/// payloads that point from one record to another.
///
/// # Key Types
///
/// - [`record::RecordCodec`] - Decode, rewrite, re-encode
/// - [`record::RenameRules`] - The renaming policy
/// - [`record::Oid`] - Record identity within a store
/// - [`record::PersistentRef`] - Cross-record reference payloads
pub mod record;

/// Type identifiers, the live registry, and broken placeholder types.
///
/// [`typesystem::TypeName`] is a namespace plus a class name.
/// [`typesystem::TypeRegistry`] describes the types that exist right now,
/// including aliases left behind by renames. Types that exist nowhere get a
/// [`typesystem::BrokenType`] placeholder so their records survive a run.
///
/// # Key Types
///
/// - [`typesystem::TypeName`] - A `namespace name` identifier
/// - [`typesystem::TypeRegistry`] - The live, shareable type registry
/// - [`typesystem::Rebuild`] - How instances of a type are reconstructed
/// - [`typesystem::BrokenRegistry`] - Placeholders for missing types
pub mod typesystem;

/// `reclass` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is
/// always [`Error`]. Used consistently throughout the crate for all fallible
/// operations.
///
/// # Examples
///
/// ```rust
/// use reclass::{Oid, RecordCodec, Result};
///
/// fn rewrite(codec: &mut RecordCodec, oid: Oid, record: &[u8]) -> Result<Option<Vec<u8>>> {
///     codec.process(oid, record)
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// `reclass` Error type
///
/// The main error type for all operations in this crate. Damaged records
/// surface as [`Error::Malformed`] or [`Error::OutOfBounds`]; identifiers
/// that cannot be stored surface as [`Error::TypeNotFound`].
///
/// # Examples
///
/// ```rust
/// use reclass::{Error, Oid, RecordCodec, RenameRules, TypeRegistry};
/// use std::sync::Arc;
///
/// let mut codec = RecordCodec::new(RenameRules::new(), Arc::new(TypeRegistry::new()));
/// match codec.process(Oid::new(1), &[0xFF]) {
///     Err(Error::Malformed { message, .. }) => println!("damaged: {message}"),
///     other => println!("{other:?}"),
/// }
/// ```
pub use error::Error;

/// Main entry point for rewriting store records.
///
/// See [`record::RecordCodec`] for processing records and collecting what a
/// run learned, and [`record::DecodedRecord`] for the two-document split.
///
/// # Example
///
/// ```rust
/// use reclass::{Oid, RecordCodec, RenameRules, TypeRegistry};
/// use std::sync::Arc;
///
/// let mut codec = RecordCodec::new(RenameRules::new(), Arc::new(TypeRegistry::new()));
/// let outcome = codec.process(Oid::new(1), &[0x00, 0x00]);
/// assert!(outcome.unwrap().is_none());
/// ```
pub use record::{DecodedRecord, Oid, PersistentRef, RecordCodec, RenameRules, SymbolResolver};

/// The type identifiers and registries the renaming policy runs against.
///
/// [`TypeName`] spells an identifier, [`TypeRegistry`] holds the live type
/// system, and [`Rebuild`] says how instances of a registered type are
/// reconstructed when loaded.
pub use typesystem::{Rebuild, TypeName, TypeRegistry};
