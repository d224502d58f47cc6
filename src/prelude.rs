//! # reclass Prelude
//!
//! This module provides a convenient prelude for the most commonly used types
//! and traits from the reclass library. Import this module to get quick access
//! to the essential types for rewriting store records.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all reclass operations
pub use crate::Error;

/// The result type used throughout reclass
pub use crate::Result;

// ================================================================================================
// Main Entry Point
// ================================================================================================

/// Record processing: decode, rewrite, re-encode
pub use crate::record::{DecodedRecord, RecordCodec};

// ================================================================================================
// Renaming Policy
// ================================================================================================

/// Explicit renames, per-record overrides, and the resolution engine
pub use crate::record::{Oid, RenameRules, SymbolResolver};

/// Cross-record reference payloads
pub use crate::record::PersistentRef;

// ================================================================================================
// Type System
// ================================================================================================

/// Type identifiers and the live registry
pub use crate::typesystem::{Rebuild, TypeDescriptor, TypeName, TypeRegistry};

/// Placeholders for types that no longer exist anywhere
pub use crate::typesystem::{rebuild_symbol, BrokenNamespace, BrokenRegistry, BrokenType};

// ================================================================================================
// Wire Format
// ================================================================================================

/// Decoded value trees, serialized instances, and wire tags
pub use crate::format::{Instance, Tag, Value};

/// Document-level and whole-buffer codec entry points
pub use crate::format::{decode_value, encode_value, read_document, write_document, Document};

/// Hooks for intercepting identifiers and references during decode and encode
pub use crate::format::{IdentityHooks, ReadHooks, WriteHooks};

/// Low-level cursor over untrusted bytes
pub use crate::format::Parser;

// ================================================================================================
// Diagnostics
// ================================================================================================

/// Findings collected across a rewrite run
pub use crate::diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticSeverity, Diagnostics};
