//! Type identity and type knowledge for record rewriting.
//!
//! This module carries everything the engine knows about types: how they are
//! identified inside records, which types the current codebase actually provides,
//! and how types that no longer exist anywhere are tolerated.
//!
//! # Key Components
//!
//! - [`TypeName`]: Fully qualified identifier (`namespace name`) as stored in records
//! - [`TypeRegistry`]: Caller-populated catalog of live types and their canonical names
//! - [`TypeDescriptor`] / [`Rebuild`]: Per-type metadata the host needs at load time
//! - [`BrokenRegistry`] / [`BrokenType`]: Placeholder machinery for missing types
//!
//! # How the Pieces Fit
//!
//! The resolver asks the live registry about every identifier it meets. A hit
//! with a different canonical name is an implicit rename; a miss sends the
//! identifier to the broken registry, which synthesizes a placeholder namespace
//! chain so the record keeps round-tripping. Neither registry ever rejects an
//! identifier outright: "unknown" is an answer, not an error.
//!
//! # Examples
//!
//! ```rust
//! use reclass::typesystem::{Rebuild, TypeName, TypeRegistry};
//!
//! let registry = TypeRegistry::new();
//! registry.register_type(TypeName::new("app.shapes", "Polygon"), Rebuild::StateOnly);
//!
//! let name = TypeName::parse("app.shapes Polygon").unwrap();
//! assert!(registry.contains(&name));
//! ```

pub mod broken;
mod registry;
mod typename;

pub use broken::{rebuild_symbol, BrokenNamespace, BrokenRegistry, BrokenType};
pub use registry::{Rebuild, TypeDescriptor, TypeRegistry};
pub use typename::TypeName;
