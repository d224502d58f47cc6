//! Live type registry for record rewriting runs.
//!
//! This module provides the [`TypeRegistry`], the caller-populated catalog of every
//! type the current codebase actually ships. The rewriting engine never imports or
//! reflects on host code; whatever the host wants treated as "live" must be
//! registered here before a run starts. Identifiers found in records are compared
//! against this registry to detect implicit renames (a type still exists, but under
//! a new canonical identifier) and missing types (nothing registered at all).
//!
//! # Key Components
//!
//! - [`TypeRegistry`] - Registry mapping identifiers to type descriptors
//! - [`TypeDescriptor`] - Canonical identifier plus rebuild strategy for one type
//! - [`Rebuild`] - How the host reconstructs instances of the type at load time
//!
//! # Aliases and Canonical Names
//!
//! A type reachable under several identifiers (re-exports, compatibility shims)
//! registers once per alias, with every descriptor pointing at the same canonical
//! identifier. Looking up an alias therefore answers both questions the resolver
//! asks: "does this type still exist?" and "what should records call it now?".
//!
//! # Thread Safety
//!
//! The registry uses a concurrent map (`DashMap`) so the host can keep registering
//! types from other threads while a long rewriting run reads it. The run itself
//! processes records strictly sequentially.
//!
//! # Examples
//!
//! ```rust
//! use reclass::typesystem::{Rebuild, TypeName, TypeRegistry};
//!
//! let registry = TypeRegistry::new();
//!
//! // A type that lives where the records say it does
//! registry.register_type(TypeName::new("app.shapes", "Polygon"), Rebuild::StateOnly);
//!
//! // A moved type: records still say `legacy.shapes Polygon`
//! registry.register_alias(
//!     TypeName::new("legacy.shapes", "Polygon"),
//!     TypeName::new("app.shapes", "Polygon"),
//! );
//!
//! let descriptor = registry
//!     .descriptor(&TypeName::new("legacy.shapes", "Polygon"))
//!     .unwrap();
//! assert_eq!(descriptor.canonical, TypeName::new("app.shapes", "Polygon"));
//! ```

use dashmap::DashMap;

use crate::typesystem::{broken, TypeName};

/// How the host reconstructs instances of a type when records are loaded.
///
/// The rewriting engine itself only consults [`TypeDescriptor::canonical`]; the
/// strategy travels with the descriptor so that hosts driving a store can build
/// instances for the types they registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rebuild {
    /// Replay the recorded constructor arguments, then apply the captured state.
    Constructor,

    /// Create a fresh instance and apply the captured state directly.
    StateOnly,
}

/// Descriptor for one registered type.
///
/// `canonical` is the identifier records should carry going forward. For a type
/// registered under its own identifier the two are equal; for an alias they
/// differ, which is exactly the signal the resolver turns into an implicit
/// rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    /// The identifier this type should be stored under.
    pub canonical: TypeName,

    /// How instances are reconstructed at load time.
    pub rebuild: Rebuild,
}

/// Registry of the types the current codebase provides.
///
/// Lookup never fails with an error: an identifier is either known (with its
/// descriptor) or unknown, and unknown identifiers are a tolerated condition
/// handled by the broken placeholder machinery.
#[derive(Debug)]
pub struct TypeRegistry {
    types: DashMap<TypeName, TypeDescriptor>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Creates a registry with the builtin helpers pre-registered.
    ///
    /// The rebuild helper used by re-encoded broken records is always live, so
    /// records rewritten into rebuild form keep loading on later runs.
    #[must_use]
    pub fn new() -> Self {
        let registry = TypeRegistry {
            types: DashMap::new(),
        };

        registry.initialize_builtins();
        registry
    }

    fn initialize_builtins(&self) {
        self.register_type(broken::rebuild_symbol(), Rebuild::Constructor);
    }

    /// Registers a type under its canonical identifier.
    ///
    /// Re-registering the same identifier replaces the previous descriptor.
    pub fn register_type(&self, canonical: TypeName, rebuild: Rebuild) {
        self.types
            .insert(canonical.clone(), TypeDescriptor { canonical, rebuild });
    }

    /// Registers an additional identifier for an already existing type.
    ///
    /// Records referring to `alias` resolve to `canonical`. The canonical
    /// identifier is registered as well if it was not yet present, so that
    /// rewritten records resolve cleanly on the next pass. The rebuild strategy
    /// is inherited from the canonical registration when one exists.
    pub fn register_alias(&self, alias: TypeName, canonical: TypeName) {
        let rebuild = self
            .types
            .get(&canonical)
            .map_or(Rebuild::Constructor, |d| d.rebuild);

        if !self.types.contains_key(&canonical) {
            self.register_type(canonical.clone(), rebuild);
        }

        self.types
            .insert(alias, TypeDescriptor { canonical, rebuild });
    }

    /// Looks up the descriptor for an identifier.
    ///
    /// Returns `None` for unknown identifiers; the caller decides whether that
    /// means "missing type" (records) or simply "not registered" (host code).
    #[must_use]
    pub fn descriptor(&self, name: &TypeName) -> Option<TypeDescriptor> {
        self.types.get(name).map(|entry| entry.value().clone())
    }

    /// Returns the canonical identifier for `name`, if the type is known.
    #[must_use]
    pub fn canonical(&self, name: &TypeName) -> Option<TypeName> {
        self.types.get(name).map(|entry| entry.value().canonical.clone())
    }

    /// Returns true if the identifier is registered (canonically or as alias).
    #[must_use]
    pub fn contains(&self, name: &TypeName) -> bool {
        self.types.contains_key(name)
    }

    /// Number of registered identifiers, builtins included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if no identifiers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
