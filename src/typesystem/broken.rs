//! Broken placeholder registry for types that no longer exist.
//!
//! Stores outlive code. A record can name a type whose namespace was deleted
//! years ago, and a rewriting run must still read and re-emit that record
//! byte-faithfully. This module provides the tolerance layer: when the resolver
//! finds an identifier that neither the rule table nor the live
//! [`TypeRegistry`](crate::typesystem::TypeRegistry) knows, it registers a
//! placeholder here and the run continues.
//!
//! Placeholders are built as a namespace chain: registering
//! `legacy.shapes Polygon` creates nodes for `legacy` and `legacy.shapes`
//! (outer to inner, each cached by its full path so repeats cost nothing) and
//! binds a [`BrokenType`] stand-in named `Polygon` under the innermost node.
//! The stand-in does three things and nothing else:
//!
//! 1. constructs without running any initialization logic,
//! 2. iterates as an empty sequence,
//! 3. re-encodes instances through [`BrokenType::rebuild_record`], a call to the
//!    builtin rebuild helper that captures the original identifier, constructor
//!    arguments and state, so nothing is lost if the type ever comes back.

use std::collections::{BTreeMap, BTreeSet};

use crate::format::{Instance, Value};
use crate::typesystem::TypeName;

/// Identifier of the builtin helper that reconstructs broken instances.
///
/// Pre-registered as live by [`TypeRegistry::new`](crate::typesystem::TypeRegistry::new),
/// so records rewritten into rebuild form keep resolving on later passes.
#[must_use]
pub fn rebuild_symbol() -> TypeName {
    TypeName::new("reclass.broken", "rebuild")
}

/// Stand-in bound under a placeholder namespace for one missing type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokenType {
    name: TypeName,
}

impl BrokenType {
    /// Creates the stand-in. No initialization logic runs, by contract.
    #[must_use]
    pub fn new(name: TypeName) -> Self {
        BrokenType { name }
    }

    /// The original identifier this stand-in replaces.
    #[must_use]
    pub fn name(&self) -> &TypeName {
        &self.name
    }

    /// Iterates the stand-in as an empty sequence.
    ///
    /// Traversals that walk containers of instances see nothing here instead
    /// of failing.
    pub fn iter(&self) -> std::iter::Empty<&Value> {
        std::iter::empty()
    }

    /// Builds the rebuild-call form this instance re-encodes as.
    ///
    /// The emitted instance calls the builtin rebuild helper with the original
    /// namespace and name prepended to the captured constructor arguments, and
    /// carries the captured state unchanged.
    #[must_use]
    pub fn rebuild_record(&self, args: &[Value], state: &Value) -> Instance {
        let mut rebuild_args = Vec::with_capacity(args.len() + 2);
        rebuild_args.push(Value::Str(self.name.namespace().to_string()));
        rebuild_args.push(Value::Str(self.name.name().to_string()));
        rebuild_args.extend(args.iter().cloned());

        Instance::new(rebuild_symbol(), rebuild_args, state.clone())
    }
}

impl<'a> IntoIterator for &'a BrokenType {
    type Item = &'a Value;
    type IntoIter = std::iter::Empty<&'a Value>;

    fn into_iter(self) -> Self::IntoIter {
        std::iter::empty()
    }
}

/// One placeholder namespace node in the chain.
#[derive(Debug, Clone)]
pub struct BrokenNamespace {
    name: String,
    path: String,
    children: BTreeSet<String>,
    types: BTreeMap<String, BrokenType>,
}

impl BrokenNamespace {
    fn new(name: &str, path: &str) -> Self {
        BrokenNamespace {
            name: name.to_string(),
            path: path.to_string(),
            children: BTreeSet::new(),
            types: BTreeMap::new(),
        }
    }

    /// Final segment of this namespace's path.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full dotted path of this namespace.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Names of directly nested placeholder namespaces.
    #[must_use]
    pub fn children(&self) -> &BTreeSet<String> {
        &self.children
    }

    /// Returns true if a stand-in with this name is bound here.
    #[must_use]
    pub fn contains_type(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Iterates the stand-ins bound under this namespace.
    pub fn types(&self) -> impl Iterator<Item = &BrokenType> {
        self.types.values()
    }
}

/// Registry of placeholder namespaces and their stand-ins.
///
/// Registration is idempotent: the chain is cached by full path, and a type
/// already bound stays bound. Warning the operator about a missing type is the
/// resolver's job, not this registry's, which is why registration is silent.
#[derive(Debug, Default)]
pub struct BrokenRegistry {
    namespaces: BTreeMap<String, BrokenNamespace>,
}

impl BrokenRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        BrokenRegistry {
            namespaces: BTreeMap::new(),
        }
    }

    /// Registers a placeholder for `name`, building its namespace chain.
    pub fn register(&mut self, name: &TypeName) {
        let mut path = String::new();
        let mut parent: Option<String> = None;

        for segment in name.namespace().split('.') {
            if !path.is_empty() {
                path.push('.');
            }
            path.push_str(segment);

            if !self.namespaces.contains_key(&path) {
                self.namespaces
                    .insert(path.clone(), BrokenNamespace::new(segment, &path));
            }

            if let Some(parent_path) = &parent {
                if let Some(node) = self.namespaces.get_mut(parent_path) {
                    node.children.insert(segment.to_string());
                }
            }

            parent = Some(path.clone());
        }

        if let Some(node) = self.namespaces.get_mut(name.namespace()) {
            node.types
                .entry(name.name().to_string())
                .or_insert_with(|| BrokenType::new(name.clone()));
        }
    }

    /// Returns true if a stand-in for this identifier is registered.
    #[must_use]
    pub fn contains(&self, name: &TypeName) -> bool {
        self.namespaces
            .get(name.namespace())
            .is_some_and(|node| node.contains_type(name.name()))
    }

    /// Looks up the stand-in for an identifier.
    #[must_use]
    pub fn get(&self, name: &TypeName) -> Option<&BrokenType> {
        self.namespaces
            .get(name.namespace())?
            .types
            .get(name.name())
    }

    /// Looks up a placeholder namespace node by full path.
    #[must_use]
    pub fn namespace(&self, path: &str) -> Option<&BrokenNamespace> {
        self.namespaces.get(path)
    }

    /// Number of placeholder namespace nodes.
    #[must_use]
    pub fn namespace_count(&self) -> usize {
        self.namespaces.len()
    }

    /// Number of bound stand-ins across all namespaces.
    #[must_use]
    pub fn type_count(&self) -> usize {
        self.namespaces.values().map(|n| n.types.len()).sum()
    }

    /// Returns true if nothing has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }
}
