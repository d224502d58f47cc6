//! Rename rule table with per-record overrides and discovered rules.
//!
//! [`RenameRules`] collects three kinds of mappings that drive rewriting:
//!
//! - **Renames** - explicit `old identifier -> new identifier` rules merged
//!   from caller-supplied sources, applied to every matching occurrence
//! - **Overrides** - per-record mappings keyed by [`Oid`] that replace a
//!   record's class identifier regardless of the rename table
//! - **Discovered rules** - implicit renames found during a run by comparing
//!   stored identifiers against the live registry, kept for reporting and fed
//!   back into the rename table so later records take the fast path
//!
//! Sources merge left to right and the last source wins for a conflicting
//! key, so callers control precedence by merge order.
//!
//! # Usage Examples
//!
//! ```rust
//! use reclass::{RenameRules, TypeName};
//!
//! let mut rules = RenameRules::new();
//! rules.merge_source([("app.old Document", "app.new Document")])?;
//!
//! let target = rules.lookup(&TypeName::new("app.old", "Document"));
//! assert_eq!(target, Some(&TypeName::new("app.new", "Document")));
//! # Ok::<(), reclass::Error>(())
//! ```

use std::collections::{BTreeMap, HashMap};

use crate::{record::Oid, typesystem::TypeName, Result};

/// Rename rules, per-record overrides, and rules discovered during a run.
#[derive(Debug, Default)]
pub struct RenameRules {
    renames: HashMap<TypeName, TypeName>,
    overrides: HashMap<Oid, TypeName>,
    discovered: BTreeMap<TypeName, TypeName>,
}

impl RenameRules {
    /// Create an empty rule table.
    #[must_use]
    pub fn new() -> Self {
        RenameRules::default()
    }

    /// Merge one source of rename rules, given as `"namespace name"` pairs.
    ///
    /// Sources merge in call order and a later source wins for a key that is
    /// already mapped.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidIdentifier`] when either side of a pair
    /// is not a valid space-separated identifier. Pairs before the invalid
    /// one are already merged.
    pub fn merge_source<'a, I>(&mut self, source: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (from, to) in source {
            self.set_rename(TypeName::parse(from)?, TypeName::parse(to)?);
        }
        Ok(())
    }

    /// Add or replace a single rename rule.
    pub fn set_rename(&mut self, from: TypeName, to: TypeName) {
        self.renames.insert(from, to);
    }

    /// Merge one source of per-record overrides, given as hex oid strings
    /// mapped to `"namespace name"` targets.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidIdentifier`] for an unparsable oid or
    /// target identifier.
    pub fn merge_overrides<'a, I>(&mut self, source: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (oid, target) in source {
            self.set_override(Oid::from_hex(oid)?, TypeName::parse(target)?);
        }
        Ok(())
    }

    /// Add or replace the override for one record.
    pub fn set_override(&mut self, oid: Oid, target: TypeName) {
        self.overrides.insert(oid, target);
    }

    /// Look up the rename target for an identifier.
    #[must_use]
    pub fn lookup(&self, name: &TypeName) -> Option<&TypeName> {
        self.renames.get(name)
    }

    /// Look up the override target for a record.
    #[must_use]
    pub fn override_for(&self, oid: Oid) -> Option<&TypeName> {
        self.overrides.get(&oid)
    }

    /// Record an implicit rule discovered against the live registry.
    ///
    /// The first discovery for an identifier wins; the mapping also joins the
    /// rename table so later occurrences resolve without a registry lookup.
    pub fn record_discovered(&mut self, from: TypeName, to: TypeName) {
        self.renames
            .entry(from.clone())
            .or_insert_with(|| to.clone());
        self.discovered.entry(from).or_insert(to);
    }

    /// The rules discovered so far, in identifier order.
    #[must_use]
    pub fn discovered(&self) -> &BTreeMap<TypeName, TypeName> {
        &self.discovered
    }

    /// The discovered rules as `"namespace name"` string pairs, ready for a
    /// caller to persist as a new rule source.
    #[must_use]
    pub fn discovered_pairs(&self) -> BTreeMap<String, String> {
        self.discovered
            .iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect()
    }

    /// Number of rename rules, including discovered ones.
    #[must_use]
    pub fn rename_count(&self) -> usize {
        self.renames.len()
    }

    /// Number of per-record overrides.
    #[must_use]
    pub fn override_count(&self) -> usize {
        self.overrides.len()
    }
}
