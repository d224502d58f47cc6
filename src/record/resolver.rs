//! Type identifier resolution against rules, overrides, and the live registry.
//!
//! [`SymbolResolver`] is the policy core of a rewrite run. Every type
//! identifier pulled out of a record goes through [`SymbolResolver::resolve`],
//! which applies a fixed precedence:
//!
//! 1. A per-record override for the record's oid, returned as supplied
//!    without verification.
//! 2. The rename rule table, including rules discovered earlier in the run.
//! 3. The live type registry: a known identifier resolves to its canonical
//!    name (a difference is recorded as a newly discovered rule); an unknown
//!    identifier is tolerated by registering a broken placeholder and keeping
//!    the stored spelling.
//!
//! Each call reports whether it changed anything, so the caller can tell
//! rewritten records from untouched ones. Unknown identifiers warn once per
//! distinct name for the life of the resolver; repeats stay silent.
//!
//! # Key Components
//!
//! - [`SymbolResolver::resolve`] - Resolution with optional oid context
//! - [`SymbolResolver::resolve_reference`] - Rewriting for reference payloads
//! - [`SymbolResolver::knows`] - The write-side guard predicate
//!
//! # Thread Safety
//!
//! The resolver is single-threaded by design; a run processes records
//! strictly sequentially. The live registry behind it may be shared and
//! concurrently readable, but resolution state (discovered rules, the warned
//! set, broken placeholders) belongs to one resolver.

use std::collections::HashSet;
use std::sync::Arc;

use crate::{
    diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticSeverity, Diagnostics},
    format::Instance,
    record::{Oid, PersistentRef, RenameRules},
    typesystem::{BrokenRegistry, TypeName, TypeRegistry},
};

/// Resolves stored type identifiers to their current names.
///
/// Owns the rule table and the broken placeholder registry for one run and
/// shares the live registry and diagnostics sink with its codec.
pub struct SymbolResolver {
    rules: RenameRules,
    live: Arc<TypeRegistry>,
    broken: BrokenRegistry,
    warned: HashSet<TypeName>,
    diagnostics: Arc<Diagnostics>,
}

impl SymbolResolver {
    /// Create a resolver over a rule table and a live registry.
    #[must_use]
    pub fn new(rules: RenameRules, live: Arc<TypeRegistry>, diagnostics: Arc<Diagnostics>) -> Self {
        SymbolResolver {
            rules,
            live,
            broken: BrokenRegistry::new(),
            warned: HashSet::new(),
            diagnostics,
        }
    }

    /// Resolve one identifier, in override, rule table, live registry order.
    ///
    /// Returns the identifier to store and whether it differs from what the
    /// record said. Missing types are tolerated: they keep their stored
    /// spelling, gain a broken placeholder, and warn once per distinct name.
    pub fn resolve(&mut self, name: TypeName, oid: Option<Oid>) -> (TypeName, bool) {
        if let Some(oid) = oid {
            if let Some(target) = self.rules.override_for(oid) {
                return (target.clone(), true);
            }
        }

        if let Some(target) = self.rules.lookup(&name) {
            return (target.clone(), true);
        }

        match self.live.canonical(&name) {
            None => {
                if self.warned.insert(name.clone()) {
                    self.diagnostics.push(
                        Diagnostic::new(
                            DiagnosticSeverity::Warning,
                            DiagnosticCategory::Type,
                            format!("Missing factory for {name}"),
                        )
                        .with_type_name(name.clone()),
                    );
                }
                self.broken.register(&name);
                (name, false)
            }
            Some(canonical) => {
                if canonical == name {
                    (name, false)
                } else {
                    self.diagnostics.push(
                        Diagnostic::new(
                            DiagnosticSeverity::Info,
                            DiagnosticCategory::Rule,
                            format!("New implicit rule detected - {name} to {canonical}"),
                        )
                        .with_type_name(name.clone()),
                    );
                    self.rules.record_discovered(name, canonical.clone());
                    (canonical, true)
                }
            }
        }
    }

    /// Rewrite the class identifier embedded in a reference payload.
    ///
    /// An override for the payload's target oid replaces the class identifier
    /// with the override target, even when the payload carried none. The
    /// target is canonicalized through the live registry when the registry
    /// knows it; a target the registry does not know is substituted as
    /// supplied and left for the write-side guard. Without an override, a
    /// present class identifier resolves like any other. Opaque payloads are
    /// never touched.
    pub fn resolve_reference(&mut self, reference: PersistentRef) -> (PersistentRef, bool) {
        match reference {
            PersistentRef::Opaque(raw) => (PersistentRef::Opaque(raw), false),
            PersistentRef::Simple { oid, class_info } => {
                let (class_info, dirty) = self.resolve_reference_class(oid, class_info);
                (PersistentRef::Simple { oid, class_info }, dirty)
            }
            PersistentRef::MultiDatabase {
                database,
                oid,
                class_info,
            } => {
                let (class_info, dirty) = self.resolve_reference_class(oid, class_info);
                (
                    PersistentRef::MultiDatabase {
                        database,
                        oid,
                        class_info,
                    },
                    dirty,
                )
            }
        }
    }

    fn resolve_reference_class(
        &mut self,
        oid: Oid,
        class_info: Option<TypeName>,
    ) -> (Option<TypeName>, bool) {
        // The override keys on the target oid, so it applies even to a
        // payload that carried no class identifier
        if let Some(target) = self.rules.override_for(oid) {
            let target = target.clone();
            let resolved = self.live.canonical(&target).unwrap_or(target);
            return (Some(resolved), true);
        }

        match class_info {
            Some(name) => {
                let (resolved, dirty) = self.resolve(name, Some(oid));
                (Some(resolved), dirty)
            }
            None => (None, false),
        }
    }

    /// True when some registry can make sense of the identifier.
    ///
    /// This is the write-side guard predicate: a record may only be written
    /// with identifiers the live registry or the broken placeholder registry
    /// knows.
    #[must_use]
    pub fn knows(&self, name: &TypeName) -> bool {
        self.live.contains(name) || self.broken.contains(name)
    }

    /// The placeholder stand-in for an instance of a broken type, if its
    /// class has one registered.
    pub(crate) fn broken_substitute(&self, instance: &Instance) -> Option<Instance> {
        self.broken
            .get(&instance.class)
            .map(|broken| broken.rebuild_record(&instance.args, &instance.state))
    }

    /// The rule table, including rules discovered so far.
    #[must_use]
    pub fn rules(&self) -> &RenameRules {
        &self.rules
    }

    /// The broken placeholder registry for this run.
    #[must_use]
    pub fn broken(&self) -> &BrokenRegistry {
        &self.broken
    }

    /// The shared live registry.
    #[must_use]
    pub fn live(&self) -> &TypeRegistry {
        &self.live
    }
}
