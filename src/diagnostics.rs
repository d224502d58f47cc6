//! Diagnostics collection for record rewriting runs.
//!
//! This module provides types for collecting and reporting diagnostic messages
//! while records are decoded, rewritten and re-encoded. It supports lenient
//! migration scenarios where stores reference types that no longer exist: such
//! records should be reported but must not stop the run.
//!
//! # Architecture
//!
//! The diagnostics container is shared across the rewriting pipeline:
//! - **SymbolResolver**: Reports discovered implicit renames and missing types
//! - **RecordCodec**: Reports records skipped because re-encoding failed
//!
//! The [`Diagnostics`] container uses `boxcar::Vec` for thread-safe, lock-free
//! append operations. A run over a store is strictly sequential, but the
//! container can be drained or inspected from another thread while a long run
//! is in progress.
//!
//! # Key Components
//!
//! - [`Diagnostics`] - Thread-safe container for diagnostic entries
//! - [`Diagnostic`] - Individual diagnostic entry with severity and context
//! - [`DiagnosticSeverity`] - Severity level (Info, Warning, Error)
//! - [`DiagnosticCategory`] - Category of the diagnostic source
//!
//! # Usage Examples
//!
//! ## Collecting Diagnostics During a Run
//!
//! ```rust,no_run
//! use reclass::diagnostics::{Diagnostics, DiagnosticSeverity, DiagnosticCategory};
//! use std::sync::Arc;
//!
//! let diagnostics = Arc::new(Diagnostics::new());
//!
//! // Report a type that no registry knows
//! diagnostics.warning(
//!     DiagnosticCategory::Type,
//!     "Missing type 'legacy.shapes Polygon', registered broken placeholder",
//! );
//!
//! // Report a record that could not be re-encoded
//! diagnostics.error(
//!     DiagnosticCategory::Record,
//!     "Could not re-encode record, keeping original bytes",
//! );
//!
//! // Check if any diagnostics were collected
//! if diagnostics.has_errors() {
//!     println!("Errors found: {}", diagnostics.error_count());
//! }
//!
//! // Iterate over all diagnostics
//! for entry in diagnostics.iter() {
//!     println!("[{:?}] {}: {}", entry.severity, entry.category, entry.message);
//! }
//! ```
//!
//! ## Filtering by Category
//!
//! ```rust,no_run
//! use reclass::diagnostics::{Diagnostics, DiagnosticCategory};
//! use std::sync::Arc;
//!
//! let diagnostics = Arc::new(Diagnostics::new());
//! // ... a run happens ...
//!
//! // Get only the discovered-rename notices
//! let rule_events: Vec<_> = diagnostics
//!     .iter()
//!     .filter(|d| d.category == DiagnosticCategory::Rule)
//!     .collect();
//!
//! println!("Discovered renames: {}", rule_events.len());
//! ```
//!
//! # Thread Safety
//!
//! All types in this module are [`Send`] and [`Sync`]. The [`Diagnostics`] container
//! uses `boxcar::Vec` internally, which provides lock-free concurrent append operations.
//! Multiple threads can safely add diagnostics simultaneously without coordination.
//!
//! # Integration
//!
//! This module integrates with:
//! - [`crate::record`] - The codec and resolver report events as they process records
//! - [`crate::typesystem`] - Broken placeholder registration is reported here

use std::fmt::{self, Write};

use crate::record::Oid;
use crate::typesystem::TypeName;

/// Severity level of a diagnostic entry.
///
/// Determines how the diagnostic should be treated and displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticSeverity {
    /// Informational message, not indicating a problem.
    ///
    /// Used for noting expected rewriting activity, such as an implicit
    /// rename discovered from the live type registry.
    Info,

    /// Warning about a recovered condition.
    ///
    /// The run continues, but some data is standing in for the real thing:
    /// a missing type was replaced by a broken placeholder, for example.
    Warning,

    /// Error indicating a record that could not be rewritten.
    ///
    /// The run continues and the original bytes of the affected record are
    /// kept, but the record was not migrated.
    Error,
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticSeverity::Info => write!(f, "INFO"),
            DiagnosticSeverity::Warning => write!(f, "WARN"),
            DiagnosticSeverity::Error => write!(f, "ERROR"),
        }
    }
}

/// Category indicating the source or type of diagnostic.
///
/// Helps classify diagnostics for filtering and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    /// Rename rule activity.
    ///
    /// Examples: implicit renames discovered by comparing on-disk identifiers
    /// against the live type registry.
    Rule,

    /// Type resolution issues.
    ///
    /// Examples: identifiers known to neither the rule table nor the live
    /// registry, broken placeholder registration.
    Type,

    /// Per-record processing issues.
    ///
    /// Examples: records skipped because the rewritten form could not be
    /// encoded.
    Record,

    /// General issues not fitting other categories.
    ///
    /// Examples: rejected rule sources, inconsistent override tables.
    General,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Rule => write!(f, "Rule"),
            DiagnosticCategory::Type => write!(f, "Type"),
            DiagnosticCategory::Record => write!(f, "Record"),
            DiagnosticCategory::General => write!(f, "General"),
        }
    }
}

/// A single diagnostic entry with context information.
///
/// Contains the severity, category, message, and optional location information
/// for a diagnostic reported while processing records.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Severity level of this diagnostic.
    pub severity: DiagnosticSeverity,

    /// Category indicating the source of this diagnostic.
    pub category: DiagnosticCategory,

    /// Human-readable description of the issue.
    pub message: String,

    /// Optional object id of the record the issue was found in.
    pub oid: Option<Oid>,

    /// Optional type identifier related to the issue.
    pub type_name: Option<TypeName>,
}

impl Diagnostic {
    /// Creates a new diagnostic entry.
    ///
    /// # Arguments
    ///
    /// * `severity` - Severity level of the diagnostic
    /// * `category` - Category of the diagnostic source
    /// * `message` - Human-readable description
    pub fn new(
        severity: DiagnosticSeverity,
        category: DiagnosticCategory,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            message: message.into(),
            oid: None,
            type_name: None,
        }
    }

    /// Adds the object id of the affected record to the diagnostic.
    #[must_use]
    pub fn with_oid(mut self, oid: Oid) -> Self {
        self.oid = Some(oid);
        self
    }

    /// Adds the related type identifier to the diagnostic.
    #[must_use]
    pub fn with_type_name(mut self, type_name: TypeName) -> Self {
        self.type_name = Some(type_name);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.category, self.message)?;

        if let Some(oid) = self.oid {
            write!(f, " (oid: {})", oid)?;
        }

        if let Some(type_name) = &self.type_name {
            write!(f, " (type: {})", type_name)?;
        }

        Ok(())
    }
}

/// Thread-safe container for collecting diagnostic entries.
///
/// Uses `boxcar::Vec` internally for lock-free concurrent append operations.
/// Multiple threads can safely add diagnostics simultaneously.
///
/// # Example
///
/// ```rust,no_run
/// use reclass::diagnostics::{Diagnostics, DiagnosticCategory};
/// use std::sync::Arc;
///
/// let diagnostics = Arc::new(Diagnostics::new());
///
/// // Can be cloned and shared across threads
/// let diag_clone = Arc::clone(&diagnostics);
/// std::thread::spawn(move || {
///     diag_clone.warning(DiagnosticCategory::Type, "Missing type");
/// });
///
/// // Original can still be used
/// diagnostics.error(DiagnosticCategory::Record, "Record skipped");
/// ```
#[derive(Debug)]
pub struct Diagnostics {
    entries: boxcar::Vec<Diagnostic>,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl Diagnostics {
    /// Creates a new empty diagnostics container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: boxcar::Vec::new(),
        }
    }

    /// Adds an informational diagnostic.
    ///
    /// # Arguments
    ///
    /// * `category` - Category of the diagnostic
    /// * `message` - Description of the observation
    pub fn info(&self, category: DiagnosticCategory, message: impl Into<String>) {
        self.push(Diagnostic::new(DiagnosticSeverity::Info, category, message));
    }

    /// Adds a warning diagnostic.
    ///
    /// # Arguments
    ///
    /// * `category` - Category of the diagnostic
    /// * `message` - Description of the issue
    pub fn warning(&self, category: DiagnosticCategory, message: impl Into<String>) {
        self.push(Diagnostic::new(DiagnosticSeverity::Warning, category, message));
    }

    /// Adds an error diagnostic.
    ///
    /// # Arguments
    ///
    /// * `category` - Category of the diagnostic
    /// * `message` - Description of the error
    pub fn error(&self, category: DiagnosticCategory, message: impl Into<String>) {
        self.push(Diagnostic::new(DiagnosticSeverity::Error, category, message));
    }

    /// Adds a diagnostic entry directly.
    ///
    /// Use this for diagnostics that need additional context like the
    /// object id or the related type identifier.
    pub fn push(&self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    /// Returns true if any diagnostics have been collected.
    pub fn has_any(&self) -> bool {
        self.entries.count() > 0
    }

    /// Returns true if any error-level diagnostics have been collected.
    pub fn has_errors(&self) -> bool {
        self.entries
            .iter()
            .any(|(_, d)| d.severity == DiagnosticSeverity::Error)
    }

    /// Returns true if any warning-level diagnostics have been collected.
    pub fn has_warnings(&self) -> bool {
        self.entries
            .iter()
            .any(|(_, d)| d.severity == DiagnosticSeverity::Warning)
    }

    /// Returns the total number of diagnostics.
    pub fn count(&self) -> usize {
        self.entries.count()
    }

    /// Returns the number of error-level diagnostics.
    pub fn error_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, d)| d.severity == DiagnosticSeverity::Error)
            .count()
    }

    /// Returns the number of warning-level diagnostics.
    pub fn warning_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, d)| d.severity == DiagnosticSeverity::Warning)
            .count()
    }

    /// Returns the number of info-level diagnostics.
    pub fn info_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|(_, d)| d.severity == DiagnosticSeverity::Info)
            .count()
    }

    /// Returns an iterator over all diagnostics in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().map(|(_, d)| d)
    }

    /// Returns all errors as a vector.
    pub fn errors(&self) -> Vec<&Diagnostic> {
        self.entries
            .iter()
            .filter(|(_, d)| d.severity == DiagnosticSeverity::Error)
            .map(|(_, d)| d)
            .collect()
    }

    /// Returns all warnings as a vector.
    pub fn warnings(&self) -> Vec<&Diagnostic> {
        self.entries
            .iter()
            .filter(|(_, d)| d.severity == DiagnosticSeverity::Warning)
            .map(|(_, d)| d)
            .collect()
    }

    /// Returns diagnostics filtered by category.
    pub fn by_category(&self, category: DiagnosticCategory) -> Vec<&Diagnostic> {
        self.entries
            .iter()
            .filter(|(_, d)| d.category == category)
            .map(|(_, d)| d)
            .collect()
    }

    /// Formats a summary of all diagnostics for display.
    ///
    /// Groups diagnostics by severity for readable output.
    pub fn summary(&self) -> String {
        let mut output = String::new();

        let error_count = self.error_count();
        let warning_count = self.warning_count();
        let info_count = self.info_count();

        let _ = writeln!(
            output,
            "Diagnostics: {} error(s), {} warning(s), {} info(s)",
            error_count, warning_count, info_count
        );

        if error_count > 0 {
            output.push_str("\nErrors:\n");
            for diag in self.errors() {
                let _ = writeln!(output, "  {diag}");
            }
        }

        if warning_count > 0 {
            output.push_str("\nWarnings:\n");
            for diag in self.warnings() {
                let _ = writeln!(output, "  {diag}");
            }
        }

        output
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}
