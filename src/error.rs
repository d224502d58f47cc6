use thiserror::Error;

use crate::typesystem::TypeName;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// This enum covers all possible error conditions that can occur while decoding, rewriting and
/// re-encoding serialized object records. Each variant provides specific context about the
/// failure mode to enable appropriate error handling.
///
/// Decode-side failures ([`Error::Malformed`], [`Error::OutOfBounds`], [`Error::Empty`]) are
/// fatal for a run: the input bytes themselves are damaged, and continuing would risk writing
/// corrupt records back to the store. [`Error::TypeNotFound`] is raised by the encode guard
/// when a record would be written with a type identifier that is known to neither the live
/// type registry nor the broken placeholder registry; record processing catches it, reports
/// the record, and leaves the original bytes in place.
///
/// # Error Categories
///
/// ## Record Parsing Errors
/// - [`Error::Malformed`] - Corrupted or invalid record structure
/// - [`Error::OutOfBounds`] - Attempted to read beyond the record boundary
/// - [`Error::Empty`] - Empty input provided
/// - [`Error::RecursionLimit`] - Value nesting exceeded the allowed depth
///
/// ## Rewriting Errors
/// - [`Error::TypeNotFound`] - A rewritten record names a type no registry knows
/// - [`Error::InvalidIdentifier`] - A supplied rule or identifier string could not be parsed
///
/// # Examples
///
/// ```rust
/// use reclass::{Error, Oid, RecordCodec, RenameRules, TypeRegistry};
/// use std::sync::Arc;
///
/// let mut codec = RecordCodec::new(RenameRules::new(), Arc::new(TypeRegistry::new()));
/// match codec.process(Oid::new(1), &[0xFF]) {
///     Ok(Some(updated)) => {
///         println!("record rewritten: {} bytes", updated.len());
///     }
///     Ok(None) => {
///         println!("record unchanged");
///     }
///     Err(Error::Malformed { message, file, line }) => {
///         eprintln!("corrupt record: {} ({}:{})", message, file, line);
///     }
///     Err(e) => {
///         eprintln!("other error: {}", e);
///     }
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    // Record parsing errors
    /// The record is damaged and could not be parsed.
    ///
    /// This error indicates that the byte structure does not conform to the record
    /// format: an unknown tag, a memo back-reference past the memo, invalid UTF-8 in
    /// a string, trailing bytes after the state document, and similar. The error
    /// includes the source location where the malformation was detected for debugging
    /// purposes.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while parsing the record.
    ///
    /// This error occurs when trying to read data beyond the end of the record
    /// buffer, typically because a length prefix or fixed-width field claims more
    /// bytes than remain. It's a safety check to prevent buffer overruns during
    /// parsing.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// Provided input was empty.
    ///
    /// This error occurs when an empty buffer is provided where a serialized
    /// record was expected.
    #[error("Provided input was empty")]
    Empty,

    /// Recursion limit reached.
    ///
    /// Value trees and reference payloads are bounded in nesting depth so that
    /// pathological records cannot overflow the stack. The associated value is
    /// the limit that was exceeded.
    #[error("Reach the maximum recursion level allowed - {0}")]
    RecursionLimit(usize),

    // Rewriting errors
    /// A type identifier survived rewriting without any registry knowing it.
    ///
    /// The encode guard refuses to write a record that names a type absent from
    /// both the live type registry and the broken placeholder registry, since such
    /// a record could never be loaded again. The associated [`TypeName`] identifies
    /// the offending type.
    #[error("No registry knows the type - {0}")]
    TypeNotFound(TypeName),

    /// A supplied identifier or rule string could not be parsed.
    ///
    /// Raised when caller input is rejected: a type identifier string without
    /// the single-space separator, an empty namespace or name, or an object id
    /// that is not valid hex.
    #[error("Invalid identifier - {0}")]
    InvalidIdentifier(String),
}
