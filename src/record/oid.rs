//! Object identifiers for records in a persistent store.
//!
//! An [`Oid`] is the 64-bit identifier a store assigns to each record. On the
//! wire it travels as 8 big-endian bytes inside reference payloads; in
//! diagnostics and override sources it appears as byte-aligned hex with a
//! `0x` prefix, with leading zero bytes trimmed.

use std::fmt;

use crate::{Error, Result};

/// A 64-bit record identifier within a persistent store.
///
/// # Usage Examples
///
/// ```rust
/// use reclass::Oid;
///
/// let oid = Oid::from_hex("0x01af")?;
/// assert_eq!(oid.value(), 0x01AF);
/// assert_eq!(oid.to_string(), "0x01af");
/// # Ok::<(), reclass::Error>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Oid(u64);

impl Oid {
    /// Create an identifier from its numeric value.
    #[must_use]
    pub fn new(value: u64) -> Self {
        Oid(value)
    }

    /// Returns the numeric value.
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }

    /// Create an identifier from its 8-byte big-endian wire form.
    #[must_use]
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        Oid(u64::from_be_bytes(bytes))
    }

    /// Returns the 8-byte big-endian wire form.
    #[must_use]
    pub fn to_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    /// Create an identifier from a byte slice, which must be exactly 8 bytes.
    ///
    /// Reference payloads store identifiers as raw byte fields; any other
    /// width is not an identifier.
    #[must_use]
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let array: [u8; 8] = bytes.try_into().ok()?;
        Some(Oid::from_bytes(array))
    }

    /// Parse a hex identifier string, with or without a `0x` prefix.
    ///
    /// This is the inverse of the [`fmt::Display`] form and accepts any
    /// number of leading zeros up to the 16 digit maximum.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidIdentifier`] for empty input, non-hex digits,
    /// or more than 16 digits.
    pub fn from_hex(text: &str) -> Result<Self> {
        let digits = text.strip_prefix("0x").unwrap_or(text);
        if digits.is_empty()
            || digits.len() > 16
            || !digits.chars().all(|c| c.is_ascii_hexdigit())
        {
            return Err(Error::InvalidIdentifier(format!(
                "object id {text:?} is not 64-bit hex"
            )));
        }

        // At most 16 hex digits, so the parse cannot overflow
        let value = u64::from_str_radix(digits, 16)
            .map_err(|_| Error::InvalidIdentifier(format!("object id {text:?} is not valid hex")))?;
        Ok(Oid(value))
    }
}

impl From<u64> for Oid {
    fn from(value: u64) -> Self {
        Oid(value)
    }
}

impl fmt::Display for Oid {
    /// Formats as `0x`-prefixed hex, trimmed to whole bytes.
    ///
    /// ```rust
    /// use reclass::Oid;
    ///
    /// assert_eq!(Oid::new(0).to_string(), "0x00");
    /// assert_eq!(Oid::new(0x1AF).to_string(), "0x01af");
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let full = format!("{:016x}", self.0);
        let trimmed = full.trim_start_matches("00");
        if trimmed.is_empty() {
            write!(f, "0x00")
        } else {
            write!(f, "0x{trimmed}")
        }
    }
}
