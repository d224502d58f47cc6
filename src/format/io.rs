//! Byte order utilities for record encoding and decoding.
//!
//! This module provides endian-aware primitive reading and writing for the
//! record wire format. All multi-byte fields in the format are little-endian;
//! reads are bounds-checked against the source buffer and writes append to a
//! growing output buffer, so neither side can overrun.
//!
//! # Key Components
//!
//! - [`WireNum`] - Trait unifying the primitive types the format stores
//! - [`read_le_at`] - Bounds-checked read at an offset, advancing the offset
//! - [`put_le`] - Append a primitive to an output buffer
//!
//! # Usage Examples
//!
//! ```rust
//! use reclass::format::io::{put_le, read_le_at};
//!
//! let mut buf = Vec::new();
//! put_le(&mut buf, 0x0807_0605_0403_0201_i64);
//!
//! let mut offset = 0;
//! let value: i64 = read_le_at(&buf, &mut offset)?;
//! assert_eq!(value, 0x0807_0605_0403_0201);
//! assert_eq!(offset, 8);
//! # Ok::<(), reclass::Error>(())
//! ```
//!
//! # Thread Safety
//!
//! All functions are pure operations over caller-owned buffers and are safe to
//! call concurrently.

use crate::{Error::OutOfBounds, Result};

/// Trait for the primitive types the wire format stores directly.
///
/// Each implementation defines a `Bytes` associated type naming the fixed-size
/// byte array for the type (e.g. `[u8; 8]` for `i64`), plus conversions in both
/// directions. Only little-endian is provided; the format has no big-endian
/// fields.
pub trait WireNum: Sized {
    /// Fixed-size byte array type backing this primitive.
    type Bytes: Sized + for<'a> TryFrom<&'a [u8]> + AsRef<[u8]>;

    /// Read Self from a little-endian byte array
    fn from_le_bytes(bytes: Self::Bytes) -> Self;

    /// Write Self to a little-endian byte array
    fn to_le_bytes(self) -> Self::Bytes;
}

// Implement WireNum support for u8
impl WireNum for u8 {
    type Bytes = [u8; 1];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        u8::from_le_bytes(bytes)
    }

    fn to_le_bytes(self) -> Self::Bytes {
        u8::to_le_bytes(self)
    }
}

// Implement WireNum support for u32
impl WireNum for u32 {
    type Bytes = [u8; 4];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        u32::from_le_bytes(bytes)
    }

    fn to_le_bytes(self) -> Self::Bytes {
        u32::to_le_bytes(self)
    }
}

// Implement WireNum support for u64
impl WireNum for u64 {
    type Bytes = [u8; 8];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        u64::from_le_bytes(bytes)
    }

    fn to_le_bytes(self) -> Self::Bytes {
        u64::to_le_bytes(self)
    }
}

// Implement WireNum support for i64
impl WireNum for i64 {
    type Bytes = [u8; 8];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        i64::from_le_bytes(bytes)
    }

    fn to_le_bytes(self) -> Self::Bytes {
        i64::to_le_bytes(self)
    }
}

// Implement WireNum support for f64
impl WireNum for f64 {
    type Bytes = [u8; 8];

    fn from_le_bytes(bytes: Self::Bytes) -> Self {
        f64::from_le_bytes(bytes)
    }

    fn to_le_bytes(self) -> Self::Bytes {
        f64::to_le_bytes(self)
    }
}

/// Safely reads a value of type `T` in little-endian byte order at a specific offset.
///
/// Reads from the specified offset and advances the offset by the number of
/// bytes consumed.
///
/// # Arguments
///
/// * `data` - The byte buffer to read from
/// * `offset` - Mutable reference to the offset position (advanced after reading)
///
/// # Errors
///
/// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes.
pub fn read_le_at<T: WireNum>(data: &[u8], offset: &mut usize) -> Result<T> {
    let type_len = std::mem::size_of::<T>();
    if (type_len + *offset) > data.len() {
        return Err(OutOfBounds);
    }

    let Ok(read) = data[*offset..*offset + type_len].try_into() else {
        return Err(OutOfBounds);
    };

    *offset += type_len;

    Ok(T::from_le_bytes(read))
}

/// Appends a value of type `T` in little-endian byte order to an output buffer.
///
/// The buffer grows as needed, so this cannot fail.
///
/// # Arguments
///
/// * `data` - The output buffer to append to
/// * `value` - The value to write
pub fn put_le<T: WireNum>(data: &mut Vec<u8>, value: T) {
    data.extend_from_slice(value.to_le_bytes().as_ref());
}
