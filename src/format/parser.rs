//! Sequential byte-level parser for record documents.
//!
//! This module provides the [`Parser`] cursor used by the decoding layer to
//! walk a record buffer. It tracks a current position, bounds-checks every
//! read, and understands the two variable-length primitives of the wire
//! format: compressed unsigned integers and length-prefixed UTF-8 strings.
//!
//! # Architecture
//!
//! The parser borrows the record buffer and never copies it; multi-byte reads
//! go through [`crate::format::io`] and string reads validate UTF-8 before
//! returning owned data. Reference payloads are sliced out with
//! [`Parser::read_bytes`] and re-parsed with a fresh cursor, which keeps
//! nested documents isolated from the outer position.
//!
//! # Key Components
//!
//! - [`Parser`] - Cursor with position tracking and bounds checking
//! - [`Parser::read_compressed_uint`] - Variable-length unsigned integers
//! - [`Parser::read_compressed_string_utf8`] - Length-prefixed UTF-8 strings
//!
//! # Usage Examples
//!
//! ```rust
//! use reclass::format::Parser;
//!
//! let data = [0x03, 0x41, 0x42, 0x43, 0xFF];
//! let mut parser = Parser::new(&data);
//!
//! let text = parser.read_compressed_string_utf8()?;
//! assert_eq!(text, "ABC");
//!
//! let trailer = parser.read_le::<u8>()?;
//! assert_eq!(trailer, 0xFF);
//! assert!(!parser.has_more_data());
//! # Ok::<(), reclass::Error>(())
//! ```
//!
//! # Error Handling
//!
//! Reads past the end of the buffer return [`crate::Error::OutOfBounds`];
//! structurally invalid data (bad compression prefixes, invalid UTF-8)
//! returns [`crate::Error::Malformed`].

use crate::{
    format::io::{read_le_at, WireNum},
    Error::OutOfBounds,
    Result,
};

/// Sequential byte-level parser with position tracking and bounds checking.
///
/// `Parser` maintains a current position within a borrowed buffer and advances
/// it as data is consumed. All reads are bounds-checked; a failed read leaves
/// the position unchanged.
pub struct Parser<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser over the full input buffer.
    ///
    /// # Arguments
    ///
    /// * `data` - The byte buffer to parse
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Returns the total length of the underlying buffer.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the underlying buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if there is more data to read.
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Returns the current position within the buffer.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Returns the number of bytes remaining after the current position.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Peek at the next byte without advancing the position.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if the parser is at the end of
    /// the buffer.
    pub fn peek_byte(&self) -> Result<u8> {
        if self.position >= self.data.len() {
            return Err(OutOfBounds);
        }

        Ok(self.data[self.position])
    }

    /// Read a little-endian primitive and advance the position.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if there are insufficient bytes.
    pub fn read_le<T: WireNum>(&mut self) -> Result<T> {
        read_le_at(self.data, &mut self.position)
    }

    /// Read a raw byte slice of the given length and advance the position.
    ///
    /// The returned slice borrows from the parser's buffer, so sliced-out
    /// reference payloads stay alive as long as the record bytes do.
    ///
    /// # Arguments
    ///
    /// * `length` - Number of bytes to read
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `length` bytes
    /// remain.
    pub fn read_bytes(&mut self, length: usize) -> Result<&'a [u8]> {
        let end = self.calc_end_position(length)?;
        if end > self.data.len() {
            return Err(OutOfBounds);
        }

        let bytes = &self.data[self.position..end];
        self.position = end;
        Ok(bytes)
    }

    /// Read a compressed unsigned integer.
    ///
    /// The encoding uses the leading bits of the first byte to select a
    /// width:
    ///
    /// | First byte    | Width   | Range                 |
    /// |---------------|---------|-----------------------|
    /// | `0xxxxxxx`    | 1 byte  | 0 - 0x7F              |
    /// | `10xxxxxx`    | 2 bytes | 0 - 0x3FFF            |
    /// | `110xxxxx`    | 4 bytes | 0 - 0x1FFFFFFF        |
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] for prefixes `111xxxxx`, and
    /// [`crate::Error::OutOfBounds`] if the continuation bytes are missing.
    pub fn read_compressed_uint(&mut self) -> Result<u32> {
        let first_byte = self.read_le::<u8>()?;

        match first_byte {
            0x00..=0x7F => Ok(u32::from(first_byte)),
            0x80..=0xBF => {
                let second_byte = self.read_le::<u8>()?;
                Ok((u32::from(first_byte & 0x3F) << 8) | u32::from(second_byte))
            }
            0xC0..=0xDF => {
                let second_byte = self.read_le::<u8>()?;
                let third_byte = self.read_le::<u8>()?;
                let fourth_byte = self.read_le::<u8>()?;
                Ok((u32::from(first_byte & 0x1F) << 24)
                    | (u32::from(second_byte) << 16)
                    | (u32::from(third_byte) << 8)
                    | u32::from(fourth_byte))
            }
            _ => Err(malformed_error!(
                "Invalid compressed integer prefix - {:#04x}",
                first_byte
            )),
        }
    }

    /// Read a length-prefixed UTF-8 string.
    ///
    /// The length is a compressed unsigned integer counting bytes, followed
    /// by that many bytes of UTF-8 data.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OutOfBounds`] if the string data is truncated
    /// and [`crate::Error::Malformed`] if the bytes are not valid UTF-8.
    pub fn read_compressed_string_utf8(&mut self) -> Result<String> {
        let length = self.read_compressed_uint()? as usize;
        let string_bytes = self.read_bytes(length)?;

        match std::str::from_utf8(string_bytes) {
            Ok(text) => Ok(text.to_string()),
            Err(_) => Err(malformed_error!(
                "Invalid UTF-8 sequence in string of length {}",
                length
            )),
        }
    }

    /// Compute `position + length` with overflow checking.
    fn calc_end_position(&self, length: usize) -> Result<usize> {
        self.position.checked_add(length).ok_or(OutOfBounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_parser() {
        let data = [0x01, 0x02, 0x03];
        let parser = Parser::new(&data);

        assert_eq!(parser.len(), 3);
        assert!(!parser.is_empty());
        assert_eq!(parser.pos(), 0);
        assert_eq!(parser.remaining(), 3);
        assert!(parser.has_more_data());
    }

    #[test]
    fn test_empty_parser() {
        let parser = Parser::new(&[]);

        assert_eq!(parser.len(), 0);
        assert!(parser.is_empty());
        assert!(!parser.has_more_data());
        assert!(matches!(parser.peek_byte(), Err(OutOfBounds)));
    }

    #[test]
    fn test_peek_does_not_advance() {
        let data = [0xAB, 0xCD];
        let mut parser = Parser::new(&data);

        assert_eq!(parser.peek_byte().unwrap(), 0xAB);
        assert_eq!(parser.pos(), 0);
        assert_eq!(parser.read_le::<u8>().unwrap(), 0xAB);
        assert_eq!(parser.peek_byte().unwrap(), 0xCD);
    }

    #[test]
    fn test_read_le_advances() {
        let data = [0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02];
        let mut parser = Parser::new(&data);

        assert_eq!(parser.read_le::<i64>().unwrap(), 1);
        assert_eq!(parser.pos(), 8);
        assert_eq!(parser.read_le::<u8>().unwrap(), 0x02);
        assert!(!parser.has_more_data());
    }

    #[test]
    fn test_read_bytes() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05];
        let mut parser = Parser::new(&data);

        let slice = parser.read_bytes(3).unwrap();
        assert_eq!(slice, &[0x01, 0x02, 0x03]);
        assert_eq!(parser.pos(), 3);
        assert_eq!(parser.remaining(), 2);

        assert!(matches!(parser.read_bytes(3), Err(OutOfBounds)));
        // Position unchanged on failure
        assert_eq!(parser.pos(), 3);
    }

    #[test]
    fn test_read_bytes_zero_length() {
        let data = [0x01];
        let mut parser = Parser::new(&data);

        let slice = parser.read_bytes(0).unwrap();
        assert!(slice.is_empty());
        assert_eq!(parser.pos(), 0);
    }

    #[test]
    fn test_compressed_uint_one_byte() {
        let cases: &[(&[u8], u32)] = &[(&[0x00], 0), (&[0x03], 3), (&[0x7F], 0x7F)];

        for (bytes, expected) in cases {
            let mut parser = Parser::new(bytes);
            assert_eq!(parser.read_compressed_uint().unwrap(), *expected);
            assert!(!parser.has_more_data());
        }
    }

    #[test]
    fn test_compressed_uint_two_byte() {
        let cases: &[(&[u8], u32)] = &[
            (&[0x80, 0x80], 0x80),
            (&[0xAE, 0x57], 0x2E57),
            (&[0xBF, 0xFF], 0x3FFF),
        ];

        for (bytes, expected) in cases {
            let mut parser = Parser::new(bytes);
            assert_eq!(parser.read_compressed_uint().unwrap(), *expected);
        }
    }

    #[test]
    fn test_compressed_uint_four_byte() {
        let cases: &[(&[u8], u32)] = &[
            (&[0xC0, 0x00, 0x40, 0x00], 0x4000),
            (&[0xC0, 0x42, 0x42, 0x42], 0x424242),
            (&[0xDF, 0xFF, 0xFF, 0xFF], 0x1FFF_FFFF),
        ];

        for (bytes, expected) in cases {
            let mut parser = Parser::new(bytes);
            assert_eq!(parser.read_compressed_uint().unwrap(), *expected);
        }
    }

    #[test]
    fn test_compressed_uint_invalid_prefix() {
        for first in [0xE0u8, 0xF0, 0xFF] {
            let data = [first, 0x00, 0x00, 0x00];
            let mut parser = Parser::new(&data);
            assert!(matches!(
                parser.read_compressed_uint(),
                Err(crate::Error::Malformed { .. })
            ));
        }
    }

    #[test]
    fn test_compressed_uint_truncated() {
        let data = [0x80];
        let mut parser = Parser::new(&data);
        assert!(matches!(parser.read_compressed_uint(), Err(OutOfBounds)));
    }

    #[test]
    fn test_compressed_string() {
        let data = [0x05, b'h', b'e', b'l', b'l', b'o'];
        let mut parser = Parser::new(&data);

        assert_eq!(parser.read_compressed_string_utf8().unwrap(), "hello");
        assert!(!parser.has_more_data());
    }

    #[test]
    fn test_compressed_string_empty() {
        let data = [0x00];
        let mut parser = Parser::new(&data);

        assert_eq!(parser.read_compressed_string_utf8().unwrap(), "");
    }

    #[test]
    fn test_compressed_string_unicode() {
        // "héllo" is 6 bytes of UTF-8
        let mut data = vec![0x06];
        data.extend_from_slice("héllo".as_bytes());

        let mut parser = Parser::new(&data);
        assert_eq!(parser.read_compressed_string_utf8().unwrap(), "héllo");
    }

    #[test]
    fn test_compressed_string_invalid_utf8() {
        let data = [0x02, 0xFF, 0xFE];
        let mut parser = Parser::new(&data);

        assert!(matches!(
            parser.read_compressed_string_utf8(),
            Err(crate::Error::Malformed { .. })
        ));
    }

    #[test]
    fn test_compressed_string_truncated() {
        let data = [0x05, b'h', b'i'];
        let mut parser = Parser::new(&data);

        assert!(matches!(
            parser.read_compressed_string_utf8(),
            Err(OutOfBounds)
        ));
    }
}
