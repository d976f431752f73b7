// blastdb-legacy: Readers for legacy BLAST database volumes.
//
// Copyright 2025 Tommi Mäklin [tommi@maklin.fi].
//
// Copyrights in this project are retained by contributors. No copyright assignment
// is required to contribute to this project.
//
// Except as otherwise noted (below and/or in individual files), this
// project is licensed under the Apache License, Version 2.0
// <LICENSE-APACHE> or <http://www.apache.org/licenses/LICENSE-2.0> or
// the MIT license, <LICENSE-MIT> or <http://opensource.org/licenses/MIT>,
// at your option.
//

//! Tag-length-value decoding for the BER subset used in header blobs.
//!
//! Header blobs store their definition lines as ASN.1 values encoded with
//! the Basic Encoding Rules. Only the envelope is interpreted here:
//!
//! - The tag byte carries the class in the top two bits, the constructed
//!   flag in bit 5 and the tag number in the low five bits. A tag number of
//!   `0x1F` means the number follows in base-128 with the high bit set on
//!   every byte except the last.
//! - The length byte is either the length itself (`0x00..=0x7F`), `0x80`
//!   for indefinite length, or `0x80 | n` followed by an n-byte big-endian
//!   length with `1 <= n <= 8`.
//! - Indefinite-length content ends with two zero bytes at the same
//!   nesting level and is only allowed on constructed elements.
//!
//! [BerReader] tracks how deeply it has descended into nested elements and
//! fails with [TooDeep](crate::error::Error::TooDeep) instead of recursing
//! without bound on hostile input.
//!

pub mod string;

#[cfg(test)]
pub(crate) mod testutil;

use crate::cursor::ByteCursor;
use crate::error::{Error, Result};

/// Default nesting limit of a [BerReader].
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Universal tag number of SEQUENCE and SEQUENCE OF.
pub const SEQUENCE: u32 = 16;
/// Universal tag number of INTEGER.
pub const INTEGER: u32 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TagClass {
    Universal,
    Application,
    ContextSpecific,
    Private,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tag {
    pub class: TagClass,
    pub constructed: bool,
    pub number: u32,
}

impl Tag {
    pub fn is_universal(&self, number: u32) -> bool {
        self.class == TagClass::Universal && self.number == number
    }

    /// Constructed universal SEQUENCE.
    pub fn is_sequence(&self) -> bool {
        self.is_universal(SEQUENCE) && self.constructed
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let class = match self.class {
            TagClass::Universal => "universal",
            TagClass::Application => "application",
            TagClass::ContextSpecific => "context-specific",
            TagClass::Private => "private",
        };
        let form = if self.constructed { "constructed" } else { "primitive" };
        write!(f, "{} {} tag {}", form, class, self.number)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Length {
    Definite(usize),
    /// Content runs until a two-zero-byte terminator.
    Indefinite,
}

impl Length {
    pub fn is_indefinite(&self) -> bool {
        *self == Length::Indefinite
    }
}

/// Outcome of a decode step that may fall back to scanning.
///
/// Lets callers tell a value read from the expected structure apart from
/// one that was pieced together by a permissive scan.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decoded<T> {
    Exact(T),
    Recovered(T),
    /// Nothing usable was found; carries the reason the structured decode failed.
    Failed(String),
}

impl<T: Default> Decoded<T> {
    pub fn is_recovered(&self) -> bool {
        matches!(self, Decoded::Recovered(_))
    }

    /// The decoded value, or `T::default()` if decoding failed.
    pub fn into_value(self) -> T {
        match self {
            Decoded::Exact(value) | Decoded::Recovered(value) => value,
            Decoded::Failed(_) => T::default(),
        }
    }
}

/// Cursor over BER encoded bytes.
#[derive(Debug, Clone)]
pub struct BerReader<'a> {
    cursor: ByteCursor<'a>,
    depth: usize,
    max_depth: usize,
}

impl<'a> BerReader<'a> {
    pub fn new(
        buf: &'a [u8],
    ) -> Self {
        BerReader::with_max_depth(buf, DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(
        buf: &'a [u8],
        max_depth: usize,
    ) -> Self {
        BerReader { cursor: ByteCursor::new(buf), depth: 0, max_depth }
    }

    pub fn buffer(&self) -> &'a [u8] {
        self.cursor.buffer()
    }

    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    pub fn set_position(&mut self, pos: usize) {
        self.cursor.set_position(pos);
    }

    pub fn len(&self) -> usize {
        self.cursor.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cursor.is_empty()
    }

    pub fn is_at_end(&self) -> bool {
        self.cursor.is_at_end()
    }

    /// Run `f` one nesting level deeper.
    ///
    /// Fails with [Error::TooDeep] if the reader is already at its limit.
    /// The depth is restored whether or not `f` succeeds.
    pub fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        if self.depth >= self.max_depth {
            return Err(Error::TooDeep { limit: self.max_depth })
        }
        self.depth += 1;
        let res = f(self);
        self.depth -= 1;
        res
    }

    pub fn read_tag(&mut self) -> Result<Tag> {
        let first = self.cursor.read_u8("BER tag")?;
        let class = match first >> 6 {
            0 => TagClass::Universal,
            1 => TagClass::Application,
            2 => TagClass::ContextSpecific,
            _ => TagClass::Private,
        };
        let constructed = first & 0b0010_0000 != 0;
        let mut number = (first & 0b0001_1111) as u32;

        if number == 0b0001_1111 {
            number = 0;
            loop {
                let b = self.cursor.read_u8("BER long-form tag number")?;
                number = (number << 7) | (b & 0x7F) as u32;
                if b & 0x80 == 0 {
                    break;
                }
            }
        }

        Ok(Tag { class, constructed, number })
    }

    pub fn read_length(&mut self) -> Result<Length> {
        let first = self.cursor.read_u8("BER length")?;
        if first == 0x80 {
            return Ok(Length::Indefinite)
        }
        if first & 0x80 == 0 {
            return Ok(Length::Definite(first as usize))
        }

        let num_bytes = first & 0x7F;
        if num_bytes > 8 {
            return Err(Error::UnsupportedLength(num_bytes))
        }
        let bytes = self.cursor.take(num_bytes as usize, "BER length body")?;
        let length = bytes.iter().fold(0_u64, |acc, b| (acc << 8) | *b as u64);

        Ok(Length::Definite(usize::try_from(length).unwrap_or(usize::MAX)))
    }

    /// True if the next two bytes are an end-of-contents marker.
    pub fn is_eoc(&self) -> bool {
        let pos = self.position();
        self.cursor.peek_at(pos) == Some(0) && self.cursor.peek_at(pos + 1) == Some(0)
    }

    /// Consume an end-of-contents marker if one is next.
    pub fn consume_eoc(&mut self) -> bool {
        if self.is_eoc() {
            self.set_position(self.position() + 2);
            return true
        }
        false
    }

    /// End offset of content with `len` starting at the current position.
    ///
    /// Returns None for indefinite length.
    pub fn end_of(&self, len: Length) -> Option<usize> {
        match len {
            Length::Definite(n) => Some(self.position().saturating_add(n)),
            Length::Indefinite => None,
        }
    }

    /// Check whether the content of a constructed element is exhausted.
    ///
    /// With a definite `end` this compares positions, otherwise it consumes
    /// the terminator if one is next.
    pub fn at_content_end(&mut self, end: Option<usize>) -> bool {
        match end {
            Some(end) => self.position() >= end,
            None => self.consume_eoc(),
        }
    }

    /// Borrow `len` bytes of primitive content.
    pub fn read_octets(
        &mut self,
        len: usize,
    ) -> Result<&'a [u8]> {
        let offset = self.position();
        let available = self.cursor.remaining();
        self.cursor.take(len, "BER content").map_err(|_| Error::ElementOverrun { offset, length: len, available })
    }

    /// Decode `len` bytes of two's complement big-endian integer content.
    pub fn read_integer(
        &mut self,
        len: usize,
    ) -> Result<i64> {
        let offset = self.position();
        if len == 0 || len > 8 || len > self.cursor.remaining() {
            return Err(Error::InvalidInteger { offset, length: len })
        }
        let bytes = self.read_octets(len)?;
        let init: i64 = if bytes[0] & 0x80 != 0 { -1 } else { 0 };
        Ok(bytes.iter().fold(init, |acc, b| (acc << 8) | *b as i64))
    }

    /// Skip one complete element starting at the current position.
    ///
    /// Indefinite-length content is walked child by child until its
    /// terminator so that nested terminators are not mistaken for it.
    pub fn skip_element(&mut self) -> Result<()> {
        let tag = self.read_tag()?;
        let len = self.read_length()?;
        self.skip_content(tag, len)
    }

    /// Skip the content of an element whose tag and length were already read.
    pub fn skip_content(
        &mut self,
        tag: Tag,
        len: Length,
    ) -> Result<()> {
        match len {
            Length::Indefinite => {
                if !tag.constructed {
                    return Err(Error::IndefinitePrimitive)
                }
                self.nested(|r| {
                    while !r.consume_eoc() {
                        r.skip_element()?;
                    }
                    Ok(())
                })
            },
            Length::Definite(n) => {
                self.read_octets(n)?;
                Ok(())
            },
        }
    }

    /// Move to the end of an explicit wrapper that began at `start`.
    ///
    /// Anything left undecoded inside the wrapper is skipped. Fails with
    /// [Error::ElementOverrun] if a definite wrapper ends past the buffer.
    pub fn skip_to_wrapper_end(
        &mut self,
        start: usize,
        len: Length,
    ) -> Result<()> {
        match len {
            Length::Indefinite => {
                while !self.is_at_end() && !self.is_eoc() {
                    self.skip_element()?;
                }
                self.consume_eoc();
            },
            Length::Definite(n) => {
                let end = start.saturating_add(n);
                if end > self.len() {
                    return Err(Error::ElementOverrun { offset: start, length: n, available: self.len().saturating_sub(start) })
                }
                if self.position() < end {
                    self.set_position(end);
                }
            },
        }
        Ok(())
    }

    /// Decode an INTEGER inside an explicit wrapper of length `len`.
    pub fn read_explicit_integer(
        &mut self,
        len: Length,
    ) -> Result<i64> {
        let start = self.position();
        let inner_tag = self.read_tag()?;
        let inner_len = self.read_length()?;
        let value = match inner_len {
            Length::Definite(n) if inner_tag.is_universal(INTEGER) => self.read_integer(n)?,
            Length::Indefinite if !inner_tag.constructed => return Err(Error::IndefinitePrimitive),
            _ => return Err(Error::UnexpectedTag { expected: "INTEGER inside explicit wrapper", found: inner_tag.to_string() }),
        };
        self.skip_to_wrapper_end(start, len)?;
        Ok(value)
    }

    /// Decode an integer field that is either bare or explicitly wrapped.
    pub fn read_integer_field(
        &mut self,
        tag: Tag,
        len: Length,
    ) -> Result<i64> {
        match len {
            Length::Definite(n) if !tag.constructed => self.read_integer(n),
            Length::Indefinite if !tag.constructed => Err(Error::IndefinitePrimitive),
            _ => self.read_explicit_integer(len),
        }
    }
}

// Tests
#[cfg(test)]
mod tests {
    use super::testutil::*;

    #[test]
    fn read_short_tag() {
        use super::{BerReader, Tag, TagClass};

        let data: Vec<u8> = vec![0x30, 0xa2, 0x1a, 0x41, 0xc1];
        let mut reader = BerReader::new(&data);

        assert_eq!(reader.read_tag().unwrap(), Tag { class: TagClass::Universal, constructed: true, number: 16 });
        assert_eq!(reader.read_tag().unwrap(), Tag { class: TagClass::ContextSpecific, constructed: true, number: 2 });
        assert_eq!(reader.read_tag().unwrap(), Tag { class: TagClass::Universal, constructed: false, number: 26 });
        assert_eq!(reader.read_tag().unwrap().class, TagClass::Application);
        assert_eq!(reader.read_tag().unwrap().class, TagClass::Private);
    }

    #[test]
    fn read_long_form_tag() {
        use super::{BerReader, TagClass};

        let data: Vec<u8> = vec![0x1f, 0x81, 0x00, 0xbf, 0x83, 0x87, 0x05];
        let mut reader = BerReader::new(&data);

        let first = reader.read_tag().unwrap();
        assert_eq!(first.number, 128);
        assert_eq!(first.class, TagClass::Universal);
        assert_eq!(reader.position(), 3);

        let second = reader.read_tag().unwrap();
        assert_eq!(second.number, (3 << 14) | (7 << 7) | 5);
        assert_eq!(second.class, TagClass::ContextSpecific);
        assert!(second.constructed);
    }

    #[test]
    fn long_form_tag_runs_out() {
        use super::BerReader;
        use crate::error::Error;

        let data: Vec<u8> = vec![0x1f, 0x81];
        let mut reader = BerReader::new(&data);

        assert!(matches!(reader.read_tag(), Err(Error::Truncated { .. })));
    }

    #[test]
    fn read_length_forms() {
        use super::{BerReader, Length};

        let data: Vec<u8> = vec![0x05, 0x80, 0x81, 0xc8, 0x82, 0x01, 0x00, 0x7f];
        let mut reader = BerReader::new(&data);

        assert_eq!(reader.read_length().unwrap(), Length::Definite(5));
        assert_eq!(reader.read_length().unwrap(), Length::Indefinite);
        assert_eq!(reader.read_length().unwrap(), Length::Definite(200));
        assert_eq!(reader.read_length().unwrap(), Length::Definite(256));
        assert_eq!(reader.read_length().unwrap(), Length::Definite(127));
    }

    #[test]
    fn unsupported_length_size() {
        use super::BerReader;
        use crate::error::Error;

        let data: Vec<u8> = vec![0x89, 0, 0, 0, 0, 0, 0, 0, 0, 1];
        let mut reader = BerReader::new(&data);

        assert!(matches!(reader.read_length(), Err(Error::UnsupportedLength(9))));
    }

    #[test]
    fn truncated_length_body() {
        use super::BerReader;
        use crate::error::Error;

        let data: Vec<u8> = vec![0x82, 0x01];
        let mut reader = BerReader::new(&data);

        assert!(matches!(reader.read_length(), Err(Error::Truncated { field: "BER length body", .. })));
    }

    #[test]
    fn read_integer_sign() {
        use super::BerReader;

        let data: Vec<u8> = vec![0x7f, 0xff, 0x00, 0x80, 0x26, 0x94];
        let mut reader = BerReader::new(&data);

        assert_eq!(reader.read_integer(1).unwrap(), 127);
        assert_eq!(reader.read_integer(1).unwrap(), -1);
        assert_eq!(reader.read_integer(2).unwrap(), 128);
        assert_eq!(reader.read_integer(2).unwrap(), 9876);
    }

    #[test]
    fn read_integer_invalid_length() {
        use super::BerReader;
        use crate::error::Error;

        let data: Vec<u8> = vec![0x01];
        let mut reader = BerReader::new(&data);

        assert!(matches!(reader.read_integer(0), Err(Error::InvalidInteger { .. })));
        assert!(matches!(reader.read_integer(2), Err(Error::InvalidInteger { .. })));
    }

    #[test]
    fn skip_definite_element() {
        use super::BerReader;

        let mut data = seq(&[visible("abc"), int(5)].concat());
        data.push(0xff);
        let mut reader = BerReader::new(&data);

        reader.skip_element().unwrap();
        assert_eq!(reader.position(), data.len() - 1);
    }

    #[test]
    fn skip_nested_indefinite_element() {
        use super::BerReader;

        // The inner terminator must not end the outer element.
        let inner = indefinite(0xa1, &[visible("x"), int(0)].concat());
        let mut data = indefinite(0x30, &[inner, visible("after")].concat());
        data.extend_from_slice(&visible("next"));
        let mut reader = BerReader::new(&data);

        reader.skip_element().unwrap();
        assert_eq!(&data[reader.position()..], &visible("next")[..]);
    }

    #[test]
    fn skip_rejects_indefinite_primitive() {
        use super::BerReader;
        use crate::error::Error;

        let data: Vec<u8> = vec![0x1a, 0x80, b'a', 0, 0];
        let mut reader = BerReader::new(&data);

        assert!(matches!(reader.skip_element(), Err(Error::IndefinitePrimitive)));
    }

    #[test]
    fn skip_overrun() {
        use super::BerReader;
        use crate::error::Error;

        let data: Vec<u8> = vec![0x04, 0x05, 1, 2];
        let mut reader = BerReader::new(&data);

        assert!(matches!(reader.skip_element(), Err(Error::ElementOverrun { offset: 2, length: 5, available: 2 })));
    }

    #[test]
    fn skip_too_deep() {
        use super::BerReader;
        use crate::error::Error;

        let mut data = visible("leaf");
        for _ in 0..10 {
            data = indefinite(0x30, &data);
        }

        let mut shallow = BerReader::with_max_depth(&data, 4);
        assert!(matches!(shallow.skip_element(), Err(Error::TooDeep { limit: 4 })));

        let mut deep = BerReader::with_max_depth(&data, 10);
        deep.skip_element().unwrap();
        assert!(deep.is_at_end());
    }

    #[test]
    fn explicit_integer() {
        use super::{BerReader, Length};

        let mut data = int(9606);
        data.push(0x05);
        data.push(0x00);
        let len = Length::Definite(data.len());
        data.push(0xee);
        let mut reader = BerReader::new(&data);

        assert_eq!(reader.read_explicit_integer(len).unwrap(), 9606);
        assert_eq!(reader.position(), data.len() - 1);
    }

    #[test]
    fn explicit_integer_wrong_type() {
        use super::{BerReader, Length};
        use crate::error::Error;

        let data = visible("12");
        let mut reader = BerReader::new(&data);

        assert!(matches!(reader.read_explicit_integer(Length::Definite(data.len())), Err(Error::UnexpectedTag { .. })));
    }

    #[test]
    fn explicit_integer_indefinite_wrapper() {
        use super::{BerReader, Length};

        let mut data = [int(-2), visible("junk"), vec![0, 0]].concat();
        data.extend_from_slice(&int(1));
        let mut reader = BerReader::new(&data);

        assert_eq!(reader.read_explicit_integer(Length::Indefinite).unwrap(), -2);
        assert_eq!(&data[reader.position()..], &int(1)[..]);
    }

    #[test]
    fn explicit_wrapper_past_end_of_buffer() {
        use super::{BerReader, Length};
        use crate::error::Error;

        let data = int(5);
        let mut reader = BerReader::new(&data);

        let got = reader.read_explicit_integer(Length::Definite(127));
        assert!(matches!(got, Err(Error::ElementOverrun { offset: 0, length: 127, available: 3 })));
    }
}
