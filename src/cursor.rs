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

//! Bounds-checked reads over an in-memory byte buffer.
//!
//! [ByteCursor] keeps the read offset explicit so that callers can save and
//! restore it, which the recovering decoders in [ber](crate::ber) rely on.
//!
//! All multi-byte integers in the legacy volumes are big-endian, with the
//! single exception of the total residue count in the index file.
//!

use byteorder::{BigEndian, ByteOrder, LittleEndian};

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(
        buf: &'a [u8],
    ) -> Self {
        ByteCursor { buf, pos: 0 }
    }

    pub fn buffer(&self) -> &'a [u8] {
        self.buf
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn set_position(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.buf.len().saturating_sub(self.pos)
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.buf.len()
    }

    pub fn peek_at(&self, pos: usize) -> Option<u8> {
        self.buf.get(pos).copied()
    }

    /// Borrow the next `n` bytes and advance past them.
    ///
    /// `field` names what is being read and ends up in the
    /// [Truncated](Error::Truncated) error if the buffer is too short.
    pub fn take(
        &mut self,
        n: usize,
        field: &'static str,
    ) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(Error::Truncated { field, offset: self.pos, needed: n, available: self.remaining() });
        }
        let bytes = &self.buf[self.pos..(self.pos + n)];
        self.pos += n;
        Ok(bytes)
    }

    pub fn read_u8(
        &mut self,
        field: &'static str,
    ) -> Result<u8> {
        Ok(self.take(1, field)?[0])
    }

    pub fn read_u32_be(
        &mut self,
        field: &'static str,
    ) -> Result<u32> {
        Ok(BigEndian::read_u32(self.take(4, field)?))
    }

    pub fn read_u64_le(
        &mut self,
        field: &'static str,
    ) -> Result<u64> {
        Ok(LittleEndian::read_u64(self.take(8, field)?))
    }

    /// Read a string prefixed by its length as a big-endian u32.
    ///
    /// The bytes are returned as-is, no character set conversion is done.
    pub fn read_lenstr(
        &mut self,
        field: &'static str,
    ) -> Result<&'a [u8]> {
        let len = self.read_u32_be(field)? as usize;
        self.take(len, field)
    }
}

// Tests
#[cfg(test)]
mod tests {

    #[test]
    fn read_mixed_endianness() {
        use super::ByteCursor;

        let data: Vec<u8> = vec![0, 0, 1, 2, 5, 0, 0, 0, 0, 0, 0, 1];
        let mut cursor = ByteCursor::new(&data);

        assert_eq!(cursor.read_u32_be("first").unwrap(), 258);
        assert_eq!(cursor.read_u64_le("second").unwrap(), (1_u64 << 56) + 5);
        assert!(cursor.is_at_end());
    }

    #[test]
    fn read_lenstr() {
        use super::ByteCursor;

        let data: Vec<u8> = vec![0, 0, 0, 3, b'a', b'b', b'c', 0xff];
        let mut cursor = ByteCursor::new(&data);

        assert_eq!(cursor.read_lenstr("title").unwrap(), b"abc");
        assert_eq!(cursor.position(), 7);
        assert_eq!(cursor.remaining(), 1);
    }

    #[test]
    fn truncated_read_names_field() {
        use super::ByteCursor;
        use crate::error::Error;

        let data: Vec<u8> = vec![0, 0, 1];
        let mut cursor = ByteCursor::new(&data);

        let got = cursor.read_u32_be("record count").unwrap_err();
        match got {
            Error::Truncated { field, offset, needed, available } => {
                assert_eq!(field, "record count");
                assert_eq!(offset, 0);
                assert_eq!(needed, 4);
                assert_eq!(available, 3);
            },
            other => panic!("unexpected error {:?}", other),
        }
        // A failed read leaves the position untouched.
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn lenstr_longer_than_buffer() {
        use super::ByteCursor;
        use crate::error::Error;

        let data: Vec<u8> = vec![0, 0, 0, 9, b'a'];
        let mut cursor = ByteCursor::new(&data);

        assert!(matches!(cursor.read_lenstr("date"), Err(Error::Truncated { field: "date", .. })));
    }
}
