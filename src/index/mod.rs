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

//! Index file (.pin/.nin) of a legacy database volume.
//!
//! The index file is a fixed layout of big-endian fields followed by
//! parallel offset tables:
//!
//! - u32 version, 4 or 5.
//! - u32 sequence type, 1 for protein and anything else for nucleotide.
//! - u32 volume number, version 5 only.
//! - Title as a u32 length followed by the bytes.
//! - Name of the backing store, version 5 only, same encoding as the title.
//! - Creation date, same encoding as the title.
//! - u32 number of records.
//! - u64 total length of all sequences. This field is **little-endian**.
//! - u32 length of the longest sequence.
//! - `records + 1` u32 offsets into the header file (.phr/.nhr).
//! - `records + 1` u32 offsets into the sequence file (.psq/.nsq).
//! - `records + 1` u32 offsets into the ambiguity data, nucleotide only.
//!
//! Bytes remaining after the last table are ignored with a warning.
//!

pub mod volume;

use bstr::BString;
use byteorder::{BigEndian, ByteOrder};

use crate::cursor::ByteCursor;
use crate::error::{Error, Result};

/// Contents of an index file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IndexRecord {
    pub version: u32,
    pub is_protein: bool,
    /// Only present in version 5.
    pub volume_number: Option<u32>,
    pub title: BString,
    /// Only present in version 5.
    pub backing_store_name: Option<BString>,
    pub date: BString,
    pub record_count: u32,
    pub total_length: u64,
    pub max_length: u32,
    pub header_offsets: Vec<u32>,
    pub sequence_offsets: Vec<u32>,
    /// Present iff `is_protein` is false.
    pub ambiguity_offsets: Option<Vec<u32>>,
}

impl IndexRecord {
    pub fn sequence_kind(&self) -> &'static str {
        if self.is_protein { "protein" } else { "nucleotide" }
    }

    /// Byte range of record `oid` in the header file.
    pub fn header_range(
        &self,
        oid: usize,
    ) -> Option<(u32, u32)> {
        Some((*self.header_offsets.get(oid)?, *self.header_offsets.get(oid + 1)?))
    }

    /// Byte range of record `oid` in the sequence file.
    pub fn sequence_range(
        &self,
        oid: usize,
    ) -> Option<(u32, u32)> {
        Some((*self.sequence_offsets.get(oid)?, *self.sequence_offsets.get(oid + 1)?))
    }

    /// True if every offset table is non-decreasing.
    pub fn offsets_are_monotonic(&self) -> bool {
        let sorted = |table: &[u32]| table.windows(2).all(|pair| pair[0] <= pair[1]);
        sorted(&self.header_offsets)
            && sorted(&self.sequence_offsets)
            && self.ambiguity_offsets.as_deref().map_or(true, sorted)
    }
}

fn read_offset_table(
    cursor: &mut ByteCursor,
    count: usize,
    field: &'static str,
) -> Result<Vec<u32>> {
    let bytes = cursor.take(count.saturating_mul(4), field)?;
    Ok(bytes.chunks_exact(4).map(BigEndian::read_u32).collect())
}

/// Parse the contents of an index file.
///
/// Fails with [Error::UnsupportedVersion] if the version is not 4 or 5 and
/// with [Error::Truncated] naming the field if the data ends early.
///
/// ## Usage
///
/// ```rust
/// use blastdb_legacy::index::parse_index;
///
/// let mut bytes: Vec<u8> = Vec::new();
/// bytes.extend_from_slice(&4_u32.to_be_bytes()); // version
/// bytes.extend_from_slice(&1_u32.to_be_bytes()); // protein
/// bytes.extend_from_slice(&3_u32.to_be_bytes()); // title
/// bytes.extend_from_slice(b"swp");
/// bytes.extend_from_slice(&4_u32.to_be_bytes()); // date
/// bytes.extend_from_slice(b"2024");
/// bytes.extend_from_slice(&1_u32.to_be_bytes()); // records
/// bytes.extend_from_slice(&42_u64.to_le_bytes()); // total length
/// bytes.extend_from_slice(&42_u32.to_be_bytes()); // max length
/// for offset in [0_u32, 17, 0, 43] {
///     bytes.extend_from_slice(&offset.to_be_bytes());
/// }
///
/// let index = parse_index(&bytes).unwrap();
///
/// assert_eq!(index.title, "swp");
/// assert_eq!(index.total_length, 42);
/// assert_eq!(index.header_offsets, vec![0, 17]);
/// assert_eq!(index.sequence_offsets, vec![0, 43]);
/// assert!(index.ambiguity_offsets.is_none());
/// ```
///
pub fn parse_index(
    data: &[u8],
) -> Result<IndexRecord> {
    let mut cursor = ByteCursor::new(data);

    let version = cursor.read_u32_be("version")?;
    if version != 4 && version != 5 {
        return Err(Error::UnsupportedVersion(version));
    }

    let is_protein = cursor.read_u32_be("sequence type")? == 1;

    let volume_number = if version == 5 {
        Some(cursor.read_u32_be("volume number")?)
    } else {
        None
    };

    let title = BString::from(cursor.read_lenstr("title")?);

    let backing_store_name = if version == 5 {
        Some(BString::from(cursor.read_lenstr("backing store name")?))
    } else {
        None
    };

    let date = BString::from(cursor.read_lenstr("date")?);

    let record_count = cursor.read_u32_be("record count")?;
    let total_length = cursor.read_u64_le("total length")?;
    let max_length = cursor.read_u32_be("max length")?;

    let count = record_count as usize + 1;
    let header_offsets = read_offset_table(&mut cursor, count, "header offsets")?;
    let sequence_offsets = read_offset_table(&mut cursor, count, "sequence offsets")?;
    let ambiguity_offsets = if is_protein {
        None
    } else {
        Some(read_offset_table(&mut cursor, count, "ambiguity offsets")?)
    };

    if !cursor.is_at_end() {
        log::warn!("trailing bytes in index file after parsing known fields ({} ignored)", cursor.remaining());
    }

    let index = IndexRecord {
        version, is_protein, volume_number,
        title, backing_store_name, date,
        record_count, total_length, max_length,
        header_offsets, sequence_offsets, ambiguity_offsets,
    };

    if !index.offsets_are_monotonic() {
        log::warn!("offset tables in index file are not monotonic");
    }
    log::debug!("parsed version {} {} index with {} records", index.version, index.sequence_kind(), index.record_count);

    Ok(index)
}

/// Serialize `index` back into the on-disk layout.
#[cfg(test)]
pub(crate) fn encode_index(
    index: &IndexRecord,
) -> Vec<u8> {
    let mut bytes: Vec<u8> = Vec::new();
    let lenstr = |bytes: &mut Vec<u8>, s: &[u8]| {
        bytes.extend_from_slice(&(s.len() as u32).to_be_bytes());
        bytes.extend_from_slice(s);
    };
    bytes.extend_from_slice(&index.version.to_be_bytes());
    bytes.extend_from_slice(&(if index.is_protein { 1_u32 } else { 0_u32 }).to_be_bytes());
    if let Some(volume) = index.volume_number {
        bytes.extend_from_slice(&volume.to_be_bytes());
    }
    lenstr(&mut bytes, &index.title);
    if let Some(name) = &index.backing_store_name {
        lenstr(&mut bytes, name);
    }
    lenstr(&mut bytes, &index.date);
    bytes.extend_from_slice(&index.record_count.to_be_bytes());
    bytes.extend_from_slice(&index.total_length.to_le_bytes());
    bytes.extend_from_slice(&index.max_length.to_be_bytes());
    let tables = [Some(&index.header_offsets), Some(&index.sequence_offsets), index.ambiguity_offsets.as_ref()];
    tables.into_iter().flatten().flatten().for_each(|offset| {
        bytes.extend_from_slice(&offset.to_be_bytes());
    });
    bytes
}
