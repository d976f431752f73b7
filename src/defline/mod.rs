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

//! Definition line sets stored in the header file (.phr/.nhr).
//!
//! Each record's header blob is a Blast-def-line-set: a SEQUENCE of
//! definition lines, each a SEQUENCE with context-specific fields
//!
//! - `[0]` title,
//! - `[1]` SEQUENCE OF [Seq-id](crate::seqid),
//! - `[2]` taxonomy id,
//!
//! and other fields that are skipped.
//!
//! Decoding never fails outright. Siblings in the set that are not
//! SEQUENCEs are skipped. If a definition line is corrupt, the error is
//! kept in [DeflineSet::error], the partially decoded line is kept if any of
//! its fields were filled in, and the rest of the set is dropped.
//!

use bstr::BString;

use crate::ber::string::read_string_field;
use crate::ber::{BerReader, Length, TagClass, SEQUENCE};
use crate::error::{Error, Result};
use crate::seqid::{read_seq_id_field, SeqId};
use crate::DecodeOptions;

/// One definition line.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DefLine {
    pub title: BString,
    pub seq_ids: Vec<SeqId>,
    pub taxid: Option<i64>,
    /// True if `title` was found by scanning a malformed wrapper.
    pub title_recovered: bool,
}

impl DefLine {
    /// True if no field was filled in.
    pub fn is_empty(&self) -> bool {
        self.title.is_empty() && self.seq_ids.is_empty() && self.taxid.is_none()
    }
}

/// Definition lines decoded from one header blob.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DeflineSet {
    /// In the order they appear in the blob.
    pub deflines: Vec<DefLine>,
    /// First error encountered, if decoding stopped early.
    pub error: Option<String>,
}

impl DeflineSet {
    pub fn is_partial(&self) -> bool {
        self.error.is_some()
    }
}

fn read_defline_fields(
    reader: &mut BerReader,
    len: Length,
    entry: &mut DefLine,
) -> Result<()> {
    let end = reader.end_of(len);
    while !reader.at_content_end(end) {
        let tag = reader.read_tag()?;
        let field_len = reader.read_length()?;
        if tag.class != TagClass::ContextSpecific {
            reader.skip_content(tag, field_len)?;
            continue;
        }

        match tag.number {
            0 => {
                let title = read_string_field(reader, tag, field_len)?;
                entry.title_recovered = title.is_recovered();
                entry.title = title.into_value();
            },
            1 => entry.seq_ids = read_seq_id_field(reader, field_len)?,
            2 => entry.taxid = Some(reader.read_integer_field(tag, field_len)?),
            _ => reader.skip_content(tag, field_len)?,
        }
    }
    Ok(())
}

/// Decode the definition lines in a header blob with default options.
///
/// An empty blob decodes to an empty set without an error.
///
/// ## Usage
///
/// ```rust
/// use blastdb_legacy::defline::decode_defline_set;
///
/// // { { [0] "Hemoglobin", [1] { gi 4504347 }, [2] 9606 } }
/// let blob: Vec<u8> = vec![
///     0x30, 0x1e, 0x30, 0x1c,
///     0xa0, 0x0c, 0x1a, 0x0a, b'H', b'e', b'm', b'o', b'g', b'l', b'o', b'b', b'i', b'n',
///     0xa1, 0x07, 0x30, 0x05, 0x8b, 0x03, 0x44, 0xbb, 0x1b,
///     0xa2, 0x03, 0x02, 0x01, 0x07,
/// ];
///
/// let set = decode_defline_set(&blob);
///
/// assert!(set.error.is_none());
/// assert_eq!(set.deflines.len(), 1);
/// assert_eq!(set.deflines[0].title, "Hemoglobin");
/// assert_eq!(set.deflines[0].seq_ids[0].value, "4504347");
/// assert_eq!(set.deflines[0].taxid, Some(7));
/// ```
///
pub fn decode_defline_set(
    blob: &[u8],
) -> DeflineSet {
    decode_defline_set_with(blob, &DecodeOptions::default())
}

/// Decode the definition lines in a header blob.
pub fn decode_defline_set_with(
    blob: &[u8],
    options: &DecodeOptions,
) -> DeflineSet {
    let mut set = DeflineSet::default();
    if blob.is_empty() {
        return set
    }

    let mut reader = BerReader::with_max_depth(blob, options.max_depth);
    let res = read_defline_set(&mut reader, &mut set);
    if let Err(e) = res {
        set.error.get_or_insert(e.to_string());
    }
    if let Some(e) = &set.error {
        log::debug!("partial decode of header blob ({} deflines kept): {}", set.deflines.len(), e);
    }

    set
}

fn read_defline_set(
    reader: &mut BerReader,
    set: &mut DeflineSet,
) -> Result<()> {
    let outer_tag = reader.read_tag()?;
    if !outer_tag.is_universal(SEQUENCE) {
        return Err(Error::UnexpectedTag { expected: "Blast-def-line-set sequence", found: outer_tag.to_string() })
    }
    let outer_len = reader.read_length()?;

    reader.nested(|r| {
        let end = r.end_of(outer_len);
        while !r.at_content_end(end) {
            let tag = r.read_tag()?;
            let len = r.read_length()?;
            if !tag.is_sequence() {
                r.skip_content(tag, len)?;
                continue;
            }

            let mut entry = DefLine::default();
            match r.nested(|r| read_defline_fields(r, len, &mut entry)) {
                Ok(()) => set.deflines.push(entry),
                Err(e) => {
                    set.error = Some(e.to_string());
                    if !entry.is_empty() {
                        set.deflines.push(entry);
                    }
                    break;
                },
            }
        }
        Ok(())
    })
}
