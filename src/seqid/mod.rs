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

//! Sequence identifiers (Seq-id) inside definition lines.
//!
//! A Seq-id is a CHOICE whose alternative is selected by the number of its
//! context-specific tag, see [SeqIdKind]. The alternatives fall in three
//! groups:
//!
//! - Integer choices (gi, gibbsq, ...) are primitive and hold the number.
//! - PDB identifiers hold a molecule name and a chain number.
//! - Everything else is decoded as a Textseq-id like record where field
//!   `[0]` is a name, `[1]` an accession and `[3]` a version.
//!
//! Producers of legacy volumes did not all agree on the exact encoding. If
//! no value could be decoded from the expected structure, the longest run
//! of accession-like characters (`[A-Za-z0-9_.]`) in the identifier's bytes
//! is used instead and [SeqId::recovered] is set.
//!

use bstr::BString;

use crate::ber::string::{is_visible_like, read_string_field};
use crate::ber::{BerReader, Decoded, Length, Tag, TagClass, INTEGER};
use crate::error::{Error, Result};

/// Seq-id alternatives by tag number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SeqIdKind {
    Local,
    Gibbsq,
    Gibbmt,
    Giim,
    Genbank,
    Embl,
    Pir,
    Swissprot,
    Patent,
    Other,
    General,
    Gi,
    Ddbj,
    Prf,
    Pdb,
    Tpg,
    Tpe,
    Tpd,
    Gpipe,
    NamedAnnotTrack,
    /// Tag number outside the known alternatives.
    Unknown(u32),
}

impl SeqIdKind {
    pub fn from_number(number: u32) -> Self {
        match number {
            0 => SeqIdKind::Local,
            1 => SeqIdKind::Gibbsq,
            2 => SeqIdKind::Gibbmt,
            3 => SeqIdKind::Giim,
            4 => SeqIdKind::Genbank,
            5 => SeqIdKind::Embl,
            6 => SeqIdKind::Pir,
            7 => SeqIdKind::Swissprot,
            8 => SeqIdKind::Patent,
            9 => SeqIdKind::Other,
            10 => SeqIdKind::General,
            11 => SeqIdKind::Gi,
            12 => SeqIdKind::Ddbj,
            13 => SeqIdKind::Prf,
            14 => SeqIdKind::Pdb,
            15 => SeqIdKind::Tpg,
            16 => SeqIdKind::Tpe,
            17 => SeqIdKind::Tpd,
            18 => SeqIdKind::Gpipe,
            19 => SeqIdKind::NamedAnnotTrack,
            n => SeqIdKind::Unknown(n),
        }
    }

    pub fn number(&self) -> u32 {
        match self {
            SeqIdKind::Local => 0,
            SeqIdKind::Gibbsq => 1,
            SeqIdKind::Gibbmt => 2,
            SeqIdKind::Giim => 3,
            SeqIdKind::Genbank => 4,
            SeqIdKind::Embl => 5,
            SeqIdKind::Pir => 6,
            SeqIdKind::Swissprot => 7,
            SeqIdKind::Patent => 8,
            SeqIdKind::Other => 9,
            SeqIdKind::General => 10,
            SeqIdKind::Gi => 11,
            SeqIdKind::Ddbj => 12,
            SeqIdKind::Prf => 13,
            SeqIdKind::Pdb => 14,
            SeqIdKind::Tpg => 15,
            SeqIdKind::Tpe => 16,
            SeqIdKind::Tpd => 17,
            SeqIdKind::Gpipe => 18,
            SeqIdKind::NamedAnnotTrack => 19,
            SeqIdKind::Unknown(n) => *n,
        }
    }
}

impl std::fmt::Display for SeqIdKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let name = match self {
            SeqIdKind::Local => "local",
            SeqIdKind::Gibbsq => "gibbsq",
            SeqIdKind::Gibbmt => "gibbmt",
            SeqIdKind::Giim => "giim",
            SeqIdKind::Genbank => "genbank",
            SeqIdKind::Embl => "embl",
            SeqIdKind::Pir => "pir",
            SeqIdKind::Swissprot => "swissprot",
            SeqIdKind::Patent => "patent",
            SeqIdKind::Other => "other",
            SeqIdKind::General => "general",
            SeqIdKind::Gi => "gi",
            SeqIdKind::Ddbj => "ddbj",
            SeqIdKind::Prf => "prf",
            SeqIdKind::Pdb => "pdb",
            SeqIdKind::Tpg => "tpg",
            SeqIdKind::Tpe => "tpe",
            SeqIdKind::Tpd => "tpd",
            SeqIdKind::Gpipe => "gpipe",
            SeqIdKind::NamedAnnotTrack => "named-annot-track",
            SeqIdKind::Unknown(n) => return write!(f, "unknown-{}", n),
        };
        write!(f, "{}", name)
    }
}

/// A decoded sequence identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeqId {
    pub kind: SeqIdKind,
    /// Accession, name or number. Empty if nothing could be decoded.
    pub value: BString,
    /// Version of an accession, or the chain of a PDB identifier.
    pub version: Option<i64>,
    /// True if `value` came from scanning rather than from the structure.
    pub recovered: bool,
}

impl SeqId {
    pub fn new(kind: SeqIdKind) -> Self {
        SeqId { kind, value: BString::new(Vec::new()), version: None, recovered: false }
    }

    fn set_value(&mut self, decoded: Decoded<BString>) {
        self.recovered = decoded.is_recovered();
        self.value = decoded.into_value();
    }
}

/// Longest run of `[A-Za-z0-9_.]` in `bytes`, the first one on ties.
pub fn longest_token(
    bytes: &[u8],
) -> Option<BString> {
    let best = bytes
        .split(|b| !(b.is_ascii_alphanumeric() || *b == b'_' || *b == b'.'))
        .fold(&bytes[0..0], |best, run| if run.len() > best.len() { run } else { best });
    if best.is_empty() { None } else { Some(BString::from(best)) }
}

// Fields of a Textseq-id like record. A universal SEQUENCE is the body of
// an explicitly tagged record and is descended into.
fn read_text_fields(
    reader: &mut BerReader,
    len: Length,
    id: &mut SeqId,
) -> Result<()> {
    let end = reader.end_of(len);
    while !reader.at_content_end(end) {
        let tag = reader.read_tag()?;
        let field_len = reader.read_length()?;

        if tag.is_sequence() {
            reader.nested(|r| read_text_fields(r, field_len, id))?;
            continue;
        }
        if tag.class != TagClass::ContextSpecific {
            reader.skip_content(tag, field_len)?;
            continue;
        }

        match tag.number {
            0 if id.value.is_empty() => id.set_value(read_string_field(reader, tag, field_len)?),
            1 => id.set_value(read_string_field(reader, tag, field_len)?),
            3 => id.version = Some(reader.read_integer_field(tag, field_len)?),
            _ => reader.skip_content(tag, field_len)?,
        }
    }
    Ok(())
}

fn is_pdb_name(tag: &Tag) -> bool {
    (is_visible_like(tag) && !tag.constructed) || (tag.class == TagClass::ContextSpecific && tag.number == 0)
}

fn is_pdb_chain(tag: &Tag) -> bool {
    (tag.is_universal(INTEGER) && !tag.constructed) || (tag.class == TagClass::ContextSpecific && tag.number == 1)
}

// PDB-seq-id: molecule name and chain, first occurrence of each wins.
fn read_pdb_fields(
    reader: &mut BerReader,
    len: Length,
    id: &mut SeqId,
) -> Result<()> {
    let end = reader.end_of(len);
    while !reader.at_content_end(end) {
        let tag = reader.read_tag()?;
        let field_len = reader.read_length()?;

        if tag.is_sequence() {
            reader.nested(|r| read_pdb_fields(r, field_len, id))?;
        } else if is_pdb_name(&tag) && id.value.is_empty() {
            id.set_value(read_string_field(reader, tag, field_len)?);
        } else if is_pdb_chain(&tag) && id.version.is_none() {
            id.version = Some(reader.read_integer_field(tag, field_len)?);
        } else {
            reader.skip_content(tag, field_len)?;
        }
    }
    Ok(())
}

/// Decode one Seq-id at the current position.
///
/// Fails if the tag is not context-specific or the content is malformed.
pub fn read_seq_id(
    reader: &mut BerReader,
) -> Result<SeqId> {
    let start = reader.position();
    let tag = reader.read_tag()?;
    if tag.class != TagClass::ContextSpecific {
        return Err(Error::UnexpectedTag { expected: "context-specific Seq-id choice", found: tag.to_string() })
    }
    let len = reader.read_length()?;
    let mut id = SeqId::new(SeqIdKind::from_number(tag.number));

    if tag.constructed {
        reader.nested(|r| match id.kind {
            SeqIdKind::Pdb => read_pdb_fields(r, len, &mut id),
            _ => read_text_fields(r, len, &mut id),
        })?;
    } else {
        let Length::Definite(n) = len else {
            return Err(Error::IndefinitePrimitive)
        };
        id.value = BString::from(reader.read_integer(n)?.to_string());
    }

    if id.value.is_empty() {
        if let Some(token) = longest_token(&reader.buffer()[start..reader.position().min(reader.len())]) {
            log::debug!("recovered {} identifier {} by scanning", id.kind, token);
            id.value = token;
            id.recovered = true;
        }
    }

    Ok(id)
}

/// Decode a SEQUENCE OF Seq-id.
///
/// A malformed identifier fails the whole list.
pub fn read_seq_id_list(
    reader: &mut BerReader,
) -> Result<Vec<SeqId>> {
    let tag = reader.read_tag()?;
    if !tag.is_sequence() {
        return Err(Error::UnexpectedTag { expected: "SEQUENCE for Seq-id list", found: tag.to_string() })
    }
    let len = reader.read_length()?;

    reader.nested(|r| {
        let end = r.end_of(len);
        let mut ids: Vec<SeqId> = Vec::new();
        while !r.at_content_end(end) {
            ids.push(read_seq_id(r)?);
        }
        Ok(ids)
    })
}

/// Decode the Seq-id list inside a field wrapper of length `len`.
///
/// Content after the list is discarded and the reader ends up at the end of
/// the wrapper.
pub fn read_seq_id_field(
    reader: &mut BerReader,
    len: Length,
) -> Result<Vec<SeqId>> {
    let start = reader.position();
    let ids = read_seq_id_list(reader)?;
    reader.skip_to_wrapper_end(start, len)?;
    Ok(ids)
}
