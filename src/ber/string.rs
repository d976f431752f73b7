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

//! Text values: VisibleString and its relatives.
//!
//! Titles and accessions are usually VisibleString, but older volumes use
//! other universal string types for the same fields, so every string type
//! whose content is plain bytes is accepted. Long strings may be split into
//! a constructed sequence of primitive fragments.
//!
//! When a value sits inside an explicit wrapper that does not have the
//! expected shape, [read_explicit_visible] scans the wrapper for the first
//! primitive string anywhere inside it.
//!

use bstr::BString;

use crate::ber::{BerReader, Decoded, Length, Tag, TagClass};
use crate::error::{Error, Result};

/// True for the universal string types accepted as text.
pub fn is_visible_like(
    tag: &Tag,
) -> bool {
    // UTF8String, Numeric.. IA5String, Graphic.. BMPString
    tag.class == TagClass::Universal && matches!(tag.number, 12 | 18..=22 | 25..=30)
}

/// Decode one string element at the current position.
///
/// Primitive content is returned verbatim. Constructed content is the
/// concatenation of its primitive string fragments, other children are
/// skipped.
pub fn read_visible(
    reader: &mut BerReader,
) -> Result<BString> {
    let tag = reader.read_tag()?;
    let len = reader.read_length()?;
    if !is_visible_like(&tag) {
        return Err(Error::UnexpectedTag { expected: "string type inside explicit tag", found: tag.to_string() })
    }

    if !tag.constructed {
        return match len {
            Length::Definite(n) => Ok(BString::from(reader.read_octets(n)?)),
            Length::Indefinite => Err(Error::IndefinitePrimitive),
        }
    }

    reader.nested(|r| {
        let end = r.end_of(len);
        let mut combined = BString::new(Vec::new());
        while !r.at_content_end(end) {
            let chunk_tag = r.read_tag()?;
            let chunk_len = r.read_length()?;
            match chunk_len {
                Length::Definite(n) if is_visible_like(&chunk_tag) && !chunk_tag.constructed => {
                    combined.extend_from_slice(r.read_octets(n)?);
                },
                _ => r.skip_content(chunk_tag, chunk_len)?,
            }
        }
        if let Some(end) = end {
            if r.position() < end {
                r.set_position(end);
            }
        }
        Ok(combined)
    })
}

/// Find the first primitive string at or below the current position.
///
/// Walks elements up to `limit`, descending into constructed ones, and
/// stops in front of a terminator that ends the enclosing content.
/// Returns None if no string was found.
pub fn scan_visible_like(
    reader: &mut BerReader,
    limit: usize,
) -> Result<Option<BString>> {
    while reader.position() < limit {
        if reader.is_eoc() {
            break;
        }

        let element_start = reader.position();
        let tag = reader.read_tag()?;
        let len = reader.read_length()?;

        if !tag.constructed {
            let Length::Definite(n) = len else {
                return Err(Error::IndefinitePrimitive)
            };
            let bytes = reader.read_octets(n)?;
            if is_visible_like(&tag) {
                return Ok(Some(BString::from(bytes)))
            }
        } else {
            let end = reader.end_of(len);
            let found = reader.nested(|r| scan_visible_like(r, end.unwrap_or(limit)))?;
            if found.is_some() {
                return Ok(found)
            }
            match end {
                Some(end) => reader.set_position(end.min(reader.len()).max(reader.position())),
                None => { reader.consume_eoc(); },
            }
        }

        if reader.position() <= element_start {
            return Err(Error::NoProgress { offset: element_start })
        }
    }

    Ok(None)
}

/// Decode a string inside an explicit wrapper of length `len`.
///
/// The reader must be positioned just after the wrapper's length. If the
/// content is not a string element, the wrapper is scanned with
/// [scan_visible_like] instead. Either way the reader ends up at the end of
/// the wrapper. A definite wrapper that ends past the buffer is an
/// [ElementOverrun](Error::ElementOverrun).
pub fn read_explicit_visible(
    reader: &mut BerReader,
    len: Length,
) -> Result<Decoded<BString>> {
    let start = reader.position();
    let limit = match len {
        Length::Definite(n) if start.saturating_add(n) > reader.len() => {
            return Err(Error::ElementOverrun { offset: start, length: n, available: reader.len().saturating_sub(start) })
        },
        Length::Definite(n) => start + n,
        Length::Indefinite => reader.len(),
    };

    let decoded = match read_visible(reader) {
        Ok(value) => Decoded::Exact(value),
        Err(err) => {
            log::debug!("scanning explicit wrapper at offset {} for a string: {}", start, err);
            reader.set_position(start);
            let scanned = match scan_visible_like(reader, limit) {
                Ok(Some(value)) => Decoded::Recovered(value),
                Ok(None) => Decoded::Failed(err.to_string()),
                Err(scan_err) => Decoded::Failed(scan_err.to_string()),
            };
            reader.set_position(start);
            scanned
        },
    };

    reader.skip_to_wrapper_end(start, len)?;
    Ok(decoded)
}

/// Decode a string field that is either bare or explicitly wrapped.
pub fn read_string_field(
    reader: &mut BerReader,
    tag: Tag,
    len: Length,
) -> Result<Decoded<BString>> {
    match len {
        Length::Definite(n) if !tag.constructed => Ok(Decoded::Exact(BString::from(reader.read_octets(n)?))),
        Length::Indefinite if !tag.constructed => Err(Error::IndefinitePrimitive),
        _ => read_explicit_visible(reader, len),
    }
}
