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

//! Plain text summaries of decoded volumes.
//!
//! All functions write to a caller supplied [Write] so that the decoders
//! themselves never touch stdout. Text fields are written as the raw bytes
//! stored in the volume.
//!
//! ## Usage
//!
//! ```rust
//! use blastdb_legacy::printer::format_header_block;
//! use blastdb_legacy::DecodeOptions;
//!
//! // A blob that is not a definition line set
//! let blob: Vec<u8> = vec![0x02, 0x01, 0x05];
//!
//! let mut output: Vec<u8> = Vec::new();
//! format_header_block(3, &blob, &DecodeOptions::default(), &mut output).unwrap();
//!
//! let expected = "  OID 3 -> 3 bytes\n".to_owned()
//!     + "    (no deflines decoded)\n"
//!     + "    Warning: partial decode - expected Blast-def-line-set sequence, found primitive universal tag 2\n"
//!     + "    Raw: 02 01 05\n";
//!
//! assert_eq!(String::from_utf8(output).unwrap(), expected);
//! ```
//!

use std::io::Write;

use crate::defline::decode_defline_set_with;
use crate::index::IndexRecord;
use crate::seqid::SeqId;
use crate::DecodeOptions;

type E = Box<dyn std::error::Error>;

/// Hex dump of at most `max_bytes` bytes of `data`.
///
/// Bytes are separated by spaces and ` ...` is appended if `data` was cut.
pub fn hex_preview(
    data: &[u8],
    max_bytes: usize,
) -> String {
    let limit = max_bytes.min(data.len());
    let mut formatted = data[0..limit].iter().map(|b| format!("{:02x}", b)).collect::<Vec<String>>().join(" ");
    if data.len() > limit {
        formatted += " ...";
    }
    formatted
}

/// Format a [SeqId] as `kind:value` with `.version` appended if present.
pub fn format_seq_id(
    id: &SeqId,
) -> String {
    let mut formatted = id.kind.to_string() + ":";
    if id.value.is_empty() {
        formatted += "<none>";
    } else {
        formatted += &id.value.to_string();
    }
    if let Some(version) = id.version {
        formatted += &format!(".{}", version);
    }
    formatted
}

fn write_field<W: Write>(
    label: &str,
    value: &[u8],
    conn: &mut W,
) -> Result<(), E> {
    conn.write_all(label.as_bytes())?;
    conn.write_all(value)?;
    conn.write_all(b"\n")?;
    Ok(())
}

/// Format the fields of an index file.
pub fn format_index_summary<W: Write>(
    index: &IndexRecord,
    conn: &mut W,
) -> Result<(), E> {
    writeln!(conn, "Database version : {}", index.version)?;
    writeln!(conn, "Sequence type    : {}", index.sequence_kind())?;
    writeln!(conn, "Volume number    : {}", index.volume_number.unwrap_or(0))?;
    write_field("Title            : ", &index.title, conn)?;
    if let Some(name) = index.backing_store_name.as_ref().filter(|x| !x.is_empty()) {
        write_field("Backing store    : ", name, conn)?;
    }
    write_field("Date             : ", &index.date, conn)?;
    writeln!(conn, "Sequences        : {}", index.record_count)?;
    writeln!(conn, "Total length     : {}", index.total_length)?;
    writeln!(conn, "Max sequence len : {}", index.max_length)?;
    Ok(())
}

/// Decode and format the header blob of record `oid`.
///
/// If decoding was partial the error and a hex preview of the blob are
/// included.
pub fn format_header_block<W: Write>(
    oid: usize,
    blob: &[u8],
    options: &DecodeOptions,
    conn: &mut W,
) -> Result<(), E> {
    writeln!(conn, "  OID {} -> {} bytes", oid, blob.len())?;

    let set = decode_defline_set_with(blob, options);
    if set.deflines.is_empty() {
        writeln!(conn, "    (no deflines decoded)")?;
    }
    for (idx, def) in set.deflines.iter().enumerate() {
        let label = format!("    Defline {}: ", idx);
        if def.title.is_empty() {
            write_field(&label, b"<no title>", conn)?;
        } else {
            write_field(&label, &def.title, conn)?;
        }
        if !def.seq_ids.is_empty() {
            let ids = def.seq_ids.iter().map(format_seq_id).collect::<Vec<String>>().join(", ");
            writeln!(conn, "      IDs    : {}", ids)?;
        }
        if let Some(taxid) = def.taxid {
            writeln!(conn, "      TaxID : {}", taxid)?;
        }
    }

    if let Some(error) = &set.error {
        log::warn!("OID {}: partial decode of header blob", oid);
        writeln!(conn, "    Warning: partial decode - {}", error)?;
        writeln!(conn, "    Raw: {}", hex_preview(blob, options.preview_bytes))?;
    }
    Ok(())
}

/// Format the index fields followed by every record's definition lines.
pub fn format_summary<W: Write>(
    index: &IndexRecord,
    blobs: &[&[u8]],
    options: &DecodeOptions,
    conn: &mut W,
) -> Result<(), E> {
    format_index_summary(index, conn)?;
    writeln!(conn)?;
    writeln!(conn, "Header blocks:")?;
    for (oid, blob) in blobs.iter().enumerate() {
        format_header_block(oid, blob, options, conn)?;
    }
    conn.flush()?;
    Ok(())
}
