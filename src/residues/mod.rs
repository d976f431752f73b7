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

//! Protein residues stored in the sequence file (.psq).
//!
//! Each residue is one byte in the NCBIstdaa alphabet and every sequence
//! is followed by a zero byte. Record `i` spans
//! `[sequence_offsets[i], sequence_offsets[i + 1])` in the file.
//!
//! ## Usage
//!
//! ```rust
//! use blastdb_legacy::residues::decode_sequence;
//!
//! let psq: Vec<u8> = vec![0, 12, 10, 13, 0, 19, 0];
//!
//! assert_eq!(decode_sequence(&psq, 1, 5).unwrap(), b"MKN");
//! assert_eq!(decode_sequence(&psq, 5, 7).unwrap(), b"V");
//! ```
//!

use std::io::Write;

use needletail::parser::{write_fasta, LineEnding};

use crate::error::{Error, Result};
use crate::index::IndexRecord;

type E = Box<dyn std::error::Error>;

// NCBIstdaa code to ASCII, code 0 is the sequence terminator.
const NCBISTDAA: &[u8; 28] = b"*ABCDEFGHIKLMNPQRSTVWYXZUOJ-";

/// Convert a NCBIstdaa code to its one-letter residue.
///
/// Returns None for the terminator (code 0) and `?` for codes outside the
/// alphabet.
pub fn decode_residue(
    code: u8,
) -> Option<u8> {
    match code {
        0 => None,
        _ => Some(*NCBISTDAA.get(code as usize).unwrap_or(&b'?')),
    }
}

/// Decode the residues in `psq[start..end]` up to the first terminator.
pub fn decode_sequence(
    psq: &[u8],
    start: u32,
    end: u32,
) -> Result<Vec<u8>> {
    if start > end || end as usize > psq.len() {
        return Err(Error::SequenceOutOfRange { start, end, size: psq.len() })
    }
    Ok(psq[(start as usize)..(end as usize)].iter().map_while(|code| decode_residue(*code)).collect())
}

/// Check that `index` describes a protein volume with usable sequence offsets.
pub fn check_protein_index(
    index: &IndexRecord,
) -> Result<()> {
    let offsets = &index.sequence_offsets;
    if offsets.len() < 2 || offsets[0] >= offsets[offsets.len() - 1] {
        return Err(Error::CorruptOffsets)
    }
    if !index.is_protein {
        return Err(Error::NotProtein)
    }
    Ok(())
}

/// Format the index fields shown before the sequences.
pub fn format_metadata<W: Write>(
    index: &IndexRecord,
    conn: &mut W,
) -> std::result::Result<(), E> {
    writeln!(conn, "PIN metadata")?;
    writeln!(conn, "  Version: {}", index.version)?;
    writeln!(conn, "  Database type: {}", index.sequence_kind())?;
    writeln!(conn, "  Title: {}", index.title)?;
    if let Some(name) = index.backing_store_name.as_ref().filter(|x| !x.is_empty()) {
        writeln!(conn, "  Backing store: {}", name)?;
    }
    writeln!(conn, "  Created: {}", index.date)?;
    writeln!(conn, "  Sequences: {}", index.record_count)?;
    writeln!(conn, "  Total residues: {}", index.total_length)?;
    writeln!(conn, "  Longest sequence: {} residues", index.max_length)?;
    Ok(())
}

/// Write every sequence in `psq` to `conn` in FASTA format.
///
/// Records are named `oid_<i> length=<n>` and written unwrapped.
pub fn format_sequences<W: Write>(
    index: &IndexRecord,
    psq: &[u8],
    conn: &mut W,
) -> std::result::Result<(), E> {
    for oid in 0..(index.record_count as usize) {
        let (start, end) = index.sequence_range(oid).ok_or(Error::CorruptOffsets)?;
        let seq = decode_sequence(psq, start, end)?;
        let id = format!("oid_{} length={}", oid, seq.len());
        write_fasta(id.as_bytes(), &seq, &mut *conn, LineEnding::Unix)?;
    }
    conn.flush()?;
    Ok(())
}

// Tests
#[cfg(test)]
mod tests {

    fn protein_index(
        offsets: Vec<u32>,
    ) -> crate::index::IndexRecord {
        crate::index::IndexRecord {
            version: 4,
            is_protein: true,
            title: "tiny".into(),
            date: "today".into(),
            record_count: (offsets.len() - 1) as u32,
            total_length: 4,
            max_length: 3,
            header_offsets: vec![0; offsets.len()],
            sequence_offsets: offsets,
            ..Default::default()
        }
    }

    #[test]
    fn decode_residue() {
        use super::decode_residue;

        assert_eq!(decode_residue(0), None);
        assert_eq!(decode_residue(1), Some(b'A'));
        assert_eq!(decode_residue(12), Some(b'M'));
        assert_eq!(decode_residue(25), Some(b'O'));
        assert_eq!(decode_residue(27), Some(b'-'));
        assert_eq!(decode_residue(28), Some(b'?'));
        assert_eq!(decode_residue(255), Some(b'?'));
    }

    #[test]
    fn decode_sequence_out_of_range() {
        use super::decode_sequence;

        let psq: Vec<u8> = vec![0, 1, 2, 0];
        assert!(decode_sequence(&psq, 0, 5).is_err());
        assert!(decode_sequence(&psq, 3, 2).is_err());
        assert_eq!(decode_sequence(&psq, 4, 4).unwrap(), b"");
        assert_eq!(decode_sequence(&psq, 1, 4).unwrap(), b"AB");
    }

    #[test]
    fn check_protein_index() {
        use super::check_protein_index;

        assert!(check_protein_index(&protein_index(vec![1, 5])).is_ok());

        let got = check_protein_index(&protein_index(vec![5, 5])).unwrap_err();
        assert_eq!(got.to_string(), "sequence offsets appear to be corrupt");

        let mut nucleotide = protein_index(vec![1, 5]);
        nucleotide.is_protein = false;
        let got = check_protein_index(&nucleotide).unwrap_err();
        assert_eq!(got.to_string(), "only protein databases (sequence type 1) contain residues");
    }

    #[test]
    fn format_metadata_and_sequences() {
        use super::{format_metadata, format_sequences};

        let index = protein_index(vec![1, 5, 7]);
        let psq: Vec<u8> = vec![0, 12, 10, 13, 0, 19, 0];

        let mut got: Vec<u8> = Vec::new();
        format_metadata(&index, &mut got).unwrap();
        format_sequences(&index, &psq, &mut got).unwrap();

        let expected = [
            "PIN metadata",
            "  Version: 4",
            "  Database type: protein",
            "  Title: tiny",
            "  Created: today",
            "  Sequences: 2",
            "  Total residues: 4",
            "  Longest sequence: 3 residues",
            ">oid_0 length=3",
            "MKN",
            ">oid_1 length=1",
            "V",
            "",
        ].join("\n");

        assert_eq!(String::from_utf8(got).unwrap(), expected);
    }
}
