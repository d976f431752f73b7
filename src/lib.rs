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

//! blastdb-legacy is a library and a set of command-line clients for
//! reading the volumes of legacy (version 4 and 5) BLAST databases.
//!
//!   - Parsing the index file (.pin or .nin) of a volume.
//!   - Decoding the BER encoded definition lines stored in the header file (.phr or .nhr).
//!   - Reading protein residues from the sequence file (.psq).
//!   - Reading the volume lists of alias files (.pal or .nal).
//!
//! The header decoder is tolerant of damaged data. Records that cannot
//! be decoded in full are kept up to the point of failure together with
//! the first error encountered, and the remaining records are still
//! decoded.
//!
//! ## Usage
//!
//! ### Command line
//!
//!   - `blastdb-legacy <index file> [output dir]` print a summary of a volume
//!     and optionally write each raw header blob to `output dir`.
//!   - `pal-reader <alias file>` print the volumes and metadata of an alias file.
//!   - `psq-reader <volume>` print the index fields of a protein volume
//!     followed by its sequences in FASTA format.
//!
//! ### Rust API
//!
//! [summarize] reads the bytes of an index file and its header file and
//! writes a plain text summary to a [Write]. The building blocks are
//! available separately:
//!
//!   - [parse_index](index::parse_index): parses an index file into an [IndexRecord].
//!   - [extract_header_blobs](index::volume::extract_header_blobs): slices the header file into per-record blobs.
//!   - [decode_defline_set](defline::decode_defline_set): decodes a blob into a [DeflineSet].
//!   - [BerReader](ber::BerReader): a bounds checked BER tag-length-value reader.
//!
//! ## File format specification
//!
//! All integers in the index file are 4-byte big-endian except the total
//! residue count, which is an 8-byte little-endian integer. Strings are
//! prefixed by their 4-byte big-endian length.
//!
//! ```text
//! version           u32       4 or 5
//! sequence type     u32       1 protein, anything else nucleotide
//! volume number     u32       version 5 only
//! title             string
//! backing store     string    version 5 only
//! date              string
//! record count      u32       N
//! total length      u64 (LE)
//! max length        u32
//! header offsets    u32 * (N + 1)
//! sequence offsets  u32 * (N + 1)
//! ambiguity offsets u32 * (N + 1)   nucleotide only
//! ```
//!

use std::io::Write;

pub mod alias;
pub mod ber;
pub mod cursor;
pub mod defline;
pub mod error;
pub mod index;
pub mod printer;
pub mod residues;
pub mod seqid;

pub use defline::{DefLine, DeflineSet};
pub use error::{Error, Result};
pub use index::IndexRecord;
pub use seqid::{SeqId, SeqIdKind};

type E = Box<dyn std::error::Error>;

/// Limits applied when decoding header blobs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Maximum nesting depth of constructed BER elements.
    pub max_depth: usize,
    /// Number of raw bytes shown for records that failed to decode.
    pub preview_bytes: usize,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            max_depth: ber::DEFAULT_MAX_DEPTH,
            preview_bytes: 32,
        }
    }
}

/// Write a summary of a volume to `conn`.
///
/// Parses the index file in `index_bytes`, splits `header_bytes` into
/// per-record blobs and decodes the definition lines of each record.
///
/// If `out_dir` is given, each blob is also written to
/// `<out_dir>/header_<oid>.bin` before the summary is printed.
///
/// Errors in the index file or the header offsets are returned before
/// anything is written to `conn`. Damaged definition lines are reported
/// inline.
///
/// ## Usage
///
/// ```rust
/// use blastdb_legacy::summarize;
/// use blastdb_legacy::DecodeOptions;
///
/// // Version 4 protein index with one empty record
/// let mut index: Vec<u8> = vec![0, 0, 0, 4, 0, 0, 0, 1];
/// index.extend([0, 0, 0, 4]); index.extend(b"test");
/// index.extend([0, 0, 0, 0]);
/// index.extend([0, 0, 0, 1]);
/// index.extend([0; 8]);
/// index.extend([0, 0, 0, 0]);
/// index.extend([0, 0, 0, 0, 0, 0, 0, 0]);
/// index.extend([0, 0, 0, 0, 0, 0, 0, 0]);
///
/// let mut output: Vec<u8> = Vec::new();
/// summarize(&index, &[], None, &DecodeOptions::default(), &mut output).unwrap();
///
/// let output = String::from_utf8(output).unwrap();
/// assert!(output.starts_with("Database version : 4\nSequence type    : protein\n"));
/// assert!(output.ends_with("Header blocks:\n  OID 0 -> 0 bytes\n    (no deflines decoded)\n"));
/// ```
///
pub fn summarize<W: Write>(
    index_bytes: &[u8],
    header_bytes: &[u8],
    out_dir: Option<&std::path::Path>,
    options: &DecodeOptions,
    conn: &mut W,
) -> std::result::Result<(), E> {
    let index = index::parse_index(index_bytes)?;
    log::info!("Read index with {} records", index.record_count);

    let blobs = index::volume::extract_header_blobs(&index, header_bytes)?;
    if let Some(dir) = out_dir {
        index::volume::dump_header_blobs(&blobs, dir)?;
    }

    printer::format_summary(&index, &blobs, options, conn)?;
    Ok(())
}
