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

//! Locating and slicing the files that make up one database volume.

use std::fs::File;
use std::io::BufWriter;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::index::{parse_index, IndexRecord};

/// Read the whole file at `path` into memory.
pub fn read_file(
    path: &Path,
) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        Error::Io(std::io::Error::new(e.kind(), format!("unable to open file {}: {}", path.display(), e)))
    })
}

/// Read and parse the index file at `path`.
pub fn read_index_file(
    path: &Path,
) -> Result<IndexRecord> {
    let data = read_file(path)?;
    parse_index(&data)
}

fn with_companion_extension(
    index_path: &Path,
    nucleotide: &str,
    protein: &str,
) -> PathBuf {
    let is_nucleotide = index_path.extension().is_some_and(|ext| ext == "nin");
    index_path.with_extension(if is_nucleotide { nucleotide } else { protein })
}

/// Path of the header file belonging to `index_path`.
///
/// `.nin` maps to `.nhr`, anything else to `.phr`.
pub fn header_path(
    index_path: &Path,
) -> PathBuf {
    with_companion_extension(index_path, "nhr", "phr")
}

/// Path of the sequence file belonging to `index_path`.
///
/// `.nin` maps to `.nsq`, anything else to `.psq`.
pub fn sequence_path(
    index_path: &Path,
) -> PathBuf {
    with_companion_extension(index_path, "nsq", "psq")
}

/// Strip a trailing `.pin` and then a trailing `.psq` from `path`.
///
/// Allows giving either the index, the sequence file, or the bare volume
/// name on the command line.
pub fn strip_volume_extension(
    path: &str,
) -> String {
    let path = path.strip_suffix(".pin").unwrap_or(path);
    path.strip_suffix(".psq").unwrap_or(path).to_string()
}

/// Slice the header file into per-record blobs.
///
/// Record `i` spans `[header_offsets[i], header_offsets[i + 1])`. Fails with
/// [Error::InvalidOffsets] naming the first record whose range is inverted
/// or runs past the end of `data`.
pub fn extract_header_blobs<'a>(
    index: &IndexRecord,
    data: &'a [u8],
) -> Result<Vec<&'a [u8]>> {
    (0..(index.record_count as usize)).map(|oid| {
        let (start, end) = index.header_range(oid).ok_or(Error::InvalidOffsets { oid, start: 0, end: 0, size: data.len() })?;
        if end < start || end as usize > data.len() {
            return Err(Error::InvalidOffsets { oid, start, end, size: data.len() })
        }
        Ok(&data[(start as usize)..(end as usize)])
    }).collect()
}

/// Write each blob verbatim to `header_<i>.bin` in `output_dir`.
///
/// Creates `output_dir` and any missing parents.
pub fn dump_header_blobs(
    blobs: &[&[u8]],
    output_dir: &Path,
) -> Result<()> {
    std::fs::create_dir_all(output_dir)?;
    for (oid, blob) in blobs.iter().enumerate() {
        let out_path = output_dir.join(format!("header_{}.bin", oid));
        let f = File::create(out_path)?;
        let mut conn_out = BufWriter::new(f);
        conn_out.write_all(blob)?;
        conn_out.flush()?;
    }
    log::info!("wrote {} header blobs to {}", blobs.len(), output_dir.display());
    Ok(())
}

// Tests
#[cfg(test)]
mod tests {
    use crate::index::IndexRecord;

    fn index_with_offsets(offsets: Vec<u32>) -> IndexRecord {
        IndexRecord {
            version: 4,
            is_protein: true,
            record_count: offsets.len() as u32 - 1,
            sequence_offsets: vec![0; offsets.len()],
            header_offsets: offsets,
            ..Default::default()
        }
    }

    #[test]
    fn companion_paths() {
        use super::{header_path, sequence_path};
        use std::path::{Path, PathBuf};

        assert_eq!(header_path(Path::new("db/swissprot.pin")), PathBuf::from("db/swissprot.phr"));
        assert_eq!(header_path(Path::new("db/nt.00.nin")), PathBuf::from("db/nt.00.nhr"));
        assert_eq!(header_path(Path::new("db/other")), PathBuf::from("db/other.phr"));
        assert_eq!(sequence_path(Path::new("swissprot.pin")), PathBuf::from("swissprot.psq"));
        assert_eq!(sequence_path(Path::new("nt.nin")), PathBuf::from("nt.nsq"));
    }

    #[test]
    fn strip_volume_extension() {
        use super::strip_volume_extension;

        assert_eq!(strip_volume_extension("db/pdbaa.pin"), "db/pdbaa");
        assert_eq!(strip_volume_extension("db/pdbaa.psq"), "db/pdbaa");
        assert_eq!(strip_volume_extension("db/pdbaa"), "db/pdbaa");
    }

    #[test]
    fn extract_header_blobs() {
        use super::extract_header_blobs;

        let data: Vec<u8> = (0..12).collect();
        let index = index_with_offsets(vec![0, 10, 10, 12]);

        let got = extract_header_blobs(&index, &data).unwrap();
        let expected: Vec<&[u8]> = vec![&data[0..10], &data[10..10], &data[10..12]];

        assert_eq!(got, expected);
    }

    #[test]
    fn extract_header_blobs_inverted_range() {
        use super::extract_header_blobs;
        use crate::error::Error;

        let data: Vec<u8> = vec![0; 20];
        let index = index_with_offsets(vec![0, 10, 5]);

        assert!(matches!(extract_header_blobs(&index, &data), Err(Error::InvalidOffsets { oid: 1, start: 10, end: 5, .. })));
    }

    #[test]
    fn extract_header_blobs_past_end() {
        use super::extract_header_blobs;
        use crate::error::Error;

        let data: Vec<u8> = vec![0; 8];
        let index = index_with_offsets(vec![0, 9]);

        assert!(matches!(extract_header_blobs(&index, &data), Err(Error::InvalidOffsets { oid: 0, .. })));
    }

    #[test]
    fn dump_header_blobs() {
        use super::dump_header_blobs;

        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("nested").join("out");
        let blobs: Vec<&[u8]> = vec![&b"first"[..], &b""[..]];

        dump_header_blobs(&blobs, &out_dir).unwrap();

        assert_eq!(std::fs::read(out_dir.join("header_0.bin")).unwrap(), b"first");
        assert_eq!(std::fs::read(out_dir.join("header_1.bin")).unwrap(), b"");
    }
}
