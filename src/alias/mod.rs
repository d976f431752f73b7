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

//! Alias files (.pal and .nal) that group volumes into one database.
//!
//! An alias file is line based. `#` starts a comment, and every other
//! non-blank line holds a key and a value separated by whitespace. The
//! `DBLIST` key lists volume names and may appear more than once.
//!
//! ## Usage
//!
//! ```rust
//! use blastdb_legacy::alias::parse_alias;
//!
//! let text = "# alias file\nTITLE Swissprot\nDBLIST swissprot.00 swissprot.01\nNSEQ 482697\n";
//! let info = parse_alias(text).unwrap();
//!
//! assert_eq!(info.volumes, vec!["swissprot.00", "swissprot.01"]);
//! assert_eq!(info.metadata.get("TITLE").map(|x| x.as_str()), Some("Swissprot"));
//! ```
//!

use std::io::Write;
use std::path::Path;

use indexmap::IndexMap;

use crate::error::{Error, Result};

type E = Box<dyn std::error::Error>;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AliasInfo {
    /// Volume names from all `DBLIST` lines in order.
    pub volumes: Vec<String>,
    /// Every other key in the order it appears in the file.
    pub metadata: IndexMap<String, String>,
}

/// Parse the contents of an alias file.
///
/// Returns an error naming the line for keys without a value, `DBLIST`
/// lines without volumes, and keys other than `DBLIST` that appear twice.
pub fn parse_alias(
    text: &str,
) -> Result<AliasInfo> {
    let mut info = AliasInfo::default();

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        let Some((key, value)) = line.split_once(char::is_whitespace) else {
            return Err(Error::Alias { line: line_no, message: format!("missing a value: {}", line) })
        };
        let value = value.trim();
        if value.is_empty() {
            return Err(Error::Alias { line: line_no, message: format!("empty value: {}", line) })
        }

        if key == "DBLIST" {
            info.volumes.extend(value.split_whitespace().map(|x| x.to_string()));
            continue;
        }

        if info.metadata.contains_key(key) {
            return Err(Error::Alias { line: line_no, message: format!("duplicate key '{}'", key) })
        }
        info.metadata.insert(key.to_string(), value.to_string());
    }

    log::debug!("alias lists {} volumes and {} other keys", info.volumes.len(), info.metadata.len());
    Ok(info)
}

/// Read and parse the alias file at `path`.
pub fn read_alias_file(
    path: &Path,
) -> Result<AliasInfo> {
    let text = std::fs::read_to_string(path)?;
    parse_alias(&text)
}

/// Format the volumes and metadata of an alias file.
///
/// Volumes are listed in file order and metadata sorted by key.
pub fn format_alias<W: Write>(
    info: &AliasInfo,
    conn: &mut W,
) -> std::result::Result<(), E> {
    writeln!(conn, "Volumes (DBLIST):")?;
    if info.volumes.is_empty() {
        writeln!(conn, "  <none>")?;
    }
    for name in info.volumes.iter() {
        writeln!(conn, "  - {}", name)?;
    }

    writeln!(conn)?;
    writeln!(conn, "Additional data:")?;
    if info.metadata.is_empty() {
        writeln!(conn, "  <none>")?;
    }
    let mut metadata = info.metadata.clone();
    metadata.sort_keys();
    for (key, value) in metadata.iter() {
        writeln!(conn, "  {}: {}", key, value)?;
    }
    conn.flush()?;
    Ok(())
}
