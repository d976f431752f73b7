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

//! Errors returned by the readers and decoders.

use thiserror::Error;

/// The error type for all fallible operations in this crate.
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A fixed-width or length-prefixed read ran past the end of the buffer.
    #[error("unexpected end of buffer while reading {field} at offset {offset}: needed {needed} bytes, {available} available")]
    Truncated {
        field: &'static str,
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("unsupported database format version: {0}")]
    UnsupportedVersion(u32),

    /// Long-form BER length with zero or more than 8 length bytes.
    #[error("unsupported BER length size: {0} bytes")]
    UnsupportedLength(u8),

    #[error("indefinite length used with primitive element")]
    IndefinitePrimitive,

    #[error("BER element at offset {offset} with length {length} exceeds buffer ({available} bytes left)")]
    ElementOverrun {
        offset: usize,
        length: usize,
        available: usize,
    },

    #[error("expected {expected}, found {found}")]
    UnexpectedTag {
        expected: &'static str,
        found: String,
    },

    #[error("invalid integer length {length} at offset {offset}")]
    InvalidInteger {
        offset: usize,
        length: usize,
    },

    #[error("failed to advance while scanning for string element at offset {offset}")]
    NoProgress {
        offset: usize,
    },

    #[error("BER structure nested deeper than {limit} levels")]
    TooDeep {
        limit: usize,
    },

    #[error("header offsets for OID {oid} are invalid: [{start}, {end}) in a file of {size} bytes")]
    InvalidOffsets {
        oid: usize,
        start: u32,
        end: u32,
        size: usize,
    },

    #[error("line {line}: {message}")]
    Alias {
        line: usize,
        message: String,
    },

    #[error("only protein databases (sequence type 1) contain residues")]
    NotProtein,

    #[error("sequence offsets appear to be corrupt")]
    CorruptOffsets,

    #[error("sequence offsets [{start}, {end}) exceed sequence file length {size}")]
    SequenceOutOfRange {
        start: u32,
        end: u32,
        size: usize,
    },
}

/// Shorthand for results carrying [Error].
pub type Result<T> = std::result::Result<T, Error>;
