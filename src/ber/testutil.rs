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

//! Minimal BER writer for building test input.

/// Encode a definite length.
pub fn length(len: usize) -> Vec<u8> {
    if len < 0x80 {
        return vec![len as u8]
    }
    let bytes: Vec<u8> = len.to_be_bytes().into_iter().skip_while(|b| *b == 0).collect();
    let mut out = vec![0x80 | bytes.len() as u8];
    out.extend(bytes);
    out
}

/// Element with a single-byte `tag` and definite length.
pub fn tlv(tag: u8, content: &[u8]) -> Vec<u8> {
    let mut out = vec![tag];
    out.extend(length(content.len()));
    out.extend_from_slice(content);
    out
}

/// Element with a single-byte `tag` and indefinite length.
pub fn indefinite(tag: u8, content: &[u8]) -> Vec<u8> {
    let mut out = vec![tag, 0x80];
    out.extend_from_slice(content);
    out.extend_from_slice(&[0, 0]);
    out
}

pub fn seq(content: &[u8]) -> Vec<u8> {
    tlv(0x30, content)
}

pub fn visible(s: &str) -> Vec<u8> {
    tlv(0x1a, s.as_bytes())
}

/// INTEGER in minimal two's complement form.
pub fn int(value: i64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let mut start = 0;
    while start < 7 {
        let redundant = (bytes[start] == 0x00 && bytes[start + 1] & 0x80 == 0)
            || (bytes[start] == 0xff && bytes[start + 1] & 0x80 != 0);
        if !redundant {
            break;
        }
        start += 1;
    }
    tlv(0x02, &bytes[start..])
}

/// Constructed context-specific element `[number]` wrapping `content`.
pub fn ctx(number: u8, content: &[u8]) -> Vec<u8> {
    tlv(0xa0 | number, content)
}

/// Primitive context-specific element `[number]`.
pub fn ctx_prim(number: u8, content: &[u8]) -> Vec<u8> {
    tlv(0x80 | number, content)
}

/// Textseq-id style identifier `[kind] { [0] name?, [1] accession, [3] version? }`.
pub fn text_seq_id(kind: u8, accession: &str, version: Option<i64>) -> Vec<u8> {
    let mut fields = ctx(1, &visible(accession));
    if let Some(v) = version {
        fields.extend(ctx(3, &int(v)));
    }
    ctx(kind, &seq(&fields))
}

/// One definition line `{ [0] title, [1] ids, [2] taxid? }`.
pub fn defline(title: &str, ids: &[Vec<u8>], taxid: Option<i64>) -> Vec<u8> {
    let mut fields = ctx(0, &visible(title));
    fields.extend(ctx(1, &seq(&ids.concat())));
    if let Some(t) = taxid {
        fields.extend(ctx(2, &int(t)));
    }
    seq(&fields)
}
