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
use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(version)]
#[command(about = "Print the definition lines of a legacy BLAST database volume")]
pub struct Cli {
    // Index file (.pin or .nin), the header file is found next to it
    #[arg(required = true, help = "Index file")]
    pub index_file: PathBuf,

    // Write each raw header blob to <dir>/header_<oid>.bin
    #[arg(required = false, help = "Directory for raw header blobs")]
    pub output_dir: Option<PathBuf>,

    // Nesting limit for constructed BER elements
    #[arg(long = "max-depth", default_value_t = blastdb_legacy::ber::DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    // Bytes of hex shown for records that failed to decode
    #[arg(long = "preview-bytes", default_value_t = 32)]
    pub preview_bytes: usize,

    // Verbosity
    #[arg(long = "verbose", default_value_t = false)]
    pub verbose: bool,
}
