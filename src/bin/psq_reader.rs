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
use std::io::BufWriter;
use std::io::Write;
use std::path::PathBuf;

use clap::Parser;

use blastdb_legacy::index::volume::read_file;
use blastdb_legacy::index::volume::read_index_file;
use blastdb_legacy::index::volume::strip_volume_extension;
use blastdb_legacy::residues::check_protein_index;
use blastdb_legacy::residues::format_metadata;
use blastdb_legacy::residues::format_sequences;

type E = Box<dyn std::error::Error>;

#[derive(Parser)]
#[command(version)]
#[command(about = "Print the protein sequences of a legacy BLAST database volume")]
struct Cli {
    // Volume name with or without the .pin or .psq extension
    #[arg(required = true, help = "Volume")]
    volume: String,

    // Verbosity
    #[arg(long = "verbose", default_value_t = false)]
    verbose: bool,
}

/// Initializes the logger with verbosity given in `log_max_level`.
fn init_log(log_max_level: usize) {
    stderrlog::new()
    .module(module_path!())
    .module("blastdb_legacy")
    .quiet(false)
    .verbosity(log_max_level)
    .timestamp(stderrlog::Timestamp::Off)
    .init()
    .unwrap();
}

fn run(
    cli: &Cli,
) -> Result<(), E> {
    let volume = strip_volume_extension(&cli.volume);
    let index_file = PathBuf::from(volume.clone() + ".pin");
    let sequence_file = PathBuf::from(volume + ".psq");

    let index = read_index_file(&index_file)?;
    check_protein_index(&index)?;
    let psq = read_file(&sequence_file)?;
    log::info!("Read {} bytes of residues from {}", psq.len(), sequence_file.display());

    let stdout = std::io::stdout();
    let mut conn_out = BufWriter::new(stdout.lock());
    format_metadata(&index, &mut conn_out)?;
    format_sequences(&index, &psq, &mut conn_out)?;
    conn_out.flush()?;

    Ok(())
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        },
    };

    init_log(if cli.verbose { 2 } else { 1 });

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
