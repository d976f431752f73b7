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

use clap::Parser;

use blastdb_legacy::index::volume::header_path;
use blastdb_legacy::index::volume::read_file;
use blastdb_legacy::DecodeOptions;

mod cli;

type E = Box<dyn std::error::Error>;

/// Initializes the logger with verbosity given in `log_max_level`.
fn init_log(log_max_level: usize) {
    stderrlog::new()
    .module(module_path!())
    .quiet(false)
    .verbosity(log_max_level)
    .timestamp(stderrlog::Timestamp::Off)
    .init()
    .unwrap();
}

fn run(
    cli: &cli::Cli,
) -> Result<(), E> {
    let options = DecodeOptions {
        max_depth: cli.max_depth,
        preview_bytes: cli.preview_bytes,
    };

    let index_bytes = read_file(&cli.index_file)?;
    let header_file = header_path(&cli.index_file);
    log::info!("Reading headers from {}", header_file.display());
    let header_bytes = read_file(&header_file)?;

    let stdout = std::io::stdout();
    let mut conn_out = BufWriter::new(stdout.lock());
    blastdb_legacy::summarize(&index_bytes, &header_bytes, cli.output_dir.as_deref(), &options, &mut conn_out)?;
    conn_out.flush()?;

    Ok(())
}

fn main() {
    let cli = match cli::Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version are not errors
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        },
    };

    init_log(if cli.verbose { 2 } else { 1 });

    if let Err(e) = run(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(2);
    }
}
