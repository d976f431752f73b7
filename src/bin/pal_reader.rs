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
use std::path::PathBuf;

use clap::Parser;

use blastdb_legacy::alias::format_alias;
use blastdb_legacy::alias::read_alias_file;

type E = Box<dyn std::error::Error>;

#[derive(Parser)]
#[command(version)]
#[command(about = "Print the volumes and metadata of a BLAST alias file")]
struct Cli {
    // Alias file (.pal or .nal)
    #[arg(required = true, help = "Alias file")]
    alias_file: PathBuf,

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
    let info = read_alias_file(&cli.alias_file).map_err(|e| format!("{}: {}", cli.alias_file.display(), e))?;
    let stdout = std::io::stdout();
    let mut conn_out = BufWriter::new(stdout.lock());
    format_alias(&info, &mut conn_out)?;
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
