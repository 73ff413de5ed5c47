/*
Copyright 2026 ancil developers

This file is part of the ancillary processing suite (ancil).

ancil is a free software: you can redistribute it and/or modify
it under the terms of the GNU General Public License as published by
the Free Software Foundation; either version 3 of the License, or
(at your option) any later version.

ancil is distributed in the hope that it will be useful,
but WITHOUT ANY WARRANTY; without even the implied warranty of
MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
GNU General Public License for more details.

You should have received a copy of the GNU General Public License
along with ancil. If not, see https://www.gnu.org/licenses/.
*/

//! File format translation into the model-ready ancillary output.
//!
//! All fields of the source file are rewritten, optionally stamped
//! with the grid staggering the conversion chain cannot usually
//! infer from its inputs (3 for New Dynamics, 6 for ENDGame).

use ancil::{errors::AncilError, io};
use clap::Parser;
use log::{error, info};
use std::path::PathBuf;

#[derive(Parser)]
#[command(about = "Translate a source file into the model-ready ancillary output")]
struct Cli {
    /// Source file whose fields are all translated
    source: PathBuf,

    /// Output file
    #[arg(short, long)]
    output: PathBuf,

    /// Grid staggering of the source file, usually 3 or 6
    #[arg(short, long)]
    grid_staggering: Option<i32>,
}

fn main() {
    ancil::init_logging();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(_) => info!("Ancillary written to {}", cli.output.display()),
        Err(err) => {
            error!("Ancillary translation failed with error: {}", err);
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<(), AncilError> {
    let fields = io::read_all_fields(&cli.source)?;

    match cli.grid_staggering {
        Some(staggering) => {
            io::write_fields_with_staggering(&cli.output, &fields, staggering)
        }
        None => io::write_fields(&cli.output, &fields),
    }
}
