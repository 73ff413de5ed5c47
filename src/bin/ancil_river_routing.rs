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

//! Derives the river routing sequence and direction ancillaries
//! consistent with a land-cover fraction.

use ancil::{
    analysis::{derive_river_routing, DIRECTION_NAME, LAND_COVER_NAME, SEQUENCE_NAME},
    errors::AncilError,
    io,
};
use clap::Parser;
use log::{error, info};
use std::path::PathBuf;

#[derive(Parser)]
#[command(about = "Derive river routing ancillaries consistent with a land cover fraction")]
struct Cli {
    /// File holding the river routing sequence and direction
    source: PathBuf,

    /// Land cover fraction file
    #[arg(long)]
    land_cover_fraction: PathBuf,

    /// Output file
    #[arg(short, long)]
    output: PathBuf,
}

fn main() {
    ancil::init_logging();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(_) => info!("River routing written to {}", cli.output.display()),
        Err(err) => {
            error!("River routing derivation failed with error: {}", err);
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<(), AncilError> {
    let sequence = io::read_field(&cli.source, SEQUENCE_NAME)?;
    let direction = io::read_field(&cli.source, DIRECTION_NAME)?;
    let land_cover = io::read_field(&cli.land_cover_fraction, LAND_COVER_NAME)?;

    let routing = derive_river_routing(&sequence, &direction, &land_cover)?;

    io::write_fields(&cli.output, &[routing.direction, routing.sequence])
}
