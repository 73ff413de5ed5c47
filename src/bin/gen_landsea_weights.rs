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

//! Regrids soil moisture stress onto a land-sea mask grid with
//! bilinear weights corrected for coastal overshoot.
//!
//! The weight correction runs against the surface layer; the
//! corrected weights are then reused for every soil level so the
//! whole column stays consistent.

use ancil::{
    config::Config,
    errors::AncilError,
    io,
    regrid::{regrid_field_with, BilinearRegridder},
    soil::STRESS_NAME,
};
use clap::Parser;
use log::{error, info, warn};
use std::path::PathBuf;

#[derive(Parser)]
#[command(about = "Regrid soil moisture stress onto a land-sea mask grid with overshoot-corrected weights")]
struct Cli {
    /// Soil moisture stress file on the source grid
    stress: PathBuf,

    /// File defining the target grid
    land_mask: PathBuf,

    /// Output regridded stress file
    output: PathBuf,
}

fn main() {
    ancil::init_logging();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(_) => info!("Regridded stress written to {}", cli.output.display()),
        Err(err) => {
            error!("Weight generation failed with error: {}", err);
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<(), AncilError> {
    let config = Config::load()?;

    rayon::ThreadPoolBuilder::new()
        .num_threads(config.resources.threads.into())
        .build_global()?;

    let stress = io::read_field(&cli.stress, STRESS_NAME)?;
    let target = io::read_grid(&cli.land_mask)?;

    let mut regridder = BilinearRegridder::new(&stress.grid, &target)?;
    let remaining = regridder.correct_overshoot(
        stress.surface(),
        config.regridding.overshoot_threshold,
    )?;

    if remaining > 0 {
        warn!(
            "{} points still overshoot after exhausting the stencil",
            remaining
        );
    }

    let regridded = regrid_field_with(&stress, &target, &regridder)?;
    io::write_fields(&cli.output, &[regridded])
}
