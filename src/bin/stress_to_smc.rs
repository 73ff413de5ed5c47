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

//! Converts a regridded soil moisture stress field back to soil
//! moisture content.
//!
//! After the inverse transform the content is held within the
//! model's physical bounds and negative points are masked. A second
//! output combines the content with a snow field, which downstream
//! conversion expects as one "smow" file.

use ancil::{
    errors::AncilError,
    io,
    soil::{self, CRIT_STASH, SAT_STASH, SMC_NAME, SNOW_STASH, STRESS_NAME, WILT_STASH},
};
use clap::Parser;
use log::{error, info};
use std::path::PathBuf;

#[derive(Parser)]
#[command(about = "Convert regridded soil moisture stress back to soil moisture content")]
struct Cli {
    /// Regridded stress file
    stress: PathBuf,

    /// Dump regridded to the stress grid, holding the threshold fields
    regridded_dump: PathBuf,

    /// Output content file
    output: PathBuf,

    /// File providing the soil level depths and bounds
    levels_source: PathBuf,

    /// Snow field to combine with the content
    snow: PathBuf,

    /// Output file for the combined content and snow
    smow_output: PathBuf,
}

fn main() {
    ancil::init_logging();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(_) => info!(
            "Soil moisture content written to {} and {}",
            cli.output.display(),
            cli.smow_output.display()
        ),
        Err(err) => {
            error!("Content reconstruction failed with error: {}", err);
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<(), AncilError> {
    let mut stress = io::read_field(&cli.stress, STRESS_NAME)?;

    let levels_source = io::read_field(&cli.levels_source, SMC_NAME)?;
    let levels = levels_source
        .levels
        .ok_or(AncilError::Incompatible("Levels source carries no soil levels"))?;
    if levels.len() != stress.nlevels() {
        return Err(AncilError::Incompatible(
            "Levels source does not match the stress field's layer count",
        ));
    }
    stress.levels = Some(levels);

    let wilt = io::read_field(&cli.regridded_dump, WILT_STASH)?;
    let crit = io::read_field(&cli.regridded_dump, CRIT_STASH)?;
    let sat = io::read_field(&cli.regridded_dump, SAT_STASH)?;

    let smc = soil::stress_to_smc(&stress, &wilt, &crit, &sat)?;
    io::write_fields(&cli.output, std::slice::from_ref(&smc))?;

    // the reader collapses the snow field to its first time level
    let snow = io::read_field(&cli.snow, SNOW_STASH)?;
    io::write_fields(&cli.smow_output, &[smc, snow])
}
