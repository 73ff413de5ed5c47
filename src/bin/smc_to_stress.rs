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

//! Derives the soil moisture stress field from an initial soil
//! moisture content ancillary.
//!
//! The wilting and critical point fields come from a global dump on
//! a 0..360 longitude axis; their longitudes are normalized and the
//! fields subset to the content field's region before the
//! conversion.

use ancil::{
    errors::AncilError,
    io,
    soil::{self, CRIT_STASH, SMC_NAME, WILT_STASH},
};
use clap::Parser;
use log::{error, info};
use std::path::PathBuf;

#[derive(Parser)]
#[command(about = "Convert a soil moisture content ancillary to soil moisture stress")]
struct Cli {
    /// Initial soil moisture content file
    initial_smc: PathBuf,

    /// Global dump holding the wilting and critical point fields
    dump: PathBuf,

    /// Output stress file
    output: PathBuf,

    /// File providing the soil level depths and bounds
    levels_source: PathBuf,
}

fn main() {
    ancil::init_logging();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(_) => info!("Soil moisture stress written to {}", cli.output.display()),
        Err(err) => {
            error!("Stress conversion failed with error: {}", err);
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<(), AncilError> {
    let mut smc = io::read_field(&cli.initial_smc, SMC_NAME)?;

    let levels_source = io::read_field(&cli.levels_source, SMC_NAME)?;
    let levels = levels_source
        .levels
        .ok_or(AncilError::Incompatible("Levels source carries no soil levels"))?;
    if levels.len() != smc.nlevels() {
        return Err(AncilError::Incompatible(
            "Levels source does not match the content field's layer count",
        ));
    }
    smc.levels = Some(levels);

    let mut wilt = io::read_field(&cli.dump, WILT_STASH)?;
    let mut crit = io::read_field(&cli.dump, CRIT_STASH)?;

    wilt.normalize_longitudes();
    crit.normalize_longitudes();

    let wilt = wilt.extract_region(&smc.grid);
    let crit = crit.extract_region(&smc.grid);

    let stress = soil::smc_to_stress(&smc, &wilt, &crit)?;
    io::write_fields(&cli.output, &[stress])
}
