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

//! Fills missing data and merges ancillary datasets.
//!
//! With two sources the first is the primary and the second the
//! alternate merged into it, optionally restricted by a validity
//! polygon. Filling of missing data runs as the final step and can
//! account for a land-sea mask so that land points are only filled
//! from land points.

use ancil::{
    analysis::{fill_field, land_mask, load_polygon, make_consistent_with_lsm, merge_all},
    errors::AncilError,
    io, Float,
};
use clap::{ArgAction, Parser};
use log::{error, info};
use std::path::PathBuf;

#[derive(Parser)]
#[command(about = "Merge ancillary datasets and fill their missing data")]
struct Cli {
    /// Primary source file
    primary: PathBuf,

    /// Alternate source merged into the primary
    alternate: Option<PathBuf>,

    /// Output file
    #[arg(short, long)]
    output: PathBuf,

    /// Validity polygon restricting where the primary takes priority
    #[arg(long)]
    polygon: Option<PathBuf>,

    /// Land-sea mask restricting the missing neighbour search
    #[arg(long)]
    target_lsm: Option<PathBuf>,

    /// Land fraction threshold turning a fraction field into a mask
    #[arg(long)]
    land_threshold: Option<Float>,

    /// Treat mask true values as masked instead of valid
    #[arg(long = "invert-mask", action = ArgAction::SetFalse)]
    invert_mask: bool,
}

fn main() {
    ancil::init_logging();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(_) => info!("Merged output written to {}", cli.output.display()),
        Err(err) => {
            error!("Fill and merge failed with error: {}", err);
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<(), AncilError> {
    let mut fields = io::read_all_fields(&cli.primary)?;

    if let Some(alternate) = &cli.alternate {
        let alternates = io::read_all_fields(alternate)?;
        let polygon = cli.polygon.as_deref().map(load_polygon).transpose()?;

        fields = merge_all(fields, alternates, polygon.as_ref())?;
    }

    match &cli.target_lsm {
        Some(lsm_path) => {
            let lsm_field = io::read_first_field(lsm_path)?;
            let mask = land_mask(&lsm_field, cli.land_threshold);

            for field in &mut fields {
                make_consistent_with_lsm(field, &mask, cli.invert_mask)?;
            }
        }
        None => {
            for field in &mut fields {
                let filled = fill_field(field);
                info!("{}: {} missing points filled", field.name, filled);
            }
        }
    }

    io::write_fields(&cli.output, &fields)
}
