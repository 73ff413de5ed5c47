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

//! Regrids every field of a source file onto a target grid.
//!
//! The target grid comes from a plain grid file or from a land-sea
//! mask; with a mask the regridded fields are additionally made
//! consistent with it, filling coastal points from their nearest
//! valid neighbours. The scheme is selected through `ancil.yaml`.

use ancil::{
    analysis::{land_mask, make_consistent_with_lsm},
    config::Config,
    errors::AncilError,
    grid::Grid,
    io,
    regrid::regrid_field,
    Float,
};
use clap::{ArgAction, ArgGroup, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use ndarray::Array2;
use std::path::PathBuf;

#[derive(Parser)]
#[command(about = "Regrid every field of a source file onto a target grid")]
#[command(group(ArgGroup::new("target").required(true).args(["target_grid", "target_lsm"])))]
struct Cli {
    /// Source file whose fields are all regridded
    source: PathBuf,

    /// Output file
    #[arg(short, long)]
    output: PathBuf,

    /// File defining the target grid
    #[arg(long)]
    target_grid: Option<PathBuf>,

    /// Land-sea mask defining the target grid and validity
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
        Ok(_) => info!("Regridded output written to {}", cli.output.display()),
        Err(err) => {
            error!("Regridding failed with error: {}", err);
            std::process::exit(1);
        }
    }
}

fn load_target(cli: &Cli) -> Result<(Grid, Option<Array2<bool>>), AncilError> {
    if let Some(grid_path) = &cli.target_grid {
        return Ok((io::read_grid(grid_path)?, None));
    }

    // clap guarantees one of the two targets is present
    let lsm_path = cli.target_lsm.as_ref().ok_or(AncilError::Incompatible(
        "Either a target grid or a target land-sea mask is required",
    ))?;

    let lsm_field = io::read_first_field(lsm_path)?;

    let mask = land_mask(&lsm_field, cli.land_threshold);
    Ok((lsm_field.grid, Some(mask)))
}

fn run(cli: &Cli) -> Result<(), AncilError> {
    let config = Config::load()?;

    rayon::ThreadPoolBuilder::new()
        .num_threads(config.resources.threads.into())
        .build_global()?;

    let fields = io::read_all_fields(&cli.source)?;
    let (target, mask) = load_target(cli)?;

    let progress = ProgressBar::new(fields.len() as u64).with_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let mut results = Vec::with_capacity(fields.len());

    for field in &fields {
        progress.set_message(field.name.clone());

        let mut regridded = regrid_field(field, &target, config.regridding.scheme)?;

        if let Some(mask) = &mask {
            make_consistent_with_lsm(&mut regridded, mask, cli.invert_mask)?;
        }

        results.push(regridded);
        progress.inc(1);
    }

    progress.finish_and_clear();
    io::write_fields(&cli.output, &results)
}
