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

//! End-to-end conversion through files: content to stress, through
//! a NetCDF round trip, and back to content.

use ancil::grid::{Field, Grid, SoilLevels};
use ancil::soil::{self, SMC_NAME, STRESS_NAME};
use ancil::io;
use float_cmp::assert_approx_eq;
use ndarray::{array, Array3};
use std::path::PathBuf;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("ancil_{}_{}.nc", std::process::id(), name))
}

fn grid() -> Grid {
    Grid::new(array![50.0, 51.0], array![-2.0, -1.0])
}

fn levels() -> SoilLevels {
    SoilLevels {
        centres: array![0.05, 0.225],
        bounds: array![[0.0, 0.1], [0.1, 0.35]],
    }
}

fn threshold(value: f64) -> Field {
    Field::from_layer(
        "threshold",
        None,
        grid(),
        ndarray::Array2::from_elem((2, 2), value),
    )
    .unwrap()
}

#[test]
fn content_survives_conversion_through_files() {
    let smc = Field::new(
        SMC_NAME,
        Some("kg m-2".to_string()),
        grid(),
        Some(levels()),
        Array3::from_elem((2, 2, 2), 19.9554),
    )
    .unwrap();

    let wilt = threshold(0.1);
    let crit = threshold(0.3);
    let sat = threshold(0.45);

    let stress = soil::smc_to_stress(&smc, &wilt, &crit).unwrap();

    let path = temp_path("stress_stage");
    io::write_fields(&path, &[stress]).unwrap();
    let mut stress = io::read_field(&path, STRESS_NAME).unwrap();
    std::fs::remove_file(&path).ok();

    // the stress file carries its own depth coordinate back in
    assert!(stress.levels.is_some());
    stress.levels = Some(levels());

    let back = soil::stress_to_smc(&stress, &wilt, &crit, &sat).unwrap();

    // the original content sits inside the clamping interval on
    // both layers so the round trip is exact up to file precision
    assert_approx_eq!(f64, back.data[[0, 0, 0]], 19.9554, epsilon = 1.0e-6);
    assert_approx_eq!(f64, back.data[[1, 1, 1]], 19.9554, epsilon = 1.0e-6);
}

#[test]
fn masked_points_propagate_through_the_pipeline() {
    let mut data = Array3::from_elem((2, 2, 2), 19.9554);
    data[[0, 0, 0]] = f64::NAN;
    data[[1, 0, 0]] = f64::NAN;

    let smc = Field::new(
        SMC_NAME,
        Some("kg m-2".to_string()),
        grid(),
        Some(levels()),
        data,
    )
    .unwrap();

    let stress = soil::smc_to_stress(&smc, &threshold(0.1), &threshold(0.3)).unwrap();

    let path = temp_path("masked_stage");
    io::write_fields(&path, &[stress]).unwrap();
    let back = io::read_field(&path, STRESS_NAME).unwrap();
    std::fs::remove_file(&path).ok();

    assert!(back.data[[0, 0, 0]].is_nan());
    assert!(!back.data[[0, 1, 1]].is_nan());
}
