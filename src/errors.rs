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

use thiserror::Error;

/// Top-level error returned by the command-line pipelines.
#[derive(Error, Debug)]
pub enum AncilError {
    #[error("Error while reading ancil.yaml: {0}")]
    Config(#[from] ConfigError),

    #[error("Error while reading input data: {0}")]
    Input(#[from] InputError),

    #[error("Error while regridding: {0}")]
    Regrid(#[from] RegridError),

    #[error("Error while creating ThreadPool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Error while writing output: {0}")]
    Output(#[from] netcdf::Error),

    #[error("Fields are not compatible: {0}")]
    Incompatible(&'static str),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot open ancil.yaml: {0}")]
    CantOpenFile(#[from] std::io::Error),

    #[error("Cannot deserialize ancil.yaml: {0}")]
    CantDeserialize(#[from] serde_yaml::Error),

    #[error("Configuration component is out of bounds: {0}")]
    OutOfBounds(&'static str),
}

#[derive(Error, Debug)]
pub enum InputError {
    #[error("Cannot access input file: {0}")]
    CantOpenFile(#[from] std::io::Error),

    #[error("NetCDF error: {0}")]
    NetCDF(#[from] netcdf::Error),

    #[error("Variable {0} not found in input file")]
    MissingVariable(String),

    #[error("Coordinate {0} not found in input file")]
    MissingCoordinate(&'static str),

    #[error("Input data is malformed: {0}")]
    Malformed(&'static str),

    #[error("Cannot deserialize polygon file: {0}")]
    BadPolygon(#[from] serde_yaml::Error),

    #[error("Expecting file to contain a single geometry, {0} found")]
    MultipleGeometries(usize),
}

#[derive(Error, Debug)]
pub enum RegridError {
    #[error("Source grid is degenerate: {0}")]
    DegenerateGrid(&'static str),

    #[error("Field shape {got:?} does not match grid shape {expected:?}")]
    ShapeMismatch {
        got: (usize, usize),
        expected: (usize, usize),
    },
}
