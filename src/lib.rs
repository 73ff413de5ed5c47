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

//! Ancillary processing suite (ancil) is a collection of command-line
//! tools for preparing, regridding and physically transforming
//! soil-moisture and land-surface fields used as ancillary inputs
//! to a numerical weather model.
//!
//! The library provides the shared machinery: a gridded field data
//! model with coordinate metadata, NetCDF input/output, bilinear and
//! area-weighted regridding with coastline overshoot correction,
//! soil-moisture stress conversions, and masking/merging/filling
//! analysis operations. Each binary under `src/bin` is a short,
//! single-pass pipeline over this library.

pub mod analysis;
pub mod config;
pub mod constants;
pub mod errors;
pub mod grid;
pub mod io;
pub mod regrid;
pub mod soil;

/// Floating-point type used for all field data.
pub type Float = f64;

/// Initialises the logger shared by all binaries.
///
/// The level is taken from the `ANCIL_LOG_LEVEL` environment
/// variable; without it the default is `info`, or `debug` for
/// builds with the `debug` feature.
pub fn init_logging() {
    #[cfg(not(feature = "debug"))]
    let logger_env = env_logger::Env::new().filter_or("ANCIL_LOG_LEVEL", "info");

    #[cfg(feature = "debug")]
    let logger_env = env_logger::Env::new().filter_or("ANCIL_LOG_LEVEL", "debug");

    env_logger::Builder::from_env(logger_env)
        .format_timestamp_millis()
        .init();
}
