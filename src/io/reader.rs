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

//! Sub-module reading gridded fields out of NetCDF files.
//!
//! Variables are looked up by name first, then by their
//! `standard_name` or `um_stash_source` attribute, so files from
//! different conversion chains keep working. Time is collapsed to
//! the first level and north-to-south latitude axes are flipped
//! ascending on read.

use crate::{
    errors::InputError,
    grid::{Field, Grid, SoilLevels},
    Float,
};
use log::debug;
use ndarray::{Array1, Array2, Array3};
use std::path::Path;

const LAT_NAMES: &[&str] = &["latitude", "lat", "grid_latitude"];
const LON_NAMES: &[&str] = &["longitude", "lon", "grid_longitude"];
const DEPTH_NAMES: &[&str] = &["depth", "soil_model_level_number"];
const TIME_NAMES: &[&str] = &["time", "t"];

/// Reads the horizontal grid of a file without touching its data.
/// A north-to-south latitude axis comes back ascending.
pub fn read_grid(path: &Path) -> Result<Grid, InputError> {
    let file = netcdf::open(path)?;
    let mut grid = grid_from_file(&file)?;

    if grid.lats_descending() {
        grid.lats = grid.lats.slice(ndarray::s![..;-1]).to_owned();
    }

    Ok(grid)
}

/// Reads a single named field.
pub fn read_field(path: &Path, name: &str) -> Result<Field, InputError> {
    let file = netcdf::open(path)?;

    let var = find_variable(&file, name)
        .ok_or_else(|| InputError::MissingVariable(name.to_string()))?;

    field_from_variable(&file, &var)
}

/// Reads every gridded field of a file, skipping coordinate and
/// bounds variables.
pub fn read_all_fields(path: &Path) -> Result<Vec<Field>, InputError> {
    let file = netcdf::open(path)?;
    let mut fields = Vec::new();

    for var in file.variables() {
        let name = var.name();

        if is_coordinate_name(&name) || name.ends_with("bnds") {
            continue;
        }
        if var.dimensions().len() < 2 {
            continue;
        }

        fields.push(field_from_variable(&file, &var)?);
    }

    if fields.is_empty() {
        return Err(InputError::Malformed("file contains no gridded fields"));
    }

    debug!("Read {} fields from file", fields.len());
    Ok(fields)
}

/// Reads the first gridded field of a file, the usual case for
/// land-sea mask files carrying a single variable.
pub fn read_first_field(path: &Path) -> Result<Field, InputError> {
    read_all_fields(path)?
        .into_iter()
        .next()
        .ok_or(InputError::Malformed("file contains no gridded fields"))
}

fn is_coordinate_name(name: &str) -> bool {
    LAT_NAMES.contains(&name)
        || LON_NAMES.contains(&name)
        || DEPTH_NAMES.contains(&name)
        || TIME_NAMES.contains(&name)
}

fn find_variable<'f>(file: &'f netcdf::File, name: &str) -> Option<netcdf::Variable<'f>> {
    if let Some(var) = file.variable(name) {
        return Some(var);
    }

    file.variables().find(|var| {
        str_attribute(var, "standard_name").as_deref() == Some(name)
            || str_attribute(var, "um_stash_source").as_deref() == Some(name)
    })
}

fn field_from_variable(
    file: &netcdf::File,
    var: &netcdf::Variable,
) -> Result<Field, InputError> {
    let dims = var.dimensions();
    let dim_names: Vec<String> = dims.iter().map(|d| d.name()).collect();
    let ndim = dims.len();

    if ndim < 2 || ndim > 4 {
        return Err(InputError::Malformed(
            "variables must have two to four dimensions",
        ));
    }

    // lat and lon are always the two fastest-varying dimensions
    let lat_ok = LAT_NAMES.contains(&dim_names[ndim - 2].as_str());
    let lon_ok = LON_NAMES.contains(&dim_names[ndim - 1].as_str());
    if !lat_ok || !lon_ok {
        return Err(InputError::Malformed(
            "last two dimensions must be latitude and longitude",
        ));
    }

    let has_time = ndim >= 3 && TIME_NAMES.contains(&dim_names[0].as_str());
    let depth_name = dim_names
        .iter()
        .find(|name| DEPTH_NAMES.contains(&name.as_str()));

    if ndim == 4 && !(has_time && depth_name.is_some()) {
        return Err(InputError::Malformed(
            "four-dimensional variables must be (time, depth, lat, lon)",
        ));
    }
    if ndim == 3 && !has_time && depth_name.is_none() {
        return Err(InputError::Malformed(
            "three-dimensional variables must lead with time or depth",
        ));
    }

    let nlat = dims[ndim - 2].len();
    let nlon = dims[ndim - 1].len();
    let nlevels = depth_name
        .map(|name| dims[dim_names.iter().position(|n| n == name).unwrap()].len())
        .unwrap_or(1);

    // collapse the time axis to its first level on read
    let raw: Vec<Float> = match (has_time, depth_name.is_some()) {
        (false, false) => var.get_values((.., ..))?,
        (false, true) => var.get_values((.., .., ..))?,
        (true, false) => var.get_values((0..1, .., ..))?,
        (true, true) => var.get_values((0..1, .., .., ..))?,
    };

    let mut data = Array3::from_shape_vec((nlevels, nlat, nlon), raw)
        .map_err(|_| InputError::Malformed("variable data does not match its dimensions"))?;

    let fill = float_attribute(var, "_FillValue")
        .or_else(|| float_attribute(var, "missing_value"));

    data.mapv_inplace(|v| {
        if !v.is_finite() || v.abs() > 1.0e30 || fill.map_or(false, |f| v == f) {
            Float::NAN
        } else {
            v
        }
    });

    let grid = grid_from_file(file)?;
    let levels = match depth_name {
        Some(name) => read_levels(file, name, nlevels)?,
        None => None,
    };

    debug!(
        "Read {} ({} levels, {}x{} points)",
        var.name(),
        nlevels,
        nlat,
        nlon
    );

    let mut field = Field::new(var.name(), str_attribute(var, "units"), grid, levels, data)
        .map_err(|_| InputError::Malformed("variable shape does not match its coordinates"))?;
    field.normalize_latitudes();

    Ok(field)
}

fn grid_from_file(file: &netcdf::File) -> Result<Grid, InputError> {
    let lats =
        read_coord(file, LAT_NAMES).ok_or(InputError::MissingCoordinate("latitude"))?;
    let lons =
        read_coord(file, LON_NAMES).ok_or(InputError::MissingCoordinate("longitude"))?;

    Ok(Grid::new(Array1::from(lats), Array1::from(lons)))
}

fn read_coord(file: &netcdf::File, names: &[&str]) -> Option<Vec<Float>> {
    for name in names {
        if let Some(var) = file.variable(name) {
            if let Ok(values) = var.get_values::<Float, _>(..) {
                return Some(values);
            }
        }
    }

    None
}

/// Reads soil level centres and bounds. Bounds come from the
/// variable named by the coordinate's `bounds` attribute; without
/// one, contiguous bounds are derived from the centres with the top
/// edge at the surface.
fn read_levels(
    file: &netcdf::File,
    name: &str,
    nlevels: usize,
) -> Result<Option<SoilLevels>, InputError> {
    let Some(var) = file.variable(name) else {
        return Ok(None);
    };

    let centres: Vec<Float> = var.get_values(..)?;
    if centres.len() != nlevels {
        return Err(InputError::Malformed(
            "soil level coordinate does not match the data",
        ));
    }

    let bounds = match str_attribute(&var, "bounds").and_then(|b| file.variable(&b)) {
        Some(bounds_var) => {
            let raw: Vec<Float> = bounds_var.get_values((.., ..))?;
            Array2::from_shape_vec((nlevels, 2), raw)
                .map_err(|_| InputError::Malformed("soil level bounds must be (depth, 2)"))?
        }
        None => derived_bounds(&centres),
    };

    Ok(Some(SoilLevels {
        centres: Array1::from(centres),
        bounds,
    }))
}

fn derived_bounds(centres: &[Float]) -> Array2<Float> {
    let n = centres.len();
    let mut bounds = Array2::zeros((n, 2));
    let mut upper = 0.0;

    for (i, &centre) in centres.iter().enumerate() {
        let lower = if i + 1 < n {
            (centre + centres[i + 1]) / 2.0
        } else {
            2.0 * centre - upper
        };

        bounds[[i, 0]] = upper;
        bounds[[i, 1]] = lower;
        upper = lower;
    }

    bounds
}

fn str_attribute(var: &netcdf::Variable, name: &str) -> Option<String> {
    match var.attribute_value(name)?.ok()? {
        netcdf::AttributeValue::Str(s) => Some(s),
        _ => None,
    }
}

fn float_attribute(var: &netcdf::Variable, name: &str) -> Option<Float> {
    match var.attribute_value(name)?.ok()? {
        netcdf::AttributeValue::Double(d) => Some(d),
        netcdf::AttributeValue::Float(f) => Some(f as Float),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn bounds_derived_from_centres_are_contiguous() {
        let bounds = derived_bounds(&[0.05, 0.225, 0.675]);

        assert_approx_eq!(f64, bounds[[0, 0]], 0.0, epsilon = 1.0e-12);
        assert_approx_eq!(f64, bounds[[0, 1]], 0.1375, epsilon = 1.0e-12);
        assert_approx_eq!(f64, bounds[[1, 0]], 0.1375, epsilon = 1.0e-12);
        assert_approx_eq!(f64, bounds[[1, 1]], 0.45, epsilon = 1.0e-12);
        // the last layer mirrors its centre
        assert_approx_eq!(f64, bounds[[2, 1]], 0.9, epsilon = 1.0e-12);
    }

    #[test]
    fn coordinate_names_are_recognised() {
        assert!(is_coordinate_name("latitude"));
        assert!(is_coordinate_name("t"));
        assert!(!is_coordinate_name("soil_moisture_stress"));
    }
}
