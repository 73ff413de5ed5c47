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

//! Sub-module writing fields into CF-style NetCDF files.

use crate::{constants::FILL_VALUE, errors::AncilError, grid::Field, Float};
use chrono::Utc;
use log::info;
use std::path::Path;

/// Writes fields sharing one grid into a new NetCDF file.
pub fn write_fields(path: &Path, fields: &[Field]) -> Result<(), AncilError> {
    write_impl(path, fields, None)
}

/// Like [`write_fields`], additionally stamping the grid staggering
/// expected by the ancillary conversion chain.
pub fn write_fields_with_staggering(
    path: &Path,
    fields: &[Field],
    grid_staggering: i32,
) -> Result<(), AncilError> {
    write_impl(path, fields, Some(grid_staggering))
}

fn write_impl(
    path: &Path,
    fields: &[Field],
    grid_staggering: Option<i32>,
) -> Result<(), AncilError> {
    let first = fields
        .first()
        .ok_or(AncilError::Incompatible("No fields to write"))?;
    let grid = &first.grid;

    for field in &fields[1..] {
        if !field.grid.approx_eq(grid) {
            return Err(AncilError::Incompatible(
                "Fields written to one file must share a grid",
            ));
        }
    }

    let levels = fields.iter().find_map(|f| f.levels.as_ref());
    for field in fields {
        if let (Some(own), Some(levels)) = (&field.levels, levels) {
            if own.len() != levels.len() {
                return Err(AncilError::Incompatible(
                    "Fields written to one file must share soil levels",
                ));
            }
        }
    }

    let (nlat, nlon) = grid.shape();
    let mut file = netcdf::create(path)?;

    file.add_dimension("latitude", nlat)?;
    file.add_dimension("longitude", nlon)?;

    {
        let mut lat_var = file.add_variable::<Float>("latitude", &["latitude"])?;
        lat_var.put_attribute("standard_name", "latitude")?;
        lat_var.put_attribute("units", "degrees_north")?;
        lat_var.put_attribute("axis", "Y")?;
        let lats: Vec<Float> = grid.lats.iter().copied().collect();
        lat_var.put_values(&lats, ..)?;
    }

    {
        let mut lon_var = file.add_variable::<Float>("longitude", &["longitude"])?;
        lon_var.put_attribute("standard_name", "longitude")?;
        lon_var.put_attribute("units", "degrees_east")?;
        lon_var.put_attribute("axis", "X")?;
        let lons: Vec<Float> = grid.lons.iter().copied().collect();
        lon_var.put_values(&lons, ..)?;
    }

    if let Some(levels) = levels {
        file.add_dimension("depth", levels.len())?;
        file.add_dimension("bnds", 2)?;

        {
            let mut depth_var = file.add_variable::<Float>("depth", &["depth"])?;
            depth_var.put_attribute("standard_name", "depth")?;
            depth_var.put_attribute("units", "m")?;
            depth_var.put_attribute("positive", "down")?;
            depth_var.put_attribute("bounds", "depth_bnds")?;
            let centres: Vec<Float> = levels.centres.iter().copied().collect();
            depth_var.put_values(&centres, ..)?;
        }

        {
            let mut bnds_var = file.add_variable::<Float>("depth_bnds", &["depth", "bnds"])?;
            let bounds: Vec<Float> = levels.bounds.iter().copied().collect();
            bnds_var.put_values(&bounds, (.., ..))?;
        }
    }

    for field in fields {
        let dims: Vec<&str> = if field.levels.is_some() {
            vec!["depth", "latitude", "longitude"]
        } else {
            vec!["latitude", "longitude"]
        };

        let mut var = file.add_variable::<Float>(&field.name, &dims)?;

        if let Some(units) = &field.units {
            var.put_attribute("units", units.as_str())?;
        }
        var.put_attribute("_FillValue", FILL_VALUE)?;

        let data: Vec<Float> = field
            .data
            .iter()
            .map(|&v| if v.is_nan() { FILL_VALUE } else { v })
            .collect();

        if field.levels.is_some() {
            var.put_values(&data, (.., .., ..))?;
        } else {
            var.put_values(&data, (.., ..))?;
        }
    }

    file.add_attribute("Conventions", "CF-1.7")?;
    file.add_attribute("source", "ancil")?;
    file.add_attribute(
        "history",
        format!(
            "{}: written by ancil",
            Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        )
        .as_str(),
    )?;

    if let Some(staggering) = grid_staggering {
        file.add_attribute("grid_staggering", staggering)?;
    }

    info!("Wrote {} fields to {}", fields.len(), path.display());
    Ok(())
}
