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

//! Module with the field analysis operations behind the fill-and-merge
//! and river-routing tools.

pub mod fill;
pub mod merge;
pub mod neighbourhood;
pub mod routing;

pub use fill::fill_missing;
pub use merge::{load_polygon, merge};
pub use routing::{
    derive_river_routing, RiverRouting, DIRECTION_NAME, LAND_COVER_NAME, SEQUENCE_NAME,
};

use crate::{errors::AncilError, grid::Field, Float};
use log::info;
use ndarray::Array2;
use rustc_hash::FxHashMap;

/// Derives a boolean land mask from a land fraction or binary
/// land-sea field. With a threshold, land is where the fraction
/// exceeds it; without, values of at least 0.5 count as land.
pub fn land_mask(field: &Field, threshold: Option<Float>) -> Array2<bool> {
    let layer = field.surface();

    match threshold {
        Some(threshold) => layer.mapv(|v| v > threshold),
        None => layer.mapv(|v| v >= 0.5),
    }
}

/// Forces a field's validity onto a land-sea mask.
///
/// With `invert` false, points where the mask is true are masked out
/// and the remainder must be valid; with `invert` true the mask marks
/// the points to keep. Missing points on the valid side are filled
/// from their nearest valid neighbours.
pub fn make_consistent_with_lsm(
    field: &mut Field,
    lsm: &Array2<bool>,
    invert: bool,
) -> Result<usize, AncilError> {
    if lsm.dim() != field.grid.shape() {
        return Err(AncilError::Incompatible(
            "Land-sea mask does not match the field's grid",
        ));
    }

    let valid = if invert {
        lsm.clone()
    } else {
        lsm.mapv(|v| !v)
    };

    let mut filled = 0;

    for level in 0..field.nlevels() {
        let mut layer = field.layer_mut(level).to_owned();

        ndarray::Zip::from(&mut layer).and(&valid).for_each(|value, &valid| {
            if !valid {
                *value = Float::NAN;
            }
        });

        filled += fill_missing(&mut layer, Some(&valid));
        field.layer_mut(level).assign(&layer);
    }

    info!(
        "{}: {} points filled to agree with the land-sea mask",
        field.name, filled
    );

    Ok(filled)
}

/// Fills every missing point of a field from its nearest valid
/// neighbours, with no mask restriction.
pub fn fill_field(field: &mut Field) -> usize {
    let mut filled = 0;

    for level in 0..field.nlevels() {
        let mut layer = field.layer(level).to_owned();
        filled += fill_missing(&mut layer, None);
        field.layer_mut(level).assign(&layer);
    }

    filled
}

/// Merges alternate fields into primaries, pairing them by name.
/// Primaries without an alternate pass through untouched.
pub fn merge_all(
    primaries: Vec<Field>,
    alternates: Vec<Field>,
    polygon: Option<&geo::Polygon<Float>>,
) -> Result<Vec<Field>, AncilError> {
    let mut by_name: FxHashMap<String, Field> = alternates
        .into_iter()
        .map(|field| (field.name.clone(), field))
        .collect();

    primaries
        .into_iter()
        .map(|primary| match by_name.remove(&primary.name) {
            Some(alternate) => merge(&primary, &alternate, polygon),
            None => Ok(primary),
        })
        .collect()
}
