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

//! Sub-module with the dataset merge used by the fill-and-merge
//! tool.
//!
//! The primary dataset takes priority; the alternate fills in
//! wherever the primary is missing. An optional validity polygon
//! narrows the region in which the primary is trusted at all.

use crate::{
    errors::{AncilError, InputError},
    grid::Field,
    Float,
};
use geo::{Contains, Coord, LineString, Point, Polygon};
use log::debug;
use ndarray::Zip;
use std::{fs, path::Path};

/// Reads a validity polygon from a YAML file holding a list of
/// geometries, each a list of `[lon, lat]` vertices.
///
/// As with the original shapefile input, exactly one geometry is
/// expected.
pub fn load_polygon(path: &Path) -> Result<Polygon<Float>, InputError> {
    let data = fs::read_to_string(path)?;
    let geometries: Vec<Vec<[Float; 2]>> = serde_yaml::from_str(&data)?;

    if geometries.len() != 1 {
        return Err(InputError::MultipleGeometries(geometries.len()));
    }

    let exterior: Vec<Coord<Float>> = geometries[0]
        .iter()
        .map(|&[lon, lat]| Coord { x: lon, y: lat })
        .collect();

    Ok(Polygon::new(LineString::new(exterior), vec![]))
}

/// Merges an alternate field into a primary one.
///
/// Without a polygon the primary wins everywhere it is valid.
/// With a polygon the primary is only trusted inside it; either
/// way the other dataset backs up missing points.
pub fn merge(
    primary: &Field,
    alternate: &Field,
    polygon: Option<&Polygon<Float>>,
) -> Result<Field, AncilError> {
    if !primary.grid.approx_eq(&alternate.grid) {
        return Err(AncilError::Incompatible(
            "Primary and alternate fields are on different grids",
        ));
    }

    if primary.nlevels() != alternate.nlevels() {
        return Err(AncilError::Incompatible(
            "Primary and alternate fields have different level counts",
        ));
    }

    debug!(
        "Merging {} with alternate, polygon: {}",
        primary.name,
        polygon.is_some()
    );

    let inside = polygon.map(|polygon| {
        let (nlat, nlon) = primary.grid.shape();
        let mut inside = ndarray::Array2::from_elem((nlat, nlon), false);

        for (i, &lat) in primary.grid.lats.iter().enumerate() {
            for (j, &lon) in primary.grid.lons.iter().enumerate() {
                inside[[i, j]] = polygon.contains(&Point::new(lon, lat));
            }
        }

        inside
    });

    let mut result = primary.clone();

    for level in 0..result.nlevels() {
        let alt = alternate.layer(level).to_owned();
        let mut out = result.layer_mut(level);

        match &inside {
            Some(inside) => {
                Zip::from(&mut out).and(&alt).and(inside).for_each(
                    |value, &alt, &inside| {
                        if !inside || value.is_nan() {
                            if !alt.is_nan() {
                                *value = alt;
                            } else if !inside {
                                *value = Float::NAN;
                            }
                        }
                    },
                );
            }
            None => {
                Zip::from(&mut out).and(&alt).for_each(|value, &alt| {
                    if value.is_nan() && !alt.is_nan() {
                        *value = alt;
                    }
                });
            }
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use ndarray::array;

    fn field(name: &str, layer: ndarray::Array2<Float>) -> Field {
        let grid = Grid::new(array![0.0, 1.0], array![0.0, 1.0]);
        Field::from_layer(name, None, grid, layer).unwrap()
    }

    fn unit_polygon() -> Polygon<Float> {
        // covers only the (lat 0, lon 0) point
        Polygon::new(
            LineString::from(vec![
                (-0.5, -0.5),
                (0.5, -0.5),
                (0.5, 0.5),
                (-0.5, 0.5),
                (-0.5, -0.5),
            ]),
            vec![],
        )
    }

    #[test]
    fn primary_wins_where_valid() {
        let primary = field("lcf", array![[1.0, f64::NAN], [3.0, 4.0]]);
        let alternate = field("lcf", array![[10.0, 20.0], [30.0, 40.0]]);

        let merged = merge(&primary, &alternate, None).unwrap();

        assert_eq!(
            merged.surface().to_owned(),
            array![[1.0, 20.0], [3.0, 4.0]]
        );
    }

    #[test]
    fn polygon_restricts_primary_validity() {
        let primary = field("lcf", array![[1.0, 2.0], [3.0, 4.0]]);
        let alternate = field("lcf", array![[10.0, 20.0], [30.0, 40.0]]);

        let merged = merge(&primary, &alternate, Some(&unit_polygon())).unwrap();

        // only the origin is inside the polygon
        assert_eq!(
            merged.surface().to_owned(),
            array![[1.0, 20.0], [30.0, 40.0]]
        );
    }

    #[test]
    fn alternate_backs_up_missing_primary_inside_polygon() {
        let primary = field("lcf", array![[f64::NAN, 2.0], [3.0, 4.0]]);
        let alternate = field("lcf", array![[10.0, 20.0], [30.0, 40.0]]);

        let merged = merge(&primary, &alternate, Some(&unit_polygon())).unwrap();

        assert_eq!(merged.surface()[[0, 0]], 10.0);
    }

    #[test]
    fn grid_mismatch_is_rejected() {
        let primary = field("lcf", array![[1.0, 2.0], [3.0, 4.0]]);
        let other_grid = Grid::new(array![5.0, 6.0], array![0.0, 1.0]);
        let alternate = Field::from_layer(
            "lcf",
            None,
            other_grid,
            array![[1.0, 2.0], [3.0, 4.0]],
        )
        .unwrap();

        assert!(merge(&primary, &alternate, None).is_err());
    }

    #[test]
    fn single_geometry_is_enforced() {
        let dir = std::env::temp_dir();
        let path = dir.join("ancil_merge_two_rings.yaml");
        std::fs::write(
            &path,
            "- [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0]]\n- [[2.0, 2.0], [3.0, 2.0], [3.0, 3.0]]\n",
        )
        .unwrap();

        let result = load_polygon(&path);
        std::fs::remove_file(&path).ok();

        assert!(matches!(result, Err(InputError::MultipleGeometries(2))));
    }
}
