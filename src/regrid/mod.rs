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

//! Module with the horizontal regridding engine.
//!
//! Bilinear interpolation with precomputed weights covers the
//! general case; an area-weighted mean serves coarse targets such
//! as the river-routing grid. Independent soil levels are
//! dispatched onto the rayon thread pool.

mod bilinear;

pub use bilinear::BilinearRegridder;

use crate::{
    config::RegridScheme,
    errors::{AncilError, RegridError},
    grid::{lower_cell_index, Field, Grid},
    Float,
};
use log::debug;
use ndarray::{Array2, Array3, Axis};
use rayon::prelude::*;

/// Regrids every level of a field onto the target grid with the
/// requested scheme.
pub fn regrid_field(
    field: &Field,
    target: &Grid,
    scheme: RegridScheme,
) -> Result<Field, AncilError> {
    debug!(
        "Regridding {} ({} levels) with scheme {:?}",
        field.name,
        field.nlevels(),
        scheme
    );

    let layers = match scheme {
        RegridScheme::Linear => {
            let regridder = BilinearRegridder::new(&field.grid, target)?;
            apply_per_level(field, &regridder)?
        }
        RegridScheme::Nearest => {
            let mut regridder = BilinearRegridder::new(&field.grid, target)?;
            regridder.collapse_to_nearest();
            apply_per_level(field, &regridder)?
        }
        RegridScheme::AreaWeighted => (0..field.nlevels())
            .into_par_iter()
            .map(|level| area_weighted_mean(field.layer(level).to_owned(), &field.grid, target))
            .collect::<Result<Vec<_>, _>>()?,
    };

    stack_levels(field, target, layers)
}

/// Regrids every level of a field with a prepared regridder, used
/// when the weight matrix has been corrected beforehand.
pub fn regrid_field_with(
    field: &Field,
    target: &Grid,
    regridder: &BilinearRegridder,
) -> Result<Field, AncilError> {
    let layers = apply_per_level(field, regridder)?;
    stack_levels(field, target, layers)
}

fn apply_per_level(
    field: &Field,
    regridder: &BilinearRegridder,
) -> Result<Vec<Array2<Float>>, RegridError> {
    (0..field.nlevels())
        .into_par_iter()
        .map(|level| regridder.apply(field.layer(level)))
        .collect()
}

fn stack_levels(
    field: &Field,
    target: &Grid,
    layers: Vec<Array2<Float>>,
) -> Result<Field, AncilError> {
    let (nlat, nlon) = target.shape();
    let mut data = Array3::zeros((layers.len(), nlat, nlon));

    for (level, layer) in layers.into_iter().enumerate() {
        data.index_axis_mut(Axis(0), level).assign(&layer);
    }

    Field::new(
        field.name.clone(),
        field.units.clone(),
        target.clone(),
        field.levels.clone(),
        data,
    )
}

/// Mean of the source cells whose centres fall inside each target
/// cell. Masked source points are excluded; target cells with no
/// contributing points come out masked.
pub fn area_weighted_mean(
    layer: Array2<Float>,
    source: &Grid,
    target: &Grid,
) -> Result<Array2<Float>, RegridError> {
    if layer.dim() != source.shape() {
        return Err(RegridError::ShapeMismatch {
            got: layer.dim(),
            expected: source.shape(),
        });
    }

    if !source.is_ascending() || !target.is_ascending() {
        return Err(RegridError::DegenerateGrid(
            "grid axes must be sorted ascendingly",
        ));
    }

    let lat_edges = cell_edges(source, target, true)?;
    let lon_edges = cell_edges(source, target, false)?;

    let (nlat_t, nlon_t) = target.shape();
    let mut sums = Array2::<Float>::zeros((nlat_t, nlon_t));
    let mut counts = Array2::<usize>::zeros((nlat_t, nlon_t));

    for (i, &lat) in source.lats.iter().enumerate() {
        let Some(ti) = edge_bin(&lat_edges, lat) else {
            continue;
        };

        for (j, &lon) in source.lons.iter().enumerate() {
            let Some(tj) = edge_bin(&lon_edges, lon) else {
                continue;
            };

            let value = layer[[i, j]];
            if value.is_nan() {
                continue;
            }

            sums[[ti, tj]] += value;
            counts[[ti, tj]] += 1;
        }
    }

    let mut result = Array2::from_elem((nlat_t, nlon_t), Float::NAN);
    ndarray::Zip::from(&mut result)
        .and(&sums)
        .and(&counts)
        .for_each(|out, &sum, &count| {
            if count > 0 {
                *out = sum / count as Float;
            }
        });

    Ok(result)
}

/// Edges of target cells along one axis, midpoints between
/// consecutive centres with the outer edges extended by half a cell.
fn cell_edges(source: &Grid, target: &Grid, lat_axis: bool) -> Result<Vec<Float>, RegridError> {
    let centres = if lat_axis { &target.lats } else { &target.lons };

    if centres.len() < 2 {
        // a single-row target still needs an edge pair; derive the
        // half-width from the source spacing
        let spacing = if lat_axis {
            source.lats[1] - source.lats[0]
        } else {
            source.lons[1] - source.lons[0]
        };
        let c = centres.first().copied().ok_or(RegridError::DegenerateGrid(
            "target grid axis is empty",
        ))?;

        return Ok(vec![c - spacing.abs() / 2.0, c + spacing.abs() / 2.0]);
    }

    let mut edges = Vec::with_capacity(centres.len() + 1);
    edges.push(centres[0] - (centres[1] - centres[0]) / 2.0);

    for w in centres.windows(2).into_iter() {
        edges.push((w[0] + w[1]) / 2.0);
    }

    let n = centres.len();
    edges.push(centres[n - 1] + (centres[n - 1] - centres[n - 2]) / 2.0);

    Ok(edges)
}

/// Bin index of a coordinate between edges, None outside the axis.
fn edge_bin(edges: &[Float], x: Float) -> Option<usize> {
    if x < edges[0] || x > *edges.last().unwrap() {
        return None;
    }

    Some(lower_cell_index(edges, x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use ndarray::array;

    #[test]
    fn area_mean_averages_contained_points() {
        let source = Grid::new(
            array![0.0, 1.0, 2.0, 3.0],
            array![0.0, 1.0, 2.0, 3.0],
        );
        let layer = array![
            [1.0, 2.0, 3.0, 4.0],
            [5.0, 6.0, 7.0, 8.0],
            [9.0, 10.0, 11.0, 12.0],
            [13.0, 14.0, 15.0, 16.0]
        ];

        // two coarse cells covering lats 0..1 and 2..3
        let target = Grid::new(array![0.5, 2.5], array![0.5, 2.5]);
        let result = area_weighted_mean(layer, &source, &target).unwrap();

        // top-left coarse cell holds the four source points
        // (0,0) (0,1) (1,0) (1,1)
        assert_approx_eq!(f64, result[[0, 0]], 3.5, epsilon = 1.0e-12);
        assert_approx_eq!(f64, result[[1, 1]], 13.5, epsilon = 1.0e-12);
    }

    #[test]
    fn area_mean_skips_masked_points() {
        let source = Grid::new(array![0.0, 1.0], array![0.0, 1.0]);
        let layer = array![[2.0, f64::NAN], [4.0, f64::NAN]];

        let target = Grid::new(array![0.5], array![0.5]);
        let result = area_weighted_mean(layer, &source, &target).unwrap();

        assert_approx_eq!(f64, result[[0, 0]], 3.0, epsilon = 1.0e-12);
    }

    #[test]
    fn descending_axes_are_rejected() {
        let source = Grid::new(array![1.0, 0.0], array![0.0, 1.0]);
        let layer = array![[1.0, 1.0], [1.0, 1.0]];

        let target = Grid::new(array![0.5], array![0.5]);

        assert!(area_weighted_mean(layer, &source, &target).is_err());
    }

    #[test]
    fn empty_target_cells_are_masked() {
        let source = Grid::new(array![0.0, 1.0], array![0.0, 1.0]);
        let layer = array![[1.0, 1.0], [1.0, 1.0]];

        // second target cell lies far outside the source envelope
        let target = Grid::new(array![0.5], array![0.5, 50.0]);
        let result = area_weighted_mean(layer, &source, &target).unwrap();

        assert!(!result[[0, 0]].is_nan());
        assert!(result[[0, 1]].is_nan());
    }
}
