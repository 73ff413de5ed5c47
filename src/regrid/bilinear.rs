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

//! Sub-module with the bilinear regridder and its coastline
//! overshoot correction.
//!
//! Weights are precomputed once per source/target grid pair and
//! reused for every level and field, which is what makes the
//! iterative weight correction cheap: the correction only rewrites
//! rows of the weight matrix and re-applies it.

use crate::{
    constants::STENCIL_SIZE,
    errors::RegridError,
    grid::{lower_cell_index, Grid},
    Float,
};
use log::debug;
use ndarray::{Array2, ArrayView1, ArrayView2};

/// Bilinear regridder with explicit per-target-point weights.
///
/// Each target point holds the flattened indices of its four
/// surrounding source points and the matching interpolation
/// weights. Points outside the source envelope are extrapolated
/// linearly from the edge cell, which is exactly where coastal
/// overshoot originates.
#[derive(Clone, Debug)]
pub struct BilinearRegridder {
    src_shape: (usize, usize),
    tgt_shape: (usize, usize),
    corners: Array2<usize>,
    weights: Array2<Float>,
    initial_weights: Array2<Float>,
}

impl BilinearRegridder {
    /// Precomputes the interpolation stencil from the source grid
    /// onto the target grid.
    pub fn new(src: &Grid, tgt: &Grid) -> Result<Self, RegridError> {
        if src.lats.len() < 2 || src.lons.len() < 2 {
            return Err(RegridError::DegenerateGrid(
                "source grid needs at least two points per axis",
            ));
        }

        if !src.is_ascending() || !tgt.is_ascending() {
            return Err(RegridError::DegenerateGrid(
                "grid axes must be sorted ascendingly",
            ));
        }

        let src_lats = src.lats.as_slice().ok_or(RegridError::DegenerateGrid(
            "source latitudes are not contiguous",
        ))?;
        let src_lons = src.lons.as_slice().ok_or(RegridError::DegenerateGrid(
            "source longitudes are not contiguous",
        ))?;

        let (nlat_t, nlon_t) = tgt.shape();
        let nlon_s = src.lons.len();
        let n_target = nlat_t * nlon_t;

        let mut corners = Array2::zeros((n_target, STENCIL_SIZE));
        let mut weights = Array2::zeros((n_target, STENCIL_SIZE));

        for (i, &lat) in tgt.lats.iter().enumerate() {
            let iy = lower_cell_index(src_lats, lat);
            let fy = (lat - src_lats[iy]) / (src_lats[iy + 1] - src_lats[iy]);

            for (j, &lon) in tgt.lons.iter().enumerate() {
                let ix = lower_cell_index(src_lons, lon);
                let fx = (lon - src_lons[ix]) / (src_lons[ix + 1] - src_lons[ix]);

                let gp = i * nlon_t + j;

                corners[[gp, 0]] = iy * nlon_s + ix;
                corners[[gp, 1]] = iy * nlon_s + ix + 1;
                corners[[gp, 2]] = (iy + 1) * nlon_s + ix;
                corners[[gp, 3]] = (iy + 1) * nlon_s + ix + 1;

                weights[[gp, 0]] = (1.0 - fy) * (1.0 - fx);
                weights[[gp, 1]] = (1.0 - fy) * fx;
                weights[[gp, 2]] = fy * (1.0 - fx);
                weights[[gp, 3]] = fy * fx;
            }
        }

        Ok(BilinearRegridder {
            src_shape: src.shape(),
            tgt_shape: (nlat_t, nlon_t),
            corners,
            initial_weights: weights.clone(),
            weights,
        })
    }

    pub fn target_shape(&self) -> (usize, usize) {
        self.tgt_shape
    }

    /// Applies the current weights to one source layer.
    pub fn apply(&self, layer: ArrayView2<Float>) -> Result<Array2<Float>, RegridError> {
        if layer.dim() != self.src_shape {
            return Err(RegridError::ShapeMismatch {
                got: layer.dim(),
                expected: self.src_shape,
            });
        }

        let flat: Vec<Float> = layer.iter().copied().collect();
        let mut result = Array2::zeros(self.tgt_shape);

        for (gp, out) in result.iter_mut().enumerate() {
            let mut value = 0.0;

            for k in 0..STENCIL_SIZE {
                let w = self.weights[[gp, k]];
                if w != 0.0 {
                    value += w * flat[self.corners[[gp, k]]];
                }
            }

            *out = value;
        }

        Ok(result)
    }

    /// Collapses every target point onto its dominant source point,
    /// turning the regridder into a nearest-neighbour one.
    pub fn collapse_to_nearest(&mut self) {
        let n_target = self.weights.dim().0;

        for gp in 0..n_target {
            let rank = rank_index(self.initial_weights.row(gp), 0);
            let mut row = self.weights.row_mut(gp);
            row.fill(0.0);
            row[rank] = 1.0;
        }
    }

    /// Iteratively suppresses extrapolation overshoot.
    ///
    /// The reference layer is regridded with the current weights;
    /// wherever the magnitude of the result exceeds `threshold` the
    /// target point's weights are collapsed onto the k-th largest of
    /// its original weights, one rank per pass. Four passes cover
    /// the whole stencil. Returns the number of points still
    /// overshooting after the last pass.
    pub fn correct_overshoot(
        &mut self,
        reference: ArrayView2<Float>,
        threshold: Float,
    ) -> Result<usize, RegridError> {
        let mut overshoot_count = 0;

        for rank in 0..STENCIL_SIZE {
            let regridded = self.apply(reference)?;

            let overshooting: Vec<usize> = regridded
                .iter()
                .enumerate()
                .filter(|(_, &v)| v.abs() > threshold)
                .map(|(gp, _)| gp)
                .collect();

            overshoot_count = overshooting.len();
            debug!(
                "Overshoot pass {}: {} points above {}",
                rank, overshoot_count, threshold
            );

            if overshooting.is_empty() {
                break;
            }

            for gp in overshooting {
                let target = rank_index(self.initial_weights.row(gp), rank);

                let mut row = self.weights.row_mut(gp);
                row.fill(0.0);
                row[target] = 1.0;
            }
        }

        Ok(overshoot_count)
    }
}

/// Index of the `rank`-th largest value in a stencil row
/// (rank 0 is the maximum).
fn rank_index(row: ArrayView1<Float>, rank: usize) -> usize {
    let mut order: Vec<usize> = (0..row.len()).collect();
    order.sort_by(|&a, &b| {
        row[b].partial_cmp(&row[a]).unwrap_or(std::cmp::Ordering::Equal)
    });

    order[rank.min(row.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use ndarray::array;

    fn source_grid() -> Grid {
        Grid::new(array![0.0, 1.0, 2.0], array![0.0, 1.0, 2.0])
    }

    #[test]
    fn linear_field_is_reproduced_exactly() {
        let src = source_grid();
        // f(lat, lon) = 2 lat + 3 lon
        let layer = array![
            [0.0, 3.0, 6.0],
            [2.0, 5.0, 8.0],
            [4.0, 7.0, 10.0]
        ];

        let tgt = Grid::new(array![0.5, 1.5], array![0.25, 1.75]);
        let regridder = BilinearRegridder::new(&src, &tgt).unwrap();
        let result = regridder.apply(layer.view()).unwrap();

        assert_approx_eq!(f64, result[[0, 0]], 2.0 * 0.5 + 3.0 * 0.25, epsilon = 1.0e-12);
        assert_approx_eq!(f64, result[[1, 1]], 2.0 * 1.5 + 3.0 * 1.75, epsilon = 1.0e-12);
    }

    #[test]
    fn extrapolation_is_linear_outside_the_envelope() {
        let src = source_grid();
        let layer = array![
            [0.0, 3.0, 6.0],
            [2.0, 5.0, 8.0],
            [4.0, 7.0, 10.0]
        ];

        let tgt = Grid::new(array![-1.0], array![3.0]);
        let regridder = BilinearRegridder::new(&src, &tgt).unwrap();
        let result = regridder.apply(layer.view()).unwrap();

        assert_approx_eq!(f64, result[[0, 0]], 2.0 * -1.0 + 3.0 * 3.0, epsilon = 1.0e-12);
    }

    #[test]
    fn overshoot_collapses_onto_dominant_weight() {
        let src = source_grid();
        // an unphysical spike in one corner makes extrapolated
        // points overshoot
        let layer = array![
            [1.0, 1.0, 1.0],
            [1.0, 1.0, 1.0],
            [1.0, 1.0, 1.0e6]
        ];

        let tgt = Grid::new(array![2.5], array![2.5]);
        let mut regridder = BilinearRegridder::new(&src, &tgt).unwrap();

        let raw = regridder.apply(layer.view()).unwrap();
        assert!(raw[[0, 0]].abs() > 1000.0);

        let remaining = regridder
            .correct_overshoot(layer.view(), 1000.0)
            .unwrap();

        // collapsing onto any single source point yields either 1.0
        // or the spike itself; the spike carries the largest original
        // weight here so further ranks demote it to a sane neighbour
        let corrected = regridder.apply(layer.view()).unwrap();
        assert_approx_eq!(f64, corrected[[0, 0]], 1.0, epsilon = 1.0e-12);
        assert_eq!(remaining, 0);
    }

    #[test]
    fn nearest_collapse_picks_closest_point() {
        let src = source_grid();
        let layer = array![
            [0.0, 10.0, 20.0],
            [30.0, 40.0, 50.0],
            [60.0, 70.0, 80.0]
        ];

        let tgt = Grid::new(array![0.9], array![1.1]);
        let mut regridder = BilinearRegridder::new(&src, &tgt).unwrap();
        regridder.collapse_to_nearest();

        let result = regridder.apply(layer.view()).unwrap();
        assert_approx_eq!(f64, result[[0, 0]], 40.0, epsilon = 1.0e-12);
    }

    #[test]
    fn descending_axes_are_rejected() {
        let descending = Grid::new(array![2.0, 1.0, 0.0], array![0.0, 1.0, 2.0]);
        let tgt = Grid::new(array![0.5], array![0.5]);

        assert!(BilinearRegridder::new(&descending, &tgt).is_err());
    }

    #[test]
    fn north_to_south_input_interpolates_after_normalization() {
        use crate::grid::Field;

        // f(lat) = lat^2 sampled north to south
        let grid = Grid::new(array![2.0, 1.0, 0.0], array![0.0, 1.0]);
        let mut field = Field::from_layer(
            "f",
            None,
            grid,
            array![[4.0, 4.0], [1.0, 1.0], [0.0, 0.0]],
        )
        .unwrap();
        field.normalize_latitudes();

        let tgt = Grid::new(array![0.5], array![0.5]);
        let regridder = BilinearRegridder::new(&field.grid, &tgt).unwrap();
        let result = regridder.apply(field.surface()).unwrap();

        // 0.5 sits between the cells valued 0.0 and 1.0
        assert_approx_eq!(f64, result[[0, 0]], 0.5, epsilon = 1.0e-12);
    }

    #[test]
    fn shape_mismatch_is_reported() {
        let src = source_grid();
        let tgt = Grid::new(array![0.5], array![0.5]);
        let regridder = BilinearRegridder::new(&src, &tgt).unwrap();

        let bad = array![[1.0, 2.0], [3.0, 4.0]];
        assert!(regridder.apply(bad.view()).is_err());
    }
}
