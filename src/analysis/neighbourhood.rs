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

//! Sub-module with the Moore (8-point) neighbourhood queries used
//! by the river-routing derivation.

use crate::Float;
use ndarray::{Array2, ArrayView2};

/// Moore neighbourhood of a 2-D layer.
pub struct MooreNeighbourhood<'a> {
    layer: ArrayView2<'a, Float>,
}

impl<'a> MooreNeighbourhood<'a> {
    pub fn new(layer: ArrayView2<'a, Float>) -> Self {
        MooreNeighbourhood { layer }
    }

    /// Boolean layer, true where every existing neighbour of a point
    /// equals `value`. Edge points consider only the neighbours that
    /// exist.
    pub fn all_equal_value(&self, value: Float) -> Array2<bool> {
        let (nlat, nlon) = self.layer.dim();
        let mut result = Array2::from_elem((nlat, nlon), true);

        for i in 0..nlat {
            for j in 0..nlon {
                'neighbours: for di in -1..=1_isize {
                    for dj in -1..=1_isize {
                        if di == 0 && dj == 0 {
                            continue;
                        }

                        let ni = i as isize + di;
                        let nj = j as isize + dj;

                        if ni < 0 || nj < 0 || ni >= nlat as isize || nj >= nlon as isize {
                            continue;
                        }

                        if self.layer[[ni as usize, nj as usize]] != value {
                            result[[i, j]] = false;
                            break 'neighbours;
                        }
                    }
                }
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn interior_point_with_uniform_neighbours() {
        let layer = array![
            [0.0, 0.0, 0.0],
            [0.0, 5.0, 0.0],
            [0.0, 0.0, 0.0]
        ];

        let neighbours = MooreNeighbourhood::new(layer.view());
        let all_zero = neighbours.all_equal_value(0.0);

        // the centre's neighbours are all zero, its own value is
        // not considered
        assert!(all_zero[[1, 1]]);
        // the corner sees the non-zero centre
        assert!(!all_zero[[0, 0]]);
    }

    #[test]
    fn edge_points_use_existing_neighbours_only() {
        let layer = array![
            [0.0, 0.0],
            [0.0, 0.0]
        ];

        let neighbours = MooreNeighbourhood::new(layer.view());
        let all_zero = neighbours.all_equal_value(0.0);

        assert!(all_zero.iter().all(|&v| v));
    }

    #[test]
    fn masked_neighbours_are_not_equal() {
        let layer = array![
            [0.0, f64::NAN],
            [0.0, 0.0]
        ];

        let neighbours = MooreNeighbourhood::new(layer.view());
        let all_zero = neighbours.all_equal_value(0.0);

        assert!(!all_zero[[0, 0]]);
    }
}
