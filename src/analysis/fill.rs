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

//! Sub-module with the nearest-neighbour search used to fill
//! missing data.
//!
//! The search expands square rings around each missing point and
//! takes the donor with the smallest squared index distance within
//! the first ring that contains one. When an eligibility mask is
//! given (derived from a land-sea mask) both the filled points and
//! the donors are restricted to it, so land points are only ever
//! filled from land points.

use crate::Float;
use ndarray::Array2;

/// Fills NaN points of a layer from the nearest valid points.
///
/// Donors are taken from the layer as it was on entry, so filled
/// values never cascade. Returns the number of points filled.
pub fn fill_missing(layer: &mut Array2<Float>, eligible: Option<&Array2<bool>>) -> usize {
    let donors = layer.clone();
    let (nlat, nlon) = layer.dim();
    let mut filled = 0;

    for i in 0..nlat {
        for j in 0..nlon {
            if !layer[[i, j]].is_nan() {
                continue;
            }

            if let Some(eligible) = eligible {
                if !eligible[[i, j]] {
                    continue;
                }
            }

            if let Some(value) = nearest_donor(&donors, eligible, (i, j)) {
                layer[[i, j]] = value;
                filled += 1;
            }
        }
    }

    filled
}

fn nearest_donor(
    donors: &Array2<Float>,
    eligible: Option<&Array2<bool>>,
    centre: (usize, usize),
) -> Option<Float> {
    let (nlat, nlon) = donors.dim();
    let (ci, cj) = (centre.0 as isize, centre.1 as isize);
    let max_radius = nlat.max(nlon) as isize;

    for radius in 1..=max_radius {
        let mut best: Option<(isize, Float)> = None;

        for di in -radius..=radius {
            for dj in -radius..=radius {
                // ring only, the interior was covered by earlier radii
                if di.abs() != radius && dj.abs() != radius {
                    continue;
                }

                let ni = ci + di;
                let nj = cj + dj;

                if ni < 0 || nj < 0 || ni >= nlat as isize || nj >= nlon as isize {
                    continue;
                }

                let point = [ni as usize, nj as usize];

                if let Some(eligible) = eligible {
                    if !eligible[point] {
                        continue;
                    }
                }

                let value = donors[point];
                if value.is_nan() {
                    continue;
                }

                let dist = di * di + dj * dj;
                match best {
                    Some((best_dist, _)) if best_dist <= dist => {}
                    _ => best = Some((dist, value)),
                }
            }
        }

        if let Some((_, value)) = best {
            return Some(value);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn fills_from_closest_valid_point() {
        let mut layer = array![
            [1.0, f64::NAN, f64::NAN],
            [f64::NAN, f64::NAN, f64::NAN],
            [f64::NAN, f64::NAN, 9.0]
        ];

        let filled = fill_missing(&mut layer, None);

        assert_eq!(filled, 7);
        // corner-adjacent points take the nearest donor
        assert_eq!(layer[[0, 1]], 1.0);
        assert_eq!(layer[[1, 2]], 9.0);
        assert!(!layer.iter().any(|v| v.is_nan()));
    }

    #[test]
    fn donors_do_not_cascade() {
        let mut layer = array![[2.0, f64::NAN, f64::NAN, f64::NAN]];

        fill_missing(&mut layer, None);

        // every fill comes from the single original donor
        assert_eq!(layer, array![[2.0, 2.0, 2.0, 2.0]]);
    }

    #[test]
    fn mask_restricts_targets_and_donors() {
        let mut layer = array![
            [5.0, f64::NAN],
            [8.0, f64::NAN]
        ];
        // only the right column is eligible: the top-right point has
        // no eligible donor and stays missing
        let eligible = array![[false, true], [false, true]];

        let filled = fill_missing(&mut layer, Some(&eligible));

        assert_eq!(filled, 0);
        assert!(layer[[0, 1]].is_nan());
        assert!(layer[[1, 1]].is_nan());
        assert_eq!(layer[[0, 0]], 5.0);
    }

    #[test]
    fn mask_allows_filling_within_eligible_points() {
        let mut layer = array![
            [5.0, 7.0],
            [f64::NAN, f64::NAN]
        ];
        let eligible = array![[true, true], [true, false]];

        let filled = fill_missing(&mut layer, Some(&eligible));

        assert_eq!(filled, 1);
        assert_eq!(layer[[1, 0]], 5.0);
        // ineligible point is left alone
        assert!(layer[[1, 1]].is_nan());
    }
}
