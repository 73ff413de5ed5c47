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

//! Sub-module deriving river-routing ancillaries consistent with a
//! land-cover fraction.
//!
//! The land-cover fraction is averaged onto the routing grid. Points
//! the routing data treats as land but the land cover calls open sea
//! become pour points; sea points fully surrounded by sea are
//! removed from the routing fields altogether.

use crate::{
    analysis::neighbourhood::MooreNeighbourhood,
    constants::{OCEAN_INDICATOR, POUR_POINT_INDICATOR},
    errors::AncilError,
    grid::Field,
    regrid::area_weighted_mean,
    Float,
};
use log::info;

/// Variable name of the river routing sequence.
pub const SEQUENCE_NAME: &str = "river_routing_sequence";

/// Variable name of the river routing direction.
pub const DIRECTION_NAME: &str = "river_routing_direction";

/// Variable name of the land cover fraction.
pub const LAND_COVER_NAME: &str = "land_area_fraction";

/// River sequence and direction adjusted to a land-cover fraction.
pub struct RiverRouting {
    pub sequence: Field,
    pub direction: Field,
}

/// Makes river sequence and direction fields consistent with a
/// land-cover fraction defined on a finer grid.
pub fn derive_river_routing(
    sequence: &Field,
    direction: &Field,
    land_cover: &Field,
) -> Result<RiverRouting, AncilError> {
    if !sequence.grid.approx_eq(&direction.grid) {
        return Err(AncilError::Incompatible(
            "River sequence and direction are on different grids",
        ));
    }

    let lcf = area_weighted_mean(
        land_cover.surface().to_owned(),
        &land_cover.grid,
        &direction.grid,
    )?;

    let sea_only = lcf.mapv(|v| v == OCEAN_INDICATOR);

    let mut direction = direction.clone();
    let mut sequence = sequence.clone();

    let surrounded = {
        let layer = lcf.view();
        MooreNeighbourhood::new(layer).all_equal_value(OCEAN_INDICATOR)
    };

    let mut pour_points = 0;
    let mut removed = 0;

    {
        let mut dir = direction.layer_mut(0);
        let mut seq = sequence.layer_mut(0);

        for ((i, j), &sea) in sea_only.indexed_iter() {
            if !sea {
                continue;
            }

            if surrounded[[i, j]] {
                // open ocean, no routing at all
                dir[[i, j]] = Float::NAN;
                seq[[i, j]] = Float::NAN;
                removed += 1;
            } else {
                dir[[i, j]] = POUR_POINT_INDICATOR;
                pour_points += 1;
            }
        }
    }

    info!(
        "River routing adjusted: {} pour points set, {} open-sea points removed",
        pour_points, removed
    );

    Ok(RiverRouting {
        sequence,
        direction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use ndarray::{array, Array2};

    fn routing_field(name: &str, layer: Array2<Float>) -> Field {
        let grid = Grid::new(array![0.0, 1.0, 2.0], array![0.0, 1.0, 2.0]);
        Field::from_layer(name, None, grid, layer).unwrap()
    }

    fn land_cover(layer: Array2<Float>) -> Field {
        // same grid as the routing fields so the area mean is the
        // identity
        routing_field("land_cover", layer)
    }

    #[test]
    fn coastal_sea_points_become_pour_points() {
        let sequence = routing_field("sequence", Array2::ones((3, 3)));
        let direction = routing_field("direction", Array2::ones((3, 3)));

        // left column is sea, the rest is land
        let lcf = land_cover(array![
            [0.0, 1.0, 1.0],
            [0.0, 1.0, 1.0],
            [0.0, 1.0, 1.0]
        ]);

        let routing = derive_river_routing(&sequence, &direction, &lcf).unwrap();
        let dir = routing.direction.surface();

        // every sea point touches land, so all become pour points
        assert_eq!(dir[[0, 0]], POUR_POINT_INDICATOR);
        assert_eq!(dir[[1, 0]], POUR_POINT_INDICATOR);
        assert_eq!(dir[[2, 0]], POUR_POINT_INDICATOR);
        // land points keep their direction
        assert_eq!(dir[[1, 1]], 1.0);
    }

    #[test]
    fn open_sea_points_are_removed() {
        let sequence = routing_field("sequence", Array2::ones((3, 3)));
        let direction = routing_field("direction", Array2::ones((3, 3)));

        // all sea: every point is surrounded by sea
        let lcf = land_cover(Array2::zeros((3, 3)));

        let routing = derive_river_routing(&sequence, &direction, &lcf).unwrap();

        assert!(routing.direction.surface().iter().all(|v| v.is_nan()));
        assert!(routing.sequence.surface().iter().all(|v| v.is_nan()));
    }

    #[test]
    fn grid_mismatch_is_rejected() {
        let sequence = routing_field("sequence", Array2::ones((3, 3)));

        let other = Grid::new(array![5.0, 6.0, 7.0], array![0.0, 1.0, 2.0]);
        let direction =
            Field::from_layer("direction", None, other, Array2::ones((3, 3))).unwrap();

        let lcf = land_cover(Array2::zeros((3, 3)));

        assert!(derive_river_routing(&sequence, &direction, &lcf).is_err());
    }
}
