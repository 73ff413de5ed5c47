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

//! Module with the gridded field data model shared by all tools.
//!
//! Fields are stored as dense `ndarray` arrays with separate 1-D
//! latitude/longitude coordinates. Missing data is represented as
//! NaN inside the library and mapped from/to fill values at the
//! file boundary.

use crate::{errors::AncilError, Float};
use ndarray::{Array1, Array2, Array3, ArrayView2, ArrayViewMut2, Axis, Zip};

/// A regular latitude-longitude grid with monotonic coordinates.
#[derive(Clone, PartialEq, Debug)]
pub struct Grid {
    pub lats: Array1<Float>,
    pub lons: Array1<Float>,
}

impl Grid {
    pub fn new(lats: Array1<Float>, lons: Array1<Float>) -> Self {
        Grid { lats, lons }
    }

    /// Grid shape as (lat, lon).
    pub fn shape(&self) -> (usize, usize) {
        (self.lats.len(), self.lons.len())
    }

    pub fn lat_extent(&self) -> (Float, Float) {
        min_max(&self.lats)
    }

    pub fn lon_extent(&self) -> (Float, Float) {
        min_max(&self.lons)
    }

    /// True when the latitude axis runs north to south.
    pub fn lats_descending(&self) -> bool {
        self.lats.len() > 1 && self.lats[0] > self.lats[self.lats.len() - 1]
    }

    /// True when both coordinate axes are sorted ascendingly, the
    /// orientation interpolation and binning require.
    pub fn is_ascending(&self) -> bool {
        let sorted = |coords: &Array1<Float>| {
            coords.windows(2).into_iter().all(|pair| pair[0] <= pair[1])
        };

        sorted(&self.lats) && sorted(&self.lons)
    }

    /// Checks coordinate equality within a tolerance suitable for
    /// coordinates read back from files.
    pub fn approx_eq(&self, other: &Grid) -> bool {
        if self.shape() != other.shape() {
            return false;
        }

        let close = |a: &Array1<Float>, b: &Array1<Float>| {
            Zip::from(a).and(b).all(|x, y| (x - y).abs() < 1.0e-6)
        };

        close(&self.lats, &other.lats) && close(&self.lons, &other.lons)
    }
}

fn min_max(coords: &Array1<Float>) -> (Float, Float) {
    let mut min = Float::INFINITY;
    let mut max = Float::NEG_INFINITY;

    for &c in coords {
        min = min.min(c);
        max = max.max(c);
    }

    (min, max)
}

/// Finds the index of the cell whose lower edge is left of `x`,
/// clamped into the valid cell range so that callers can
/// extrapolate beyond the coordinate envelope.
///
/// The coordinate array must be sorted ascendingly.
pub fn lower_cell_index(coords: &[Float], x: Float) -> usize {
    debug_assert!(coords.len() >= 2);

    let mut lo = 0;
    let mut hi = coords.len() - 1;

    while lo < hi {
        let mid = (lo + hi) / 2;

        if coords[mid] >= x {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }

    // lo is the first index with coords[lo] >= x
    if lo == 0 {
        0
    } else {
        (lo - 1).min(coords.len() - 2)
    }
}

/// Soil layer centre depths with their (n, 2) bounds.
#[derive(Clone, PartialEq, Debug)]
pub struct SoilLevels {
    pub centres: Array1<Float>,
    pub bounds: Array2<Float>,
}

impl SoilLevels {
    pub fn len(&self) -> usize {
        self.centres.len()
    }

    pub fn is_empty(&self) -> bool {
        self.centres.is_empty()
    }

    /// Layer thicknesses, upper bound minus lower bound.
    pub fn thicknesses(&self) -> Array1<Float> {
        &self.bounds.column(1) - &self.bounds.column(0)
    }
}

/// A named variable on a [`Grid`], optionally with soil levels.
///
/// Data is shaped (level, lat, lon); plain 2-D fields carry a
/// single level. Masked points are NaN.
#[derive(Clone, PartialEq, Debug)]
pub struct Field {
    pub name: String,
    pub units: Option<String>,
    pub grid: Grid,
    pub levels: Option<SoilLevels>,
    pub data: Array3<Float>,
}

impl Field {
    /// Field constructor checking that data and coordinate
    /// shapes are consistent.
    pub fn new(
        name: impl Into<String>,
        units: Option<String>,
        grid: Grid,
        levels: Option<SoilLevels>,
        data: Array3<Float>,
    ) -> Result<Self, AncilError> {
        let (nlat, nlon) = grid.shape();

        if data.dim().1 != nlat || data.dim().2 != nlon {
            return Err(AncilError::Incompatible(
                "Data shape does not match grid coordinates",
            ));
        }

        if let Some(levels) = &levels {
            if levels.len() != data.dim().0 {
                return Err(AncilError::Incompatible(
                    "Level count does not match data shape",
                ));
            }
        }

        Ok(Field {
            name: name.into(),
            units,
            grid,
            levels,
            data,
        })
    }

    /// Convenience constructor for a single-level field.
    pub fn from_layer(
        name: impl Into<String>,
        units: Option<String>,
        grid: Grid,
        layer: Array2<Float>,
    ) -> Result<Self, AncilError> {
        let data = layer.insert_axis(Axis(0));
        Field::new(name, units, grid, None, data)
    }

    pub fn nlevels(&self) -> usize {
        self.data.dim().0
    }

    /// View of the first (surface) level.
    pub fn surface(&self) -> ArrayView2<'_, Float> {
        self.data.index_axis(Axis(0), 0)
    }

    pub fn layer(&self, index: usize) -> ArrayView2<'_, Float> {
        self.data.index_axis(Axis(0), index)
    }

    pub fn layer_mut(&mut self, index: usize) -> ArrayViewMut2<'_, Float> {
        self.data.index_axis_mut(Axis(0), index)
    }

    /// Wraps longitudes into [-180, 180) and sorts them ascendingly,
    /// reordering the data columns accordingly.
    ///
    /// Global dump files come on a 0..360 longitude axis while the
    /// regional fields use -180..180; all comparisons between the two
    /// happen on the wrapped axis.
    pub fn normalize_longitudes(&mut self) {
        let wrapped: Array1<Float> = self
            .grid
            .lons
            .mapv(|lon| (lon + 180.0).rem_euclid(360.0) - 180.0);

        let mut order: Vec<usize> = (0..wrapped.len()).collect();
        order.sort_by(|&a, &b| {
            wrapped[a].partial_cmp(&wrapped[b]).unwrap_or(std::cmp::Ordering::Equal)
        });

        let sorted_lons = Array1::from_iter(order.iter().map(|&i| wrapped[i]));

        let mut sorted_data = Array3::zeros(self.data.dim());
        for (new_col, &old_col) in order.iter().enumerate() {
            sorted_data
                .index_axis_mut(Axis(2), new_col)
                .assign(&self.data.index_axis(Axis(2), old_col));
        }

        self.grid.lons = sorted_lons;
        self.data = sorted_data;
    }

    /// Reverses a north-to-south latitude axis into ascending order,
    /// reordering the data rows accordingly.
    ///
    /// Files routinely carry latitudes running north to south while
    /// interpolation and binning assume ascending coordinates.
    pub fn normalize_latitudes(&mut self) {
        if !self.grid.lats_descending() {
            return;
        }

        self.grid.lats = self.grid.lats.slice(ndarray::s![..;-1]).to_owned();
        self.data = self.data.slice(ndarray::s![.., ..;-1, ..]).to_owned();
    }

    /// Subsets the field to the latitude-longitude envelope of a
    /// reference grid, keeping points within the closed extent.
    pub fn extract_region(&self, reference: &Grid) -> Field {
        let (lat_min, lat_max) = reference.lat_extent();
        let (lon_min, lon_max) = reference.lon_extent();

        let lat_range = inclusive_range(&self.grid.lats, lat_min, lat_max);
        let lon_range = inclusive_range(&self.grid.lons, lon_min, lon_max);

        let lats = self.grid.lats.slice(ndarray::s![lat_range.clone()]).to_owned();
        let lons = self.grid.lons.slice(ndarray::s![lon_range.clone()]).to_owned();
        let data = self
            .data
            .slice(ndarray::s![.., lat_range, lon_range])
            .to_owned();

        Field {
            name: self.name.clone(),
            units: self.units.clone(),
            grid: Grid::new(lats, lons),
            levels: self.levels.clone(),
            data,
        }
    }

    /// Masks (sets to NaN) all negative values.
    pub fn mask_negative(&mut self) {
        self.data.mapv_inplace(|v| if v < 0.0 { Float::NAN } else { v });
    }
}

/// Contiguous index range of sorted coordinates falling
/// within the closed interval [min, max].
fn inclusive_range(coords: &Array1<Float>, min: Float, max: Float) -> std::ops::Range<usize> {
    let start = coords.iter().position(|&c| c >= min && c <= max);

    match start {
        Some(start) => {
            let count = coords
                .iter()
                .skip(start)
                .take_while(|&&c| c >= min && c <= max)
                .count();

            start..start + count
        }
        None => 0..0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use ndarray::array;

    fn test_field() -> Field {
        let grid = Grid::new(array![0.0, 1.0, 2.0], array![300.0, 340.0, 20.0, 60.0]);
        let layer = array![
            [1.0, 2.0, 3.0, 4.0],
            [5.0, 6.0, 7.0, 8.0],
            [9.0, 10.0, 11.0, 12.0]
        ];

        Field::from_layer("smc", Some("kg m-2".to_string()), grid, layer).unwrap()
    }

    #[test]
    fn longitudes_wrap_and_sort() {
        let mut field = test_field();
        field.normalize_longitudes();

        assert_eq!(field.grid.lons, array![-60.0, -20.0, 20.0, 60.0]);
        // columns follow their coordinates
        assert_eq!(
            field.surface().row(0).to_vec(),
            vec![1.0, 2.0, 3.0, 4.0]
        );
    }

    #[test]
    fn region_extraction_keeps_closed_extent() {
        let mut field = test_field();
        field.normalize_longitudes();

        let reference = Grid::new(array![0.5, 1.5], array![-25.0, 25.0]);
        let sub = field.extract_region(&reference);

        assert_eq!(sub.grid.lats, array![1.0]);
        assert_eq!(sub.grid.lons, array![-20.0, 20.0]);
        assert_eq!(sub.surface().to_owned(), array![[6.0, 7.0]]);
    }

    #[test]
    fn descending_latitudes_are_normalized() {
        let grid = Grid::new(array![2.0, 1.0, 0.0], array![0.0, 1.0]);
        let mut field = Field::from_layer(
            "orography",
            None,
            grid,
            array![[4.0, 4.0], [1.0, 1.0], [0.0, 0.0]],
        )
        .unwrap();

        assert!(field.grid.lats_descending());
        field.normalize_latitudes();

        assert_eq!(field.grid.lats, array![0.0, 1.0, 2.0]);
        assert!(field.grid.is_ascending());
        // rows follow their coordinates
        assert_eq!(field.surface().row(0).to_vec(), vec![0.0, 0.0]);
        assert_eq!(field.surface().row(2).to_vec(), vec![4.0, 4.0]);
    }

    #[test]
    fn cell_lookup_clamps_at_edges() {
        let coords = [0.0, 1.0, 2.0, 3.0];

        assert_eq!(lower_cell_index(&coords, -0.5), 0);
        assert_eq!(lower_cell_index(&coords, 0.5), 0);
        assert_eq!(lower_cell_index(&coords, 2.5), 2);
        assert_eq!(lower_cell_index(&coords, 3.5), 2);
    }

    #[test]
    fn thicknesses_from_bounds() {
        let levels = SoilLevels {
            centres: array![0.05, 0.225],
            bounds: array![[0.0, 0.1], [0.1, 0.35]],
        };

        let thickness = levels.thicknesses();

        assert_approx_eq!(f64, thickness[0], 0.1, epsilon = 1.0e-12);
        assert_approx_eq!(f64, thickness[1], 0.25, epsilon = 1.0e-12);
    }

    #[test]
    fn negative_masking() {
        let grid = Grid::new(array![0.0], array![0.0, 1.0]);
        let mut field =
            Field::from_layer("smc", None, grid, array![[-1.0, 2.0]]).unwrap();

        field.mask_negative();

        assert!(field.surface()[[0, 0]].is_nan());
        assert_eq!(field.surface()[[0, 1]], 2.0);
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        let grid = Grid::new(array![0.0, 1.0], array![0.0]);
        let result = Field::from_layer("bad", None, grid, array![[1.0, 2.0]]);

        assert!(result.is_err());
    }
}
