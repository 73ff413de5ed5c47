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

//! Module containing constants used by the suite.

use crate::Float;

/// Density of liquid water used by the soil-moisture
/// conversions (kg m^-3).
pub const RHO_WATER: Float = 997.77;

/// Lowest soil moisture content the model accepts,
/// as a fraction of the wilting point.
pub const WILT_FLOOR_FACTOR: Float = 0.1;

/// Regridded values above this magnitude are treated as
/// unphysical extrapolation overshoot near coastlines.
pub const OVERSHOOT_THRESHOLD: Float = 1000.0;

/// Number of source points contributing to one bilinearly
/// interpolated target point.
pub const STENCIL_SIZE: usize = 4;

/// River direction value marking a pour point into the ocean.
pub const POUR_POINT_INDICATOR: Float = 9.0;

/// Land cover fraction of a cell that is entirely ocean.
pub const OCEAN_INDICATOR: Float = 0.0;

/// Default fill value written to NetCDF output for masked points.
pub const FILL_VALUE: Float = -1.073_741_8e9;
