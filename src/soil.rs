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

//! Module with the soil-moisture conversions between content,
//! volume and stress.
//!
//! Soil moisture content (SMC, kg m^-2) is converted to a
//! fractional volume by normalizing with layer thickness and water
//! density, and further to the dimensionless stress
//! `(volume - wilt) / (crit - wilt)` which interpolates across
//! coastlines better than the content itself. The inverse
//! conversion applies the physical bounds the model enforces on
//! its soil moisture: values are capped at saturation and floored
//! at a tenth of the wilting point.

use crate::{
    constants::{RHO_WATER, WILT_FLOOR_FACTOR},
    errors::AncilError,
    grid::Field,
    Float,
};
use log::debug;
use ndarray::{Array1, Array3, Zip};

/// Name given to the derived stress variable.
pub const STRESS_NAME: &str = "soil_moisture_stress";

/// Name given to the reconstructed content variable.
pub const SMC_NAME: &str = "moisture_content_of_soil_layer";

/// STASH identifier of the volumetric wilting point field.
pub const WILT_STASH: &str = "m01s00i040";

/// STASH identifier of the volumetric critical point field.
pub const CRIT_STASH: &str = "m01s00i041";

/// STASH identifier of the volumetric saturation field.
pub const SAT_STASH: &str = "m01s00i043";

/// STASH identifier of the snow amount field.
pub const SNOW_STASH: &str = "m01s00i023";

/// Converts soil moisture content to soil moisture stress.
///
/// The wilting and critical point fields are 2-D and broadcast
/// over the soil layers of the content field.
pub fn smc_to_stress(smc: &Field, wilt: &Field, crit: &Field) -> Result<Field, AncilError> {
    check_thresholds(smc, &[wilt, crit])?;
    let thicknesses = layer_thicknesses(smc)?;

    debug!(
        "Converting {} levels of SMC to stress, layer thicknesses {:?}",
        smc.nlevels(),
        thicknesses.to_vec()
    );

    let wilt = wilt.surface();
    let crit = crit.surface();

    let mut stress = Array3::zeros(smc.data.dim());

    for (level, dz) in thicknesses.iter().enumerate() {
        let volume = smc.layer(level).mapv(|v| v / (dz * RHO_WATER));

        Zip::from(stress.index_axis_mut(ndarray::Axis(0), level))
            .and(&volume)
            .and(&wilt)
            .and(&crit)
            .for_each(|s, &vol, &w, &c| {
                *s = (vol - w) / (c - w);
            });
    }

    Field::new(
        STRESS_NAME,
        Some("1".to_string()),
        smc.grid.clone(),
        smc.levels.clone(),
        stress,
    )
}

/// Converts soil moisture stress back to soil moisture content,
/// applying the model consistency bounds.
///
/// Per layer the volume is reconstructed as
/// `stress * (crit - wilt) + wilt`, capped at saturation, scaled to
/// content, and finally clamped to the content interval
/// `[0.1 * wilt, sat]` (both expressed in content units).
pub fn stress_to_smc(
    stress: &Field,
    wilt: &Field,
    crit: &Field,
    sat: &Field,
) -> Result<Field, AncilError> {
    check_thresholds(stress, &[wilt, crit, sat])?;
    let thicknesses = layer_thicknesses(stress)?;

    debug!(
        "Converting {} levels of stress to SMC",
        stress.nlevels()
    );

    let wilt = wilt.surface();
    let crit = crit.surface();
    let sat = sat.surface();

    let mut smc = Array3::zeros(stress.data.dim());

    for (level, dz) in thicknesses.iter().enumerate() {
        Zip::from(smc.index_axis_mut(ndarray::Axis(0), level))
            .and(&stress.layer(level))
            .and(&wilt)
            .and(&crit)
            .and(&sat)
            .for_each(|out, &st, &w, &c, &sa| {
                // min/max ignore NaN operands, so masked stress or
                // threshold points must stay masked explicitly
                if st.is_nan() || w.is_nan() || c.is_nan() || sa.is_nan() {
                    *out = Float::NAN;
                    return;
                }

                let volume = (st * (c - w) + w).min(sa);
                let content = volume * RHO_WATER * dz;

                // model consistency bounds in content units
                let floor = WILT_FLOOR_FACTOR * w * dz * RHO_WATER;
                let ceiling = sa * dz * RHO_WATER;

                *out = content.max(floor).min(ceiling);
            });
    }

    let mut result = Field::new(
        SMC_NAME,
        Some("kg m-2".to_string()),
        stress.grid.clone(),
        stress.levels.clone(),
        smc,
    )?;

    result.mask_negative();

    Ok(result)
}

fn layer_thicknesses(field: &Field) -> Result<Array1<Float>, AncilError> {
    field
        .levels
        .as_ref()
        .map(|levels| levels.thicknesses())
        .ok_or(AncilError::Incompatible(
            "Soil level bounds are required to derive layer thicknesses",
        ))
}

fn check_thresholds(field: &Field, thresholds: &[&Field]) -> Result<(), AncilError> {
    for threshold in thresholds {
        if !threshold.grid.approx_eq(&field.grid) {
            return Err(AncilError::Incompatible(
                "Threshold field grid does not match the moisture field grid",
            ));
        }
    }

    Ok(())
}
