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

//! Module responsible for parsing and checking the optional
//! runtime configuration file.
//!
//! All tools look for an `ancil.yaml` in the working directory.
//! When the file is absent every setting falls back to its default,
//! so the tools stay usable as plain command-line filters.
//! The structures and their fields in this module directly correspond
//! to the fields inside `ancil.yaml`.

use crate::errors::ConfigError;
use serde::Deserialize;
use std::{fs, path::Path};

/// Horizontal regridding schemes selectable at runtime.
///
/// `Linear` is the default and matches the behaviour of the
/// general-regrid tool; `Nearest` collapses each target point
/// onto its dominant source point; `AreaWeighted` averages all
/// source cells falling within a target cell.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegridScheme {
    #[default]
    Linear,
    Nearest,
    AreaWeighted,
}

/// Fields controlling the regridding engine.
#[derive(Copy, Clone, PartialEq, Debug, Deserialize)]
pub struct Regridding {
    /// _(Optional)_ Horizontal scheme used by `ancil_general_regrid`.
    ///
    /// Defaults to `linear`.
    #[serde(default)]
    pub scheme: RegridScheme,

    /// _(Optional)_ Magnitude above which regridded values are
    /// treated as coastal extrapolation overshoot.
    ///
    /// Must be positive. Defaults to `1000.0`.
    #[serde(default = "Regridding::default_overshoot_threshold")]
    pub overshoot_threshold: f64,
}

impl Regridding {
    fn default_overshoot_threshold() -> f64 {
        crate::constants::OVERSHOOT_THRESHOLD
    }

    /// Checks if regridding settings follow conventions and limits.
    pub fn check_bounds(&self) -> Result<(), ConfigError> {
        if self.overshoot_threshold <= 0.0 {
            return Err(ConfigError::OutOfBounds(
                "Overshoot threshold must be positive",
            ));
        }

        Ok(())
    }
}

impl Default for Regridding {
    fn default() -> Self {
        Regridding {
            scheme: RegridScheme::default(),
            overshoot_threshold: Regridding::default_overshoot_threshold(),
        }
    }
}

/// _(Optional)_ Fields with information about
/// resources available for the tools.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Deserialize)]
pub struct Resources {
    /// _(Optional)_ Thread count used when regridding
    /// independent levels and fields.
    ///
    /// Cannot be less than `1`. Defaults to `1`.
    #[serde(default = "Resources::default_threads")]
    pub threads: u16,
}

impl Resources {
    fn default_threads() -> u16 {
        1
    }

    /// Checks if the thread count is above limits.
    pub fn check_bounds(&self) -> Result<(), ConfigError> {
        if self.threads < 1 {
            return Err(ConfigError::OutOfBounds(
                "Available threads cannot be less than 1",
            ));
        }

        Ok(())
    }
}

impl Default for Resources {
    fn default() -> Self {
        Resources {
            threads: Resources::default_threads(),
        }
    }
}

/// Main config structure representing the fields in
/// the configuration file.
#[derive(Copy, Clone, PartialEq, Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub regridding: Regridding,

    #[serde(default)]
    pub resources: Resources,
}

impl Config {
    /// Config structure constructor, responsible for
    /// deserializing configuration and checking it.
    pub fn new_from_file(file_path: &Path) -> Result<Config, ConfigError> {
        let data = fs::read(file_path)?;
        let config: Config = serde_yaml::from_slice(data.as_slice())?;

        config.regridding.check_bounds()?;
        config.resources.check_bounds()?;

        Ok(config)
    }

    /// Reads `ancil.yaml` from the working directory when present,
    /// falling back to defaults otherwise.
    pub fn load() -> Result<Config, ConfigError> {
        let path = Path::new("ancil.yaml");

        if path.is_file() {
            Config::new_from_file(path)
        } else {
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_within_bounds() {
        let config = Config::default();

        assert!(config.regridding.check_bounds().is_ok());
        assert!(config.resources.check_bounds().is_ok());
        assert_eq!(config.regridding.scheme, RegridScheme::Linear);
    }

    #[test]
    fn deserializes_partial_config() {
        let config: Config =
            serde_yaml::from_str("regridding:\n  scheme: area_weighted\n").unwrap();

        assert_eq!(config.regridding.scheme, RegridScheme::AreaWeighted);
        assert_eq!(config.resources.threads, 1);
    }

    #[test]
    fn rejects_nonpositive_threshold() {
        let config: Config =
            serde_yaml::from_str("regridding:\n  overshoot_threshold: -5.0\n").unwrap();

        assert!(config.regridding.check_bounds().is_err());
    }
}
