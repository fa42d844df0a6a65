//! Speed of sound in seawater.
//!
//! Depths are in meters, positive downwards, temperatures in degrees Celsius and
//! salinities in PSU.

use std::f64::consts::PI;

use serde_derive::{Deserialize, Serialize};

use crate::error::{Error, Result};

const MAX_TABLE_ROWS: usize = 1_000_000;

/// Nine-term equation of Mackenzie (1981).
pub fn mackenzie(t: f64, s: f64, z: f64) -> f64 {
    let ds = s - 35.0;
    1448.96 + 4.591 * t - 5.304e-2 * t * t + 2.374e-4 * t * t * t + 1.340 * ds + 1.630e-2 * z
        + 1.675e-7 * z * z
        - 1.025e-2 * t * ds
        - 7.139e-13 * t * z * z * z
}

/// Small horizontal variation used to make a depth-only profile into a 3D field; `u` and
/// `v` are the horizontal coordinates scaled to `[0, 1]`.
pub fn lateral_perturbation(u: f64, v: f64) -> f64 {
    0.1 * u + 0.1 * v + 0.05 * (2.0 * PI * u).sin() * (2.0 * PI * v).sin()
}

/// Temperature and salinity as functions of depth: constant in the mixed surface layer,
/// linear through the transition layer, constant again in the deep layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OceanProfile {
    #[serde(default = "default_mixed_layer_depth")]
    pub mixed_layer_depth: f64,
    #[serde(default = "default_deep_layer_depth")]
    pub deep_layer_depth: f64,
    /// Surface and deep water temperature.
    #[serde(default = "default_temperature")]
    pub temperature: [f64; 2],
    /// Surface and deep water salinity.
    #[serde(default = "default_salinity")]
    pub salinity: [f64; 2],
}

fn default_mixed_layer_depth() -> f64 {
    100.0
}

fn default_deep_layer_depth() -> f64 {
    1000.0
}

fn default_temperature() -> [f64; 2] {
    [20.0, 2.0]
}

fn default_salinity() -> [f64; 2] {
    [35.0, 35.5]
}

impl Default for OceanProfile {
    fn default() -> Self {
        OceanProfile {
            mixed_layer_depth: default_mixed_layer_depth(),
            deep_layer_depth: default_deep_layer_depth(),
            temperature: default_temperature(),
            salinity: default_salinity(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProfileSample {
    pub depth: f64,
    pub temperature: f64,
    pub salinity: f64,
    pub sound_speed: f64,
}

impl OceanProfile {
    pub fn validate(&self) -> Result<()> {
        let values = [
            self.mixed_layer_depth,
            self.deep_layer_depth,
            self.temperature[0],
            self.temperature[1],
            self.salinity[0],
            self.salinity[1],
        ];
        if !values.iter().all(|v| v.is_finite()) {
            return Err(Error::InvalidParameter(
                "ocean profile values must be finite".to_owned(),
            ));
        }
        if self.mixed_layer_depth >= self.deep_layer_depth {
            return Err(Error::InvalidParameter(format!(
                "mixed layer ({} m) must end above the deep layer ({} m)",
                self.mixed_layer_depth, self.deep_layer_depth
            )));
        }
        Ok(())
    }

    fn layered(&self, depth: f64, [top, bottom]: [f64; 2]) -> f64 {
        if depth <= self.mixed_layer_depth {
            top
        } else if depth <= self.deep_layer_depth {
            let frac =
                (depth - self.mixed_layer_depth) / (self.deep_layer_depth - self.mixed_layer_depth);
            top + (bottom - top) * frac
        } else {
            bottom
        }
    }

    pub fn temperature(&self, depth: f64) -> f64 {
        self.layered(depth, self.temperature)
    }

    pub fn salinity(&self, depth: f64) -> f64 {
        self.layered(depth, self.salinity)
    }

    pub fn sound_speed(&self, depth: f64) -> f64 {
        mackenzie(self.temperature(depth), self.salinity(depth), depth)
    }

    pub fn sample(&self, depth: f64) -> ProfileSample {
        let temperature = self.temperature(depth);
        let salinity = self.salinity(depth);
        ProfileSample {
            depth,
            temperature,
            salinity,
            sound_speed: mackenzie(temperature, salinity, depth),
        }
    }

    /// Samples from `min_depth` to `max_depth` inclusive, every `step` meters.
    pub fn table(&self, min_depth: f64, max_depth: f64, step: f64) -> Result<Vec<ProfileSample>> {
        if !(step > 0.0) || !step.is_finite() {
            return Err(Error::InvalidParameter(format!(
                "depth step must be positive, got {}",
                step
            )));
        }
        if !(min_depth <= max_depth) || !(max_depth - min_depth).is_finite() {
            return Err(Error::InvalidParameter(format!(
                "depth range [{}, {}] is empty or unbounded",
                min_depth, max_depth
            )));
        }
        let steps = ((max_depth - min_depth) / step + 1e-9).floor();
        if steps >= MAX_TABLE_ROWS as f64 {
            return Err(Error::InvalidParameter(format!(
                "depth step {} gives more than {} rows between {} and {}",
                step, MAX_TABLE_ROWS, min_depth, max_depth
            )));
        }
        let count = steps as usize + 1;
        Ok((0..count)
            .map(|i| self.sample(min_depth + step * i as f64))
            .collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionParams {
    /// Width of the section in meters.
    #[serde(default = "default_horizontal_extent")]
    pub horizontal_extent: f64,
    /// Deepest depth drawn, in meters.
    #[serde(default = "default_depth_extent")]
    pub depth_extent: f64,
    #[serde(default = "default_section_resolution")]
    pub resolution: [usize; 2],
    #[serde(default = "default_seafloor_depth")]
    pub seafloor_depth: f64,
    /// Seafloor deepening per meter of horizontal distance.
    #[serde(default = "default_seafloor_slope")]
    pub seafloor_slope: f64,
    /// Platform position as a fraction of the horizontal extent.
    #[serde(default = "default_platform")]
    pub platform: f64,
    /// Cut through the 3D field at this fraction of the lateral extent instead of using
    /// the plain depth profile.
    #[serde(default)]
    pub lateral_position: Option<f64>,
}

fn default_horizontal_extent() -> f64 {
    2000.0
}

fn default_depth_extent() -> f64 {
    4500.0
}

fn default_section_resolution() -> [usize; 2] {
    [500, 450]
}

fn default_seafloor_depth() -> f64 {
    4000.0
}

fn default_seafloor_slope() -> f64 {
    0.02
}

fn default_platform() -> f64 {
    0.5
}

impl Default for SectionParams {
    fn default() -> Self {
        SectionParams {
            horizontal_extent: default_horizontal_extent(),
            depth_extent: default_depth_extent(),
            resolution: default_section_resolution(),
            seafloor_depth: default_seafloor_depth(),
            seafloor_slope: default_seafloor_slope(),
            platform: default_platform(),
            lateral_position: None,
        }
    }
}

impl SectionParams {
    pub fn seafloor_at(&self, x: f64) -> f64 {
        self.seafloor_depth + self.seafloor_slope * x
    }

    pub fn platform_x(&self) -> f64 {
        self.horizontal_extent * self.platform
    }
}

/// Sound speed over a vertical cross-section, `resolution[0]` columns from the left edge
/// to the right, `resolution[1]` rows from the surface down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundSpeedSection {
    xs: Vec<f64>,
    depths: Vec<f64>,
    values: Vec<f64>,
}

impl SoundSpeedSection {
    pub fn compute(profile: &OceanProfile, params: &SectionParams) -> Result<Self> {
        profile.validate()?;
        let [nx, nz] = params.resolution;
        if nx < 2 || nz < 2 {
            return Err(Error::InvalidParameter(format!(
                "section resolution must be at least 2x2, got {}x{}",
                nx, nz
            )));
        }
        if !(params.horizontal_extent > 0.0 && params.depth_extent > 0.0) {
            return Err(Error::InvalidParameter(
                "section extents must be positive".to_owned(),
            ));
        }

        let xs = linspace(0.0, params.horizontal_extent, nx);
        let depths = linspace(0.0, params.depth_extent, nz);
        let column = depths
            .iter()
            .map(|&z| profile.sound_speed(z))
            .collect::<Vec<_>>();

        let mut values = Vec::with_capacity(nx * nz);
        for c in &column {
            for &x in &xs {
                let lateral = params.lateral_position.map_or(0.0, |v| {
                    lateral_perturbation(x / params.horizontal_extent, v)
                });
                values.push(c + lateral);
            }
        }

        Ok(SoundSpeedSection { xs, depths, values })
    }

    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    pub fn depths(&self) -> &[f64] {
        &self.depths
    }

    pub fn value(&self, i: usize, k: usize) -> f64 {
        self.values[k * self.xs.len() + i]
    }

    /// The vertical profile under column `i`.
    pub fn column(&self, i: usize) -> Vec<f64> {
        (0..self.depths.len()).map(|k| self.value(i, k)).collect()
    }

    pub fn range(&self) -> (f64, f64) {
        self.values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }
}

fn linspace(from: f64, to: f64, count: usize) -> Vec<f64> {
    let last = (count - 1) as f64;
    (0..count)
        .map(|i| from + (to - from) * i as f64 / last)
        .collect()
}
