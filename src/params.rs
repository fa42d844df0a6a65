use std::{env, fs, path::Path};

use serde_derive::{Deserialize, Serialize};

use crate::{
    bathymetry::{GridParams, PlaneSurface, SampleSet},
    error::{Error, Result},
    fan::{FanParams, Heading},
    march::MarchParams,
    sound_speed::{OceanProfile, SectionParams},
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bathymetry {
    /// Path to a whitespace separated XYZ file.
    #[serde(default)]
    pub file: Option<String>,
    /// Rescale x, y and z of the samples into [0, 1] before gridding.
    #[serde(default = "default_true")]
    pub normalize: bool,
    /// Flip the sign of the depths so that the seafloor lies below zero. Applies with and
    /// without normalization.
    #[serde(default = "default_true")]
    pub invert_depth: bool,
    #[serde(default)]
    pub grid: GridParams,
}

fn default_true() -> bool {
    true
}

impl Bathymetry {
    /// Brings loaded samples into the frame rays are traced in.
    pub fn prepare(&self, samples: SampleSet) -> SampleSet {
        match (self.normalize, self.invert_depth) {
            (true, invert) => samples.normalized(invert),
            (false, true) => samples.with_inverted_depth(),
            (false, false) => samples,
        }
    }
}

impl Default for Bathymetry {
    fn default() -> Self {
        Self {
            file: None,
            normalize: true,
            invert_depth: true,
            grid: Default::default(),
        }
    }
}

/// Fan settings as written in a config file; the source and the ray length depend on the
/// bathymetry when left out.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfFan {
    #[serde(default)]
    pub source: Option<[f64; 3]>,
    #[serde(default)]
    pub heading: Heading,
    #[serde(default = "default_spread")]
    pub spread: f64,
    #[serde(default = "default_count")]
    pub count: usize,
    #[serde(default)]
    pub length: Option<f64>,
}

fn default_spread() -> f64 {
    180.0
}

fn default_count() -> usize {
    100
}

impl Default for ConfFan {
    fn default() -> Self {
        Self {
            source: None,
            heading: Default::default(),
            spread: default_spread(),
            count: default_count(),
            length: None,
        }
    }
}

impl ConfFan {
    pub fn into_fan_params(self, default_source: [f64; 3], default_length: f64) -> FanParams {
        FanParams {
            source: self.source.unwrap_or(default_source),
            heading: self.heading,
            spread: self.spread,
            count: self.count,
            length: self.length.unwrap_or(default_length),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Output {
    #[serde(default = "default_output_file")]
    pub file: String,
    #[serde(default)]
    pub file_metadata: Option<String>,
    #[serde(default = "default_output_width")]
    pub width: u32,
    #[serde(default = "default_output_height")]
    pub height: u32,
}

fn default_output_file() -> String {
    "./output.png".to_owned()
}

fn default_output_width() -> u32 {
    640
}

fn default_output_height() -> u32 {
    480
}

impl Default for Output {
    fn default() -> Self {
        Self {
            file: default_output_file(),
            file_metadata: None,
            width: default_output_width(),
            height: default_output_height(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub bathymetry: Bathymetry,
    #[serde(default)]
    pub fan: ConfFan,
    #[serde(default)]
    pub march: MarchParams,
    /// Analytic seafloor used when no bathymetry file is given.
    #[serde(default)]
    pub floor: Option<PlaneSurface>,
    #[serde(default)]
    pub ocean: OceanProfile,
    #[serde(default)]
    pub section: SectionParams,
    #[serde(default)]
    pub output: Output,
}

impl Config {
    pub fn from_yaml(contents: &str) -> Result<Config> {
        Ok(serde_yaml::from_str::<Config>(contents)?)
    }
}

/// Reads a YAML config, relative paths are resolved against the working directory.
pub fn parse_config<P: AsRef<Path>>(filename: P) -> Result<Config> {
    let mut config_abs_path = env::current_dir()?;
    config_abs_path.push(filename);
    let contents =
        fs::read_to_string(&config_abs_path).map_err(|err| Error::io(&config_abs_path, err))?;
    Config::from_yaml(&contents)
}
