use std::{fs, path::Path};

use serde_derive::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Sample {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Sample { x, y, z }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
    pub min_z: f64,
    pub max_z: f64,
}

impl Bounds {
    fn of(samples: &[Sample]) -> Option<Self> {
        let first = samples.first()?;
        let init = Bounds {
            min_x: first.x,
            max_x: first.x,
            min_y: first.y,
            max_y: first.y,
            min_z: first.z,
            max_z: first.z,
        };
        Some(samples.iter().fold(init, |b, s| Bounds {
            min_x: b.min_x.min(s.x),
            max_x: b.max_x.max(s.x),
            min_y: b.min_y.min(s.y),
            max_y: b.max_y.max(s.y),
            min_z: b.min_z.min(s.z),
            max_z: b.max_z.max(s.z),
        }))
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Scattered bathymetry samples; read-only once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSet {
    samples: Vec<Sample>,
    bounds: Bounds,
}

impl SampleSet {
    pub fn new(samples: Vec<Sample>) -> Result<Self> {
        let bounds = Bounds::of(&samples).ok_or(Error::EmptySampleSet)?;
        Ok(SampleSet { samples, bounds })
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Rescales every axis to `[0, 1]`. With `invert_depth` the depth axis ends up in
    /// `[-1, 0]` instead, deepest sample at -1.
    pub fn normalized(&self, invert_depth: bool) -> SampleSet {
        let b = self.bounds;
        let samples = self
            .samples
            .iter()
            .map(|s| {
                let z = to_unit(s.z, b.min_z, b.max_z);
                Sample {
                    x: to_unit(s.x, b.min_x, b.max_x),
                    y: to_unit(s.y, b.min_y, b.max_y),
                    z: if invert_depth { -z } else { z },
                }
            })
            .collect::<Vec<_>>();
        let bounds = Bounds::of(&samples).unwrap_or(b);
        SampleSet { samples, bounds }
    }

    /// Same samples with the sign of every depth flipped.
    pub fn with_inverted_depth(&self) -> SampleSet {
        let samples = self
            .samples
            .iter()
            .map(|s| Sample::new(s.x, s.y, -s.z))
            .collect();
        let bounds = Bounds {
            min_z: -self.bounds.max_z,
            max_z: -self.bounds.min_z,
            ..self.bounds
        };
        SampleSet { samples, bounds }
    }
}

fn to_unit(v: f64, min: f64, max: f64) -> f64 {
    let span = max - min;
    if span > 0.0 {
        (v - min) / span
    } else {
        0.0
    }
}

/// Parses `x y z` rows. Blank lines and `#` comments are skipped, anything else that
/// isn't exactly three finite numbers fails the whole parse.
pub fn parse_xyz(contents: &str) -> Result<SampleSet> {
    let mut samples = vec![];

    for (line_idx, line) in contents.lines().enumerate() {
        let data = line.split('#').next().unwrap_or("").trim();
        if data.is_empty() {
            continue;
        }
        let malformed = || Error::Parse {
            line: line_idx + 1,
            content: line.to_owned(),
        };
        let values = data
            .split_whitespace()
            .map(|field| field.parse::<f64>().ok().filter(|v| v.is_finite()))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(malformed)?;
        match values[..] {
            [x, y, z] => samples.push(Sample { x, y, z }),
            _ => return Err(malformed()),
        }
    }

    SampleSet::new(samples)
}

pub fn load_xyz<P: AsRef<Path>>(path: P) -> Result<SampleSet> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|err| Error::io(path, err))?;
    let samples = parse_xyz(&contents)?;
    log::info!("Loaded {} bathymetry samples from {:?}", samples.len(), path);
    Ok(samples)
}
