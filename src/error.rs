use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("couldn't read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed sample on line {line}: {content:?}")]
    Parse { line: usize, content: String },
    #[error("no bathymetry samples to work with")]
    EmptySampleSet,
    #[error("bathymetry samples span no area ({0})")]
    DegenerateSamples(String),
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("failed parsing config file: {0}")]
    Config(#[from] serde_yaml::Error),
    #[error("failed to write image: {0}")]
    Image(#[from] image::ImageError),
    #[error("failed to serialize metadata: {0}")]
    Metadata(#[from] bincode::Error),
    #[error(transparent)]
    Output(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn io<P: Into<PathBuf>>(path: P, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
