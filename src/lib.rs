pub mod bathymetry;
pub mod coloring;
pub mod error;
pub mod fan;
pub mod march;
pub mod metadata;
pub mod params;
pub mod renderer;
pub mod sound_speed;
pub mod utils;

pub use error::{Error, Result};
