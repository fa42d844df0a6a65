mod grid;
mod surface;
mod triangulation;
mod xyz;

pub use grid::{smooth_masked, BathymetryGrid, GridParams, Lookup};
pub use surface::{DepthSurface, PlaneSurface};
pub use triangulation::Triangulation;
pub use xyz::{load_xyz, parse_xyz, Bounds, Sample, SampleSet};
