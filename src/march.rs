use nalgebra::Point3;
use rayon::prelude::*;
use serde_derive::{Deserialize, Serialize};

use crate::{bathymetry::DepthSurface, error::Result, fan::Ray};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarchParams {
    /// Points sampled along every ray.
    #[serde(default = "default_samples")]
    pub samples: usize,
    /// Interpolate between the last sample above the floor and the first one below it
    /// instead of reporting the first sample below.
    #[serde(default)]
    pub refine: bool,
}

fn default_samples() -> usize {
    1000
}

impl Default for MarchParams {
    fn default() -> Self {
        MarchParams {
            samples: default_samples(),
            refine: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Index of the first trajectory sample at or below the floor.
    pub index: usize,
    pub point: Point3<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarchResult<'a> {
    pub hit: Option<Hit>,
    /// The trajectory up to and including the hit sample, or all of it.
    pub path: &'a [Point3<f64>],
}

pub fn march<'a, S>(trajectory: &'a [Point3<f64>], surface: &S, refine: bool) -> MarchResult<'a>
where
    S: DepthSurface + ?Sized,
{
    let mut last_above: Option<(Point3<f64>, f64)> = None;

    for (index, point) in trajectory.iter().enumerate() {
        let floor = match surface.depth_at(point.x, point.y) {
            Some(floor) => floor,
            None => continue,
        };
        if point.z > floor {
            last_above = Some((*point, floor));
            continue;
        }

        let point = match last_above {
            Some((prev, prev_floor)) if refine => {
                let diff1 = prev.z - prev_floor;
                let diff2 = point.z - floor;
                let prop = diff1 / (diff1 - diff2);
                prev + (point - prev) * prop
            }
            _ => *point,
        };
        return MarchResult {
            hit: Some(Hit { index, point }),
            path: &trajectory[..=index],
        };
    }

    MarchResult {
        hit: None,
        path: trajectory,
    }
}

/// A ray after marching: its rendered path and where it met the floor, if it did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RayTrace {
    pub index: usize,
    pub angle: f64,
    pub path: Vec<Point3<f64>>,
    pub hit: Option<Point3<f64>>,
}

pub fn trace_ray<S>(ray: &Ray, params: &MarchParams, surface: &S) -> Result<RayTrace>
where
    S: DepthSurface + ?Sized,
{
    let trajectory = ray.trajectory(params.samples)?;
    let result = march(trajectory.points(), surface, params.refine);
    let mut path = result.path.to_vec();
    if let (Some(hit), Some(last)) = (result.hit, path.last_mut()) {
        *last = hit.point;
    }
    Ok(RayTrace {
        index: ray.index,
        angle: ray.angle,
        path,
        hit: result.hit.map(|hit| hit.point),
    })
}

/// Marches every ray of a fan; rays are independent so they run in parallel, the result
/// keeps the fan order.
pub fn trace_fan<S>(rays: &[Ray], params: &MarchParams, surface: &S) -> Result<Vec<RayTrace>>
where
    S: DepthSurface + Sync + ?Sized,
{
    rays.par_iter()
        .map(|ray| trace_ray(ray, params, surface))
        .collect()
}
