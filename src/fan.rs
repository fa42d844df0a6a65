use nalgebra::{Point3, Unit, Vector3};
use serde_derive::{Deserialize, Serialize};

use crate::error::{Error, Result};

const MIN_AXIS_NORM: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Heading {
    /// Horizontal heading in degrees, counterclockwise from the +x axis.
    Azimuth(f64),
    /// Arbitrary heading vector, doesn't have to be normalized.
    Vector([f64; 3]),
}

impl Default for Heading {
    fn default() -> Self {
        Heading::Azimuth(0.0)
    }
}

impl Heading {
    pub fn direction(&self) -> Vector3<f64> {
        match *self {
            Heading::Azimuth(deg) => {
                let rad = deg.to_radians();
                Vector3::new(rad.cos(), rad.sin(), 0.0)
            }
            Heading::Vector(v) => Vector3::from(v),
        }
    }
}

/// Axes of the source: where it heads, where "down" is and the lateral axis
/// the fan is spread along.
#[derive(Debug, Clone, Copy)]
pub struct LocalFrame {
    pub heading: Unit<Vector3<f64>>,
    pub lateral: Unit<Vector3<f64>>,
    pub down: Unit<Vector3<f64>>,
}

impl LocalFrame {
    pub fn new(heading: &Heading) -> Result<Self> {
        let dir = heading.direction();
        if !dir.iter().all(|c| c.is_finite()) {
            return Err(Error::InvalidGeometry(format!(
                "heading vector {:?} is not finite",
                dir.as_slice()
            )));
        }
        let heading = Unit::try_new(dir, MIN_AXIS_NORM).ok_or_else(|| {
            Error::InvalidGeometry("heading vector has zero length".to_owned())
        })?;
        let down = Unit::new_unchecked(Vector3::new(0.0, 0.0, -1.0));
        let lateral = Unit::try_new(heading.into_inner().cross(&down.into_inner()), MIN_AXIS_NORM)
            .ok_or_else(|| {
                Error::InvalidGeometry(
                    "heading is parallel to the down axis, lateral axis is undefined".to_owned(),
                )
            })?;
        Ok(LocalFrame {
            heading,
            lateral,
            down,
        })
    }

    /// Unit direction at fan angle `theta` (radians), 0 pointing straight down.
    pub fn direction_at(&self, theta: f64) -> Unit<Vector3<f64>> {
        Unit::new_normalize(
            self.lateral.into_inner() * theta.sin() + self.down.into_inner() * theta.cos(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FanParams {
    pub source: [f64; 3],
    #[serde(default)]
    pub heading: Heading,
    #[serde(default = "default_spread")]
    pub spread: f64,
    #[serde(default = "default_count")]
    pub count: usize,
    #[serde(default = "default_length")]
    pub length: f64,
}

fn default_spread() -> f64 {
    180.0
}

fn default_count() -> usize {
    100
}

fn default_length() -> f64 {
    5.0
}

impl Default for FanParams {
    fn default() -> Self {
        FanParams {
            source: [0.0; 3],
            heading: Heading::default(),
            spread: default_spread(),
            count: default_count(),
            length: default_length(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub index: usize,
    /// Fan angle in radians, relative to straight down.
    pub angle: f64,
    pub origin: Point3<f64>,
    pub direction: Unit<Vector3<f64>>,
    pub length: f64,
}

impl Ray {
    pub fn endpoint(&self) -> Point3<f64> {
        self.origin + self.direction.into_inner() * self.length
    }

    pub fn trajectory(&self, samples: usize) -> Result<Trajectory> {
        Trajectory::between(&self.origin, &self.endpoint(), samples)
    }
}

/// Evenly spaced angles (radians) over `[-spread/2, spread/2]`, both ends included.
pub fn fan_angles(spread_deg: f64, count: usize) -> Vec<f64> {
    match count {
        0 => vec![],
        1 => vec![0.0],
        _ => {
            let half = spread_deg.to_radians() / 2.0;
            let step = 2.0 * half / (count - 1) as f64;
            (0..count).map(|i| -half + step * i as f64).collect()
        }
    }
}

pub fn generate_fan(params: &FanParams) -> Result<Vec<Ray>> {
    if !params.length.is_finite() || params.length <= 0.0 {
        return Err(Error::InvalidParameter(format!(
            "ray length must be positive, got {}",
            params.length
        )));
    }
    if !params.spread.is_finite() || params.spread < 0.0 {
        return Err(Error::InvalidParameter(format!(
            "fan spread must be non-negative, got {}",
            params.spread
        )));
    }

    let frame = LocalFrame::new(&params.heading)?;
    let origin = Point3::from(params.source);

    let rays = fan_angles(params.spread, params.count)
        .into_iter()
        .enumerate()
        .map(|(index, angle)| Ray {
            index,
            angle,
            origin,
            direction: frame.direction_at(angle),
            length: params.length,
        })
        .collect();

    Ok(rays)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    points: Vec<Point3<f64>>,
}

impl Trajectory {
    /// `samples` points linearly interpolated from `start` to `end`, inclusive.
    pub fn between(start: &Point3<f64>, end: &Point3<f64>, samples: usize) -> Result<Self> {
        if samples < 2 {
            return Err(Error::InvalidParameter(format!(
                "a trajectory needs at least 2 samples, got {}",
                samples
            )));
        }
        let last = (samples - 1) as f64;
        let points = (0..samples)
            .map(|i| {
                let t = i as f64 / last;
                Point3::from(start.coords * (1.0 - t) + end.coords * t)
            })
            .collect();
        Ok(Trajectory { points })
    }

    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn into_points(self) -> Vec<Point3<f64>> {
        self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn fan(heading: Heading, count: usize) -> FanParams {
        FanParams {
            source: [1.0, -2.0, 0.5],
            heading,
            spread: 180.0,
            count,
            length: 5.0,
        }
    }

    #[test]
    fn directions_are_unit_and_in_fan_plane() {
        for heading in &[
            Heading::Azimuth(0.0),
            Heading::Azimuth(100.0),
            Heading::Vector([1.0, 1.0, -0.5]),
        ] {
            let frame = LocalFrame::new(heading).unwrap();
            let normal = frame.lateral.into_inner().cross(&frame.down.into_inner());
            for ray in generate_fan(&fan(*heading, 37)).unwrap() {
                assert_approx_eq!(ray.direction.norm(), 1.0, 1e-12);
                assert_approx_eq!(ray.direction.into_inner().dot(&normal), 0.0, 1e-12);
            }
        }
    }

    #[test]
    fn endpoints_match_direction_and_length() {
        for ray in generate_fan(&fan(Heading::Azimuth(100.0), 20)).unwrap() {
            let trajectory = ray.trajectory(100).unwrap();
            let expected = ray.origin + ray.direction.into_inner() * ray.length;
            let last = trajectory.points()[99];
            assert_approx_eq!((last - expected).norm(), 0.0, 1e-12);
            assert_eq!(trajectory.points()[0], ray.origin);
        }
    }

    #[test]
    fn lateral_axis_for_northward_heading() {
        let frame = LocalFrame::new(&Heading::Azimuth(0.0)).unwrap();
        assert_approx_eq!(frame.lateral.x, 0.0);
        assert_approx_eq!(frame.lateral.y, 1.0);
        assert_approx_eq!(frame.lateral.z, 0.0);
    }

    #[test]
    fn angles_cover_spread_symmetrically() {
        let angles = fan_angles(180.0, 5);
        assert_eq!(angles.len(), 5);
        assert_approx_eq!(angles[0], -std::f64::consts::FRAC_PI_2);
        assert_approx_eq!(angles[2], 0.0);
        assert_approx_eq!(angles[4], std::f64::consts::FRAC_PI_2);
        assert_eq!(fan_angles(180.0, 1), vec![0.0]);
        assert!(fan_angles(180.0, 0).is_empty());
    }

    #[test]
    fn single_ray_points_straight_down() {
        let rays = generate_fan(&fan(Heading::Azimuth(0.0), 1)).unwrap();
        assert_eq!(rays.len(), 1);
        assert_approx_eq!(rays[0].direction.z, -1.0);
    }

    #[test]
    fn heading_parallel_to_down_is_rejected() {
        let err = generate_fan(&fan(Heading::Vector([0.0, 0.0, -3.0]), 10)).unwrap_err();
        assert!(matches!(err, Error::InvalidGeometry(_)));
        let err = generate_fan(&fan(Heading::Vector([0.0, 0.0, 2.0]), 10)).unwrap_err();
        assert!(matches!(err, Error::InvalidGeometry(_)));
    }

    #[test]
    fn zero_heading_is_rejected() {
        let err = LocalFrame::new(&Heading::Vector([0.0; 3])).unwrap_err();
        assert!(matches!(err, Error::InvalidGeometry(_)));
    }

    #[test]
    fn bad_length_and_sample_count_are_rejected() {
        let mut params = fan(Heading::Azimuth(0.0), 3);
        params.length = 0.0;
        assert!(matches!(
            generate_fan(&params),
            Err(Error::InvalidParameter(_))
        ));
        let ray = generate_fan(&fan(Heading::Azimuth(0.0), 1)).unwrap()[0];
        assert!(matches!(ray.trajectory(1), Err(Error::InvalidParameter(_))));
    }
}
