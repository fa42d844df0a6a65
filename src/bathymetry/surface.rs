use serde_derive::{Deserialize, Serialize};

/// Anything that can tell the seafloor height under a horizontal position.
///
/// `None` means the depth is undefined there (outside the surveyed area) and callers
/// are expected to skip the position rather than assume any default.
pub trait DepthSurface {
    fn depth_at(&self, x: f64, y: f64) -> Option<f64>;
}

/// Seafloor as an infinite plane: `level + slope[0] * x + slope[1] * y`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaneSurface {
    pub level: f64,
    #[serde(default)]
    pub slope: [f64; 2],
}

impl PlaneSurface {
    pub fn flat(level: f64) -> Self {
        PlaneSurface {
            level,
            slope: [0.0; 2],
        }
    }

    pub fn sloped(level: f64, slope_x: f64, slope_y: f64) -> Self {
        PlaneSurface {
            level,
            slope: [slope_x, slope_y],
        }
    }
}

impl DepthSurface for PlaneSurface {
    fn depth_at(&self, x: f64, y: f64) -> Option<f64> {
        Some(self.level + self.slope[0] * x + self.slope[1] * y)
    }
}

impl<S: DepthSurface + ?Sized> DepthSurface for &S {
    fn depth_at(&self, x: f64, y: f64) -> Option<f64> {
        (**self).depth_at(x, y)
    }
}

impl<S: DepthSurface + ?Sized> DepthSurface for Box<S> {
    fn depth_at(&self, x: f64, y: f64) -> Option<f64> {
        (**self).depth_at(x, y)
    }
}

/// A missing surface is undefined everywhere.
impl<S: DepthSurface> DepthSurface for Option<S> {
    fn depth_at(&self, x: f64, y: f64) -> Option<f64> {
        self.as_ref().and_then(|surface| surface.depth_at(x, y))
    }
}
