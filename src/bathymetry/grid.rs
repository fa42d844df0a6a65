use rayon::prelude::*;
use serde_derive::{Deserialize, Serialize};

use super::{
    surface::DepthSurface,
    triangulation::{barycentric, Triangulation},
    xyz::SampleSet,
};
use crate::error::{Error, Result};

const KERNEL_TRUNCATE: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Lookup {
    Nearest,
    Bilinear,
}

impl Default for Lookup {
    fn default() -> Self {
        Lookup::Bilinear
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridParams {
    /// Number of grid nodes along x and y.
    #[serde(default = "default_resolution")]
    pub resolution: [usize; 2],
    /// Gaussian smoothing radius in grid cells, 0 disables smoothing.
    #[serde(default = "default_sigma")]
    pub sigma: f64,
    #[serde(default)]
    pub lookup: Lookup,
}

fn default_resolution() -> [usize; 2] {
    [200, 200]
}

fn default_sigma() -> f64 {
    2.0
}

impl Default for GridParams {
    fn default() -> Self {
        GridParams {
            resolution: default_resolution(),
            sigma: default_sigma(),
            lookup: Lookup::default(),
        }
    }
}

/// Depth values on a regular mesh spanning the bounding box of a sample set.
///
/// Nodes are laid out row by row (`y` major), node `(i, j)` sits at
/// `min_x + i * dx, min_y + j * dy`. Nodes outside the convex hull of the samples hold
/// `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BathymetryGrid {
    nx: usize,
    ny: usize,
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
    lookup: Lookup,
    cells: Vec<Option<f64>>,
}

impl BathymetryGrid {
    pub fn build(samples: &SampleSet, params: &GridParams) -> Result<Self> {
        let [nx, ny] = params.resolution;
        if nx < 2 || ny < 2 {
            return Err(Error::InvalidParameter(format!(
                "grid resolution must be at least 2x2, got {}x{}",
                nx, ny
            )));
        }
        if !params.sigma.is_finite() || params.sigma < 0.0 {
            return Err(Error::InvalidParameter(format!(
                "smoothing sigma must be non-negative, got {}",
                params.sigma
            )));
        }
        let bounds = samples.bounds();
        if !(bounds.width() > 0.0 && bounds.height() > 0.0) {
            return Err(Error::DegenerateSamples(format!(
                "x in [{}, {}], y in [{}, {}]",
                bounds.min_x, bounds.max_x, bounds.min_y, bounds.max_y
            )));
        }

        let mut grid = BathymetryGrid {
            nx,
            ny,
            min_x: bounds.min_x,
            max_x: bounds.max_x,
            min_y: bounds.min_y,
            max_y: bounds.max_y,
            lookup: params.lookup,
            cells: vec![None; nx * ny],
        };

        let triangulation = Triangulation::new(samples.samples());
        log::debug!(
            "Triangulated {} samples into {} triangles",
            samples.len(),
            triangulation.len()
        );
        grid.cells = grid.interpolate(samples, &triangulation);

        if params.sigma > 0.0 {
            grid.cells = smooth_masked(&grid.cells, nx, ny, params.sigma);
        }

        Ok(grid)
    }

    fn interpolate(
        &self,
        samples: &SampleSet,
        triangulation: &Triangulation,
    ) -> Vec<Option<f64>> {
        let pts = samples.samples();
        let mut cells = vec![None; self.nx * self.ny];

        cells
            .par_chunks_mut(self.nx)
            .enumerate()
            .for_each(|(j, row)| {
                let y = self.node_y(j);
                for tri in triangulation.triangles() {
                    let [a, b, c] = [pts[tri[0]], pts[tri[1]], pts[tri[2]]];
                    if y < a.y.min(b.y).min(c.y) || y > a.y.max(b.y).max(c.y) {
                        continue;
                    }
                    let (i_min, i_max) =
                        self.index_span_x(a.x.min(b.x).min(c.x), a.x.max(b.x).max(c.x));
                    for (i, cell) in row.iter_mut().enumerate().take(i_max + 1).skip(i_min) {
                        if cell.is_some() {
                            continue;
                        }
                        let p = (self.node_x(i), y);
                        if let Some(w) = barycentric((a.x, a.y), (b.x, b.y), (c.x, c.y), p) {
                            *cell = Some(w[0] * a.z + w[1] * b.z + w[2] * c.z);
                        }
                    }
                }
            });

        cells
    }

    fn index_span_x(&self, from: f64, to: f64) -> (usize, usize) {
        let dx = self.dx();
        let lo = ((from - self.min_x) / dx).floor().max(0.0) as usize;
        let hi = ((to - self.min_x) / dx).ceil().max(0.0) as usize;
        (lo, hi.min(self.nx - 1))
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    pub fn lookup(&self) -> Lookup {
        self.lookup
    }

    pub fn dx(&self) -> f64 {
        (self.max_x - self.min_x) / (self.nx - 1) as f64
    }

    pub fn dy(&self) -> f64 {
        (self.max_y - self.min_y) / (self.ny - 1) as f64
    }

    pub fn extent(&self) -> (f64, f64, f64, f64) {
        (self.min_x, self.max_x, self.min_y, self.max_y)
    }

    pub fn node_x(&self, i: usize) -> f64 {
        if i + 1 == self.nx {
            self.max_x
        } else {
            self.min_x + self.dx() * i as f64
        }
    }

    pub fn node_y(&self, j: usize) -> f64 {
        if j + 1 == self.ny {
            self.max_y
        } else {
            self.min_y + self.dy() * j as f64
        }
    }

    pub fn cell(&self, i: usize, j: usize) -> Option<f64> {
        if i >= self.nx || j >= self.ny {
            return None;
        }
        self.cells[j * self.nx + i]
    }

    pub fn cells(&self) -> &[Option<f64>] {
        &self.cells
    }

    pub fn valid_cells(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Shallowest and deepest value on the grid.
    pub fn depth_range(&self) -> Option<(f64, f64)> {
        self.cells.iter().flatten().fold(None, |acc, &z| match acc {
            None => Some((z, z)),
            Some((lo, hi)) => Some((lo.min(z), hi.max(z))),
        })
    }

    fn grid_coords(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        if !(x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y) {
            return None;
        }
        Some(((x - self.min_x) / self.dx(), (y - self.min_y) / self.dy()))
    }

    pub fn nearest(&self, x: f64, y: f64) -> Option<f64> {
        let (fx, fy) = self.grid_coords(x, y)?;
        let i = (fx.round() as usize).min(self.nx - 1);
        let j = (fy.round() as usize).min(self.ny - 1);
        self.cell(i, j)
    }

    /// Bilinear interpolation between the four surrounding nodes, `None` if any of them is
    /// undefined.
    pub fn bilinear(&self, x: f64, y: f64) -> Option<f64> {
        let (fx, fy) = self.grid_coords(x, y)?;
        let i = (fx.floor() as usize).min(self.nx - 2);
        let j = (fy.floor() as usize).min(self.ny - 2);
        let tx = fx - i as f64;
        let ty = fy - j as f64;
        let z00 = self.cell(i, j)?;
        let z10 = self.cell(i + 1, j)?;
        let z01 = self.cell(i, j + 1)?;
        let z11 = self.cell(i + 1, j + 1)?;
        let bottom = z00 * (1.0 - tx) + z10 * tx;
        let top = z01 * (1.0 - tx) + z11 * tx;
        Some(bottom * (1.0 - ty) + top * ty)
    }
}

impl DepthSurface for BathymetryGrid {
    fn depth_at(&self, x: f64, y: f64) -> Option<f64> {
        match self.lookup {
            Lookup::Nearest => self.nearest(x, y),
            Lookup::Bilinear => self.bilinear(x, y),
        }
    }
}

/// Kernel truncated at four sigma, and never wider than `max_radius` cells on each side.
fn gaussian_kernel(sigma: f64, max_radius: usize) -> Vec<f64> {
    let radius = (KERNEL_TRUNCATE * sigma + 0.5).min(max_radius as f64) as isize;
    (-radius..=radius)
        .map(|k| {
            let k = k as f64 / sigma;
            (-0.5 * k * k).exp()
        })
        .collect()
}

/// Separable Gaussian blur as a normalized convolution: undefined cells carry no weight,
/// stay undefined and never leak into their neighbours.
pub fn smooth_masked(
    cells: &[Option<f64>],
    nx: usize,
    ny: usize,
    sigma: f64,
) -> Vec<Option<f64>> {
    let kernel = gaussian_kernel(sigma, nx.max(ny));
    let radius = (kernel.len() / 2) as isize;

    let values: Vec<(f64, f64)> = cells
        .iter()
        .map(|c| c.map_or((0.0, 0.0), |z| (z, 1.0)))
        .collect();

    let mut horizontal = vec![(0.0, 0.0); nx * ny];
    horizontal
        .par_chunks_mut(nx)
        .enumerate()
        .for_each(|(j, row)| {
            let src = &values[j * nx..(j + 1) * nx];
            for (i, out) in row.iter_mut().enumerate() {
                *out = convolve(&kernel, radius, i, nx, |k| src[k]);
            }
        });

    let mut smoothed = vec![None; nx * ny];
    smoothed
        .par_chunks_mut(nx)
        .enumerate()
        .for_each(|(j, row)| {
            for (i, out) in row.iter_mut().enumerate() {
                if cells[j * nx + i].is_none() {
                    continue;
                }
                let (num, den) = convolve(&kernel, radius, j, ny, |k| horizontal[k * nx + i]);
                *out = Some(num / den);
            }
        });

    smoothed
}

fn convolve<F>(kernel: &[f64], radius: isize, center: usize, len: usize, at: F) -> (f64, f64)
where
    F: Fn(usize) -> (f64, f64),
{
    let mut num = 0.0;
    let mut den = 0.0;
    for (offset, w) in (-radius..=radius).zip(kernel) {
        let k = center as isize + offset;
        if k < 0 || k >= len as isize {
            continue;
        }
        let (v, m) = at(k as usize);
        num += w * v;
        den += w * m;
    }
    (num, den)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bathymetry::xyz::{parse_xyz, Sample};
    use assert_approx_eq::assert_approx_eq;

    fn plane_samples() -> SampleSet {
        let mut samples = vec![];
        for j in 0..5 {
            for i in 0..5 {
                let (x, y) = (i as f64 * 2.5, j as f64 * 5.0);
                samples.push(Sample::new(x, y, -10.0 + 0.5 * x - 0.2 * y));
            }
        }
        SampleSet::new(samples).unwrap()
    }

    fn params(resolution: [usize; 2], sigma: f64) -> GridParams {
        GridParams {
            resolution,
            sigma,
            lookup: Lookup::Bilinear,
        }
    }

    #[test]
    fn linear_interpolation_reproduces_a_plane() {
        let grid = BathymetryGrid::build(&plane_samples(), &params([21, 11], 0.0)).unwrap();
        assert_eq!(grid.valid_cells(), 21 * 11);
        for j in 0..grid.ny() {
            for i in 0..grid.nx() {
                let (x, y) = (grid.node_x(i), grid.node_y(j));
                assert_approx_eq!(grid.cell(i, j).unwrap(), -10.0 + 0.5 * x - 0.2 * y, 1e-9);
            }
        }
        assert_approx_eq!(grid.depth_at(3.3, 7.1).unwrap(), -10.0 + 1.65 - 1.42, 1e-9);
    }

    #[test]
    fn smoothing_keeps_a_plane_in_the_interior() {
        let grid = BathymetryGrid::build(&plane_samples(), &params([41, 41], 2.0)).unwrap();
        let (x, y) = (grid.node_x(20), grid.node_y(20));
        assert_approx_eq!(grid.cell(20, 20).unwrap(), -10.0 + 0.5 * x - 0.2 * y, 1e-9);
    }

    #[test]
    fn outside_of_hull_is_undefined() {
        let set = parse_xyz("0 0 -1\n10 0 -2\n0 10 -3\n").unwrap();
        let grid = BathymetryGrid::build(&set, &params([11, 11], 0.0)).unwrap();
        assert!(grid.cell(0, 0).is_some());
        assert!(grid.cell(10, 10).is_none());
        assert!(grid.cell(9, 9).is_none());
        assert!(grid.depth_at(9.0, 9.0).is_none());
        assert!(grid.depth_at(-1.0, 5.0).is_none());
        assert!(grid.depth_at(5.0, f64::NAN).is_none());
        assert!(grid.depth_at(1.0, 1.0).is_some());
    }

    #[test]
    fn smoothing_doesnt_leak_undefined_cells() {
        let set = parse_xyz("0 0 -1\n10 0 -2\n0 10 -3\n").unwrap();
        let raw = BathymetryGrid::build(&set, &params([21, 21], 0.0)).unwrap();
        let smooth = BathymetryGrid::build(&set, &params([21, 21], 2.0)).unwrap();
        assert_eq!(raw.valid_cells(), smooth.valid_cells());
        for (a, b) in raw.cells().iter().zip(smooth.cells()) {
            assert_eq!(a.is_some(), b.is_some());
            if let Some(z) = b {
                assert!(z.is_finite());
            }
        }
    }

    #[test]
    fn constant_field_survives_masked_blur() {
        let cells = vec![Some(-4.0), None, Some(-4.0), Some(-4.0), Some(-4.0), None];
        let out = smooth_masked(&cells, 3, 2, 1.5);
        assert_eq!(out[1], None);
        assert_eq!(out[5], None);
        for z in out.iter().flatten() {
            assert_approx_eq!(*z, -4.0);
        }
    }

    #[test]
    fn huge_sigma_averages_over_the_whole_grid() {
        let cells = vec![Some(1.0), Some(3.0), None, Some(5.0)];
        for &sigma in &[1e10, 1e300] {
            assert_eq!(gaussian_kernel(sigma, 2).len(), 5);
            let out = smooth_masked(&cells, 2, 2, sigma);
            assert_eq!(out[2], None);
            for z in out.iter().flatten() {
                assert_approx_eq!(*z, 3.0, 1e-9);
            }
        }
        let grid = BathymetryGrid::build(&plane_samples(), &params([8, 8], 1e300)).unwrap();
        assert_eq!(grid.valid_cells(), 64);
    }

    fn strip_samples(seed: u64, count: usize) -> Vec<Sample> {
        let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
        let mut next = move || {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 11) as f64 / (1u64 << 53) as f64
        };
        (0..count)
            .map(|_| Sample::new(1000.0 * next(), 50.0 * next(), -20.0 - 10.0 * next()))
            .collect()
    }

    /// Counterclockwise convex hull, monotone chain.
    fn convex_hull(samples: &[Sample]) -> Vec<(f64, f64)> {
        let mut pts: Vec<(f64, f64)> = samples.iter().map(|s| (s.x, s.y)).collect();
        pts.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let cross = |o: (f64, f64), a: (f64, f64), b: (f64, f64)| {
            (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
        };
        let mut hull: Vec<(f64, f64)> = vec![];
        let upper: Vec<(f64, f64)> = pts.iter().rev().cloned().collect();
        for chain in [pts, upper].iter() {
            let start = hull.len();
            for &p in chain {
                while hull.len() >= start + 2
                    && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0
                {
                    hull.pop();
                }
                hull.push(p);
            }
            hull.pop();
        }
        hull
    }

    #[test]
    fn elongated_surveys_are_defined_inside_their_hull() {
        for seed in 0..200 {
            let samples = strip_samples(seed, 10 + (seed as usize * 7) % 61);
            let hull = convex_hull(&samples);
            let set = SampleSet::new(samples).unwrap();
            let grid = BathymetryGrid::build(&set, &params([200, 200], 0.0)).unwrap();
            for j in 0..grid.ny() {
                for i in 0..grid.nx() {
                    let p = (grid.node_x(i), grid.node_y(j));
                    let inside = (0..hull.len()).all(|k| {
                        let (a, b) = (hull[k], hull[(k + 1) % hull.len()]);
                        let len = ((b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)).sqrt();
                        (b.0 - a.0) * (p.1 - a.1) - (b.1 - a.1) * (p.0 - a.0) > 1e-6 * len
                    });
                    if inside {
                        assert!(
                            grid.cell(i, j).is_some(),
                            "seed {}: node ({}, {}) inside the hull is undefined",
                            seed,
                            i,
                            j
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn building_is_deterministic() {
        let a = BathymetryGrid::build(&plane_samples(), &params([30, 30], 2.0)).unwrap();
        let b = BathymetryGrid::build(&plane_samples(), &params([30, 30], 2.0)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn nearest_lookup_snaps_to_nodes() {
        let mut p = params([5, 5], 0.0);
        p.lookup = Lookup::Nearest;
        let grid = BathymetryGrid::build(&plane_samples(), &p).unwrap();
        let expected = grid.cell(1, 1).unwrap();
        assert_eq!(grid.depth_at(grid.node_x(1) + 0.2, grid.node_y(1) - 0.3), Some(expected));
    }

    #[test]
    fn degenerate_inputs_are_rejected() {
        let line = parse_xyz("0 0 -1\n1 0 -2\n2 0 -3\n").unwrap();
        assert!(matches!(
            BathymetryGrid::build(&line, &GridParams::default()),
            Err(Error::DegenerateSamples(_))
        ));
        assert!(matches!(
            BathymetryGrid::build(&plane_samples(), &params([1, 10], 0.0)),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            BathymetryGrid::build(&plane_samples(), &params([10, 10], -1.0)),
            Err(Error::InvalidParameter(_))
        ));
    }
}
