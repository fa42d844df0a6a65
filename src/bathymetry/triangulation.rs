use delaunator::Point;

use super::xyz::Sample;

const DUPLICATE_EPS: f64 = 1e-12;
const BARYCENTRIC_EPS: f64 = 1e-9;
const DEGENERATE_AREA: f64 = 1e-12;

/// Delaunay triangulation of the horizontal sample positions, covering their whole convex
/// hull.
///
/// Computed with `delaunator` in coordinates rescaled to the unit square, so sample sets in
/// projected coordinates (hundreds of kilometers of easting) or in degrees stay well
/// conditioned. Coincident samples are triangulated once, the first occurrence wins. Input
/// without three non-collinear samples yields no triangles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Triangulation {
    triangles: Vec<[usize; 3]>,
}

impl Triangulation {
    pub fn new(samples: &[Sample]) -> Self {
        let min_x = samples.iter().map(|s| s.x).fold(f64::INFINITY, f64::min);
        let min_y = samples.iter().map(|s| s.y).fold(f64::INFINITY, f64::min);
        let max_x = samples.iter().map(|s| s.x).fold(f64::NEG_INFINITY, f64::max);
        let max_y = samples.iter().map(|s| s.y).fold(f64::NEG_INFINITY, f64::max);
        let span = (max_x - min_x).max(max_y - min_y);
        if samples.len() < 3 || !(span > 0.0) {
            return Triangulation { triangles: vec![] };
        }

        let points: Vec<(f64, f64)> = samples
            .iter()
            .map(|s| ((s.x - min_x) / span, (s.y - min_y) / span))
            .collect();
        let unique = unique_indices(&points);
        if unique.len() < 3 {
            return Triangulation { triangles: vec![] };
        }

        let input: Vec<Point> = unique
            .iter()
            .map(|&i| Point {
                x: points[i].0,
                y: points[i].1,
            })
            .collect();
        let delaunay = delaunator::triangulate(&input);

        let triangles = delaunay
            .triangles
            .chunks_exact(3)
            .map(|t| [unique[t[0]], unique[t[1]], unique[t[2]]])
            .filter_map(|[a, b, c]| {
                let area = proper_area(points[a], points[b], points[c])?;
                Some(if area > 0.0 { [a, b, c] } else { [a, c, b] })
            })
            .collect();

        Triangulation { triangles }
    }

    /// Vertex indices into the sample slice, counterclockwise.
    pub fn triangles(&self) -> &[[usize; 3]] {
        &self.triangles
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}

fn unique_indices(points: &[(f64, f64)]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..points.len()).collect();
    // stable sort keeps the first of coincident samples in front
    order.sort_by(|&a, &b| {
        points[a]
            .0
            .partial_cmp(&points[b].0)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(
                points[a]
                    .1
                    .partial_cmp(&points[b].1)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
    });
    order.dedup_by(|&mut next, &mut kept| {
        (points[next].0 - points[kept].0).abs() < DUPLICATE_EPS
            && (points[next].1 - points[kept].1).abs() < DUPLICATE_EPS
    });
    order
}

fn orientation(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> f64 {
    (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0)
}

fn dist2(a: (f64, f64), b: (f64, f64)) -> f64 {
    (b.0 - a.0).powi(2) + (b.1 - a.1).powi(2)
}

/// Twice the signed area of `abc`, `None` for slivers. The threshold is relative to the
/// longest edge, so it doesn't depend on the units of the coordinates.
fn proper_area(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> Option<f64> {
    let area = orientation(a, b, c);
    let scale = dist2(a, b).max(dist2(b, c)).max(dist2(c, a));
    if area.abs() > DEGENERATE_AREA * scale {
        Some(area)
    } else {
        None
    }
}

/// Barycentric weights of `p` in triangle `abc`, `None` when `p` is outside it.
pub fn barycentric(
    a: (f64, f64),
    b: (f64, f64),
    c: (f64, f64),
    p: (f64, f64),
) -> Option<[f64; 3]> {
    let area = proper_area(a, b, c)?;
    let wa = orientation(b, c, p) / area;
    let wb = orientation(c, a, p) / area;
    let wc = 1.0 - wa - wb;
    if wa < -BARYCENTRIC_EPS || wb < -BARYCENTRIC_EPS || wc < -BARYCENTRIC_EPS {
        return None;
    }
    Some([wa, wb, wc])
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn area(samples: &[Sample], t: &[usize; 3]) -> f64 {
        let p = |i: usize| (samples[i].x, samples[i].y);
        orientation(p(t[0]), p(t[1]), p(t[2])) / 2.0
    }

    fn total_area(samples: &[Sample], tri: &Triangulation) -> f64 {
        tri.triangles().iter().map(|t| area(samples, t)).sum()
    }

    /// Convex hull area by the monotone chain.
    fn hull_area(samples: &[Sample]) -> f64 {
        let mut pts: Vec<(f64, f64)> = samples.iter().map(|s| (s.x, s.y)).collect();
        pts.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let mut hull: Vec<(f64, f64)> = vec![];
        for pass in 0..2 {
            let start = hull.len();
            let iter: Box<dyn Iterator<Item = &(f64, f64)>> = if pass == 0 {
                Box::new(pts.iter())
            } else {
                Box::new(pts.iter().rev())
            };
            for &p in iter {
                while hull.len() >= start + 2
                    && orientation(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0
                {
                    hull.pop();
                }
                hull.push(p);
            }
            hull.pop();
        }
        let n = hull.len();
        (0..n)
            .map(|i| {
                let (a, b) = (hull[i], hull[(i + 1) % n]);
                a.0 * b.1 - b.0 * a.1
            })
            .sum::<f64>()
            / 2.0
    }

    /// Deterministic pseudo-random soundings over a long narrow strip.
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

    #[test]
    fn square_is_split_in_two() {
        let samples = vec![
            Sample::new(0.0, 0.0, 0.0),
            Sample::new(1.0, 0.0, 0.0),
            Sample::new(1.0, 1.0, 0.0),
            Sample::new(0.0, 1.0, 0.0),
        ];
        let tri = Triangulation::new(&samples);
        assert_eq!(tri.len(), 2);
        assert_approx_eq!(total_area(&samples, &tri), 1.0);
        assert!(tri.triangles().iter().all(|t| area(&samples, t) > 0.0));
    }

    #[test]
    fn lattice_covers_its_hull() {
        let mut samples = vec![];
        for j in 0..6 {
            for i in 0..7 {
                samples.push(Sample::new(100.0 + 10.0 * i as f64, 5.0 * j as f64, 0.0));
            }
        }
        let tri = Triangulation::new(&samples);
        assert_eq!(tri.len(), 2 * 6 * 5);
        assert_approx_eq!(total_area(&samples, &tri), 60.0 * 25.0, 1e-6);
    }

    #[test]
    fn elongated_strips_cover_their_hull() {
        for seed in 0..200 {
            let samples = strip_samples(seed, 10 + (seed as usize * 7) % 61);
            let tri = Triangulation::new(&samples);
            let hull = hull_area(&samples);
            assert!(tri.triangles().iter().all(|t| area(&samples, t) > 0.0));
            assert_approx_eq!(total_area(&samples, &tri), hull, hull * 1e-9);
        }
    }

    #[test]
    fn tiny_spacing_still_triangulates() {
        // soundings a millimeter apart in degrees
        let samples: Vec<Sample> = (0..5)
            .flat_map(|j| {
                (0..5).map(move |i| {
                    Sample::new(18.6 + 1e-8 * i as f64, 54.4 + 1e-8 * j as f64, -30.0)
                })
            })
            .collect();
        let tri = Triangulation::new(&samples);
        assert_approx_eq!(total_area(&samples, &tri), 16e-16, 1e-20);
        let [a, b, c] = tri.triangles()[0];
        let p = |i: usize| (samples[i].x, samples[i].y);
        let centroid = (
            (p(a).0 + p(b).0 + p(c).0) / 3.0,
            (p(a).1 + p(b).1 + p(c).1) / 3.0,
        );
        let w = barycentric(p(a), p(b), p(c), centroid).unwrap();
        assert_approx_eq!(w[0], 1.0 / 3.0, 1e-4);
    }

    #[test]
    fn delaunay_property_holds() {
        let samples: Vec<Sample> = (0..40)
            .map(|i| {
                let f = i as f64;
                Sample::new((f * 7.31).sin() * 50.0, (f * 3.17).cos() * 30.0 + f, 0.0)
            })
            .collect();
        let tri = Triangulation::new(&samples);
        assert!(!tri.is_empty());
        let pts: Vec<(f64, f64)> = samples.iter().map(|s| (s.x, s.y)).collect();
        for t in tri.triangles() {
            let [(ax, ay), (bx, by), (cx, cy)] = [pts[t[0]], pts[t[1]], pts[t[2]]];
            let d = 2.0 * (ax * (by - cy) + bx * (cy - ay) + cx * (ay - by));
            let (a2, b2, c2) = (ax * ax + ay * ay, bx * bx + by * by, cx * cx + cy * cy);
            let ux = (a2 * (by - cy) + b2 * (cy - ay) + c2 * (ay - by)) / d;
            let uy = (a2 * (cx - bx) + b2 * (ax - cx) + c2 * (bx - ax)) / d;
            let r2 = dist2((ax, ay), (ux, uy));
            for (i, &p) in pts.iter().enumerate() {
                if t.contains(&i) {
                    continue;
                }
                let d2 = dist2(p, (ux, uy));
                assert!(d2 >= r2 * (1.0 - 1e-9), "point {} inside circumcircle", i);
            }
        }
    }

    #[test]
    fn degenerate_inputs_give_no_triangles() {
        let collinear: Vec<Sample> = (0..5)
            .map(|i| Sample::new(i as f64, 2.0 * i as f64, 1.0))
            .collect();
        assert!(Triangulation::new(&collinear).is_empty());
        let duplicates = vec![Sample::new(1.0, 1.0, 0.0); 4];
        assert!(Triangulation::new(&duplicates).is_empty());
        assert!(Triangulation::new(&[]).is_empty());
    }

    #[test]
    fn duplicates_are_triangulated_once() {
        let samples = vec![
            Sample::new(0.0, 0.0, 1.0),
            Sample::new(1.0, 0.0, 2.0),
            Sample::new(0.0, 1.0, 3.0),
            Sample::new(0.0, 0.0, 9.0),
        ];
        let tri = Triangulation::new(&samples);
        assert_eq!(tri.len(), 1);
        assert!(!tri.triangles()[0].contains(&3));
    }

    #[test]
    fn barycentric_weights() {
        let w = barycentric((0.0, 0.0), (2.0, 0.0), (0.0, 2.0), (0.5, 0.5)).unwrap();
        assert_approx_eq!(w[0], 0.5);
        assert_approx_eq!(w[1], 0.25);
        assert_approx_eq!(w[2], 0.25);
        assert!(barycentric((0.0, 0.0), (2.0, 0.0), (0.0, 2.0), (1.5, 1.5)).is_none());
        assert!(barycentric((0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (1.0, 1.0)).is_none());
    }
}
