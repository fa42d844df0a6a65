/// Linear mapping between a world rectangle and image pixels, `v` growing upwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    min_u: f64,
    max_u: f64,
    min_v: f64,
    max_v: f64,
    width: u32,
    height: u32,
}

impl Viewport {
    pub fn new(u: (f64, f64), v: (f64, f64), width: u32, height: u32) -> Self {
        let (min_u, max_u) = widen(u.0, u.1);
        let (min_v, max_v) = widen(v.0, v.1);
        Viewport {
            min_u,
            max_u,
            min_v,
            max_v,
            width: width.max(2),
            height: height.max(2),
        }
    }

    /// Smallest viewport containing all the points, padded by `margin` of its size on
    /// every side.
    pub fn fit<I>(points: I, width: u32, height: u32, margin: f64) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let (min_u, max_u, min_v, max_v) = points.into_iter().fold(
            None,
            |acc: Option<(f64, f64, f64, f64)>, (u, v)| match acc {
                None => Some((u, u, v, v)),
                Some((a, b, c, d)) => Some((a.min(u), b.max(u), c.min(v), d.max(v))),
            },
        )?;
        let pad_u = (max_u - min_u) * margin;
        let pad_v = (max_v - min_v) * margin;
        Some(Viewport::new(
            (min_u - pad_u, max_u + pad_u),
            (min_v - pad_v, max_v + pad_v),
            width,
            height,
        ))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn to_pixel(&self, u: f64, v: f64) -> (f32, f32) {
        let px = (u - self.min_u) / (self.max_u - self.min_u) * (self.width - 1) as f64;
        let py = (self.max_v - v) / (self.max_v - self.min_v) * (self.height - 1) as f64;
        (px as f32, py as f32)
    }

    pub fn to_world(&self, px: u32, py: u32) -> (f64, f64) {
        let u = self.min_u + (self.max_u - self.min_u) * px as f64 / (self.width - 1) as f64;
        let v = self.max_v - (self.max_v - self.min_v) * py as f64 / (self.height - 1) as f64;
        (u, v)
    }
}

fn widen(lo: f64, hi: f64) -> (f64, f64) {
    if hi > lo {
        (lo, hi)
    } else {
        (lo - 0.5, lo + 0.5)
    }
}
