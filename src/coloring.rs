use image::Rgb;

const VIRIDIS: [[f64; 3]; 9] = [
    [68.0, 1.0, 84.0],
    [71.0, 44.0, 122.0],
    [59.0, 81.0, 139.0],
    [44.0, 113.0, 142.0],
    [33.0, 144.0, 141.0],
    [39.0, 173.0, 129.0],
    [92.0, 200.0, 99.0],
    [170.0, 220.0, 50.0],
    [253.0, 231.0, 37.0],
];

pub const BACKGROUND: Rgb<u8> = Rgb([28, 28, 28]);

/// Maps values linearly onto the viridis palette, `min` dark purple, `max` yellow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    min: f64,
    max: f64,
}

impl ColorScale {
    pub fn new(min: f64, max: f64) -> Self {
        ColorScale { min, max }
    }

    pub fn color_for(&self, value: f64) -> Rgb<u8> {
        let span = self.max - self.min;
        let t = if span > 0.0 {
            ((value - self.min) / span).max(0.0).min(1.0)
        } else {
            0.5
        };
        viridis(t)
    }
}

pub fn viridis(t: f64) -> Rgb<u8> {
    let pos = t.max(0.0).min(1.0) * (VIRIDIS.len() - 1) as f64;
    let idx = (pos.floor() as usize).min(VIRIDIS.len() - 2);
    let frac = pos - idx as f64;
    let (c1, c2) = (VIRIDIS[idx], VIRIDIS[idx + 1]);
    let mut rgb = [0u8; 3];
    for i in 0..3 {
        rgb[i] = (c1[i] * (1.0 - frac) + c2[i] * frac).round() as u8;
    }
    Rgb(rgb)
}
