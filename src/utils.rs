use image::Rgb;
use nalgebra::Vector3;

#[allow(clippy::many_single_char_names)]
pub fn rgb_to_vec3(rgb: Rgb<u8>) -> Vector3<f64> {
    let r = rgb.0[0] as f64 / 255.0;
    let g = rgb.0[1] as f64 / 255.0;
    let b = rgb.0[2] as f64 / 255.0;
    Vector3::new(r, g, b)
}

#[allow(clippy::many_single_char_names)]
pub fn vec3_to_rgb(v: Vector3<f64>) -> Rgb<u8> {
    let r = (v[0].max(0.0).min(1.0) * 255.0).round() as u8;
    let g = (v[1].max(0.0).min(1.0) * 255.0).round() as u8;
    let b = (v[2].max(0.0).min(1.0) * 255.0).round() as u8;
    Rgb([r, g, b])
}

/// `top` painted over `bottom` with opacity `alpha`.
pub fn blend(bottom: Rgb<u8>, top: Rgb<u8>, alpha: f64) -> Rgb<u8> {
    let result = rgb_to_vec3(bottom) * (1.0 - alpha) + rgb_to_vec3(top) * alpha;
    vec3_to_rgb(result)
}

/// Parses `"x,y,z"`.
pub fn parse_triple(s: &str) -> Option<[f64; 3]> {
    let values = s
        .split(',')
        .map(|part| part.trim().parse::<f64>().ok())
        .collect::<Option<Vec<_>>>()?;
    match values[..] {
        [x, y, z] => Some([x, y, z]),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blending_endpoints() {
        let black = Rgb([0, 0, 0]);
        let white = Rgb([255, 255, 255]);
        assert_eq!(blend(black, white, 0.0), black);
        assert_eq!(blend(black, white, 1.0), white);
        assert_eq!(blend(black, white, 0.5), Rgb([128, 128, 128]));
    }

    #[test]
    fn triples() {
        assert_eq!(parse_triple("0.5, 0.5,-1"), Some([0.5, 0.5, -1.0]));
        assert_eq!(parse_triple("1,2"), None);
        assert_eq!(parse_triple("1,x,2"), None);
    }
}
