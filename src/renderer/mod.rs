mod viewport;

use std::env;

use image::{ImageBuffer, Rgb, RgbImage};
use imageproc::drawing::{
    draw_antialiased_line_segment_mut, draw_filled_circle_mut, draw_hollow_circle_mut,
    draw_line_segment_mut,
};
use nalgebra::Point3;

use crate::{
    bathymetry::{BathymetryGrid, DepthSurface},
    coloring::{ColorScale, BACKGROUND},
    error::Result,
    fan::LocalFrame,
    march::RayTrace,
    sound_speed::{SectionParams, SoundSpeedSection},
    utils::blend,
};

pub use viewport::Viewport;

const RAY_COLOR: Rgb<u8> = Rgb([255, 255, 0]);
const RAY_ALPHA: f64 = 0.7;
const HIT_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const SOURCE_COLOR: Rgb<u8> = Rgb([255, 255, 255]);
const HEADING_COLOR: Rgb<u8> = Rgb([0, 200, 0]);
const LATERAL_COLOR: Rgb<u8> = Rgb([80, 120, 255]);
const SEAFLOOR_COLOR: Rgb<u8> = Rgb([139, 69, 19]);
const SEA_SURFACE_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
const PROFILE_COLOR: Rgb<u8> = Rgb([255, 0, 0]);

/// Top-down view of the gridded seafloor; undefined cells are left as background.
pub fn draw_height_map(grid: &BathymetryGrid, viewport: &Viewport) -> RgbImage {
    let scale = grid
        .depth_range()
        .map(|(lo, hi)| ColorScale::new(lo, hi))
        .unwrap_or_else(|| ColorScale::new(0.0, 0.0));
    ImageBuffer::from_fn(viewport.width(), viewport.height(), |px, py| {
        let (x, y) = viewport.to_world(px, py);
        grid.depth_at(x, y)
            .map(|z| scale.color_for(z))
            .unwrap_or(BACKGROUND)
    })
}

pub fn plan_viewport(grid: &BathymetryGrid, width: u32, height: u32) -> Viewport {
    let (min_x, max_x, min_y, max_y) = grid.extent();
    Viewport::new((min_x, max_x), (min_y, max_y), width, height)
}

/// Ray paths, their intersections and the source seen from above.
pub fn draw_traces_plan(
    img: &mut RgbImage,
    viewport: &Viewport,
    traces: &[RayTrace],
    source: &Point3<f64>,
) {
    for trace in traces {
        if let (Some(first), Some(last)) = (trace.path.first(), trace.path.last()) {
            let from = viewport.to_pixel(first.x, first.y);
            let to = viewport.to_pixel(last.x, last.y);
            draw_blended_segment(img, from, to, RAY_COLOR, RAY_ALPHA);
        }
    }
    for hit in traces.iter().filter_map(|trace| trace.hit) {
        let (px, py) = viewport.to_pixel(hit.x, hit.y);
        draw_filled_circle_mut(img, (px as i32, py as i32), 2, HIT_COLOR);
    }
    let (px, py) = viewport.to_pixel(source.x, source.y);
    draw_filled_circle_mut(img, (px as i32, py as i32), 4, SOURCE_COLOR);
}

/// Heading and lateral axes of the source as short segments, `length` in world units.
pub fn draw_axes_plan(
    img: &mut RgbImage,
    viewport: &Viewport,
    source: &Point3<f64>,
    frame: &LocalFrame,
    length: f64,
) {
    let origin = viewport.to_pixel(source.x, source.y);
    for (axis, color) in &[
        (frame.heading.into_inner(), HEADING_COLOR),
        (frame.lateral.into_inner(), LATERAL_COLOR),
    ] {
        let tip = source + axis * length;
        draw_line_segment_mut(img, origin, viewport.to_pixel(tip.x, tip.y), *color);
    }
}

/// Vertical view of a fan: lateral offset from the source against height.
pub fn draw_fan_side<S>(
    traces: &[RayTrace],
    source: &Point3<f64>,
    frame: &LocalFrame,
    floor: Option<&S>,
    width: u32,
    height: u32,
) -> RgbImage
where
    S: DepthSurface + ?Sized,
{
    let lateral = frame.lateral.into_inner();
    let project = |p: &Point3<f64>| ((p - source).dot(&lateral), p.z);

    let points = traces
        .iter()
        .flat_map(|trace| trace.path.iter().map(project))
        .chain(std::iter::once((0.0, source.z)));
    let viewport = match Viewport::fit(points, width, height, 0.05) {
        Some(viewport) => viewport,
        None => return ImageBuffer::from_pixel(width, height, BACKGROUND),
    };

    let mut img = ImageBuffer::from_pixel(viewport.width(), viewport.height(), BACKGROUND);

    if let Some(floor) = floor {
        fill_below_floor(&mut img, &viewport, |u| {
            let p = source + lateral * u;
            floor.depth_at(p.x, p.y)
        });
    }

    for trace in traces {
        if let (Some(first), Some(last)) = (trace.path.first(), trace.path.last()) {
            let (u0, v0) = project(first);
            let (u1, v1) = project(last);
            draw_blended_segment(
                &mut img,
                viewport.to_pixel(u0, v0),
                viewport.to_pixel(u1, v1),
                RAY_COLOR,
                RAY_ALPHA,
            );
        }
        if let Some(hit) = trace.hit {
            let (u, v) = project(&hit);
            let (px, py) = viewport.to_pixel(u, v);
            draw_filled_circle_mut(&mut img, (px as i32, py as i32), 2, HIT_COLOR);
        }
    }

    let (px, py) = viewport.to_pixel(0.0, source.z);
    draw_filled_circle_mut(&mut img, (px as i32, py as i32), 4, SOURCE_COLOR);

    img
}

fn fill_below_floor<F>(img: &mut RgbImage, viewport: &Viewport, floor_at: F)
where
    F: Fn(f64) -> Option<f64>,
{
    for px in 0..viewport.width() {
        let (u, _) = viewport.to_world(px, 0);
        let floor = match floor_at(u) {
            Some(floor) => floor,
            None => continue,
        };
        for py in 0..viewport.height() {
            let (_, v) = viewport.to_world(px, py);
            if v <= floor {
                img.put_pixel(px, py, SEAFLOOR_COLOR);
            }
        }
    }
}

/// Antialiased segment painted over the image with opacity `alpha`.
fn draw_blended_segment(
    img: &mut RgbImage,
    from: (f32, f32),
    to: (f32, f32),
    color: Rgb<u8>,
    alpha: f64,
) {
    let pixel = |p: (f32, f32)| (p.0.round() as i32, p.1.round() as i32);
    draw_antialiased_line_segment_mut(img, pixel(from), pixel(to), color, |line, below, weight| {
        blend(below, line, alpha * weight as f64)
    });
}

/// Sound speed cross-section with the sea surface, the seafloor and the platform on the
/// left, the vertical profile under the platform on the right.
pub fn draw_sound_speed_section(
    section: &SoundSpeedSection,
    params: &SectionParams,
    width: u32,
    height: u32,
) -> RgbImage {
    let width = width.max(10);
    let height = height.max(2);
    let section_width = width * 4 / 5;
    let (lo, hi) = section.range();
    let scale = ColorScale::new(lo, hi);
    let xs = section.xs();
    let depths = section.depths();
    let max_depth = depths[depths.len() - 1];
    let max_x = xs[xs.len() - 1];

    let section_view = Viewport::new((0.0, max_x), (-max_depth, 0.0), section_width, height);
    let mut img = ImageBuffer::from_pixel(width, height, BACKGROUND);

    for py in 0..height {
        for px in 0..section_width {
            let (x, v) = section_view.to_world(px, py);
            let depth = -v;
            let color = if depth >= params.seafloor_at(x) {
                SEAFLOOR_COLOR
            } else {
                let i = nearest_index(x, max_x, xs.len());
                let k = nearest_index(depth, max_depth, depths.len());
                scale.color_for(section.value(i, k))
            };
            img.put_pixel(px, py, color);
        }
    }

    for row in 0..height.min(3) {
        draw_line_segment_mut(
            &mut img,
            (0.0, row as f32),
            ((section_width - 1) as f32, row as f32),
            SEA_SURFACE_COLOR,
        );
    }

    let (px, py) = section_view.to_pixel(params.platform_x(), 0.0);
    draw_filled_circle_mut(&mut img, (px as i32, py as i32), 6, Rgb([0, 0, 0]));
    draw_hollow_circle_mut(&mut img, (px as i32, py as i32), 6, SOURCE_COLOR);

    let column = section.column(nearest_index(params.platform_x(), max_x, xs.len()));
    let (c_lo, c_hi) = column
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(a, b), &c| {
            (a.min(c), b.max(c))
        });
    let profile_view = Viewport::new(
        (c_lo, c_hi),
        (-max_depth, 0.0),
        width - section_width,
        height,
    );
    let offset = section_width as f32;
    let points = column
        .iter()
        .zip(depths)
        .map(|(&c, &z)| {
            let (px, py) = profile_view.to_pixel(c, -z);
            (px + offset, py)
        })
        .collect::<Vec<_>>();
    for pair in points.windows(2) {
        draw_line_segment_mut(&mut img, pair[0], pair[1], PROFILE_COLOR);
    }

    img
}

fn nearest_index(value: f64, max: f64, count: usize) -> usize {
    let idx = (value / max * (count - 1) as f64).round();
    (idx.max(0.0) as usize).min(count - 1)
}

pub fn save_image(img: &RgbImage, file: &str) -> Result<()> {
    let mut output_file = env::current_dir()?;
    output_file.push(file);
    img.save(&output_file)?;
    log::info!("Saved image {:?}", output_file);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bathymetry::{parse_xyz, GridParams, Lookup, PlaneSurface},
        fan::{generate_fan, FanParams, Heading},
        march::{trace_fan, MarchParams},
        sound_speed::OceanProfile,
    };

    fn small_grid() -> BathymetryGrid {
        let set = parse_xyz("0 0 -1\n10 0 -2\n0 10 -3\n10 10 -4\n").unwrap();
        let params = GridParams {
            resolution: [11, 11],
            sigma: 0.0,
            lookup: Lookup::Nearest,
        };
        BathymetryGrid::build(&set, &params).unwrap()
    }

    #[test]
    fn height_map_colors_defined_cells() {
        let grid = small_grid();
        let viewport = plan_viewport(&grid, 20, 20);
        let img = draw_height_map(&grid, &viewport);
        assert_eq!(img.dimensions(), (20, 20));
        assert!(img.pixels().all(|px| *px != BACKGROUND));
    }

    #[test]
    fn plan_view_marks_hits() {
        let grid = small_grid();
        let fan = FanParams {
            source: [5.0, 5.0, 0.0],
            heading: Heading::Azimuth(0.0),
            spread: 90.0,
            count: 5,
            length: 5.0,
        };
        let rays = generate_fan(&fan).unwrap();
        let traces = trace_fan(&rays, &MarchParams::default(), &grid).unwrap();
        assert!(traces.iter().all(|t| t.hit.is_some()));
        let viewport = plan_viewport(&grid, 50, 50);
        let mut img = draw_height_map(&grid, &viewport);
        draw_traces_plan(&mut img, &viewport, &traces, &rays[0].origin);
        assert!(img.pixels().any(|px| *px == HIT_COLOR));
        assert_eq!(*img.get_pixel(24, 24), SOURCE_COLOR);
    }

    #[test]
    fn rays_are_blended_over_the_background() {
        let mut img = ImageBuffer::from_pixel(20, 10, BACKGROUND);
        draw_blended_segment(&mut img, (-5.0, 4.0), (30.0, 4.0), RAY_COLOR, RAY_ALPHA);
        let expected = blend(BACKGROUND, RAY_COLOR, RAY_ALPHA);
        assert_ne!(expected, RAY_COLOR);
        assert!((0..20).all(|x| *img.get_pixel(x, 4) == expected));
        assert_eq!(*img.get_pixel(10, 2), BACKGROUND);
        assert_eq!(*img.get_pixel(10, 6), BACKGROUND);
    }

    #[test]
    fn side_view_draws_the_floor() {
        let fan = FanParams {
            count: 11,
            ..Default::default()
        };
        let rays = generate_fan(&fan).unwrap();
        let floor = PlaneSurface::flat(-2.0);
        let traces = trace_fan(&rays, &MarchParams::default(), &floor).unwrap();
        let frame = LocalFrame::new(&fan.heading).unwrap();
        let img = draw_fan_side(&traces, &rays[0].origin, &frame, Some(&floor), 64, 48);
        assert_eq!(img.dimensions(), (64, 48));
        assert_eq!(*img.get_pixel(0, 47), SEAFLOOR_COLOR);
    }

    #[test]
    fn section_image_has_both_panels() {
        let params = SectionParams {
            resolution: [20, 30],
            ..Default::default()
        };
        let section = SoundSpeedSection::compute(&OceanProfile::default(), &params).unwrap();
        let img = draw_sound_speed_section(&section, &params, 100, 60);
        assert_eq!(img.dimensions(), (100, 60));
        assert_eq!(*img.get_pixel(0, 59), SEAFLOOR_COLOR);
        assert!(img.pixels().any(|px| *px == PROFILE_COLOR));
    }
}
