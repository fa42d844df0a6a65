use std::time::Instant;

use clap::{AppSettings, Arg, ArgMatches, SubCommand};
use nalgebra::Point3;
use sonar_raytracer::{
    fan::{generate_fan, LocalFrame},
    march::trace_fan,
    metadata::{output_metadata, TraceData},
    renderer::{draw_axes_plan, draw_height_map, draw_traces_plan, plan_viewport, save_image},
    Error,
};

use crate::{
    bathy_map::load_grid,
    cli::{self, elapsed, App2},
};

pub const SUBCOMMAND: &str = "trace";

pub fn run(matches: &ArgMatches<'_>) -> Result<(), Error> {
    let config = cli::read_config(matches)?;
    let start = Instant::now();

    let grid = load_grid(&config.bathymetry, start)?;

    let (min_x, max_x, min_y, max_y) = grid.extent();
    let center = [(min_x + max_x) / 2.0, (min_y + max_y) / 2.0, 0.0];
    let span = (max_x - min_x).max(max_y - min_y);
    let fan = config.fan.into_fan_params(center, span);
    let frame = LocalFrame::new(&fan.heading)?;
    let rays = generate_fan(&fan)?;

    log::info!(
        "{:.3}: Tracing {} rays of {} samples each",
        elapsed(start),
        rays.len(),
        config.march.samples
    );
    let traces = trace_fan(&rays, &config.march, &grid)?;
    let hits = traces.iter().filter(|trace| trace.hit.is_some()).count();
    log::info!(
        "{:.3}: {} of {} rays reached the seafloor",
        elapsed(start),
        hits,
        traces.len()
    );

    if matches.is_present("print-hits") {
        for trace in &traces {
            if let Some(hit) = trace.hit {
                println!(
                    "{}\t{}\t{}\t{}\t{}",
                    trace.index,
                    trace.angle.to_degrees(),
                    hit.x,
                    hit.y,
                    hit.z
                );
            }
        }
    }

    log::info!("{:.3}: Outputting image...", elapsed(start));
    let viewport = plan_viewport(&grid, config.output.width, config.output.height);
    let mut img = draw_height_map(&grid, &viewport);
    let source = Point3::from(fan.source);
    draw_traces_plan(&mut img, &viewport, &traces, &source);
    draw_axes_plan(&mut img, &viewport, &source, &frame, span * 0.1);
    save_image(&img, &config.output.file)?;

    if let Some(ref filename) = config.output.file_metadata {
        log::info!("{:.3}: Outputting metadata...", elapsed(start));
        output_metadata(
            filename,
            &TraceData {
                fan,
                march: config.march,
                traces,
            },
        )?;
    }

    Ok(())
}

pub fn subcommand_def() -> App2 {
    let app = SubCommand::with_name(SUBCOMMAND)
        .about("Trace a ray fan against gridded bathymetry")
        .setting(AppSettings::AllowLeadingHyphen)
        .arg(
            Arg::with_name("output-meta")
                .long("output-meta")
                .value_name("FILE")
                .help("File name to save the traced rays as")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("print-hits")
                .long("print-hits")
                .help("Print the seafloor intersections as index, angle, x, y, z lines")
                .takes_value(false),
        );
    cli::output_args(cli::fan_args(cli::bathymetry_args(cli::config_args(app))))
}
