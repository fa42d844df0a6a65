use std::time::Instant;

use clap::{AppSettings, Arg, ArgMatches, SubCommand};
use nalgebra::Point3;
use sonar_raytracer::{
    fan::{generate_fan, FanParams, LocalFrame},
    march::trace_fan,
    renderer::{draw_fan_side, save_image},
    Error,
};

use crate::cli::{self, elapsed, App2};

pub const SUBCOMMAND: &str = "fan";

pub fn run(matches: &ArgMatches<'_>) -> Result<(), Error> {
    let config = cli::read_config(matches)?;
    let start = Instant::now();

    let defaults = FanParams::default();
    let fan = config
        .fan
        .into_fan_params(defaults.source, defaults.length);
    let frame = LocalFrame::new(&fan.heading)?;
    let rays = generate_fan(&fan)?;

    log::info!(
        "{:.3}: Generated {} rays, heading {:?}, lateral axis {:?}",
        elapsed(start),
        rays.len(),
        frame.heading,
        frame.lateral
    );

    let traces = trace_fan(&rays, &config.march, &config.floor)?;

    for (ray, trace) in rays.iter().zip(&traces) {
        let end = ray.endpoint();
        match trace.hit {
            Some(hit) => println!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
                ray.index,
                ray.angle.to_degrees(),
                end.x,
                end.y,
                end.z,
                hit.x,
                hit.y,
                hit.z
            ),
            None => println!(
                "{}\t{}\t{}\t{}\t{}\t-\t-\t-",
                ray.index,
                ray.angle.to_degrees(),
                end.x,
                end.y,
                end.z
            ),
        }
    }

    log::info!("{:.3}: Outputting image...", elapsed(start));
    let img = draw_fan_side(
        &traces,
        &Point3::from(fan.source),
        &frame,
        config.floor.as_ref(),
        config.output.width,
        config.output.height,
    );
    save_image(&img, &config.output.file)?;

    Ok(())
}

pub fn subcommand_def() -> App2 {
    let app = SubCommand::with_name(SUBCOMMAND)
        .about(
            "Generate a ray fan, print the rays as index, angle, end point and seafloor \
            intersection and draw the fan from the side",
        )
        .setting(AppSettings::AllowLeadingHyphen)
        .arg(
            Arg::with_name("floor")
                .long("floor")
                .value_name("LEVEL")
                .help("Stop the rays at a flat seafloor at the given height")
                .takes_value(true),
        );
    cli::output_args(cli::fan_args(cli::config_args(app)))
}
