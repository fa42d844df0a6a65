use std::time::Instant;

use clap::{AppSettings, Arg, ArgMatches, SubCommand};
use nalgebra::Point3;
use sonar_raytracer::{fan::Trajectory, march::march, Error};

use crate::{
    bathy_map::load_grid,
    cli::{self, elapsed, App2},
};

pub const SUBCOMMAND: &str = "output-trajectory";

pub fn run(matches: &ArgMatches<'_>) -> Result<(), Error> {
    let from = cli::triple(matches, "from")?.unwrap_or([0.0, 0.0, 0.0]);
    let to = cli::triple(matches, "to")?.unwrap_or([10.0, 5.0, -3.0]);
    let samples = cli::value_or(matches, "samples", 100)?;

    let trajectory = Trajectory::between(&Point3::from(from), &Point3::from(to), samples)?;

    let points = if matches.is_present("bathymetry") {
        let config = cli::read_config(matches)?;
        let start = Instant::now();
        let grid = load_grid(&config.bathymetry, start)?;
        let result = march(trajectory.points(), &grid, config.march.refine);
        match result.hit {
            Some(hit) => {
                log::info!(
                    "{:.3}: Seafloor reached at ({}, {}, {}), sample {}",
                    elapsed(start),
                    hit.point.x,
                    hit.point.y,
                    hit.point.z,
                    hit.index
                );
                let mut points = result.path.to_vec();
                if let Some(last) = points.last_mut() {
                    *last = hit.point;
                }
                points
            }
            None => {
                log::info!("{:.3}: The trajectory stays above the seafloor", elapsed(start));
                trajectory.into_points()
            }
        }
    } else {
        trajectory.into_points()
    };

    for point in points {
        println!("{}\t{}\t{}", point.x, point.y, point.z);
    }

    Ok(())
}

pub fn subcommand_def() -> App2 {
    let app = SubCommand::with_name(SUBCOMMAND)
        .about("Print the straight trajectory from a source to a target as x, y, z lines")
        .setting(AppSettings::AllowLeadingHyphen)
        .arg(
            Arg::with_name("from")
                .long("from")
                .value_name("X,Y,Z")
                .help("Source position (default: 0,0,0)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("to")
                .long("to")
                .value_name("X,Y,Z")
                .help("Target position (default: 10,5,-3)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("samples")
                .long("samples")
                .value_name("COUNT")
                .help("Number of points on the trajectory (default: 100)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("refine")
                .long("refine")
                .help("Interpolate the seafloor intersection between samples")
                .takes_value(false),
        );
    cli::bathymetry_args(cli::config_args(app))
}
