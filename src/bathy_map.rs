use std::time::Instant;

use clap::{AppSettings, Arg, ArgMatches, SubCommand};
use sonar_raytracer::{
    bathymetry::{load_xyz, BathymetryGrid},
    params::Bathymetry,
    renderer::{draw_height_map, plan_viewport, save_image},
    Error,
};

use crate::cli::{self, elapsed, App2};

pub const SUBCOMMAND: &str = "bathymetry";

/// Loads the XYZ samples named in the config and grids them.
pub fn load_grid(bathymetry: &Bathymetry, start: Instant) -> Result<BathymetryGrid, Error> {
    let file = bathymetry.file.as_ref().ok_or_else(|| {
        Error::InvalidParameter("no bathymetry file given (use --bathymetry)".to_owned())
    })?;

    log::info!("{:.3}: Loading bathymetry from {}", elapsed(start), file);
    let samples = bathymetry.prepare(load_xyz(file)?);

    let [nx, ny] = bathymetry.grid.resolution;
    log::info!(
        "{:.3}: Gridding {} samples onto {}x{} nodes",
        elapsed(start),
        samples.len(),
        nx,
        ny
    );
    let grid = BathymetryGrid::build(&samples, &bathymetry.grid)?;
    log::info!(
        "{:.3}: {} of {} nodes inside the surveyed area",
        elapsed(start),
        grid.valid_cells(),
        nx * ny
    );
    Ok(grid)
}

pub fn run(matches: &ArgMatches<'_>) -> Result<(), Error> {
    let config = cli::read_config(matches)?;
    let start = Instant::now();

    let grid = load_grid(&config.bathymetry, start)?;

    if matches.is_present("print-grid") {
        for j in 0..grid.ny() {
            for i in 0..grid.nx() {
                if let Some(z) = grid.cell(i, j) {
                    println!("{}\t{}\t{}", grid.node_x(i), grid.node_y(j), z);
                }
            }
        }
    }

    log::info!("{:.3}: Outputting image...", elapsed(start));
    let viewport = plan_viewport(&grid, config.output.width, config.output.height);
    let img = draw_height_map(&grid, &viewport);
    save_image(&img, &config.output.file)?;

    Ok(())
}

pub fn subcommand_def() -> App2 {
    let app = SubCommand::with_name(SUBCOMMAND)
        .about("Grid XYZ bathymetry and draw it as a height map")
        .setting(AppSettings::AllowLeadingHyphen)
        .arg(
            Arg::with_name("print-grid")
                .long("print-grid")
                .help("Print the defined grid nodes as x, y, z lines")
                .takes_value(false),
        );
    cli::output_args(cli::bathymetry_args(cli::config_args(app)))
}
