use std::{str::FromStr, time::Instant};

use clap::{App, Arg, ArgMatches};
use sonar_raytracer::{
    bathymetry::{Lookup, PlaneSurface},
    fan::Heading,
    params::{parse_config, Config},
    utils::parse_triple,
    Error,
};

pub type App2 = App<'static, 'static>;

pub fn elapsed(start: Instant) -> f64 {
    start.elapsed().as_secs_f64()
}

/// Parses an optional argument, `None` when it wasn't given.
pub fn value<T: FromStr>(matches: &ArgMatches<'_>, name: &str) -> Result<Option<T>, Error> {
    matches
        .value_of(name)
        .map(|raw| {
            raw.parse::<T>().map_err(|_| {
                Error::InvalidParameter(format!("--{}: invalid value {:?}", name, raw))
            })
        })
        .transpose()
}

pub fn value_or<T: FromStr>(matches: &ArgMatches<'_>, name: &str, default: T) -> Result<T, Error> {
    Ok(value(matches, name)?.unwrap_or(default))
}

/// Parses an optional `x,y,z` argument.
pub fn triple(matches: &ArgMatches<'_>, name: &str) -> Result<Option<[f64; 3]>, Error> {
    matches
        .value_of(name)
        .map(|raw| {
            parse_triple(raw).ok_or_else(|| {
                Error::InvalidParameter(format!("--{}: expected x,y,z, got {:?}", name, raw))
            })
        })
        .transpose()
}

pub fn config_args(app: App2) -> App2 {
    app.arg(
        Arg::with_name("config")
            .short("c")
            .long("config")
            .value_name("FILE")
            .help("Path to a config file with alternative defaults")
            .takes_value(true),
    )
}

pub fn output_args(app: App2) -> App2 {
    app.arg(
        Arg::with_name("output")
            .long("output")
            .value_name("FILE")
            .help("File name to save the output image as (default: output.png)")
            .takes_value(true),
    )
    .arg(
        Arg::with_name("width")
            .short("w")
            .long("width")
            .value_name("PIXELS")
            .help("Output image width in pixels (default: 640)")
            .takes_value(true),
    )
    .arg(
        Arg::with_name("height")
            .short("h")
            .long("height")
            .value_name("PIXELS")
            .help("Output image height in pixels (default: 480)")
            .takes_value(true),
    )
}

pub fn bathymetry_args(app: App2) -> App2 {
    app.arg(
        Arg::with_name("bathymetry")
            .short("b")
            .long("bathymetry")
            .value_name("FILE")
            .help("Path to the XYZ file with bathymetry samples")
            .takes_value(true),
    )
    .arg(
        Arg::with_name("resolution")
            .short("r")
            .long("resolution")
            .value_name("NODES")
            .help("Number of grid nodes along each axis (default: 200)")
            .takes_value(true),
    )
    .arg(
        Arg::with_name("sigma")
            .long("sigma")
            .value_name("CELLS")
            .help("Gaussian smoothing radius in grid cells, 0 to disable (default: 2)")
            .takes_value(true),
    )
    .arg(
        Arg::with_name("nearest")
            .long("nearest")
            .help("Look depths up at the nearest grid node instead of interpolating")
            .takes_value(false),
    )
    .arg(
        Arg::with_name("raw")
            .long("raw")
            .help("Use the sample coordinates as they are instead of normalizing them")
            .takes_value(false),
    )
}

pub fn fan_args(app: App2) -> App2 {
    app.arg(
        Arg::with_name("source")
            .short("s")
            .long("source")
            .value_name("X,Y,Z")
            .help("Source position (default: center of the surveyed area at z = 0)")
            .takes_value(true),
    )
    .arg(
        Arg::with_name("heading")
            .short("d")
            .long("heading")
            .value_name("DEG")
            .conflicts_with("heading-vector")
            .help("Source heading in degrees counterclockwise from the x axis (default: 0)")
            .takes_value(true),
    )
    .arg(
        Arg::with_name("heading-vector")
            .long("heading-vector")
            .value_name("X,Y,Z")
            .conflicts_with("heading")
            .help("Source heading as a vector")
            .takes_value(true),
    )
    .arg(
        Arg::with_name("spread")
            .short("a")
            .long("spread")
            .value_name("DEG")
            .help("Angular width of the fan in degrees (default: 180)")
            .takes_value(true),
    )
    .arg(
        Arg::with_name("rays")
            .short("n")
            .long("rays")
            .value_name("COUNT")
            .help("Number of rays in the fan (default: 100)")
            .takes_value(true),
    )
    .arg(
        Arg::with_name("length")
            .short("l")
            .long("length")
            .value_name("LENGTH")
            .help("Length of every ray (default: the larger side of the surveyed area)")
            .takes_value(true),
    )
    .arg(
        Arg::with_name("samples")
            .long("samples")
            .value_name("COUNT")
            .help("Points sampled along each ray (default: 1000)")
            .takes_value(true),
    )
    .arg(
        Arg::with_name("refine")
            .long("refine")
            .help("Interpolate the intersection between the two samples around the floor")
            .takes_value(false),
    )
}

/// Loads the config file if one was passed and applies the command line overrides on top.
pub fn read_config(matches: &ArgMatches<'_>) -> Result<Config, Error> {
    let mut config = if let Some(config_path) = matches.value_of("config") {
        parse_config(config_path)?
    } else {
        Default::default()
    };

    if let Some(output) = matches.value_of("output") {
        config.output.file = output.to_owned();
    }
    if let Some(output_metadata) = matches.value_of("output-meta") {
        config.output.file_metadata = Some(output_metadata.to_owned());
    }
    if let Some(width) = value(matches, "width")? {
        config.output.width = width;
    }
    if let Some(height) = value(matches, "height")? {
        config.output.height = height;
    }

    if let Some(bathymetry) = matches.value_of("bathymetry") {
        config.bathymetry.file = Some(bathymetry.to_owned());
    }
    if let Some(resolution) = value(matches, "resolution")? {
        config.bathymetry.grid.resolution = [resolution, resolution];
    }
    if let Some(sigma) = value(matches, "sigma")? {
        config.bathymetry.grid.sigma = sigma;
    }
    if matches.is_present("nearest") {
        config.bathymetry.grid.lookup = Lookup::Nearest;
    }
    if matches.is_present("raw") {
        config.bathymetry.normalize = false;
    }

    if let Some(source) = triple(matches, "source")? {
        config.fan.source = Some(source);
    }
    match (value(matches, "heading")?, triple(matches, "heading-vector")?) {
        (Some(azimuth), None) => config.fan.heading = Heading::Azimuth(azimuth),
        (None, Some(vector)) => config.fan.heading = Heading::Vector(vector),
        (Some(_), Some(_)) => {
            return Err(Error::InvalidParameter(
                "conflicting heading options chosen".to_owned(),
            ))
        }
        (None, None) => (),
    }
    if let Some(spread) = value(matches, "spread")? {
        config.fan.spread = spread;
    }
    if let Some(count) = value(matches, "rays")? {
        config.fan.count = count;
    }
    if let Some(length) = value(matches, "length")? {
        config.fan.length = Some(length);
    }
    if let Some(samples) = value(matches, "samples")? {
        config.march.samples = samples;
    }
    if matches.is_present("refine") {
        config.march.refine = true;
    }
    if let Some(level) = value(matches, "floor")? {
        config.floor = Some(match config.floor {
            Some(floor) => PlaneSurface { level, ..floor },
            None => PlaneSurface::flat(level),
        });
    }

    Ok(config)
}
