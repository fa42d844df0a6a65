use clap::{AppSettings, Arg, ArgMatches, SubCommand};
use sonar_raytracer::Error;

use crate::cli::{self, App2};

pub const SUBCOMMAND: &str = "output-sound-speed";

pub fn run(matches: &ArgMatches<'_>) -> Result<(), Error> {
    let config = cli::read_config(matches)?;

    let min_depth = cli::value_or(matches, "min_depth", 0.0)?;
    let max_depth = cli::value_or(matches, "max_depth", 1500.0)?;
    let step = cli::value_or(matches, "step", 10.0)?;

    let mut ocean = config.ocean;
    if let Some(depth) = cli::value(matches, "mixed_layer")? {
        ocean.mixed_layer_depth = depth;
    }
    if let Some(depth) = cli::value(matches, "deep_layer")? {
        ocean.deep_layer_depth = depth;
    }
    ocean.validate()?;

    for sample in ocean.table(min_depth, max_depth, step)? {
        println!(
            "{}\t{:.3}\t{:.3}\t{:.3}",
            sample.depth, sample.temperature, sample.salinity, sample.sound_speed
        );
    }

    Ok(())
}

pub fn subcommand_def() -> App2 {
    let app = SubCommand::with_name(SUBCOMMAND)
        .about("Print depth, temperature, salinity and sound speed down the water column")
        .setting(AppSettings::AllowLeadingHyphen)
        .arg(
            Arg::with_name("min_depth")
                .short("a")
                .long("min-depth")
                .value_name("DEPTH")
                .help(
                    "Upper boundary of the range of depths for which the data should be \
                    output, in meters (default: 0)",
                )
                .takes_value(true),
        )
        .arg(
            Arg::with_name("max_depth")
                .short("b")
                .long("max-depth")
                .value_name("DEPTH")
                .help(
                    "Lower boundary of the range of depths for which the data should be \
                    output, in meters (default: 1500)",
                )
                .takes_value(true),
        )
        .arg(
            Arg::with_name("step")
                .short("s")
                .long("step")
                .value_name("LENGTH")
                .help(
                    "The depth difference between two subsequent data points, in meters \
                    (default: 10)",
                )
                .takes_value(true),
        )
        .arg(
            Arg::with_name("mixed_layer")
                .long("mixed-layer")
                .value_name("DEPTH")
                .help("Bottom of the surface mixed layer, in meters (default: 100)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("deep_layer")
                .long("deep-layer")
                .value_name("DEPTH")
                .help("Top of the deep isothermal layer, in meters (default: 1000)")
                .takes_value(true),
        );
    cli::config_args(app)
}
