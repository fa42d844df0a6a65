use clap::{Arg, ArgMatches, SubCommand};
use sonar_raytracer::{metadata::read_metadata, Error};

use crate::cli::App2;

pub const SUBCOMMAND: &str = "inspect";

pub fn run(matches: &ArgMatches<'_>) -> Result<(), Error> {
    let filename = matches
        .value_of("input")
        .ok_or_else(|| Error::InvalidParameter("please provide an input file".to_owned()))?;

    let data = read_metadata(filename)?;

    log::info!(
        "{} rays, spread {} deg, length {}, {} samples per ray, {} reached the seafloor",
        data.traces.len(),
        data.fan.spread,
        data.fan.length,
        data.march.samples,
        data.hits().count()
    );

    for trace in data.hits() {
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

    Ok(())
}

pub fn subcommand_def() -> App2 {
    SubCommand::with_name(SUBCOMMAND)
        .about("Print the seafloor intersections stored in a metadata file")
        .arg(
            Arg::with_name("input")
                .help("Path to the metadata file written with --output-meta")
                .required(true)
                .index(1),
        )
}
