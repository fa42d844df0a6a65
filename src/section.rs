use std::time::Instant;

use clap::{AppSettings, Arg, ArgMatches, SubCommand};
use sonar_raytracer::{
    renderer::{draw_sound_speed_section, save_image},
    sound_speed::SoundSpeedSection,
    Error,
};

use crate::cli::{self, elapsed, App2};

pub const SUBCOMMAND: &str = "sound-speed-section";

pub fn run(matches: &ArgMatches<'_>) -> Result<(), Error> {
    let config = cli::read_config(matches)?;
    let start = Instant::now();

    let mut params = config.section;
    if let Some(platform) = cli::value(matches, "platform")? {
        params.platform = platform;
    }
    if let Some(lateral) = cli::value(matches, "lateral")? {
        params.lateral_position = Some(lateral);
    }
    if let Some(depth) = cli::value(matches, "seafloor")? {
        params.seafloor_depth = depth;
    }

    let [nx, nz] = params.resolution;
    log::info!(
        "{:.3}: Evaluating sound speed on {}x{} points",
        elapsed(start),
        nx,
        nz
    );
    let section = SoundSpeedSection::compute(&config.ocean, &params)?;
    let (lo, hi) = section.range();
    log::info!(
        "{:.3}: Sound speed between {:.2} and {:.2} m/s",
        elapsed(start),
        lo,
        hi
    );

    log::info!("{:.3}: Outputting image...", elapsed(start));
    let img = draw_sound_speed_section(
        &section,
        &params,
        config.output.width,
        config.output.height,
    );
    save_image(&img, &config.output.file)?;

    Ok(())
}

pub fn subcommand_def() -> App2 {
    let app = SubCommand::with_name(SUBCOMMAND)
        .about("Draw a vertical sound speed cross-section with the profile under the platform")
        .setting(AppSettings::AllowLeadingHyphen)
        .arg(
            Arg::with_name("platform")
                .short("p")
                .long("platform")
                .value_name("FRACTION")
                .help("Platform position as a fraction of the section width (default: 0.5)")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("lateral")
                .long("lateral")
                .value_name("FRACTION")
                .help("Cut through the horizontally varying field at this lateral position")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("seafloor")
                .long("seafloor")
                .value_name("DEPTH")
                .help("Seafloor depth at the left edge of the section, in meters (default: 4000)")
                .takes_value(true),
        );
    cli::output_args(cli::config_args(app))
}
