mod bathy_map;
mod cli;
mod fan_view;
mod inspect;
mod profile_printer;
mod section;
mod tracer;
mod trajectory_printer;

use std::process;

use clap::{App, AppSettings};
use env_logger::Env;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let matches = App::new("Underwater Acoustic Raytracer")
        .version(env!("CARGO_PKG_VERSION"))
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .subcommand(tracer::subcommand_def())
        .subcommand(bathy_map::subcommand_def())
        .subcommand(fan_view::subcommand_def())
        .subcommand(profile_printer::subcommand_def())
        .subcommand(section::subcommand_def())
        .subcommand(trajectory_printer::subcommand_def())
        .subcommand(inspect::subcommand_def())
        .get_matches();

    let result = match matches.subcommand() {
        (tracer::SUBCOMMAND, Some(sub)) => tracer::run(sub),
        (bathy_map::SUBCOMMAND, Some(sub)) => bathy_map::run(sub),
        (fan_view::SUBCOMMAND, Some(sub)) => fan_view::run(sub),
        (profile_printer::SUBCOMMAND, Some(sub)) => profile_printer::run(sub),
        (section::SUBCOMMAND, Some(sub)) => section::run(sub),
        (trajectory_printer::SUBCOMMAND, Some(sub)) => trajectory_printer::run(sub),
        (inspect::SUBCOMMAND, Some(sub)) => inspect::run(sub),
        _ => unreachable!("clap requires a subcommand"),
    };

    if let Err(err) = result {
        log::error!("{}", err);
        process::exit(1);
    }
}
