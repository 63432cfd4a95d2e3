//! Function for running the command line program.

use super::{
    build, convert::run_convert_subcommand, inspect::run_inspect_subcommand,
    spectrum::run_spectrum_subcommand,
};
use clap::ArgMatches;
use std::time::Instant;

/// Runs the `fieldgrid` command line program.
pub fn run() {
    let command = build::build();
    run_with_args(command.get_matches());
}

/// Runs the `fieldgrid` command line program with the given parsed arguments.
pub fn run_with_args(arguments: ArgMatches) {
    let start_instant = Instant::now();

    if let Some(inspect_arguments) = arguments.subcommand_matches("inspect") {
        run_inspect_subcommand(inspect_arguments);
    }
    if let Some(convert_arguments) = arguments.subcommand_matches("convert") {
        run_convert_subcommand(convert_arguments);
    }
    if let Some(spectrum_arguments) = arguments.subcommand_matches("spectrum") {
        run_spectrum_subcommand(spectrum_arguments);
    }

    if arguments.is_present("timing") {
        println!("Elapsed time: {} s", start_instant.elapsed().as_secs_f64());
    }
}
