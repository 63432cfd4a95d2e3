//! Command line interface for converting grid files between formats.

use super::{
    input::{self, GridFileFormat, InputGrid},
    utils,
};
use crate::{
    exit_on_error,
    grid::{Grid, GridCell},
    io::{binary, text, utils as io_utils},
};
use clap::{Arg, ArgMatches, Command};
use std::path::Path;

/// Builds a representation of the `convert` command line subcommand.
pub fn create_convert_subcommand() -> Command<'static> {
    input::add_grid_input_arguments(
        Command::new("convert")
            .about("Write the grid in a file to another file, possibly in another format"),
    )
    .arg(
        Arg::new("output-file")
            .value_name("OUTPUT_FILE")
            .help(
                "Path of the grid file to produce.\n\
                 The format is determined from the file extension like for the input file",
            )
            .required(true)
            .takes_value(true),
    )
    .arg(
        Arg::new("output-format")
            .long("output-format")
            .require_equals(true)
            .value_name("FORMAT")
            .help("Format of the output file, overriding the file extension")
            .takes_value(true)
            .possible_values(&["binary", "text"]),
    )
    .arg(
        Arg::new("output-scale")
            .long("output-scale")
            .require_equals(true)
            .allow_hyphen_values(true)
            .value_name("FACTOR")
            .help("Factor to multiply the grid values with when writing")
            .takes_value(true)
            .default_value("1"),
    )
    .arg(
        Arg::new("header")
            .long("header")
            .help("Include a grid properties header in text output"),
    )
    .arg(
        Arg::new("overwrite")
            .long("overwrite")
            .help("Automatically overwrite any existing file")
            .conflicts_with("no-overwrite"),
    )
    .arg(
        Arg::new("no-overwrite")
            .long("no-overwrite")
            .help("Do not overwrite any existing file")
            .conflicts_with("overwrite"),
    )
}

/// Runs the actions for the `convert` subcommand using the given arguments.
pub fn run_convert_subcommand(arguments: &ArgMatches) {
    let output_file_path = utils::get_path_from_required_argument(arguments, "output-file");
    if !io_utils::write_allowed(
        &output_file_path,
        utils::overwrite_mode_from_arguments(arguments),
    ) {
        return;
    }

    match input::read_input_grid(arguments) {
        InputGrid::Scalar(grid) => write_grid(arguments, &grid, &output_file_path),
        InputGrid::Vector(grid) => write_grid(arguments, &grid, &output_file_path),
    }
}

fn write_grid<C: GridCell>(arguments: &ArgMatches, grid: &Grid<C>, output_file_path: &Path) {
    let format =
        GridFileFormat::from_name_or_path(arguments.value_of("output-format"), output_file_path);
    let scale = utils::get_finite_float_value_from_parseable_argument_with_default(
        arguments,
        "output-scale",
        1.0,
    );
    let endianness = utils::parse_endianness(arguments);
    let verbosity = utils::parse_verbosity(arguments);

    exit_on_error!(
        match format {
            GridFileFormat::Binary =>
                binary::dump_grid(grid, output_file_path, scale, endianness, verbosity),
            GridFileFormat::Text => text::dump_grid_to_txt(
                grid,
                output_file_path,
                scale,
                arguments.is_present("header"),
                verbosity
            ),
        },
        "Error: Could not write output file: {}"
    );
}
