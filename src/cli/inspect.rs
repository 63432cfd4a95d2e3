//! Command line interface for inspecting grid files.

use super::input::{self, InputGrid};
use crate::grid::{Grid, GridCell};
use clap::{ArgMatches, Command};

/// Builds a representation of the `inspect` command line subcommand.
pub fn create_inspect_subcommand() -> Command<'static> {
    input::add_grid_input_arguments(
        Command::new("inspect").about("Print the properties and statistics of a grid file"),
    )
}

/// Runs the actions for the `inspect` subcommand using the given arguments.
pub fn run_inspect_subcommand(arguments: &ArgMatches) {
    match input::read_input_grid(arguments) {
        InputGrid::Scalar(grid) => {
            print_common_statistics(&grid);
            println!("mean value:     {}", grid.mean_value());
        }
        InputGrid::Vector(grid) => {
            print_common_statistics(&grid);
            println!("mean vector:    {}", grid.mean_vector());
            println!("rms per axis:   {}", grid.rms_per_axis());
        }
    }
}

fn print_common_statistics<C: GridCell>(grid: &Grid<C>) {
    println!("type:          {}", C::TYPE_NAME);
    println!("{}", grid.properties());
    println!("mean magnitude: {}", grid.mean_magnitude());
    println!("rms magnitude:  {}", grid.rms_magnitude());
}
