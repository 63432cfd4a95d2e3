//! Command line interface for computing power spectra of grid files.

use super::input::{self, InputGrid};
use crate::{exit_on_error, exit_with_error, io::utils as io_utils, spectrum};
use clap::{Arg, ArgMatches, Command};
use std::io::Write;

/// Builds a representation of the `spectrum` command line subcommand.
pub fn create_spectrum_subcommand() -> Command<'static> {
    let command = Command::new("spectrum")
        .about("Compute the isotropic power spectrum of a cubic vector grid")
        .arg(
            Arg::new("output-file")
                .short('o')
                .long("output-file")
                .require_equals(true)
                .value_name("OUTPUT_FILE")
                .help("Write the spectrum to this file rather than printing it")
                .takes_value(true),
        );
    input::add_grid_input_arguments(command)
}

/// Runs the actions for the `spectrum` subcommand using the given arguments.
pub fn run_spectrum_subcommand(arguments: &ArgMatches) {
    if !spectrum::fft_backend_available() {
        exit_with_error!(
            "Error: Computing power spectra requires the fft feature\n\
             Tip: Use cargo flag --features=fft"
        );
    }

    let grid = match input::read_input_grid(arguments) {
        InputGrid::Vector(grid) => grid,
        InputGrid::Scalar(_) => {
            exit_with_error!("Error: The power spectrum can only be computed for vector grids")
        }
    };

    let spectrum = exit_on_error!(
        spectrum::power_spectrum(&grid),
        "Error: Could not compute power spectrum: {}"
    );

    match arguments.value_of("output-file") {
        Some(output_file_path) => exit_on_error!(
            io_utils::write_atomically(output_file_path, |writer| {
                writeln!(writer, "# k power")?;
                for (k, power) in &spectrum {
                    writeln!(writer, "{} {}", k, power)?;
                }
                Ok(())
            }),
            "Error: Could not write spectrum file: {}"
        ),
        None => {
            println!("{:>6} {:>16}", "k", "power");
            for (k, power) in &spectrum {
                println!("{:>6} {:>16.8e}", k, power);
            }
        }
    }
}
