//! Function for building the command line hierarchy.

use super::{
    convert::create_convert_subcommand, inspect::create_inspect_subcommand,
    spectrum::create_spectrum_subcommand,
};
use clap::{self, Arg, Command};

/// Build the `fieldgrid` command line hierarchy.
pub fn build() -> Command<'static> {
    Command::new(clap::crate_name!())
        .version(clap::crate_version!())
        .author(clap::crate_authors!())
        .about(clap::crate_description!())
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("timing")
                .short('t')
                .long("timing")
                .help("Display elapsed time when done"),
        )
        .arg(
            Arg::new("scale")
                .long("scale")
                .require_equals(true)
                .allow_hyphen_values(true)
                .value_name("FACTOR")
                .help("Factor to multiply the grid values with when reading")
                .takes_value(true)
                .default_value("1")
                .global(true),
        )
        .arg(
            Arg::new("endianness")
                .long("endianness")
                .require_equals(true)
                .value_name("ORDER")
                .help("Byte order of binary grid files")
                .takes_value(true)
                .possible_values(&["native", "little", "big"])
                .default_value("native")
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print status messages")
                .global(true),
        )
        .subcommand(create_inspect_subcommand())
        .subcommand(create_convert_subcommand())
        .subcommand(create_spectrum_subcommand())
}
