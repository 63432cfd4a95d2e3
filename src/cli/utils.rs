//! Utilities for creating the command line interface.

use crate::{
    exit_on_error, exit_on_false, exit_with_error,
    geometry::{Dim3, In3D},
    io::{Endianness, OverwriteMode, Verbosity},
    num::BFloat,
};
use clap::ArgMatches;
use std::{path::PathBuf, str::FromStr};

pub fn parse_value_string<T>(argument_name: &str, value_string: &str) -> T
where
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    exit_on_error!(
        value_string.parse(),
        "Error: Could not parse value for {0}: {1}",
        argument_name
    )
}

fn verify_argument_value_count<T>(argument_name: &str, values: &[T], required_count: usize) {
    let count = values.len();
    exit_on_false!(
        count == required_count,
        "Error: {} must have {} values, got {}",
        argument_name,
        required_count,
        count
    );
}

pub fn get_value_from_parseable_argument_with_default<T>(
    arguments: &ArgMatches,
    argument_name: &str,
    default_value: T,
) -> T
where
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Display,
{
    arguments
        .value_of(argument_name)
        .map_or(default_value, |value_string| {
            parse_value_string(argument_name, value_string)
        })
}

pub fn get_finite_float_value_from_parseable_argument_with_default<F>(
    arguments: &ArgMatches,
    argument_name: &str,
    default_value: F,
) -> F
where
    F: BFloat + FromStr,
    <F as FromStr>::Err: std::fmt::Display,
{
    let value =
        get_value_from_parseable_argument_with_default(arguments, argument_name, default_value);
    exit_on_false!(value.is_finite(), "Error: {} must be finite", argument_name);
    value
}

/// Parses the three comma-separated values of the given argument, or returns
/// `None` if the argument is absent.
pub fn parse_3d_values<T>(
    arguments: &ArgMatches,
    argument_name: &str,
    min_value: Option<T>,
) -> Option<In3D<T>>
where
    T: FromStr + PartialOrd + std::fmt::Display,
    <T as FromStr>::Err: std::fmt::Display,
{
    let value_strings: Vec<_> = arguments.values_of(argument_name)?.collect();

    verify_argument_value_count(argument_name, &value_strings, 3);

    let values = In3D::with_each_component(|dim| {
        parse_value_string(argument_name, value_strings[dim.num()])
    });

    if let Some(min_value) = min_value {
        exit_on_false!(
            Dim3::slice().iter().all(|&dim| values[dim] >= min_value),
            "Error: All values in {} must be at least {}",
            argument_name,
            min_value
        );
    }

    Some(values)
}

/// Parses the three comma-separated floats of the given argument, which must be finite.
pub fn parse_3d_float_values<F>(arguments: &ArgMatches, argument_name: &str) -> Option<In3D<F>>
where
    F: BFloat + FromStr,
    <F as FromStr>::Err: std::fmt::Display,
{
    let values: In3D<F> = parse_3d_values(arguments, argument_name, None)?;
    exit_on_false!(
        values.all(|value| value.is_finite()),
        "Error: {} must be finite",
        argument_name
    );
    Some(values)
}

pub fn get_path_from_required_argument(arguments: &ArgMatches, argument_name: &str) -> PathBuf {
    exit_on_error!(
        PathBuf::from_str(
            arguments
                .value_of(argument_name)
                .expect("No value for required argument"),
        ),
        "Error: Could not interpret path for {0}: {1}",
        argument_name
    )
}

pub fn overwrite_mode_from_arguments(arguments: &ArgMatches) -> OverwriteMode {
    if arguments.is_present("overwrite") {
        OverwriteMode::Always
    } else if arguments.is_present("no-overwrite") {
        OverwriteMode::Never
    } else {
        OverwriteMode::Ask
    }
}

pub fn parse_verbosity(arguments: &ArgMatches) -> Verbosity {
    if arguments.is_present("verbose") {
        Verbosity::Messages
    } else {
        Verbosity::Quiet
    }
}

pub fn parse_endianness(arguments: &ArgMatches) -> Endianness {
    let name = arguments
        .value_of("endianness")
        .expect("No value for argument with default");
    Endianness::from_name(name).unwrap_or_else(|| {
        exit_with_error!(
            "Error: Invalid endianness {}\n\
             Valid values are: native, little, big",
            name
        )
    })
}
