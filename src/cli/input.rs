//! Command line arguments for reading grid files.

use super::utils;
use crate::{
    exit_on_error, exit_with_error,
    geometry::{In3D, Point3, Vec3},
    grid::{Grid, Grid1f, Grid3f, GridCell, GridProperties, InterpolationType},
    io::{binary, text, Endianness, Verbosity},
};
use clap::{Arg, ArgMatches, Command};
use std::path::Path;

/// Encoding of a grid file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridFileFormat {
    Binary,
    Text,
}

impl GridFileFormat {
    /// Determines the format from the given format name, or from the file
    /// extension if no name is given.
    pub fn from_name_or_path(name: Option<&str>, file_path: &Path) -> Self {
        if let Some(name) = name {
            return match name {
                "binary" => Self::Binary,
                "text" => Self::Text,
                invalid => exit_with_error!(
                    "Error: Invalid grid file format {}\n\
                     Valid formats are: binary, text",
                    invalid
                ),
            };
        }
        let extension = file_path
            .extension()
            .map(|extension| extension.to_string_lossy().to_lowercase());
        match extension.as_deref() {
            Some("raw" | "bin") => Self::Binary,
            Some("txt" | "dat") => Self::Text,
            _ => exit_with_error!(
                "Error: Could not determine format of {} from its extension\n\
                 Tip: Use a .raw/.bin or .txt/.dat extension, or specify --format",
                file_path.display()
            ),
        }
    }
}

/// A grid of either scalar or vector values read from the command line input.
#[derive(Clone, Debug)]
pub enum InputGrid {
    Scalar(Grid1f),
    Vector(Grid3f),
}

/// Adds the arguments describing the input grid file to the given command.
pub fn add_grid_input_arguments(command: Command<'static>) -> Command<'static> {
    command
        .arg(
            Arg::new("input-file")
                .value_name("INPUT_FILE")
                .help(
                    "Path of the grid file to read.\n\
                     The format is determined from the file extension:\
                     \n    *.raw, *.bin: Raw binary floats\
                     \n    *.txt, *.dat: Text with one cell per line",
                )
                .required(true)
                .takes_value(true),
        )
        .arg(
            Arg::new("format")
                .long("format")
                .require_equals(true)
                .value_name("FORMAT")
                .help("Format of the input file, overriding the file extension")
                .takes_value(true)
                .possible_values(&["binary", "text"]),
        )
        .arg(
            Arg::new("scalar")
                .long("scalar")
                .help("Read a grid of scalar values rather than 3D vectors"),
        )
        .arg(
            Arg::new("shape")
                .long("shape")
                .require_equals(true)
                .use_value_delimiter(true)
                .require_value_delimiter(true)
                .value_name("NX,NY,NZ")
                .help(
                    "Number of grid cells along each dimension\n\
                     (required for binary files and text files without header)",
                )
                .takes_value(true)
                .number_of_values(3),
        )
        .arg(
            Arg::new("origin")
                .long("origin")
                .require_equals(true)
                .use_value_delimiter(true)
                .require_value_delimiter(true)
                .allow_hyphen_values(true)
                .value_name("X,Y,Z")
                .help("Position of the lower grid corner [default: 0,0,0]")
                .takes_value(true)
                .number_of_values(3),
        )
        .arg(
            Arg::new("spacing")
                .long("spacing")
                .require_equals(true)
                .use_value_delimiter(true)
                .require_value_delimiter(true)
                .value_name("DX,DY,DZ")
                .help("Extent of a grid cell along each dimension [default: 1,1,1]")
                .takes_value(true)
                .number_of_values(3),
        )
        .arg(
            Arg::new("reflective")
                .long("reflective")
                .help("Mark the grid as reflective (ignored for files with header)"),
        )
        .arg(
            Arg::new("clip-volume")
                .long("clip-volume")
                .help("Mark the grid as clipping its volume (ignored for files with header)"),
        )
        .arg(
            Arg::new("interpolation")
                .long("interpolation")
                .require_equals(true)
                .value_name("TYPE")
                .help("Interpolation type of the grid (ignored for files with header)")
                .takes_value(true)
                .possible_values(&["NEAREST_NEIGHBOUR", "TRILINEAR", "TRICUBIC"])
                .default_value("TRILINEAR"),
        )
}

/// Reads the input grid specified by the given arguments.
///
/// Text files with a grid properties header are read using the header,
/// which also determines whether the grid is scalar. All other inputs are
/// described by the `shape`, `origin` and `spacing` arguments.
pub fn read_input_grid(arguments: &ArgMatches) -> InputGrid {
    let input_file_path = utils::get_path_from_required_argument(arguments, "input-file");
    let format = GridFileFormat::from_name_or_path(arguments.value_of("format"), &input_file_path);
    let scale =
        utils::get_finite_float_value_from_parseable_argument_with_default(arguments, "scale", 1.0);
    let endianness = utils::parse_endianness(arguments);
    let verbosity = utils::parse_verbosity(arguments);

    if format == GridFileFormat::Text {
        let header = exit_on_error!(
            text::read_header(&input_file_path),
            "Error: Could not read header of input file: {}"
        );
        if let Some(header) = header {
            return if header.type_name == f32::TYPE_NAME {
                InputGrid::Scalar(read_text_grid_with_header(
                    &input_file_path,
                    scale,
                    verbosity,
                ))
            } else {
                InputGrid::Vector(read_text_grid_with_header(
                    &input_file_path,
                    scale,
                    verbosity,
                ))
            };
        }
    }

    let properties = grid_properties_from_arguments(arguments);
    if arguments.is_present("scalar") {
        InputGrid::Scalar(read_grid_with_properties(
            properties,
            &input_file_path,
            format,
            scale,
            endianness,
            verbosity,
        ))
    } else {
        InputGrid::Vector(read_grid_with_properties(
            properties,
            &input_file_path,
            format,
            scale,
            endianness,
            verbosity,
        ))
    }
}

fn read_text_grid_with_header<C: GridCell>(
    input_file_path: &Path,
    scale: f64,
    verbosity: Verbosity,
) -> Grid<C> {
    exit_on_error!(
        text::load_grid_with_header(input_file_path, scale, verbosity),
        "Error: Could not read input file: {}"
    )
}

fn read_grid_with_properties<C: GridCell>(
    properties: GridProperties,
    input_file_path: &Path,
    format: GridFileFormat,
    scale: f64,
    endianness: Endianness,
    verbosity: Verbosity,
) -> Grid<C> {
    exit_on_error!(
        match format {
            GridFileFormat::Binary => binary::load_new_grid(
                properties,
                input_file_path,
                scale,
                endianness,
                verbosity
            ),
            GridFileFormat::Text => {
                let mut grid = Grid::new(properties);
                text::load_grid_from_txt(&mut grid, input_file_path, scale, verbosity)
                    .map(|_| grid)
            }
        },
        "Error: Could not read input file: {}"
    )
}

fn grid_properties_from_arguments(arguments: &ArgMatches) -> GridProperties {
    let shape = utils::parse_3d_values(arguments, "shape", Some(1)).unwrap_or_else(|| {
        exit_with_error!(
            "Error: The grid shape must be specified for input files without header\n\
             Tip: Use --shape=NX,NY,NZ"
        )
    });
    let origin =
        utils::parse_3d_float_values(arguments, "origin").unwrap_or_else(|| In3D::same(0.0));
    let spacing =
        utils::parse_3d_float_values(arguments, "spacing").unwrap_or_else(|| In3D::same(1.0));
    let interpolation_type = InterpolationType::from_name_or_default(
        arguments
            .value_of("interpolation")
            .expect("No value for argument with default"),
    );

    let properties = exit_on_error!(
        GridProperties::new(
            Point3::with_each_component(|dim| origin[dim]),
            shape,
            Vec3::with_each_component(|dim| spacing[dim]),
        ),
        "Error: {}"
    );
    properties
        .with_reflective(arguments.is_present("reflective"))
        .with_clip_volume(arguments.is_present("clip-volume"))
        .with_interpolation_type(interpolation_type)
}
