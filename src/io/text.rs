//! Reading and writing of grids as plain text.
//!
//! A text grid file contains one line per cell in standard cell order, with
//! the components of the cell value separated by whitespace. Lines starting
//! with `#` are comments. The leading comment block may contain a header line
//! describing the grid properties:
//!
//! ```text
//! # GridProperties: Type Grid3f	origin: 0 0 0	gridsize: 4 4 4	spacing: 1 1 1	reflective: 0	clipVolume: 0	interpolation: TRILINEAR
//! ```

use super::{utils, Verbosity};
use crate::{
    error::GridError,
    geometry::{
        Dim3::{X, Y, Z},
        In3D, Point3, Vec3,
    },
    grid::{Grid, GridCell, GridProperties, InterpolationType},
};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::{
    io::{self, BufRead, Read, Write},
    path::Path,
    str::FromStr,
};

lazy_static! {
    static ref HEADER_TYPE_REGEX: Regex =
        Regex::new(r"^#\s*GridProperties:\s*Type\s+(\S+)").unwrap();
    static ref HEADER_PROPERTIES_REGEX: Regex = Regex::new(
        r"origin:\s+(\S+)\s+(\S+)\s+(\S+)\s+gridsize:\s+(\S+)\s+(\S+)\s+(\S+)\s+spacing:\s+(\S+)\s+(\S+)\s+(\S+)\s+reflective:\s+(\S+)\s+clipVolume:\s+(\S+)\s+interpolation:\s+(\S+)"
    )
    .unwrap();
}

/// Grid properties found in the header of a text grid file.
#[derive(Clone, Debug, PartialEq)]
pub struct GridHeader {
    pub type_name: String,
    pub properties: GridProperties,
}

/// Loads cell values from a text file into the given grid.
///
/// Comment lines are skipped, including any header. Values beyond those
/// needed to fill the grid are ignored.
///
/// # Parameters
///
/// - `grid`: Grid to load the values into. Its shape determines the number of values to read.
/// - `input_file_path`: Path of the text file.
/// - `scale`: Factor to multiply each loaded value by.
/// - `verbosity`: Whether to print status messages.
///
/// # Returns
///
/// A `Result` which is either:
///
/// - `Ok`: The grid values were replaced by the file contents.
/// - `Err`: Contains a `GridError::FileNotFound` if the file is missing, a
/// `GridError::TruncatedFile` if the file ends before the grid is filled, a
/// `GridError::InvalidData` if a value could not be parsed, or an I/O error.
/// The grid is left untouched.
///
/// # Type parameters
///
/// - `C`: Type of grid cell value.
/// - `P`: A type that can be treated as a reference to a `Path`.
pub fn load_grid_from_txt<C, P>(
    grid: &mut Grid<C>,
    input_file_path: P,
    scale: f64,
    verbosity: Verbosity,
) -> Result<(), GridError>
where
    C: GridCell,
    P: AsRef<Path>,
{
    let values = read_values(grid.len(), input_file_path.as_ref(), scale, verbosity)?;
    grid.set_values(values)
}

/// Creates a new grid from the properties in the header of a text file and
/// loads its values from the same file.
///
/// # Parameters
///
/// - `input_file_path`: Path of the text file.
/// - `scale`: Factor to multiply each loaded value by.
/// - `verbosity`: Whether to print status messages.
///
/// # Returns
///
/// A `Result` which is either:
///
/// - `Ok`: Contains the loaded grid.
/// - `Err`: Contains a `GridError::HeaderNotFound` if the leading comment block
/// has no grid properties, a `GridError::TypeMismatch` if the header describes
/// another grid type, a `GridError::InvalidHeader` if the header could not be
/// parsed, or any error from [`load_grid_from_txt`].
///
/// # Type parameters
///
/// - `C`: Type of grid cell value.
/// - `P`: A type that can be treated as a reference to a `Path`.
pub fn load_grid_with_header<C, P>(
    input_file_path: P,
    scale: f64,
    verbosity: Verbosity,
) -> Result<Grid<C>, GridError>
where
    C: GridCell,
    P: AsRef<Path>,
{
    let input_file_path = input_file_path.as_ref();
    let header_line =
        find_header_line(input_file_path)?.ok_or_else(|| GridError::HeaderNotFound {
            path: input_file_path.to_path_buf(),
        })?;

    let type_name = parse_header_type(&header_line, input_file_path)?;
    if type_name != C::TYPE_NAME {
        return Err(GridError::TypeMismatch {
            expected: C::TYPE_NAME,
            found: type_name,
        });
    }
    let properties = parse_header_properties(&header_line, input_file_path)?;
    if verbosity.print_messages() {
        println!("Found grid properties in header:\n{}", properties);
    }

    let values = read_values(
        properties.number_of_cells(),
        input_file_path,
        scale,
        verbosity,
    )?;
    Grid::from_values(properties, values)
}

/// Reads the grid header from the leading comment block of a text file.
///
/// # Returns
///
/// A `Result` which is either:
///
/// - `Ok`: Contains the parsed header, or `None` if the file has no header.
/// - `Err`: Contains an error encountered while reading the file or parsing the header.
pub fn read_header<P: AsRef<Path>>(input_file_path: P) -> Result<Option<GridHeader>, GridError> {
    let input_file_path = input_file_path.as_ref();
    match find_header_line(input_file_path)? {
        Some(header_line) => Ok(Some(GridHeader {
            type_name: parse_header_type(&header_line, input_file_path)?,
            properties: parse_header_properties(&header_line, input_file_path)?,
        })),
        None => Ok(None),
    }
}

/// Writes the cell values of the given grid to a text file.
///
/// # Parameters
///
/// - `grid`: Grid to write.
/// - `output_file_path`: Path of the text file to create or replace.
/// - `scale`: Factor to multiply each value by before writing.
/// - `with_header`: Whether to start the file with a grid properties header.
/// - `verbosity`: Whether to print status messages.
///
/// # Returns
///
/// A `Result` which is either:
///
/// - `Ok`: Writing was completed successfully.
/// - `Err`: Contains an error encountered while trying to write the file.
/// Any existing file at the output path is then left untouched.
///
/// # Type parameters
///
/// - `C`: Type of grid cell value.
/// - `P`: A type that can be treated as a reference to a `Path`.
pub fn dump_grid_to_txt<C, P>(
    grid: &Grid<C>,
    output_file_path: P,
    scale: f64,
    with_header: bool,
    verbosity: Verbosity,
) -> Result<(), GridError>
where
    C: GridCell,
    P: AsRef<Path>,
{
    let output_file_path = output_file_path.as_ref();
    if verbosity.print_messages() {
        println!("Writing {} to {}", C::TYPE_NAME, output_file_path.display());
    }

    let factor = scale as f32;
    utils::write_atomically(output_file_path, |writer| {
        if with_header {
            writeln!(writer, "{}", format_header::<C>(grid.properties()))?;
        }
        let mut components = vec![0.0; C::COMPONENTS];
        for value in grid.values().iter() {
            (*value * factor).write_components(&mut components);
            write_components_line(writer, &components)?;
        }
        Ok(())
    })
}

/// Formats the header line describing the given grid properties.
pub fn format_header<C: GridCell>(properties: &GridProperties) -> String {
    let origin = properties.origin();
    let shape = properties.shape();
    let spacing = properties.spacing();
    format!(
        "# GridProperties: Type {}\torigin: {} {} {}\tgridsize: {} {} {}\tspacing: {} {} {}\treflective: {}\tclipVolume: {}\tinterpolation: {}",
        C::TYPE_NAME,
        origin[X],
        origin[Y],
        origin[Z],
        shape[X],
        shape[Y],
        shape[Z],
        spacing[X],
        spacing[Y],
        spacing[Z],
        u8::from(properties.is_reflective()),
        u8::from(properties.clips_volume()),
        properties.interpolation_type()
    )
}

fn write_components_line<W: Write>(writer: &mut W, components: &[f32]) -> io::Result<()> {
    let mut components = components.iter();
    if let Some(first) = components.next() {
        write!(writer, "{}", first)?;
    }
    for component in components {
        write!(writer, " {}", component)?;
    }
    writeln!(writer)
}

fn read_values<C: GridCell>(
    number_of_cells: usize,
    input_file_path: &Path,
    scale: f64,
    verbosity: Verbosity,
) -> Result<Vec<C>, GridError> {
    if verbosity.print_messages() {
        println!("Reading {} from {}", C::TYPE_NAME, input_file_path.display());
    }
    let mut text = String::new();
    utils::open_file_and_map_err(input_file_path)?.read_to_string(&mut text)?;

    let expected_count = number_of_cells * C::COMPONENTS;
    // Every value takes at least two bytes including its separator.
    let mut buffer = Vec::with_capacity(expected_count.min(text.len() / 2 + 1));
    let mut tokens = text
        .lines()
        .filter(|line| !is_comment(line))
        .flat_map(str::split_whitespace);

    while buffer.len() < expected_count {
        let token = tokens.next().ok_or_else(|| GridError::TruncatedFile {
            path: input_file_path.to_path_buf(),
            expected: expected_count,
            found: buffer.len(),
        })?;
        let value: f32 = token.parse().map_err(|_| GridError::InvalidData {
            path: input_file_path.to_path_buf(),
            message: format!("Could not parse `{}` as a floating point value", token),
        })?;
        buffer.push(value);
    }

    let factor = scale as f32;
    Ok(buffer
        .chunks_exact(C::COMPONENTS)
        .map(|components| C::from_components(components) * factor)
        .collect())
}

fn is_comment(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

fn find_header_line(input_file_path: &Path) -> Result<Option<String>, GridError> {
    let file = utils::open_file_and_map_err(input_file_path)?;
    for line in io::BufReader::new(file).lines() {
        let line = line?;
        if !is_comment(&line) {
            break;
        }
        let line = line.trim_start();
        if HEADER_TYPE_REGEX.is_match(line) {
            return Ok(Some(line.to_string()));
        }
    }
    Ok(None)
}

fn parse_header_type(header_line: &str, input_file_path: &Path) -> Result<String, GridError> {
    HEADER_TYPE_REGEX
        .captures(header_line)
        .map(|captures| captures[1].to_string())
        .ok_or_else(|| invalid_header(input_file_path, "Missing grid type".to_string()))
}

fn parse_header_properties(
    header_line: &str,
    input_file_path: &Path,
) -> Result<GridProperties, GridError> {
    let captures = HEADER_PROPERTIES_REGEX
        .captures(header_line)
        .ok_or_else(|| {
            invalid_header(
                input_file_path,
                "Expected origin, gridsize, spacing, reflective, clipVolume and interpolation"
                    .to_string(),
            )
        })?;

    let origin = Point3::new(
        parse_capture(&captures, 1, "origin", input_file_path)?,
        parse_capture(&captures, 2, "origin", input_file_path)?,
        parse_capture(&captures, 3, "origin", input_file_path)?,
    );
    let shape = In3D::new(
        parse_capture(&captures, 4, "gridsize", input_file_path)?,
        parse_capture(&captures, 5, "gridsize", input_file_path)?,
        parse_capture(&captures, 6, "gridsize", input_file_path)?,
    );
    let spacing = Vec3::new(
        parse_capture(&captures, 7, "spacing", input_file_path)?,
        parse_capture(&captures, 8, "spacing", input_file_path)?,
        parse_capture(&captures, 9, "spacing", input_file_path)?,
    );
    let is_reflective = parse_flag(&captures[10], "reflective", input_file_path)?;
    let clip_volume = parse_flag(&captures[11], "clipVolume", input_file_path)?;
    let interpolation_type = InterpolationType::from_name_or_default(&captures[12]);

    let properties = GridProperties::new(origin, shape, spacing)
        .map_err(|err| invalid_header(input_file_path, err.to_string()))?;
    Ok(properties
        .with_reflective(is_reflective)
        .with_clip_volume(clip_volume)
        .with_interpolation_type(interpolation_type))
}

fn parse_capture<T: FromStr>(
    captures: &Captures,
    group: usize,
    entry_name: &str,
    input_file_path: &Path,
) -> Result<T, GridError> {
    captures[group].parse().map_err(|_| {
        invalid_header(
            input_file_path,
            format!("Could not parse {} value `{}`", entry_name, &captures[group]),
        )
    })
}

fn parse_flag(value: &str, entry_name: &str, input_file_path: &Path) -> Result<bool, GridError> {
    match value {
        "0" | "false" => Ok(false),
        "1" | "true" => Ok(true),
        _ => Err(invalid_header(
            input_file_path,
            format!("Could not parse {} flag `{}`", entry_name, value),
        )),
    }
}

fn invalid_header(input_file_path: &Path, message: String) -> GridError {
    GridError::InvalidHeader {
        path: input_file_path.to_path_buf(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Grid1f, Grid3f};
    use std::fs;

    #[test]
    fn header_is_formatted_with_tabs() {
        let properties = GridProperties::new(
            Point3::new(-1.5, 0.0, 2.0),
            In3D::new(4, 2, 8),
            Vec3::new(0.5, 1.0, 0.25),
        )
        .unwrap()
        .with_reflective(true)
        .with_interpolation_type(InterpolationType::Tricubic);
        assert_eq!(
            format_header::<Vec3<f32>>(&properties),
            "# GridProperties: Type Grid3f\torigin: -1.5 0 2\tgridsize: 4 2 8\tspacing: 0.5 1 0.25\treflective: 1\tclipVolume: 0\tinterpolation: TRICUBIC"
        );
    }

    #[test]
    fn header_after_other_comments_is_found() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("grid.txt");
        fs::write(
            &path,
            "# produced by hand\n\
             # GridProperties: Type Grid1f\torigin: 0 0 0\tgridsize: 1 1 2\tspacing: 1 1 1\treflective: false\tclipVolume: true\tinterpolation: NEAREST_NEIGHBOUR\n\
             1.5\n\
             # interleaved comment\n\
             -2\n",
        )
        .unwrap();
        let grid: Grid1f = load_grid_with_header(&path, 2.0, Verbosity::Quiet).unwrap();
        assert!(grid.properties().clips_volume());
        assert_eq!(
            grid.properties().interpolation_type(),
            InterpolationType::NearestNeighbour
        );
        assert_eq!(grid.values().as_slice().unwrap(), &[3.0, -4.0]);
    }

    #[test]
    fn indented_header_is_found() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("grid.txt");
        fs::write(
            &path,
            "  # GridProperties: Type Grid1f\torigin: 0 0 0\tgridsize: 2 1 1\tspacing: 1 1 1\treflective: 1\tclipVolume: 0\tinterpolation: TRICUBIC\n\
             \t# indented comment\n\
             0.5 -1\n",
        )
        .unwrap();
        let header = read_header(&path).unwrap().unwrap();
        assert_eq!(header.type_name, "Grid1f");
        assert!(header.properties.is_reflective());

        let grid: Grid1f = load_grid_with_header(&path, 1.0, Verbosity::Quiet).unwrap();
        assert_eq!(grid.values().as_slice().unwrap(), &[0.5, -1.0]);
    }

    #[test]
    fn header_below_data_is_not_found() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("grid.txt");
        let grid = Grid1f::from_values(
            GridProperties::with_uniform_spacing(Point3::origin(), In3D::same(1), 1.0).unwrap(),
            vec![1.0],
        )
        .unwrap();
        let header = format_header::<f32>(grid.properties());
        fs::write(&path, format!("1\n{}\n", header)).unwrap();
        assert!(matches!(
            load_grid_with_header::<f32, _>(&path, 1.0, Verbosity::Quiet),
            Err(GridError::HeaderNotFound { .. })
        ));
        assert_eq!(read_header(&path).unwrap(), None);
    }

    #[test]
    fn malformed_header_is_rejected() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("grid.txt");
        fs::write(
            &path,
            "# GridProperties: Type Grid3f\torigin: 0 0 0\tgridsize: 2 x 2\tspacing: 1 1 1\treflective: 0\tclipVolume: 0\tinterpolation: TRILINEAR\n",
        )
        .unwrap();
        assert!(matches!(
            load_grid_with_header::<Vec3<f32>, _>(&path, 1.0, Verbosity::Quiet),
            Err(GridError::InvalidHeader { .. })
        ));
    }

    #[test]
    fn unparseable_value_is_invalid_data() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("grid.txt");
        fs::write(&path, "1 2 3\n4 five 6\n").unwrap();
        let mut grid = Grid3f::new(
            GridProperties::with_uniform_spacing(Point3::origin(), In3D::new(2, 1, 1), 1.0)
                .unwrap(),
        );
        assert!(matches!(
            load_grid_from_txt(&mut grid, &path, 1.0, Verbosity::Quiet),
            Err(GridError::InvalidData { .. })
        ));
        assert!(grid.values().iter().all(|value| value.is_zero()));
    }
}
