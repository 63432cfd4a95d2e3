//! Reading and writing of grids as raw binary floats.
//!
//! A binary grid file contains no header, only the cell values as 32-bit
//! floats in standard cell order, with all components of a cell stored
//! consecutively.

use super::{utils, Endianness, Verbosity};
use crate::{
    error::GridError,
    grid::{Grid, GridCell, GridProperties},
};
use std::{io::Write, mem, path::Path};

/// Loads cell values from a binary file into the given grid.
///
/// # Parameters
///
/// - `grid`: Grid to load the values into. Its shape determines the expected file size.
/// - `input_file_path`: Path of the binary file.
/// - `scale`: Factor to multiply each loaded value by.
/// - `endianness`: Byte order of the floats in the file.
/// - `verbosity`: Whether to print status messages.
///
/// # Returns
///
/// A `Result` which is either:
///
/// - `Ok`: The grid values were replaced by the file contents.
/// - `Err`: Contains a `GridError::FileNotFound` if the file is missing, a
/// `GridError::SizeMismatch` if the file does not contain exactly one value
/// per cell component, or an I/O error. The grid is left untouched.
///
/// # Type parameters
///
/// - `C`: Type of grid cell value.
/// - `P`: A type that can be treated as a reference to a `Path`.
pub fn load_grid<C, P>(
    grid: &mut Grid<C>,
    input_file_path: P,
    scale: f64,
    endianness: Endianness,
    verbosity: Verbosity,
) -> Result<(), GridError>
where
    C: GridCell,
    P: AsRef<Path>,
{
    let values = read_values(
        grid.len(),
        input_file_path.as_ref(),
        scale,
        endianness,
        verbosity,
    )?;
    grid.set_values(values)
}

/// Creates a new grid with the given properties and loads its values from a binary file.
///
/// The file size is checked before the grid is allocated. See [`load_grid`] for details.
pub fn load_new_grid<C, P>(
    properties: GridProperties,
    input_file_path: P,
    scale: f64,
    endianness: Endianness,
    verbosity: Verbosity,
) -> Result<Grid<C>, GridError>
where
    C: GridCell,
    P: AsRef<Path>,
{
    let values = read_values(
        properties.number_of_cells(),
        input_file_path.as_ref(),
        scale,
        endianness,
        verbosity,
    )?;
    Grid::from_values(properties, values)
}

fn read_values<C: GridCell>(
    number_of_cells: usize,
    input_file_path: &Path,
    scale: f64,
    endianness: Endianness,
    verbosity: Verbosity,
) -> Result<Vec<C>, GridError> {
    if verbosity.print_messages() {
        println!("Reading {} from {}", C::TYPE_NAME, input_file_path.display());
    }
    let mut file = utils::open_file_and_map_err(input_file_path)?;

    let float_size = mem::size_of::<f32>() as u64;
    let expected_count = number_of_cells * C::COMPONENTS;
    let file_size = file.metadata()?.len();
    if file_size != expected_count as u64 * float_size {
        return Err(GridError::SizeMismatch {
            path: input_file_path.to_path_buf(),
            expected: expected_count,
            found: (file_size / float_size) as usize,
        });
    }

    let mut buffer = vec![0.0; expected_count];
    utils::read_floats_into(&mut file, &mut buffer, endianness)?;

    let factor = scale as f32;
    Ok(buffer
        .chunks_exact(C::COMPONENTS)
        .map(|components| C::from_components(components) * factor)
        .collect())
}

/// Writes the cell values of the given grid to a binary file.
///
/// # Parameters
///
/// - `grid`: Grid to write.
/// - `output_file_path`: Path of the binary file to create or replace.
/// - `scale`: Factor to multiply each value by before writing.
/// - `endianness`: Byte order to use for the floats.
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
pub fn dump_grid<C, P>(
    grid: &Grid<C>,
    output_file_path: P,
    scale: f64,
    endianness: Endianness,
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
    let mut floats = vec![0.0; grid.len() * C::COMPONENTS];
    for (components, value) in floats
        .chunks_exact_mut(C::COMPONENTS)
        .zip(grid.values().iter())
    {
        (*value * factor).write_components(components);
    }

    let mut byte_buffer = vec![0_u8; floats.len() * mem::size_of::<f32>()];
    utils::write_into_byte_buffer(&floats, &mut byte_buffer, 0, endianness);

    utils::write_atomically(output_file_path, |writer| writer.write_all(&byte_buffer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        geometry::{In3D, Point3, Vec3},
        grid::{Grid1f, Grid3f},
    };
    use std::fs;

    fn properties() -> GridProperties {
        GridProperties::with_uniform_spacing(Point3::origin(), In3D::new(2, 3, 1), 1.0).unwrap()
    }

    #[test]
    fn binary_layout_is_component_interleaved() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("grid.raw");
        let values = (0..6)
            .map(|i| Vec3::new(i as f32, 10.0 + i as f32, 20.0 + i as f32))
            .collect();
        let grid = Grid3f::from_values(properties(), values).unwrap();
        dump_grid(&grid, &path, 1.0, Endianness::Little, Verbosity::Quiet).unwrap();

        let bytes = fs::read(&path).unwrap();
        assert_eq!(bytes.len(), 6 * 3 * 4);
        let third_float = f32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
        let fourth_float = f32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]);
        assert_eq!(third_float, 20.0);
        assert_eq!(fourth_float, 1.0);
    }

    #[test]
    fn wrong_file_size_leaves_grid_untouched() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("grid.raw");
        fs::write(&path, vec![0_u8; 5 * 4]).unwrap();

        let mut grid = Grid1f::from_values(properties(), vec![7.0; 6]).unwrap();
        let result = load_grid(&mut grid, &path, 1.0, Endianness::Native, Verbosity::Quiet);
        assert!(matches!(
            result,
            Err(GridError::SizeMismatch {
                expected: 6,
                found: 5,
                ..
            })
        ));
        assert!(grid.values().iter().all(|&value| value == 7.0));
    }
}
