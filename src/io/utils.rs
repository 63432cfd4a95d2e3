//! Utilities for input/output.

use super::{Endianness, OverwriteMode};
use crate::error::GridError;
use byteorder::{BigEndian, ByteOrder, LittleEndian, NativeEndian, ReadBytesExt};
use std::{
    fs,
    io::{self, Write},
    path::Path,
};
use tempfile::NamedTempFile;

/// Opens the given file for reading, reporting a missing file as
/// `GridError::FileNotFound`.
pub fn open_file_and_map_err<P: AsRef<Path>>(file_path: P) -> Result<fs::File, GridError> {
    let file_path = file_path.as_ref();
    fs::File::open(file_path).map_err(|err| {
        if err.kind() == io::ErrorKind::NotFound {
            GridError::FileNotFound {
                path: file_path.to_path_buf(),
            }
        } else {
            GridError::Io(err)
        }
    })
}

/// Fills the given buffer with floats read from the given reader.
pub fn read_floats_into<R: io::Read>(
    reader: &mut R,
    buffer: &mut [f32],
    endianness: Endianness,
) -> io::Result<()> {
    match endianness {
        Endianness::Native => reader.read_f32_into::<NativeEndian>(buffer),
        Endianness::Little => reader.read_f32_into::<LittleEndian>(buffer),
        Endianness::Big => reader.read_f32_into::<BigEndian>(buffer),
    }
}

/// Writes the given floats into the given byte buffer, starting at the given byte offset.
///
/// # Panics
///
/// If the byte buffer is too small to hold the floats.
pub fn write_into_byte_buffer(
    values: &[f32],
    byte_buffer: &mut [u8],
    byte_offset: usize,
    endianness: Endianness,
) {
    let number_of_bytes = values.len() * std::mem::size_of::<f32>();
    let byte_slice = &mut byte_buffer[byte_offset..byte_offset + number_of_bytes];
    match endianness {
        Endianness::Native => NativeEndian::write_f32_into(values, byte_slice),
        Endianness::Little => LittleEndian::write_f32_into(values, byte_slice),
        Endianness::Big => BigEndian::write_f32_into(values, byte_slice),
    }
}

/// Writes a file by letting the given closure fill a temporary file in the
/// same directory, which then replaces the output file.
///
/// Any existing output file is left untouched if writing fails.
///
/// # Parameters
///
/// - `output_file_path`: Path of the file to write.
/// - `write_contents`: Closure writing the file contents to the given writer.
///
/// # Returns
///
/// A `Result` which is either:
///
/// - `Ok`: The file was written successfully.
/// - `Err`: Contains an error encountered while creating, writing or moving the file.
///
/// # Type parameters
///
/// - `P`: A type that can be treated as a reference to a `Path`.
/// - `W`: A function type taking a writer and returning an `io::Result`.
pub fn write_atomically<P, W>(output_file_path: P, write_contents: W) -> Result<(), GridError>
where
    P: AsRef<Path>,
    W: FnOnce(&mut io::BufWriter<&mut fs::File>) -> io::Result<()>,
{
    let output_file_path = output_file_path.as_ref();
    let directory = match output_file_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(directory)?;

    let mut temp_file = NamedTempFile::new_in(directory)?;
    {
        let mut writer = io::BufWriter::new(temp_file.as_file_mut());
        write_contents(&mut writer)?;
        writer.flush()?;
    }
    temp_file
        .persist(output_file_path)
        .map_err(|err| GridError::Io(err.error))?;
    Ok(())
}

/// Asks the user a yes/no question on the command line and returns the answer.
pub fn user_says_yes(question: &str, default_is_yes: bool) -> io::Result<bool> {
    let options = if default_is_yes { "[Y/n]" } else { "[y/N]" };
    loop {
        print!("{} {} ", question, options);
        io::stdout().flush()?;

        let mut answer = String::new();
        io::stdin().read_line(&mut answer)?;
        match answer.trim().to_lowercase().as_str() {
            "" => return Ok(default_is_yes),
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => println!("Invalid answer, please type y or n"),
        }
    }
}

/// Decides whether the given output file may be written, asking the user
/// if required by the overwrite mode.
pub fn write_allowed<P: AsRef<Path>>(file_path: P, overwrite_mode: OverwriteMode) -> bool {
    let file_path = file_path.as_ref();
    if !file_path.exists() {
        return true;
    }
    match overwrite_mode {
        OverwriteMode::Always => true,
        OverwriteMode::Never => {
            println!("{} already exists, skipping", file_path.display());
            false
        }
        OverwriteMode::Ask => user_says_yes(
            &format!("File {} already exists, overwrite?", file_path.display()),
            true,
        )
        .unwrap_or_else(|err| {
            eprintln!("Warning: Not overwriting due to error: {}", err);
            false
        }),
    }
}
