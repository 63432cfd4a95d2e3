//! Error types and macros for reporting errors.

use std::{io, path::PathBuf};
use thiserror::Error;

/// Errors that can occur when loading, dumping or analysing grids.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("Could not find file {}", .path.display())]
    FileNotFound { path: PathBuf },

    #[error(
        "Size of file {} ({found} values) does not match size of grid ({expected} values)",
        .path.display()
    )]
    SizeMismatch {
        path: PathBuf,
        expected: usize,
        found: usize,
    },

    #[error("Tried to load {expected}, but grid properties assume grid type {found}")]
    TypeMismatch {
        expected: &'static str,
        found: String,
    },

    #[error("Could not find grid properties in header of file {}", .path.display())]
    HeaderNotFound { path: PathBuf },

    #[error("Invalid grid properties header in file {}: {message}", .path.display())]
    InvalidHeader { path: PathBuf, message: String },

    #[error(
        "File {} ended after {found} of {expected} values",
        .path.display()
    )]
    TruncatedFile {
        path: PathBuf,
        expected: usize,
        found: usize,
    },

    #[error("Invalid data in file {}: {message}", .path.display())]
    InvalidData { path: PathBuf, message: String },

    #[error("Invalid grid properties: {0}")]
    InvalidProperties(String),

    #[error("Grid must be cubic, but has shape {nx}x{ny}x{nz}")]
    NotCubic { nx: usize, ny: usize, nz: usize },

    #[error("Capability `{capability}` is not available in this build")]
    UnsupportedCapability { capability: &'static str },

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl From<GridError> for io::Error {
    fn from(err: GridError) -> Self {
        match err {
            GridError::Io(err) => err,
            GridError::FileNotFound { .. } => io::Error::new(io::ErrorKind::NotFound, err),
            GridError::UnsupportedCapability { .. } => {
                io::Error::new(io::ErrorKind::Unsupported, err)
            }
            GridError::InvalidProperties(_) | GridError::NotCubic { .. } => {
                io::Error::new(io::ErrorKind::InvalidInput, err)
            }
            GridError::TruncatedFile { .. } => io::Error::new(io::ErrorKind::UnexpectedEof, err),
            _ => io::Error::new(io::ErrorKind::InvalidData, err),
        }
    }
}

#[cfg(not(feature = "for-testing"))]
#[macro_export]
macro_rules! exit_with_error {
    ($($print_arg:tt)*) => {{
        eprintln!($($print_arg)*);
        quit::with_code(1);
    }};
}

#[cfg(feature = "for-testing")]
#[macro_export]
macro_rules! exit_with_error {
    ($($print_arg:tt)*) => {{
        panic!($($print_arg)*);
    }};
}

#[macro_export]
macro_rules! exit_on_error {
    ($result:expr, $($print_arg:tt)*) => {
        match $result {
            Ok(value) => value,
            Err(err) => {
                $crate::exit_with_error!($($print_arg)*, err)
            }
        }
    };
}

#[macro_export]
macro_rules! exit_on_false {
    ($logic:expr, $($print_arg:tt)*) => {
        if $logic {
            true
        } else {
            $crate::exit_with_error!($($print_arg)*)
        }
    };
}

#[macro_export]
macro_rules! exit_on_none {
    ($option:expr, $($print_arg:tt)*) => {
        $option.unwrap_or_else(|| $crate::exit_with_error!($($print_arg)*))
    };
}
