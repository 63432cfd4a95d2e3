//! The `fieldgrid` crate provides regular 3D grids of scalar and vector field
//! values, shared ownership of heavyweight objects, grid file input/output
//! and power spectrum analysis.

pub mod error;
pub mod field;
pub mod geometry;
pub mod grid;
pub mod interpolation;
pub mod io;
pub mod num;
pub mod ownership;
pub mod spectrum;

#[cfg(feature = "cli")]
pub mod cli;
