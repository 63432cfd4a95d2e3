//! Interpolation of grid values at arbitrary positions.
//!
//! Grid values are located at cell centers. Neighbours beyond the grid
//! boundaries are found by wrapping the indices periodically, or by
//! mirroring them about the boundaries if the grid is reflective.

use crate::{
    geometry::{
        Dim3::{self, X, Y, Z},
        In3D, Point3,
    },
    grid::{Grid, GridCell, GridProperties, InterpolationType},
};

/// Evaluates the grid at the given position using the interpolation type
/// stored in the grid properties.
///
/// # Parameters
///
/// - `grid`: Grid to interpolate.
/// - `position`: Position where the grid should be evaluated.
///
/// # Returns
///
/// The interpolated value, or zero if the grid clips its volume and the
/// position lies outside it.
///
/// # Type parameters
///
/// - `C`: Type of grid cell value.
pub fn interpolate<C: GridCell>(grid: &Grid<C>, position: &Point3<f64>) -> C {
    let properties = grid.properties();
    if properties.clips_volume() && properties.cell_containing(position).is_none() {
        return C::default();
    }
    let coords = fractional_indices(properties, position);
    match properties.interpolation_type() {
        InterpolationType::NearestNeighbour => interp_nearest(grid, &coords),
        InterpolationType::Trilinear => interp_trilinear(grid, &coords),
        InterpolationType::Tricubic => interp_tricubic(grid, &coords),
    }
}

/// Computes the position in units of cells relative to the center of the first cell.
fn fractional_indices(properties: &GridProperties, position: &Point3<f64>) -> In3D<f64> {
    let origin = properties.origin();
    let spacing = properties.spacing();
    In3D::with_each_component(|dim| (position[dim] - origin[dim]) / spacing[dim] - 0.5)
}

/// Maps the given (possibly out of range) index into the range `0..size`.
fn wrap_index(index: isize, size: usize, is_reflective: bool) -> usize {
    let size = size as isize;
    if is_reflective {
        let wrapped = index.rem_euclid(2 * size);
        (if wrapped < size {
            wrapped
        } else {
            2 * size - 1 - wrapped
        }) as usize
    } else {
        index.rem_euclid(size) as usize
    }
}

struct Stencil<const N: usize> {
    indices: In3D<[usize; N]>,
    weights: In3D<[f64; N]>,
}

impl<const N: usize> Stencil<N> {
    fn new<W>(properties: &GridProperties, coords: &In3D<f64>, compute_weights: W) -> Self
    where
        W: Fn(f64) -> [f64; N],
    {
        let shape = properties.shape();
        let is_reflective = properties.is_reflective();
        let lowest_offset = (N as isize - 1) / 2;
        let mut indices = In3D::same([0; N]);
        let mut weights = In3D::same([0.0; N]);
        for dim in Dim3::slice() {
            let floor = coords[dim].floor();
            let start = floor as isize - lowest_offset;
            for (offset, index) in indices[dim].iter_mut().enumerate() {
                *index = wrap_index(start + offset as isize, shape[dim], is_reflective);
            }
            weights[dim] = compute_weights(coords[dim] - floor);
        }
        Self { indices, weights }
    }

    fn evaluate<C: GridCell>(&self, grid: &Grid<C>) -> C {
        let mut value = C::default();
        for (&i, &wx) in self.indices[X].iter().zip(&self.weights[X]) {
            for (&j, &wy) in self.indices[Y].iter().zip(&self.weights[Y]) {
                for (&k, &wz) in self.indices[Z].iter().zip(&self.weights[Z]) {
                    // Stencil indices are always wrapped into the grid.
                    let cell = unsafe { *grid.get_unchecked(i, j, k) };
                    value = value + cell * ((wx * wy * wz) as f32);
                }
            }
        }
        value
    }
}

fn interp_nearest<C: GridCell>(grid: &Grid<C>, coords: &In3D<f64>) -> C {
    let properties = grid.properties();
    let shape = properties.shape();
    let is_reflective = properties.is_reflective();
    let [i, j, k] = [X, Y, Z]
        .map(|dim| wrap_index((coords[dim] + 0.5).floor() as isize, shape[dim], is_reflective));
    unsafe { *grid.get_unchecked(i, j, k) }
}

fn interp_trilinear<C: GridCell>(grid: &Grid<C>, coords: &In3D<f64>) -> C {
    Stencil::new(grid.properties(), coords, |t| [1.0 - t, t]).evaluate(grid)
}

fn interp_tricubic<C: GridCell>(grid: &Grid<C>, coords: &In3D<f64>) -> C {
    Stencil::new(grid.properties(), coords, cubic_weights).evaluate(grid)
}

fn hermite_basis_00(t: f64) -> f64 {
    (1.0 + 2.0 * t) * f64::powi(1.0 - t, 2)
}

fn hermite_basis_10(t: f64) -> f64 {
    t * f64::powi(1.0 - t, 2)
}

fn hermite_basis_01(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

fn hermite_basis_11(t: f64) -> f64 {
    t * t * (t - 1.0)
}

/// Weights of the four values surrounding the interpolation coordinate in a
/// cubic Hermite spline with central finite difference tangents.
fn cubic_weights(t: f64) -> [f64; 4] {
    let h00 = hermite_basis_00(t);
    let h10 = hermite_basis_10(t);
    let h01 = hermite_basis_01(t);
    let h11 = hermite_basis_11(t);
    [
        -0.5 * h10,
        h00 - 0.5 * h11,
        h01 + 0.5 * h10,
        0.5 * h11,
    ]
}
