//! Regular 3D grids of scalar or vector field values.

pub mod sampling;
pub mod statistics;

use crate::{
    error::GridError,
    geometry::{
        Dim3::{self, X, Y, Z},
        Idx3, In3D, Point3, Vec3,
    },
    interpolation,
};
use ndarray::{Array3, ArrayViewMut3};
use std::{
    fmt, mem,
    ops::{Add, Index, IndexMut, Mul},
};

/// Method used for evaluating a grid between cell centers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum InterpolationType {
    NearestNeighbour,
    #[default]
    Trilinear,
    Tricubic,
}

impl InterpolationType {
    /// Returns the name used for the interpolation type in grid file headers.
    pub fn name(self) -> &'static str {
        match self {
            Self::NearestNeighbour => "NEAREST_NEIGHBOUR",
            Self::Trilinear => "TRILINEAR",
            Self::Tricubic => "TRICUBIC",
        }
    }

    /// Parses the given interpolation type name, returning `None` if
    /// the name is not recognized.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "NEAREST_NEIGHBOUR" => Some(Self::NearestNeighbour),
            "TRILINEAR" => Some(Self::Trilinear),
            "TRICUBIC" => Some(Self::Tricubic),
            _ => None,
        }
    }

    /// Parses the given interpolation type name, falling back to
    /// trilinear interpolation for unrecognized names.
    pub fn from_name_or_default(name: &str) -> Self {
        Self::from_name(name).unwrap_or_default()
    }
}

impl fmt::Display for InterpolationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Geometric and behavioural metadata of a regular grid.
#[derive(Clone, Debug, PartialEq)]
pub struct GridProperties {
    origin: Point3<f64>,
    shape: In3D<usize>,
    spacing: Vec3<f64>,
    is_reflective: bool,
    clip_volume: bool,
    interpolation_type: InterpolationType,
}

impl GridProperties {
    /// Creates new grid properties with the given origin, number of cells
    /// along each dimension and cell spacing.
    ///
    /// The grid is non-reflective, does not clip its volume and uses
    /// trilinear interpolation.
    ///
    /// # Returns
    ///
    /// A `Result` which is either:
    ///
    /// - `Ok`: Contains the new grid properties.
    /// - `Err`: Contains a `GridError::InvalidProperties` if any extent is zero,
    /// the total number of cells is too large to allocate, or any spacing
    /// component is not a positive finite number.
    pub fn new(
        origin: Point3<f64>,
        shape: In3D<usize>,
        spacing: Vec3<f64>,
    ) -> Result<Self, GridError> {
        if !shape.all(|&size| size > 0) {
            return Err(GridError::InvalidProperties(format!(
                "Grid shape {} has zero extent",
                shape
            )));
        }
        let max_number_of_cells = isize::MAX as usize / mem::size_of::<Vec3<f32>>();
        match shape[X]
            .checked_mul(shape[Y])
            .and_then(|cells| cells.checked_mul(shape[Z]))
        {
            Some(number_of_cells) if number_of_cells <= max_number_of_cells => {}
            _ => {
                return Err(GridError::InvalidProperties(format!(
                    "Grid shape {} has too many cells",
                    shape
                )))
            }
        }
        if !(spacing.is_positive() && spacing.to_point3().is_finite()) {
            return Err(GridError::InvalidProperties(format!(
                "Grid spacing {} is not positive and finite",
                spacing
            )));
        }
        if !origin.is_finite() {
            return Err(GridError::InvalidProperties(format!(
                "Grid origin {} is not finite",
                origin
            )));
        }
        Ok(Self {
            origin,
            shape,
            spacing,
            is_reflective: false,
            clip_volume: false,
            interpolation_type: InterpolationType::default(),
        })
    }

    /// Creates new grid properties with the same spacing along all dimensions.
    pub fn with_uniform_spacing(
        origin: Point3<f64>,
        shape: In3D<usize>,
        spacing: f64,
    ) -> Result<Self, GridError> {
        Self::new(origin, shape, Vec3::equal_components(spacing))
    }

    /// Returns the properties with the reflective flag set as specified.
    pub fn with_reflective(mut self, is_reflective: bool) -> Self {
        self.is_reflective = is_reflective;
        self
    }

    /// Returns the properties with the clip volume flag set as specified.
    pub fn with_clip_volume(mut self, clip_volume: bool) -> Self {
        self.clip_volume = clip_volume;
        self
    }

    /// Returns the properties with the given interpolation type.
    pub fn with_interpolation_type(mut self, interpolation_type: InterpolationType) -> Self {
        self.interpolation_type = interpolation_type;
        self
    }

    /// Returns the position of the lower corner of the grid.
    pub fn origin(&self) -> &Point3<f64> {
        &self.origin
    }

    /// Returns the number of cells along each dimension.
    pub fn shape(&self) -> &In3D<usize> {
        &self.shape
    }

    /// Returns the extent of a cell along each dimension.
    pub fn spacing(&self) -> &Vec3<f64> {
        &self.spacing
    }

    /// Whether out-of-range indices are mirrored rather than wrapped periodically.
    pub fn is_reflective(&self) -> bool {
        self.is_reflective
    }

    /// Whether the grid evaluates to zero outside its volume.
    pub fn clips_volume(&self) -> bool {
        self.clip_volume
    }

    pub fn interpolation_type(&self) -> InterpolationType {
        self.interpolation_type
    }

    pub fn set_reflective(&mut self, is_reflective: bool) {
        self.is_reflective = is_reflective;
    }

    pub fn set_clip_volume(&mut self, clip_volume: bool) {
        self.clip_volume = clip_volume;
    }

    pub fn set_interpolation_type(&mut self, interpolation_type: InterpolationType) {
        self.interpolation_type = interpolation_type;
    }

    /// Returns the total number of cells.
    pub fn number_of_cells(&self) -> usize {
        self.shape[X] * self.shape[Y] * self.shape[Z]
    }

    /// Returns the extent of the whole grid along each dimension.
    pub fn extents(&self) -> Vec3<f64> {
        Vec3::with_each_component(|dim| self.shape[dim] as f64 * self.spacing[dim])
    }

    /// Returns the position of the upper corner of the grid.
    pub fn upper_bounds(&self) -> Point3<f64> {
        &self.origin + &self.extents()
    }

    /// Whether the three extents are equal.
    pub fn is_cubic(&self) -> bool {
        self.shape[X] == self.shape[Y] && self.shape[Y] == self.shape[Z]
    }

    /// Computes the position of the center of the cell with the given indices.
    pub fn cell_center(&self, ix: usize, iy: usize, iz: usize) -> Point3<f64> {
        let indices = In3D::new(ix, iy, iz);
        Point3::with_each_component(|dim| {
            self.origin[dim] + (indices[dim] as f64 + 0.5) * self.spacing[dim]
        })
    }

    /// Finds the indices of the cell containing the given position, or
    /// `None` if the position is outside the grid.
    pub fn cell_containing(&self, position: &Point3<f64>) -> Option<Idx3<usize>> {
        let mut indices = Idx3::origin();
        for dim in Dim3::slice() {
            let offset = (position[dim] - self.origin[dim]) / self.spacing[dim];
            if !(offset >= 0.0 && offset < self.shape[dim] as f64) {
                return None;
            }
            indices[dim] = usize::min(offset.floor() as usize, self.shape[dim] - 1);
        }
        Some(indices)
    }
}

impl fmt::Display for GridProperties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "origin:        {}", self.origin)?;
        writeln!(f, "shape:         {}", self.shape)?;
        writeln!(f, "spacing:       {}", self.spacing)?;
        writeln!(f, "reflective:    {}", self.is_reflective)?;
        writeln!(f, "clip volume:   {}", self.clip_volume)?;
        write!(f, "interpolation: {}", self.interpolation_type)
    }
}

/// Value stored in each cell of a grid.
pub trait GridCell:
    Copy
    + Default
    + PartialEq
    + fmt::Debug
    + Send
    + Sync
    + 'static
    + Add<Output = Self>
    + Mul<f32, Output = Self>
{
    /// Name identifying grids of this cell type in file headers.
    const TYPE_NAME: &'static str;

    /// Number of floating point components per cell.
    const COMPONENTS: usize;

    /// Converts a field vector into a cell value.
    fn from_field_vector(field: &Vec3<f64>) -> Self;

    /// Computes the squared magnitude of the cell value in double precision.
    fn squared_magnitude(&self) -> f64;

    /// Computes the magnitude of the cell value in double precision.
    fn magnitude(&self) -> f64 {
        self.squared_magnitude().sqrt()
    }

    /// Creates a cell value from exactly `COMPONENTS` floats.
    fn from_components(components: &[f32]) -> Self;

    /// Writes the `COMPONENTS` floats of the cell value into the given slice.
    fn write_components(&self, components: &mut [f32]);
}

impl GridCell for f32 {
    const TYPE_NAME: &'static str = "Grid1f";
    const COMPONENTS: usize = 1;

    fn from_field_vector(field: &Vec3<f64>) -> Self {
        field.length() as f32
    }

    fn squared_magnitude(&self) -> f64 {
        let value = f64::from(*self);
        value * value
    }

    fn from_components(components: &[f32]) -> Self {
        components[0]
    }

    fn write_components(&self, components: &mut [f32]) {
        components[0] = *self;
    }
}

impl GridCell for Vec3<f32> {
    const TYPE_NAME: &'static str = "Grid3f";
    const COMPONENTS: usize = 3;

    fn from_field_vector(field: &Vec3<f64>) -> Self {
        field.cast()
    }

    fn squared_magnitude(&self) -> f64 {
        self.cast::<f64>().squared_length()
    }

    fn from_components(components: &[f32]) -> Self {
        Self::new(components[0], components[1], components[2])
    }

    fn write_components(&self, components: &mut [f32]) {
        for (component, &value) in components.iter_mut().zip(self) {
            *component = value;
        }
    }
}

/// A regular 3D grid holding one value per cell.
///
/// Values are stored contiguously with the x-index varying slowest
/// and the z-index varying fastest.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<C: GridCell> {
    properties: GridProperties,
    values: Array3<C>,
}

/// Grid of scalar values.
pub type Grid1f = Grid<f32>;

/// Grid of 3D vectors.
pub type Grid3f = Grid<Vec3<f32>>;

impl<C: GridCell> Grid<C> {
    /// Creates a new grid with the given properties, filled with zeros.
    pub fn new(properties: GridProperties) -> Self {
        let values = Array3::default(properties.shape().to_tuple());
        Self { properties, values }
    }

    /// Creates a new grid with the given properties and values.
    ///
    /// # Returns
    ///
    /// A `Result` which is either:
    ///
    /// - `Ok`: Contains the new grid.
    /// - `Err`: Contains a `GridError::InvalidProperties` if the number of values
    /// does not match the number of cells.
    pub fn from_values(properties: GridProperties, values: Vec<C>) -> Result<Self, GridError> {
        let values = Self::shape_values(&properties, values)?;
        Ok(Self { properties, values })
    }

    fn shape_values(properties: &GridProperties, values: Vec<C>) -> Result<Array3<C>, GridError> {
        let number_of_values = values.len();
        Array3::from_shape_vec(properties.shape().to_tuple(), values).map_err(|_| {
            GridError::InvalidProperties(format!(
                "Got {} values for grid with {} cells",
                number_of_values,
                properties.number_of_cells()
            ))
        })
    }

    /// Returns a reference to the grid metadata.
    pub fn properties(&self) -> &GridProperties {
        &self.properties
    }

    /// Returns a mutable reference to the grid metadata.
    ///
    /// The shape of the grid can not be changed through the returned reference.
    pub fn properties_mut(&mut self) -> &mut GridProperties {
        &mut self.properties
    }

    /// Returns the number of cells along each dimension.
    pub fn shape(&self) -> &In3D<usize> {
        self.properties.shape()
    }

    /// Returns the total number of cells.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns a reference to the value of the given cell without bounds checking.
    ///
    /// # Safety
    ///
    /// Each index must be smaller than the grid extent along the corresponding dimension.
    pub unsafe fn get_unchecked(&self, ix: usize, iy: usize, iz: usize) -> &C {
        self.values.uget((ix, iy, iz))
    }

    /// Returns a mutable reference to the value of the given cell without bounds checking.
    ///
    /// # Safety
    ///
    /// Each index must be smaller than the grid extent along the corresponding dimension.
    pub unsafe fn get_unchecked_mut(&mut self, ix: usize, iy: usize, iz: usize) -> &mut C {
        self.values.uget_mut((ix, iy, iz))
    }

    /// Returns a reference to the value of the given cell, or `None` if
    /// the indices are out of bounds.
    pub fn get(&self, ix: usize, iy: usize, iz: usize) -> Option<&C> {
        if self.contains_indices(ix, iy, iz) {
            Some(unsafe { self.get_unchecked(ix, iy, iz) })
        } else {
            None
        }
    }

    /// Returns a mutable reference to the value of the given cell, or `None` if
    /// the indices are out of bounds.
    pub fn get_mut(&mut self, ix: usize, iy: usize, iz: usize) -> Option<&mut C> {
        if self.contains_indices(ix, iy, iz) {
            Some(unsafe { self.get_unchecked_mut(ix, iy, iz) })
        } else {
            None
        }
    }

    fn contains_indices(&self, ix: usize, iy: usize, iz: usize) -> bool {
        let shape = self.shape();
        ix < shape[X] && iy < shape[Y] && iz < shape[Z]
    }

    /// Returns a view of all values.
    pub fn values(&self) -> &Array3<C> {
        &self.values
    }

    /// Returns a mutable view of all values.
    pub fn values_mut(&mut self) -> ArrayViewMut3<'_, C> {
        self.values.view_mut()
    }

    /// Replaces all values of the grid with the given values, which must be
    /// in standard cell order.
    ///
    /// The grid is left untouched if the number of values is wrong.
    pub fn set_values(&mut self, values: Vec<C>) -> Result<(), GridError> {
        self.values = Self::shape_values(&self.properties, values)?;
        Ok(())
    }

    /// Computes the position of the center of the cell with the given indices.
    pub fn position_of(&self, ix: usize, iy: usize, iz: usize) -> Point3<f64> {
        self.properties.cell_center(ix, iy, iz)
    }

    /// Finds the indices of the cell containing the given position, or
    /// `None` if the position is outside the grid.
    pub fn index_of(&self, position: &Point3<f64>) -> Option<Idx3<usize>> {
        self.properties.cell_containing(position)
    }

    /// Evaluates the grid at the given position using the interpolation
    /// type of the grid.
    pub fn interpolate(&self, position: &Point3<f64>) -> C {
        interpolation::interpolate(self, position)
    }
}

impl<C: GridCell> Index<(usize, usize, usize)> for Grid<C> {
    type Output = C;
    fn index(&self, indices: (usize, usize, usize)) -> &Self::Output {
        &self.values[indices]
    }
}

impl<C: GridCell> IndexMut<(usize, usize, usize)> for Grid<C> {
    fn index_mut(&mut self, indices: (usize, usize, usize)) -> &mut Self::Output {
        &mut self.values[indices]
    }
}

impl<C: GridCell> Index<&Idx3<usize>> for Grid<C> {
    type Output = C;
    fn index(&self, indices: &Idx3<usize>) -> &Self::Output {
        &self.values[indices.to_tuple()]
    }
}
