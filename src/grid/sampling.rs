//! Bulk modification of grid values.

use super::{Grid, GridCell};
use crate::field::FieldSupplier;
use ndarray::Zip;

impl<C: GridCell> Grid<C> {
    /// Multiplies every cell value by the given factor.
    pub fn scale(&mut self, factor: f64) {
        let factor = factor as f32;
        self.values.par_mapv_inplace(|value| value * factor);
    }

    /// Sets every cell value to the field evaluated at the cell center.
    ///
    /// Scalar grids store the magnitude of the field. Cells are evaluated in
    /// parallel, so the supplier must be safe to call from multiple threads.
    ///
    /// # Type parameters
    ///
    /// - `S`: Type of field supplier.
    pub fn populate_from_field<S>(&mut self, supplier: &S)
    where
        S: FieldSupplier + ?Sized,
    {
        let properties = &self.properties;
        Zip::indexed(&mut self.values).par_for_each(|(ix, iy, iz), value| {
            let position = properties.cell_center(ix, iy, iz);
            *value = C::from_field_vector(&supplier.field_at(&position));
        });
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        geometry::{Dim3::X, In3D, Point3, Vec3},
        grid::{Grid1f, Grid3f, GridProperties},
    };

    fn properties() -> GridProperties {
        GridProperties::new(
            Point3::new(1.0, 0.0, 0.0),
            In3D::new(4, 3, 2),
            Vec3::new(0.5, 1.0, 1.0),
        )
        .unwrap()
    }

    #[test]
    fn scaling_is_applied_to_every_cell() {
        let mut grid =
            Grid3f::from_values(properties(), vec![Vec3::new(1.0, -2.0, 0.5); 24]).unwrap();
        grid.scale(4.0);
        assert!(grid
            .values()
            .iter()
            .all(|&value| value == Vec3::new(4.0, -8.0, 2.0)));
    }

    #[test]
    fn population_samples_cell_centers() {
        let mut grid = Grid3f::new(properties());
        grid.populate_from_field(&|position: &Point3<f64>| position.to_vec3());
        for ((ix, iy, iz), value) in grid.values().indexed_iter() {
            assert_eq!(value.cast::<f64>(), grid.position_of(ix, iy, iz).to_vec3());
        }
        assert_eq!(grid[(3, 0, 0)][X], 2.75);
    }

    #[test]
    fn scalar_population_stores_magnitude() {
        let mut grid = Grid1f::new(properties());
        grid.populate_from_field(&|_: &Point3<f64>| Vec3::new(0.0, 3.0, -4.0));
        assert!(grid.values().iter().all(|&value| value == 5.0));
    }
}
