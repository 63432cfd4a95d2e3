//! Suppliers of 3D vector fields.

use crate::{
    geometry::{Point3, Vec3},
    grid::Grid3f,
    ownership::RefPtr,
};

/// Defines the properties of anything that can be evaluated as a vector
/// field at an arbitrary position.
///
/// Suppliers may be evaluated from several threads at once.
pub trait FieldSupplier: Send + Sync {
    /// Returns the field vector at the given position.
    fn field_at(&self, position: &Point3<f64>) -> Vec3<f64>;
}

impl<S> FieldSupplier for S
where
    S: Fn(&Point3<f64>) -> Vec3<f64> + Send + Sync,
{
    fn field_at(&self, position: &Point3<f64>) -> Vec3<f64> {
        self(position)
    }
}

impl FieldSupplier for Grid3f {
    fn field_at(&self, position: &Point3<f64>) -> Vec3<f64> {
        self.interpolate(position).cast()
    }
}

impl<S: FieldSupplier + ?Sized> FieldSupplier for RefPtr<S> {
    fn field_at(&self, position: &Point3<f64>) -> Vec3<f64> {
        (**self).field_at(position)
    }
}

/// A field that has the same value everywhere.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UniformField {
    value: Vec3<f64>,
}

impl UniformField {
    pub fn new(value: Vec3<f64>) -> Self {
        Self { value }
    }
}

impl FieldSupplier for UniformField {
    fn field_at(&self, _position: &Point3<f64>) -> Vec3<f64> {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{geometry::In3D, grid::GridProperties};

    #[test]
    fn grid_can_be_sampled_as_field() {
        let properties =
            GridProperties::with_uniform_spacing(Point3::origin(), In3D::same(3), 2.0).unwrap();
        let mut grid = Grid3f::new(properties);
        let supplier = UniformField::new(Vec3::new(0.25, 1.0, -4.0));
        grid.populate_from_field(&supplier);

        let shared: RefPtr<dyn FieldSupplier> = RefPtr::new(grid).map(as_supplier);
        let sampled = shared.field_at(&Point3::new(2.2, 3.9, 0.1));
        assert!((sampled - Vec3::new(0.25, 1.0, -4.0)).length() < 1e-6);
    }

    fn as_supplier(grid: &Grid3f) -> &(dyn FieldSupplier + 'static) {
        grid
    }
}
