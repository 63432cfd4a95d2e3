//! Reductions over all cells of a grid.
//!
//! Sums are accumulated in double precision in standard cell order, so
//! results are reproducible between runs.

use super::{Grid, Grid1f, Grid3f, GridCell};
use crate::geometry::Vec3;

impl<C: GridCell> Grid<C> {
    /// Computes the mean magnitude of the cell values.
    pub fn mean_magnitude(&self) -> f64 {
        self.mean_of(C::magnitude)
    }

    /// Computes the root mean square of the magnitudes of the cell values.
    pub fn rms_magnitude(&self) -> f64 {
        self.mean_of(C::squared_magnitude).sqrt()
    }

    fn mean_of<R>(&self, reduce: R) -> f64
    where
        R: Fn(&C) -> f64,
    {
        let sum: f64 = self.values.iter().map(reduce).sum();
        sum / self.len() as f64
    }
}

impl Grid1f {
    /// Computes the mean of the scalar cell values.
    pub fn mean_value(&self) -> f64 {
        self.mean_of(|&value| f64::from(value))
    }
}

impl Grid3f {
    /// Computes the mean of the vector cell values.
    pub fn mean_vector(&self) -> Vec3<f64> {
        let sum = self
            .values
            .iter()
            .fold(Vec3::zero(), |sum, value| sum + value.cast::<f64>());
        sum / self.len() as f64
    }

    /// Computes the root mean square of each vector component separately.
    pub fn rms_per_axis(&self) -> Vec3<f64> {
        let sum = self.values.iter().fold(Vec3::zero(), |sum, value| {
            let value = value.cast::<f64>();
            sum + value.component_mul(&value)
        });
        let mean_squares = sum / self.len() as f64;
        Vec3::with_each_component(|dim| mean_squares[dim].sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        geometry::{In3D, Point3},
        grid::GridProperties,
    };
    use approx::assert_abs_diff_eq;

    fn properties(n: usize) -> GridProperties {
        GridProperties::with_uniform_spacing(Point3::origin(), In3D::same(n), 1.0).unwrap()
    }

    #[test]
    fn scalar_statistics_are_correct() {
        let grid = Grid1f::from_values(properties(2), (1..=8).map(|i| i as f32).collect()).unwrap();
        assert_abs_diff_eq!(grid.mean_value(), 4.5);
        assert_abs_diff_eq!(grid.mean_magnitude(), 4.5);
        assert_abs_diff_eq!(grid.rms_magnitude(), f64::sqrt(204.0 / 8.0), epsilon = 1e-12);
    }

    #[test]
    fn uniform_magnitude_gives_equal_mean_and_rms() {
        let value = Vec3::new(1.0_f32, -2.0, 2.0);
        let grid = Grid3f::from_values(properties(3), vec![value; 27]).unwrap();
        assert_abs_diff_eq!(grid.mean_magnitude(), 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(grid.rms_magnitude(), 3.0, epsilon = 1e-12);
        let mean = grid.mean_vector();
        assert_abs_diff_eq!(mean[crate::geometry::Dim3::Y], -2.0, epsilon = 1e-12);
    }

    #[test]
    fn rms_per_axis_of_aligned_field_is_aligned() {
        let grid = Grid3f::from_values(properties(2), vec![Vec3::new(-1.5, 0.0, 0.0); 8]).unwrap();
        let rms = grid.rms_per_axis();
        assert_abs_diff_eq!(rms[crate::geometry::Dim3::X], 1.5);
        assert_abs_diff_eq!(rms[crate::geometry::Dim3::Y], 0.0);
        assert_abs_diff_eq!(rms[crate::geometry::Dim3::Z], 0.0);
    }
}
