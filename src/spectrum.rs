//! Isotropic power spectrum of vector grids.
//!
//! Computing the spectrum requires a fast Fourier transform backend, which
//! is only available when compiled with the `fft` feature.

use crate::{error::GridError, grid::Grid3f};

/// Whether this build can compute power spectra.
pub fn fft_backend_available() -> bool {
    cfg!(feature = "fft")
}

/// Computes the power spectrum of the given cubic vector grid.
///
/// The field is normalized by its root mean square magnitude and Fourier
/// transformed component by component. The power `|Bx|² + |By|² + |Bz|²` of
/// each frequency cell is binned by the radial index
/// `k = floor(sqrt(ix² + iy² + iz²))` of the unshifted frequency indices,
/// skipping `k = 0` and `k > n/2`.
///
/// # Returns
///
/// A `Result` which is either:
///
/// - `Ok`: Contains `(k, mean power)` pairs in order of increasing `k`.
/// - `Err`: Contains a `GridError::NotCubic` if the grid extents differ, or a
/// `GridError::UnsupportedCapability` if the FFT backend is not available.
pub fn power_spectrum(grid: &Grid3f) -> Result<Vec<(usize, f64)>, GridError> {
    if !fft_backend_available() {
        return Err(GridError::UnsupportedCapability { capability: "fft" });
    }
    if !grid.properties().is_cubic() {
        let (nx, ny, nz) = grid.shape().to_tuple();
        return Err(GridError::NotCubic { nx, ny, nz });
    }
    compute_power_spectrum(grid)
}

#[cfg(not(feature = "fft"))]
fn compute_power_spectrum(_grid: &Grid3f) -> Result<Vec<(usize, f64)>, GridError> {
    Err(GridError::UnsupportedCapability { capability: "fft" })
}

#[cfg(feature = "fft")]
fn compute_power_spectrum(grid: &Grid3f) -> Result<Vec<(usize, f64)>, GridError> {
    use crate::geometry::Dim3;
    use ndarray::{Array3, Axis, Zip};
    use rayon::prelude::*;
    use rustfft::{num_complex::Complex, FftPlanner};
    use std::collections::BTreeMap;

    let n = grid.shape()[Dim3::X];
    let rms = grid.rms_magnitude();
    // An all-zero field has no meaningful normalization.
    let normalization = if rms > 0.0 { rms.recip() } else { 1.0 };

    let fft = FftPlanner::<f64>::new().plan_fft_forward(n);

    let mut components: Vec<Array3<Complex<f64>>> = Dim3::slice()
        .iter()
        .map(|&dim| {
            grid.values()
                .mapv(|value| Complex::new(f64::from(value[dim]) * normalization, 0.0))
        })
        .collect();

    components.par_iter_mut().for_each(|component| {
        for axis in 0..3 {
            Zip::from(component.lanes_mut(Axis(axis))).par_for_each(|mut lane| {
                let mut buffer = lane.to_vec();
                fft.process(&mut buffer);
                for (value, transformed) in lane.iter_mut().zip(buffer) {
                    *value = transformed;
                }
            });
        }
    });

    let mut shells = BTreeMap::<usize, (f64, usize)>::new();
    for ((ix, iy, iz), _) in components[0].indexed_iter() {
        let k = ((ix * ix + iy * iy + iz * iz) as f64).sqrt().floor() as usize;
        if k == 0 || 2 * k > n {
            continue;
        }
        let power: f64 = components
            .iter()
            .map(|component| component[(ix, iy, iz)].norm_sqr())
            .sum();
        let shell = shells.entry(k).or_insert((0.0, 0));
        shell.0 += power;
        shell.1 += 1;
    }

    Ok(shells
        .into_iter()
        .map(|(k, (total_power, count))| (k, total_power / count as f64))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        geometry::{In3D, Point3, Vec3},
        grid::GridProperties,
    };

    fn cubic_properties(n: usize) -> GridProperties {
        GridProperties::with_uniform_spacing(Point3::origin(), In3D::same(n), 1.0).unwrap()
    }

    #[cfg(feature = "fft")]
    #[test]
    fn non_cubic_grid_is_rejected() {
        let properties =
            GridProperties::with_uniform_spacing(Point3::origin(), In3D::new(4, 4, 2), 1.0)
                .unwrap();
        assert!(matches!(
            power_spectrum(&Grid3f::new(properties)),
            Err(GridError::NotCubic { nx: 4, ny: 4, nz: 2 })
        ));
    }

    #[cfg(feature = "fft")]
    #[test]
    fn uniform_field_has_no_power_beyond_dc() {
        let grid = Grid3f::from_values(cubic_properties(8), vec![Vec3::new(0.3, -1.0, 2.0); 512])
            .unwrap();
        let spectrum = power_spectrum(&grid).unwrap();
        assert_eq!(
            spectrum.iter().map(|&(k, _)| k).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
        assert!(spectrum.iter().all(|&(_, power)| power.abs() < 1e-9));
    }

    #[cfg(feature = "fft")]
    #[test]
    fn single_mode_appears_in_its_shell() {
        let n = 8;
        let mut grid = Grid3f::new(cubic_properties(n));
        for ((ix, _, _), value) in grid.values_mut().indexed_iter_mut() {
            let phase = 2.0 * std::f64::consts::PI * 2.0 * ix as f64 / n as f64;
            *value = Vec3::new(0.0, phase.cos() as f32, 0.0);
        }
        let spectrum = power_spectrum(&grid).unwrap();
        let (peak_k, _) = spectrum
            .iter()
            .copied()
            .fold((0, f64::MIN), |max, entry| if entry.1 > max.1 { entry } else { max });
        assert_eq!(peak_k, 2);
    }

    #[cfg(not(feature = "fft"))]
    #[test]
    fn spectrum_is_unsupported_without_fft() {
        assert!(!fft_backend_available());
        assert!(matches!(
            power_spectrum(&Grid3f::new(cubic_properties(2))),
            Err(GridError::UnsupportedCapability { .. })
        ));
        let non_cubic =
            GridProperties::with_uniform_spacing(Point3::origin(), In3D::new(4, 4, 2), 1.0)
                .unwrap();
        assert!(matches!(
            power_spectrum(&Grid3f::new(non_cubic)),
            Err(GridError::UnsupportedCapability { .. })
        ));
    }
}
