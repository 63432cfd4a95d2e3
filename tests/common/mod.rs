#![allow(dead_code)]

use fieldgrid::{
    geometry::{In3D, Point3, Vec3},
    grid::{Grid1f, Grid3f, GridProperties, InterpolationType},
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};
use tempfile::TempDir;

pub const SEED: u64 = 42;

#[macro_export]
macro_rules! def_test {
    (
        OUT[$($out_ident:ident = $out_str:expr),*]
        fn $name:ident $test_body:expr
    ) => {
        #[test]
        fn $name() {
            let test = common::Test::new();

            $( let $out_ident = test.output_path($out_str); )*

            let test_body = |$( $out_ident: &::std::path::Path, )*| $test_body;

            test_body($( &$out_ident, )*);
        }
    };
}

#[cfg(feature = "cli")]
pub fn run<I, T>(args: I)
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let arguments = fieldgrid::cli::build::build()
        .try_get_matches_from(std::iter::once(OsString::from("fieldgrid")).chain(
            args.into_iter().map(Into::into),
        ))
        .unwrap_or_else(|err| panic!("Invalid test arguments: {}", err));
    fieldgrid::cli::run::run_with_args(arguments);
}

pub fn path_str(path: &Path) -> &str {
    path.to_str().expect("Test path is not valid UTF-8")
}

/// Scratch directory for the output files of a single test, removed when dropped.
#[derive(Debug)]
pub struct Test {
    output_dir: TempDir,
}

impl Test {
    pub fn new() -> Self {
        Self {
            output_dir: tempfile::tempdir().expect("Could not create temporary directory"),
        }
    }

    pub fn output_path<S: AsRef<str>>(&self, file_name: S) -> PathBuf {
        self.output_dir.path().join(file_name.as_ref())
    }
}

pub fn test_properties(shape: In3D<usize>) -> GridProperties {
    GridProperties::new(
        Point3::new(-1.0, 0.5, 2.0),
        shape,
        Vec3::new(0.25, 0.5, 1.0),
    )
    .unwrap()
    .with_reflective(true)
    .with_interpolation_type(InterpolationType::Tricubic)
}

pub fn random_vector_grid(properties: GridProperties) -> Grid3f {
    let mut rng = StdRng::seed_from_u64(SEED);
    let values = (0..properties.number_of_cells())
        .map(|_| {
            Vec3::new(
                rng.gen_range(-1e3..1e3),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1e-3..1e-3),
            )
        })
        .collect();
    Grid3f::from_values(properties, values).unwrap()
}

pub fn random_scalar_grid(properties: GridProperties) -> Grid1f {
    let mut rng = StdRng::seed_from_u64(SEED);
    let values = (0..properties.number_of_cells())
        .map(|_| rng.gen_range(-50.0..50.0))
        .collect();
    Grid1f::from_values(properties, values).unwrap()
}

pub fn assert_vector_grids_close(a: &Grid3f, b: &Grid3f, max_relative: f32) {
    assert_eq!(a.shape(), b.shape());
    for (value_a, value_b) in a.values().iter().zip(b.values().iter()) {
        for (&component_a, &component_b) in value_a.into_iter().zip(value_b) {
            assert!(
                approx::relative_eq!(
                    component_a,
                    component_b,
                    epsilon = 1e-12,
                    max_relative = max_relative
                ),
                "{} != {}",
                value_a,
                value_b
            );
        }
    }
}

pub fn assert_scalar_grids_close(a: &Grid1f, b: &Grid1f, max_relative: f32) {
    assert_eq!(a.shape(), b.shape());
    for (&value_a, &value_b) in a.values().iter().zip(b.values().iter()) {
        assert!(
            approx::relative_eq!(
                value_a,
                value_b,
                epsilon = 1e-12,
                max_relative = max_relative
            ),
            "{} != {}",
            value_a,
            value_b
        );
    }
}
