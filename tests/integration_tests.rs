#![cfg(feature = "cli")]

mod common;

use common::{path_str, run};
use fieldgrid::{
    geometry::{Dim3, In3D, Point3, Vec3},
    grid::{Grid1f, Grid3f, GridProperties, InterpolationType},
    io::{binary, text, Endianness, Verbosity},
};
use std::{f64::consts::PI, fs};

fn unit_properties(shape: In3D<usize>) -> GridProperties {
    GridProperties::with_uniform_spacing(Point3::origin(), shape, 1.0).unwrap()
}

def_test!(
OUT[input = "field.raw", output = "field.txt"]
fn binary_file_can_be_converted_to_text_with_header {
    let grid = common::random_vector_grid(unit_properties(In3D::new(3, 2, 4)));
    binary::dump_grid(&grid, input, 1.0, Endianness::Little, Verbosity::Quiet).unwrap();

    run([
        "--endianness=little",
        "convert",
        path_str(input),
        path_str(output),
        "--shape=3,2,4",
        "--interpolation=TRICUBIC",
        "--reflective",
        "--header",
        "--overwrite",
    ]);

    let converted: Grid3f = text::load_grid_with_header(output, 1.0, Verbosity::Quiet).unwrap();
    assert_eq!(
        converted.properties(),
        &grid
            .properties()
            .clone()
            .with_interpolation_type(InterpolationType::Tricubic)
            .with_reflective(true)
    );
    common::assert_vector_grids_close(&grid, &converted, 1e-6);
});

def_test!(
OUT[input = "field.txt", output = "field.bin"]
fn text_file_with_header_can_be_converted_to_scaled_binary {
    let grid = common::random_scalar_grid(common::test_properties(In3D::new(2, 2, 5)));
    text::dump_grid_to_txt(&grid, input, 1.0, true, Verbosity::Quiet).unwrap();

    run([
        "convert",
        path_str(input),
        path_str(output),
        "--output-scale=-2",
        "--overwrite",
    ]);

    let converted: Grid1f = binary::load_new_grid(
        grid.properties().clone(),
        output,
        -0.5,
        Endianness::Native,
        Verbosity::Quiet,
    )
    .unwrap();
    common::assert_scalar_grids_close(&grid, &converted, 1e-6);
});

def_test!(
OUT[input = "field.txt"]
fn text_file_can_be_inspected {
    let grid = common::random_vector_grid(common::test_properties(In3D::same(3)));
    text::dump_grid_to_txt(&grid, input, 1.0, true, Verbosity::Quiet).unwrap();
    run(["--timing", "inspect", path_str(input)]);
});

def_test!(
OUT[input = "field.dat"]
fn text_file_without_header_can_be_inspected_as_scalar {
    fs::write(input, "# Scalar values\n1\n2\n3\n4\n").unwrap();
    run([
        "inspect",
        path_str(input),
        "--scalar",
        "--shape=1,2,2",
        "--origin=-1,-1,-1",
        "--spacing=0.5,0.5,0.5",
    ]);
});

#[cfg(feature = "fft")]
def_test!(
OUT[input = "field.raw", output = "spectrum.txt"]
fn spectrum_of_single_mode_is_written_to_file {
    let n = 8;
    let mut grid = Grid3f::new(unit_properties(In3D::same(n)));
    grid.populate_from_field(&|position: &Point3<f64>| {
        let phase = 2.0 * PI * 3.0 * (position[Dim3::X] - 0.5) / n as f64;
        Vec3::new(0.0, phase.cos(), 0.0)
    });
    binary::dump_grid(&grid, input, 1.0, Endianness::Native, Verbosity::Quiet).unwrap();

    let output_argument = format!("--output-file={}", path_str(output));
    run([
        "spectrum",
        path_str(input),
        "--shape=8,8,8",
        output_argument.as_str(),
    ]);

    let contents = fs::read_to_string(output).unwrap();
    let spectrum: Vec<(usize, f64)> = contents
        .lines()
        .filter(|line| !line.starts_with('#'))
        .map(|line| {
            let mut tokens = line.split_whitespace();
            (
                tokens.next().unwrap().parse().unwrap(),
                tokens.next().unwrap().parse().unwrap(),
            )
        })
        .collect();

    assert_eq!(
        spectrum.iter().map(|&(k, _)| k).collect::<Vec<_>>(),
        vec![1, 2, 3, 4]
    );
    let (peak_k, _) = spectrum
        .iter()
        .copied()
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .unwrap();
    assert_eq!(peak_k, 3);
});
