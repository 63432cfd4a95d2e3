mod common;

use fieldgrid::{
    field::FieldSupplier,
    geometry::{In3D, Point3, Vec3},
    grid::{Grid3f, GridProperties},
    ownership::RefPtr,
};
use atomic_counter::{AtomicCounter, RelaxedCounter};
use rayon::prelude::*;
use std::{any::Any, sync::Arc, thread};

fn as_supplier(grid: &Grid3f) -> &(dyn FieldSupplier + 'static) {
    grid
}

fn constant_grid(value: Vec3<f32>) -> Grid3f {
    let properties =
        GridProperties::with_uniform_spacing(Point3::origin(), In3D::same(4), 0.5).unwrap();
    Grid3f::from_values(properties, vec![value; 64]).unwrap()
}

struct CountedGrid {
    grid: Grid3f,
    drops: Arc<RelaxedCounter>,
}

impl Drop for CountedGrid {
    fn drop(&mut self) {
        self.drops.inc();
    }
}

#[test]
fn grid_shared_between_threads_is_sampled_consistently() {
    let grid = RefPtr::new(constant_grid(Vec3::new(1.0, -2.0, 0.5)));
    let supplier: RefPtr<dyn FieldSupplier> = grid.clone().map(as_supplier);
    assert_eq!(grid.reference_count(), 2);

    thread::scope(|scope| {
        for thread_idx in 0..4 {
            let supplier = supplier.clone();
            scope.spawn(move || {
                let offset = 0.1 * thread_idx as f64;
                let value = supplier.field_at(&Point3::new(offset, 1.0 - offset, 1.5));
                assert!((value - Vec3::new(1.0, -2.0, 0.5)).length() < 1e-6);
            });
        }
    });

    assert_eq!(grid.reference_count(), 2);
    drop(supplier);
    assert_eq!(grid.reference_count(), 1);
}

#[test]
fn grid_can_be_populated_from_shared_grid() {
    let source = RefPtr::new(common::random_vector_grid(common::test_properties(
        In3D::new(3, 4, 5),
    )));
    let mut target = Grid3f::new(source.properties().clone());
    target.populate_from_field(&source);
    common::assert_vector_grids_close(&source, &target, 1e-5);
}

#[test]
fn type_erased_grid_handles_can_be_recovered() {
    let grid = RefPtr::new(constant_grid(Vec3::new(0.0, 0.0, 3.0)));
    let erased: RefPtr<dyn Any + Send + Sync> = grid.clone().into_any();
    assert_eq!(erased.reference_count(), 2);

    let wrong = erased.clone().downcast::<String>();
    assert!(!wrong.is_valid());
    assert_eq!(grid.reference_count(), 2);

    let recovered = erased.downcast::<Grid3f>();
    assert!(RefPtr::ptr_eq(&recovered, &grid));
    assert_eq!(recovered.mean_magnitude(), 3.0);
}

#[test]
fn unique_grid_handle_allows_mutation() {
    let mut grid = RefPtr::new(constant_grid(Vec3::new(2.0, 0.0, 0.0)));
    let other = grid.clone();
    assert!(grid.get_mut().is_none());
    drop(other);

    grid.get_mut().unwrap().scale(0.5);
    assert_eq!(grid.mean_vector(), Vec3::new(1.0, 0.0, 0.0));
}

#[test]
fn handles_are_dropped_in_parallel() {
    let grid = RefPtr::new(constant_grid(Vec3::new(1.0, 1.0, 1.0)));
    let handles: Vec<_> = (0..1000).map(|_| grid.clone()).collect();
    assert_eq!(grid.reference_count(), 1001);

    handles.into_par_iter().for_each(drop);
    assert_eq!(grid.reference_count(), 1);
}

#[test]
fn grid_released_by_last_worker_is_dropped_once() {
    let drops = Arc::new(RelaxedCounter::new(0));
    for iteration in 1..=500 {
        let grid = RefPtr::new(CountedGrid {
            grid: constant_grid(Vec3::new(1.0, 0.0, 0.0)),
            drops: Arc::clone(&drops),
        });
        let handles: Vec<_> = (0..8).map(|_| grid.clone()).collect();
        drop(grid);

        thread::scope(|scope| {
            for handle in handles {
                scope.spawn(move || {
                    let value = handle.grid.interpolate(&Point3::new(1.0, 1.0, 1.0));
                    assert_eq!(value, Vec3::new(1.0, 0.0, 0.0));
                });
            }
        });
        assert_eq!(drops.get(), iteration);
    }
}
