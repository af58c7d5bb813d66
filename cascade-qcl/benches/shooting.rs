use cascade_qcl::{
    app::Configuration,
    eigen::{EigenSolverBuilder, FiniteDifferenceKernel, ShootingKernel},
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use utilities::square_well_grid;

pub fn bench_end_value(c: &mut Criterion) {
    let mut group = c.benchmark_group("end_value");
    let kernel = FiniteDifferenceKernel;

    for width in [50., 100., 200., 400., 800.].iter() {
        let grid = square_well_grid(0.3, *width, 50., 0.25);
        group.bench_with_input(BenchmarkId::from_parameter(grid.len()), &grid, |b, grid| {
            b.iter(|| kernel.end_value(black_box(grid), black_box(0.05)))
        });
    }
}

pub fn bench_eigen_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("eigen_solve");
    group.sample_size(10);
    let configuration = Configuration::default();

    for vert_res in [2., 1., 0.5].iter() {
        let grid = square_well_grid(0.3, 100., 50., 0.5);
        let solver = EigenSolverBuilder::new()
            .with_grid(&grid)
            .with_configuration(&configuration)
            .build();
        group.bench_with_input(
            BenchmarkId::from_parameter(vert_res),
            vert_res,
            |b, &vert_res| b.iter(|| solver.solve(black_box(vert_res))),
        );
    }
}

criterion_group!(benches, bench_end_value, bench_eigen_solve);
criterion_main!(benches);
