//! Benchmarks for laser injection backends.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

use pic_laser::fields::FieldE;
use pic_laser::gpu::GpuLaserInjector;
use pic_laser::grid::{DataSpace, GridLayout, SuperCellSize};
use pic_laser::kernel::{BasicBackend, ParallelBackend};
use pic_laser::laser::{GaussianBeam, LaserConfig, LaserProfile};
use pic_laser::math::erf;
use pic_laser::params::{AbsorberCells, GridParams};
use pic_laser::LaserPhysics;

fn bench_injection(c: &mut Criterion) {
    let sizes = [(64, 64, 64), (256, 64, 256), (512, 64, 512)];
    let sc = SuperCellSize::new([8, 8, 4]).unwrap();
    let params = GridParams::new([1.0; 3], 0.5).with_speed_of_light(1.0);
    let profile =
        LaserProfile::GaussianBeam(GaussianBeam::new(1.0, 2.0, 1.0, 16.0).with_pulse_init(1e6));
    let config = LaserConfig::new(profile).with_init_plane_y(12);

    for (nx, ny, nz) in sizes {
        let layout = GridLayout::new(
            DataSpace::new([nx, ny, nz]),
            DataSpace::new([8, 8, 4]),
            sc,
        )
        .unwrap();
        let make = || {
            LaserPhysics::new(config, params, layout, AbsorberCells::uniform(8)).unwrap()
        };

        let mut group = c.benchmark_group(format!("laser_{}x{}x{}", nx, ny, nz));
        group.throughput(Throughput::Elements((nx * nz) as u64));
        group.sample_size(20);

        group.bench_function("basic", |b| {
            let laser = make().with_backend(BasicBackend::new());
            let mut field = FieldE::new(layout);
            b.iter(|| {
                laser.apply(black_box(10), &mut field).unwrap();
                black_box(&field);
            });
        });

        for workers in [1, 32, 256] {
            group.bench_function(format!("parallel_w{workers}"), |b| {
                let laser = make().with_backend(ParallelBackend::with_workers(workers));
                let mut field = FieldE::new(layout);
                b.iter(|| {
                    laser.apply(black_box(10), &mut field).unwrap();
                    black_box(&field);
                });
            });
        }

        if GpuLaserInjector::is_available() {
            group.bench_function("gpu", |b| {
                let laser = make().with_gpu().unwrap();
                let mut field = FieldE::new(layout);
                b.iter(|| {
                    laser.apply(black_box(10), &mut field).unwrap();
                    black_box(&field);
                });
            });
        }

        group.finish();
    }
}

fn bench_erf(c: &mut Criterion) {
    let xs: Vec<f32> = (0..1024).map(|i| (i as f32 - 512.0) / 128.0).collect();

    let mut group = c.benchmark_group("math");
    group.throughput(Throughput::Elements(xs.len() as u64));
    group.bench_function("erf", |b| {
        b.iter(|| xs.iter().map(|&x| erf(black_box(x))).sum::<f32>());
    });
    group.finish();
}

criterion_group!(benches, bench_injection, bench_erf);
criterion_main!(benches);
