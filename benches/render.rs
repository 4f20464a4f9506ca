//! Benchmarks for rendering and export.
//!
//! Run with: cargo bench -p gradient-studio

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use gradient_studio::gradient_lut::{ColorRamp, GradientLut, DEFAULT_LUT_SIZE};
use gradient_studio::{
    export_image_blocking, render_with_options, ExportFormat, Gradient, RenderOptions, Surface,
};

const SIZES: [(u32, u32); 3] = [(640, 360), (1920, 1080), (3840, 2160)];

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    group.sample_size(10);
    let options = RenderOptions::seeded(1);
    for (name, gradient) in [
        ("mesh", Gradient::default_mesh()),
        ("linear", Gradient::default_linear()),
        ("radial", Gradient::default_radial()),
    ] {
        for (w, h) in SIZES {
            let mut surface = Surface::new(w, h).unwrap();
            group.throughput(Throughput::Elements(w as u64 * h as u64));
            group.bench_with_input(BenchmarkId::new(name, format!("{w}x{h}")), &gradient, |b, g| {
                b.iter(|| render_with_options(&mut surface, black_box(g), &options))
            });
        }
    }
    group.finish();
}

fn bench_lut(c: &mut Criterion) {
    let stops = Gradient::default_linear().stops().to_vec();
    c.bench_function("lut_build", |b| {
        b.iter(|| GradientLut::new(&ColorRamp::new(black_box(&stops)), DEFAULT_LUT_SIZE))
    });
}

fn bench_export(c: &mut Criterion) {
    let mut group = c.benchmark_group("export");
    group.sample_size(10);
    let gradient = Gradient::default_mesh();
    for format in ExportFormat::ALL {
        group.bench_function(format.to_string(), |b| {
            b.iter(|| export_image_blocking(black_box(&gradient), 1920, 1080, format, 0.9).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_render, bench_lut, bench_export);
criterion_main!(benches);
