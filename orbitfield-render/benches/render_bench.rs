use criterion::{criterion_group, criterion_main, Criterion};

use orbitfield_core::{ColoringMode, Complex, FamilyKind, Formula, FractalParameters, Viewport};
use orbitfield_render::{render_field, ColorGradient, GradientPreset, RenderCancel};

fn bench_full_frame_render(c: &mut Criterion) {
    let params = FractalParameters {
        viewport: Viewport::default_mandelbrot(640, 480),
        ..Default::default()
    };
    let formula = Formula::new(&params).unwrap();
    let cancel = RenderCancel::new();

    c.bench_function("full_frame_640x480", |b| {
        b.iter(|| render_field(&formula, &params, &cancel));
    });
}

fn bench_families(c: &mut Criterion) {
    let mut group = c.benchmark_group("family_256x256");
    for family in FamilyKind::ALL {
        let params = FractalParameters {
            family,
            power: 3,
            q: Complex::new(0.1, 0.0),
            coloring: ColoringMode::SmoothEscape,
            viewport: Viewport::new(Complex::new(-0.5, 0.0), 0.01, 256, 256).unwrap(),
            ..Default::default()
        };
        let formula = Formula::new(&params).unwrap();
        let cancel = RenderCancel::new();
        group.bench_function(family.label(), |b| {
            b.iter(|| render_field(&formula, &params, &cancel));
        });
    }
    group.finish();
}

fn bench_colorize(c: &mut Criterion) {
    let params = FractalParameters {
        viewport: Viewport::default_mandelbrot(640, 480),
        coloring: ColoringMode::SmoothEscape,
        ..Default::default()
    };
    let formula = Formula::new(&params).unwrap();
    let result = render_field(&formula, &params, &RenderCancel::new());
    let (lower, upper) = result.field.value_range().unwrap();
    let gradient = ColorGradient::from_preset(GradientPreset::Spectrum);

    c.bench_function("colorize_640x480", |b| {
        b.iter(|| gradient.colorize_field(&result.field, lower, upper, false));
    });
}

criterion_group!(
    benches,
    bench_full_frame_render,
    bench_families,
    bench_colorize
);
criterion_main!(benches);
