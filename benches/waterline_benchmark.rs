use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use waterline::config::{Backend, WaterlineConfig};
use waterline::cutter::CylindricalCutter;
use waterline::geometry::{Bounds, Line, Point};
use waterline::mesh::{Face, Mesh};
use waterline::model::TriangleModel;
use waterline::stitcher::WaterlineTriangles;
use waterline::toolpath::SimplePathAccumulator;
use waterline::Waterline;

/// Generate a grid of `n` x `n` unit boxes of varying height, one unit apart
fn generate_box_grid(n: usize) -> TriangleModel {
    let mut mesh = Mesh::new();
    for i in 0..n {
        for j in 0..n {
            let x = (i * 2) as f64;
            let y = (j * 2) as f64;
            let height = 1.0 + ((i + j) % 3) as f64;
            let cube = Mesh::cuboid(Point::new(x, y, 0.0), Point::new(x + 1.0, y + 1.0, height));
            let offset = mesh.vertices.len();
            mesh.vertices.extend_from_slice(&cube.vertices);
            mesh.faces.extend(cube.faces.iter().map(|f| {
                let [a, b, c] = f.indices();
                Face::new(a + offset, b + offset, c + offset)
            }));
        }
    }
    TriangleModel::from_mesh(&mesh).unwrap()
}

fn grid_bounds(n: usize) -> Bounds {
    let extent = (n * 2) as f64;
    Bounds::new(-1.0, extent, -1.0, extent, 0.1, 2.9)
}

fn bench_single_box(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_box");
    let model = generate_box_grid(1);
    let bounds = grid_bounds(1);

    for &layers in &[4usize, 16, 64] {
        let dz = 2.8 / layers as f64;
        group.bench_with_input(BenchmarkId::new("layers", layers), &dz, |b, &dz| {
            b.iter(|| {
                let cutter = CylindricalCutter::new(0.1).unwrap();
                let mut generator =
                    Waterline::new(&model, cutter, SimplePathAccumulator::new()).unwrap();
                black_box(generator.generate_toolpath(&bounds, dz, None).unwrap())
            });
        });
    }

    group.finish();
}

fn bench_box_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("box_grid");
    group.sample_size(10); // Reduce sample size for large grids

    for &n in &[2usize, 4, 8] {
        let model = generate_box_grid(n);
        let bounds = grid_bounds(n);
        group.bench_with_input(
            BenchmarkId::new("boxes", format!("{}x{}", n, n)),
            &model,
            |b, model| {
                b.iter(|| {
                    let cutter = CylindricalCutter::new(0.25).unwrap();
                    let mut generator =
                        Waterline::new(model, cutter, SimplePathAccumulator::new()).unwrap();
                    black_box(generator.generate_toolpath(&bounds, 0.5, None).unwrap())
                });
            },
        );
    }

    group.finish();
}

fn bench_backends(c: &mut Criterion) {
    let mut group = c.benchmark_group("backends");
    group.sample_size(10);
    let model = generate_box_grid(4);
    let bounds = grid_bounds(4);

    for (name, backend) in [
        ("triangle_scan", Backend::TriangleScan),
        ("accelerated", Backend::Accelerated),
    ] {
        for &radius in &[0.05, 0.25] {
            group.bench_with_input(
                BenchmarkId::new(name, format!("r{}", radius)),
                &radius,
                |b, &radius| {
                    b.iter(|| {
                        let config = WaterlineConfig::new().with_backend(backend);
                        let cutter = CylindricalCutter::new(radius).unwrap();
                        let mut generator = Waterline::with_config(
                            &model,
                            cutter,
                            SimplePathAccumulator::new(),
                            config,
                        )
                        .unwrap();
                        black_box(generator.generate_toolpath(&bounds, 0.5, None).unwrap())
                    });
                },
            );
        }
    }

    group.finish();
}

fn bench_stitching(c: &mut Criterion) {
    let mut group = c.benchmark_group("stitching");

    for &sides in &[64usize, 512, 4096] {
        // polygon approximating a circle, offsets leaving a gap at every corner
        let step = std::f64::consts::TAU / sides as f64;
        let corner = |i: usize| {
            let angle = -((i % sides) as f64) * step;
            Point::new(10.0 * angle.cos(), 10.0 * angle.sin(), 0.0)
        };
        let centre = Point::new(0.0, 0.0, 0.0);
        let edges: Vec<(Line, Line)> = (0..sides)
            .map(|i| {
                let raw = Line::new(corner(i), corner(i + 1));
                let outward = (raw.midpoint() - centre).normalized().unwrap();
                (raw, raw.translated(outward * 0.5))
            })
            .collect();

        group.bench_with_input(BenchmarkId::new("sides", sides), &edges, |b, edges| {
            b.iter(|| {
                let mut triangles = WaterlineTriangles::new();
                for &(raw, shifted) in edges {
                    triangles.add(raw, shifted);
                }
                triangles.extend_shifted_lines();
                black_box(triangles.shifted_lines())
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_single_box,
    bench_box_grid,
    bench_backends,
    bench_stitching
);
criterion_main!(benches);
