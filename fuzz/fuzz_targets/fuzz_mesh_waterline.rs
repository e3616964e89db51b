#![no_main]

use libfuzzer_sys::arbitrary::{Arbitrary, Result, Unstructured};
use libfuzzer_sys::fuzz_target;
use waterline::cutter::{CylindricalCutter, SphericalCutter};
use waterline::geometry::{Bounds, Point};
use waterline::mesh::{Face, Mesh};
use waterline::model::TriangleModel;
use waterline::toolpath::SimplePathAccumulator;
use waterline::Waterline;

#[derive(Debug)]
struct FuzzJob {
    vertices: Vec<(i8, i8, i8)>,
    faces: Vec<(usize, usize, usize)>,
    radius: u8,
    ball_nose: bool,
    layers: u8,
}

impl<'a> Arbitrary<'a> for FuzzJob {
    fn arbitrary(u: &mut Unstructured<'a>) -> Result<Self> {
        let vertex_count = u.int_in_range(0..=24)?;
        let mut vertices = Vec::with_capacity(vertex_count);
        for _ in 0..vertex_count {
            vertices.push((u.arbitrary()?, u.arbitrary()?, u.arbitrary()?));
        }

        // Face indices stay within the vertex range
        let face_count = u.int_in_range(0..=32)?;
        let mut faces = Vec::with_capacity(face_count);
        if vertex_count > 0 {
            for _ in 0..face_count {
                faces.push((
                    u.int_in_range(0..=(vertex_count - 1))?,
                    u.int_in_range(0..=(vertex_count - 1))?,
                    u.int_in_range(0..=(vertex_count - 1))?,
                ));
            }
        }

        Ok(FuzzJob {
            vertices,
            faces,
            radius: u.arbitrary()?,
            ball_nose: u.arbitrary()?,
            layers: u.int_in_range(1..=8)?,
        })
    }
}

fuzz_target!(|job: FuzzJob| {
    let mut mesh = Mesh::new();
    for &(x, y, z) in &job.vertices {
        mesh.vertices.push(Point::new(
            f64::from(x) / 16.0,
            f64::from(y) / 16.0,
            f64::from(z) / 16.0,
        ));
    }
    for &(a, b, c) in &job.faces {
        mesh.faces.push(Face::new(a, b, c));
    }

    // Degenerate meshes are rejected with an error, never a panic
    let Ok(model) = TriangleModel::from_mesh(&mesh) else {
        return;
    };
    let radius = f64::from(job.radius) / 64.0;
    let bounds = Bounds::new(-10.0, 10.0, -10.0, 10.0, -8.0, 8.0);
    let dz = 16.0 / f64::from(job.layers);

    let outcome = if job.ball_nose {
        let Ok(cutter) = SphericalCutter::new(radius) else {
            return;
        };
        Waterline::new(&model, cutter, SimplePathAccumulator::new())
            .and_then(|mut g| g.generate_toolpath(&bounds, dz, None))
    } else {
        let Ok(cutter) = CylindricalCutter::new(radius) else {
            return;
        };
        Waterline::new(&model, cutter, SimplePathAccumulator::new())
            .and_then(|mut g| g.generate_toolpath(&bounds, dz, None))
    };

    if let Ok(outcome) = outcome {
        for path in &outcome.paths {
            assert!(!path.is_empty());
            assert!(path.points.iter().all(|p| p.is_finite()));
        }
    }
});
