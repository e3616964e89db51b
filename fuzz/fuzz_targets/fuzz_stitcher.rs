#![no_main]

use libfuzzer_sys::fuzz_target;
use waterline::geometry::{Line, Point};
use waterline::stitcher::WaterlineTriangles;

fuzz_target!(|edges: Vec<[(i16, i16); 4]>| {
    // Coordinates on a coarse grid so that raw edges share endpoints often
    let point = |(x, y): (i16, i16)| Point::new(f64::from(x) / 8.0, f64::from(y) / 8.0, 0.0);

    let mut triangles = WaterlineTriangles::new();
    for [a, b, c, d] in edges.into_iter().take(64) {
        let raw = Line::new(point(a), point(b));
        let shifted = Line::new(point(c), point(d));
        if raw.len() == 0.0 || shifted.len() == 0.0 {
            continue;
        }
        triangles.add(raw, shifted);
    }

    let before = triangles.len();
    triangles.extend_shifted_lines();
    assert_eq!(triangles.len(), before);
    assert!(triangles.shifted_lines().len() <= before);
    let grouped: usize = triangles.groups().iter().map(Vec::len).sum();
    assert_eq!(grouped, before);
});
