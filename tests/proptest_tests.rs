//! Property-based tests for waterline
//!
//! These tests use proptest to generate random geometry and verify that the
//! invariants of cropping, offsetting, stitching and layer planning hold
//! across a wide range of inputs.

use proptest::prelude::*;
use waterline::config::{EPSILON, ceil_tolerant, layer_heights};
use waterline::cutter::CylindricalCutter;
use waterline::geometry::{Bounds, Line, Point};
use waterline::mesh::Mesh;
use waterline::model::TriangleModel;
use waterline::stitcher::WaterlineTriangles;
use waterline::waterline::shifted_waterline;

// ============================================================================
// Generators for basic data structures
// ============================================================================

/// Generate a point with moderate, finite coordinates
fn point_strategy() -> impl Strategy<Value = Point> {
    (-100.0..100.0f64, -100.0..100.0f64, -100.0..100.0f64)
        .prop_map(|(x, y, z)| Point::new(x, y, z))
}

/// Generate a horizontal line at least 0.01 long
fn horizontal_line_strategy() -> impl Strategy<Value = Line> {
    (
        -50.0..50.0f64,
        -50.0..50.0f64,
        -50.0..50.0f64,
        -50.0..50.0f64,
        -10.0..10.0f64,
    )
        .prop_filter("line must have a length", |(x1, y1, x2, y2, _)| {
            (x2 - x1).hypot(y2 - y1) > 0.01
        })
        .prop_map(|(x1, y1, x2, y2, z)| Line::new(Point::new(x1, y1, z), Point::new(x2, y2, z)))
}

fn bounds_of(line: &Line) -> Bounds {
    Bounds::from_points([&line.p1, &line.p2]).unwrap()
}

proptest! {
    /// A box containing the line leaves it untouched
    #[test]
    fn test_crop_to_containing_box_is_identity(a in point_strategy(), b in point_strategy(), margin in 0.0..10.0f64) {
        let line = Line::new(a, b);
        let bounds = bounds_of(&line);
        let grown = Bounds::new(
            bounds.minx - margin, bounds.maxx + margin,
            bounds.miny - margin, bounds.maxy + margin,
            bounds.minz - margin, bounds.maxz + margin,
        );
        prop_assert_eq!(line.cropped(&grown), Some(line));
    }

    /// A box beside the line removes it
    #[test]
    fn test_crop_to_disjoint_box_is_none(a in point_strategy(), b in point_strategy(), gap in 0.1..10.0f64) {
        let line = Line::new(a, b);
        let bounds = bounds_of(&line);
        let beside = Bounds::new(
            bounds.maxx + gap, bounds.maxx + gap + 5.0,
            bounds.miny, bounds.maxy,
            bounds.minz, bounds.maxz,
        );
        prop_assert_eq!(line.cropped(&beside), None);
    }

    /// Whatever survives cropping lies inside the box and on the line
    #[test]
    fn test_cropped_line_stays_inside(a in point_strategy(), b in point_strategy(), lo in -50.0..0.0f64, hi in 0.0..50.0f64) {
        let line = Line::new(a, b);
        let bounds = Bounds::new(lo, hi, lo, hi, lo, hi);
        if let Some(cropped) = line.cropped(&bounds) {
            let slack = 2.0 * EPSILON;
            for p in [cropped.p1, cropped.p2] {
                for v in [p.x, p.y, p.z] {
                    prop_assert!(v >= lo - slack && v <= hi + slack, "{} outside {}..{}", p, lo, hi);
                }
            }
            prop_assert!(line.dist_to_point(&cropped.p1) < 1e-6);
            prop_assert!(cropped.len() <= line.len() + 1e-9);
        }
    }

    /// A cutter location on the edge does not move it
    #[test]
    fn test_shift_with_cutter_on_edge_is_identity(line in horizontal_line_strategy(), t in 0.0..1.0f64) {
        let on_edge = line.p1.lerp(&line.p2, t);
        prop_assert_eq!(shifted_waterline(&line, on_edge), Some(line));
    }

    /// The shifted edge runs through the cutter location, parallel to the edge
    #[test]
    fn test_shift_passes_through_cutter_location(line in horizontal_line_strategy(), t in 0.0..1.0f64, offset in 0.01..5.0f64) {
        let dir = line.dir().unwrap();
        let side = waterline::geometry::Vector::up().cross(&dir);
        let cl = line.p1.lerp(&line.p2, t) + side * offset;
        let shifted = shifted_waterline(&line, cl).unwrap();
        prop_assert!(shifted.dist_to_point(&cl) < 1e-6);
        prop_assert!((shifted.len() - line.len()).abs() < 1e-6);
        prop_assert!((line.dist_to_point(&shifted.p1) - offset).abs() < 1e-6);
    }

    /// Adding an edge twice changes nothing
    #[test]
    fn test_add_is_idempotent(lines in prop::collection::vec(horizontal_line_strategy(), 1..20)) {
        let mut once = WaterlineTriangles::new();
        let mut twice = WaterlineTriangles::new();
        for line in &lines {
            once.add(*line, *line);
            twice.add(*line, *line);
            twice.add(*line, *line);
        }
        prop_assert_eq!(once.len(), twice.len());
        prop_assert_eq!(once.shifted_lines(), twice.shifted_lines());
    }

    /// Layers are evenly spaced from the top down and hit both ends
    #[test]
    fn test_layer_heights(minz in -100.0..100.0f64, height in 0.0..50.0f64, dz in 0.05..10.0f64) {
        let maxz = minz + height;
        let layers = layer_heights(minz, maxz, dz).unwrap();
        let diff = if (maxz - minz).abs() < EPSILON { 0.0 } else { (maxz - minz).abs() };
        prop_assert_eq!(layers.len(), 1 + ceil_tolerant(diff / dz));
        prop_assert_eq!(layers[0], maxz);
        if layers.len() > 1 {
            prop_assert!((layers[layers.len() - 1] - minz).abs() < 1e-9);
            for pair in layers.windows(2) {
                prop_assert!(pair[0] > pair[1]);
                prop_assert!(pair[0] - pair[1] <= dz * (1.0 + EPSILON) + 1e-9);
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Any box yields a single closed contour offset by the tool radius
    #[test]
    fn test_box_contour_is_offset_rectangle(
        width in 0.5..4.0f64,
        depth in 0.5..4.0f64,
        radius in prop_oneof![Just(0.0), 0.01..0.5f64],
        level in 0.1..0.9f64,
    ) {
        let mesh = Mesh::cuboid(Point::new(0.0, 0.0, 0.0), Point::new(width, depth, 1.0));
        let model = TriangleModel::from_mesh(&mesh).unwrap();
        let cutter = CylindricalCutter::new(radius).unwrap();
        let bounds = Bounds::new(-5.0, 10.0, -5.0, 10.0, level, level);
        let paths = waterline::waterline_toolpath(&model, cutter, &bounds, 1.0).unwrap();

        prop_assert_eq!(paths.len(), 1);
        let path = &paths[0];
        prop_assert_eq!(path.points.len(), 5);
        prop_assert_eq!(path.points.first(), path.points.last());
        let expected = 2.0 * (width + depth) + 8.0 * radius;
        prop_assert!((path.length() - expected).abs() < 1e-6, "length {} vs {}", path.length(), expected);
        for p in &path.points {
            prop_assert!((p.x + radius).abs() < 1e-6 || (p.x - width - radius).abs() < 1e-6);
            prop_assert!((p.y + radius).abs() < 1e-6 || (p.y - depth - radius).abs() < 1e-6);
            prop_assert_eq!(p.z, level);
        }
    }
}
