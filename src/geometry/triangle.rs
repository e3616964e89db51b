//! Mesh triangles with precomputed normal and bounds

use super::{Bounds, Line, Point, Vector};
use crate::config::EPSILON;

/// A triangle of the model
///
/// The normal follows the right-hand rule over `points` and is the zero
/// vector for degenerate triangles. `id` is the triangle's index in its
/// model and identifies it in collision contacts.
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    /// Index of the triangle in its model
    pub id: usize,
    /// Corners, in winding order
    pub points: [Point; 3],
    /// Unit normal (zero for degenerate triangles)
    pub normal: Vector,
    /// Axis-aligned bounds of the corners
    pub bounds: Bounds,
}

impl Triangle {
    /// Create a triangle and precompute its normal and bounds
    pub fn new(id: usize, p1: Point, p2: Point, p3: Point) -> Self {
        let (ab, ac) = (p2 - p1, p3 - p1);
        let cross = ab.cross(&ac);
        // sine of the corner angle, independent of the triangle's size
        let normal = if cross.norm() <= EPSILON * ab.norm() * ac.norm() {
            Vector::default()
        } else {
            cross * (1.0 / cross.norm())
        };
        let bounds = Bounds::new(
            p1.x.min(p2.x).min(p3.x),
            p1.x.max(p2.x).max(p3.x),
            p1.y.min(p2.y).min(p3.y),
            p1.y.max(p2.y).max(p3.y),
            p1.z.min(p2.z).min(p3.z),
            p1.z.max(p2.z).max(p3.z),
        );
        Self {
            id,
            points: [p1, p2, p3],
            normal,
            bounds,
        }
    }

    /// Lowest Z of the corners
    pub fn minz(&self) -> f64 {
        self.bounds.minz
    }

    /// Highest Z of the corners
    pub fn maxz(&self) -> f64 {
        self.bounds.maxz
    }

    /// Whether the corners are (nearly) collinear
    pub fn is_degenerate(&self) -> bool {
        self.normal == Vector::default()
    }

    /// The three edges in winding order
    pub fn edges(&self) -> [Line; 3] {
        let [a, b, c] = self.points;
        [Line::new(a, b), Line::new(b, c), Line::new(c, a)]
    }

    /// Closest point on the (filled) triangle to `p`
    pub fn closest_point(&self, p: &Point) -> Point {
        let [a, b, c] = self.points;
        let ab = b - a;
        let ac = c - a;

        let ap = *p - a;
        let d1 = ab.dot(&ap);
        let d2 = ac.dot(&ap);
        if d1 <= 0.0 && d2 <= 0.0 {
            return a;
        }

        let bp = *p - b;
        let d3 = ab.dot(&bp);
        let d4 = ac.dot(&bp);
        if d3 >= 0.0 && d4 <= d3 {
            return b;
        }

        let vc = d1 * d4 - d3 * d2;
        if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
            return a + ab * (d1 / (d1 - d3));
        }

        let cp = *p - c;
        let d5 = ab.dot(&cp);
        let d6 = ac.dot(&cp);
        if d6 >= 0.0 && d5 <= d6 {
            return c;
        }

        let vb = d5 * d2 - d1 * d6;
        if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
            return a + ac * (d2 / (d2 - d6));
        }

        let va = d3 * d6 - d5 * d4;
        if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
            return b + (c - b) * ((d4 - d3) / ((d4 - d3) + (d5 - d6)));
        }

        let denom = va + vb + vc;
        if denom == 0.0 {
            // collinear corners; the vertex tests above cover the ends
            return a;
        }
        a + ab * (vb / denom) + ac * (vc / denom)
    }

    /// Distance from `p` to the filled triangle
    pub fn distance_to(&self, p: &Point) -> f64 {
        p.distance(&self.closest_point(p))
    }
}
