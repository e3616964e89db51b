//! Planes, projections and triangle slicing

use super::{Line, Point, Triangle, Vector};
use crate::config::EPSILON;

/// An infinite plane through `point` with unit `normal`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Any point on the plane
    pub point: Point,
    /// Unit normal
    pub normal: Vector,
}

impl Plane {
    /// Create a plane, normalizing `normal`
    ///
    /// Returns `None` if the normal has zero length.
    pub fn new(point: Point, normal: Vector) -> Option<Self> {
        Some(Self {
            point,
            normal: normal.normalized()?,
        })
    }

    /// Horizontal plane through `point`, facing up
    pub const fn horizontal(point: Point) -> Self {
        Self {
            point,
            normal: Vector::up(),
        }
    }

    /// Signed distance of `p` from the plane, positive on the normal's side
    pub fn signed_distance(&self, p: &Point) -> f64 {
        (*p - self.point).dot(&self.normal)
    }

    /// Orthogonal projection of `p` onto the plane
    pub fn point_projection(&self, p: &Point) -> Point {
        let mut projected = *p - self.normal * self.signed_distance(p);
        if self.normal.x == 0.0 && self.normal.y == 0.0 {
            // keep points on a horizontal plane bit-identical in Z
            projected.z = self.point.z;
        }
        projected
    }

    /// Orthogonal projection of both endpoints of `line`
    pub fn line_projection(&self, line: &Line) -> Line {
        Line::new(self.point_projection(&line.p1), self.point_projection(&line.p2))
    }

    /// Orient `line` clockwise around a surface with normal `surface_normal`
    ///
    /// Looking down the plane normal, the surface lies on the right of the
    /// returned line.
    pub fn oriented_clockwise(&self, line: Line, surface_normal: &Vector) -> Line {
        let Some(dir) = line.dir() else {
            return line;
        };
        if self.normal.cross(&dir).dot(surface_normal) < 0.0 {
            line.reversed()
        } else {
            line
        }
    }

    /// Line where the plane cuts the triangle, oriented clockwise
    ///
    /// Corners within [`EPSILON`] of the plane count as cut points. Returns
    /// `None` when the triangle misses the plane, touches it in a single
    /// point, or lies in it. Interpolated points are computed from each edge
    /// in a fixed corner order so that neighbouring triangles agree exactly
    /// on their shared edge.
    pub fn intersect_triangle(&self, triangle: &Triangle) -> Option<Line> {
        let distances = triangle.points.map(|p| self.signed_distance(&p));
        let mut cuts: Vec<Point> = Vec::with_capacity(3);
        let mut push_unique = |p: Point| {
            if !cuts.contains(&p) {
                cuts.push(p);
            }
        };

        for i in 0..3 {
            let j = (i + 1) % 3;
            let (a, b) = (triangle.points[i], triangle.points[j]);
            let (da, db) = (distances[i], distances[j]);
            if da.abs() < EPSILON {
                push_unique(self.point_projection(&a));
            }
            let straddles = (da > EPSILON && db < -EPSILON) || (da < -EPSILON && db > EPSILON);
            if straddles {
                let (from, to, d_from, d_to) = if a.lex_lt(&b) {
                    (a, b, da, db)
                } else {
                    (b, a, db, da)
                };
                let t = d_from / (d_from - d_to);
                push_unique(self.point_projection(&from.lerp(&to, t)));
            }
        }

        if cuts.len() != 2 {
            return None;
        }
        let line = Line::new(cuts[0], cuts[1]);
        line.dir()?;
        Some(self.oriented_clockwise(line, &triangle.normal))
    }
}
