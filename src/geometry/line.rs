//! Directed line segments

use std::fmt;

use super::{Bounds, Point, Vector};
use crate::config::EPSILON;

/// A directed segment from `p1` to `p2`
///
/// Equality compares both endpoints in order, so a line and its reversal are
/// different lines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    /// Start point
    pub p1: Point,
    /// End point
    pub p2: Point,
}

impl Line {
    /// Create a line from `p1` to `p2`
    pub const fn new(p1: Point, p2: Point) -> Self {
        Self { p1, p2 }
    }

    /// Unnormalized vector from `p1` to `p2`
    pub fn vector(&self) -> Vector {
        self.p2 - self.p1
    }

    /// Unit direction, `None` for a zero-length line
    pub fn dir(&self) -> Option<Vector> {
        self.vector().normalized()
    }

    /// Length of the segment
    pub fn len(&self) -> f64 {
        self.vector().norm()
    }

    /// Midpoint of the segment
    pub fn midpoint(&self) -> Point {
        self.p1.midpoint(&self.p2)
    }

    /// The same segment, traversed backwards
    pub fn reversed(&self) -> Line {
        Line::new(self.p2, self.p1)
    }

    /// The same segment moved by `offset`
    pub fn translated(&self, offset: Vector) -> Line {
        Line::new(self.p1 + offset, self.p2 + offset)
    }

    /// Parameter of the projection of `p` onto the infinite line
    ///
    /// 0 at `p1`, 1 at `p2`. Zero-length lines give 0.
    pub fn parameter_of(&self, p: &Point) -> f64 {
        let v = self.vector();
        let len_sq = v.norm_squared();
        if len_sq == 0.0 {
            0.0
        } else {
            (*p - self.p1).dot(&v) / len_sq
        }
    }

    /// Closest point to `p` on the infinite line through the segment
    pub fn closest_point(&self, p: &Point) -> Point {
        self.p1 + self.vector() * self.parameter_of(p)
    }

    /// Distance from `p` to the infinite line through the segment
    pub fn dist_to_point(&self, p: &Point) -> f64 {
        p.distance(&self.closest_point(p))
    }

    /// Distance from `p` to the closest point of the segment itself
    pub fn distance_to_segment(&self, p: &Point) -> f64 {
        let t = self.parameter_of(p).clamp(0.0, 1.0);
        p.distance(&self.p1.lerp(&self.p2, t))
    }

    /// Whether `p` lies on the segment, within [`EPSILON`]
    pub fn is_point_inside(&self, p: &Point) -> bool {
        if *p == self.p1 || *p == self.p2 {
            return true;
        }
        let len = self.len();
        if len < EPSILON {
            return self.p1.distance(p) < EPSILON;
        }
        let t = self.parameter_of(p);
        let slack = EPSILON / len;
        t >= -slack && t <= 1.0 + slack && self.dist_to_point(p) < EPSILON
    }

    /// Crossing point of two lines and its parameter along `self`
    ///
    /// The parameter is 0 at `self.p1` and 1 at `self.p2`. Returns `None` for
    /// parallel, degenerate or skew lines. Unless `infinite_lines` is set,
    /// the crossing must also lie within both segments.
    pub fn intersection(&self, other: &Line, infinite_lines: bool) -> Option<(Point, f64)> {
        let a = self.vector();
        let b = other.vector();
        let c = other.p1 - self.p1;
        let axb = a.cross(&b);
        let axb_norm = axb.norm();
        let scale = a.norm() * b.norm();
        if scale == 0.0 || axb_norm < EPSILON * scale {
            return None;
        }
        // skew lines never meet
        if c.dot(&axb).abs() / axb_norm > EPSILON {
            return None;
        }
        let denom = axb_norm * axb_norm;
        let factor = c.cross(&b).dot(&axb) / denom;
        if !infinite_lines {
            let other_factor = c.cross(&a).dot(&axb) / denom;
            let inside = |t: f64| (-EPSILON..=1.0 + EPSILON).contains(&t);
            if !inside(factor) || !inside(other_factor) {
                return None;
            }
        }
        Some((self.p1 + a * factor, factor))
    }

    /// The part of the segment inside `bounds`
    ///
    /// A segment entirely inside is returned unchanged. Returns `None` when
    /// nothing (or only a single point) remains. Bounds are tolerant by
    /// [`EPSILON`], so a flat Z range (`minz == maxz`) keeps segments at
    /// that height.
    pub fn cropped(&self, bounds: &Bounds) -> Option<Line> {
        if bounds.contains(&self.p1) && bounds.contains(&self.p2) {
            return Some(*self);
        }
        let d = self.vector();
        let axes = [
            (self.p1.x, d.x, bounds.minx, bounds.maxx),
            (self.p1.y, d.y, bounds.miny, bounds.maxy),
            (self.p1.z, d.z, bounds.minz, bounds.maxz),
        ];
        let mut t0: f64 = 0.0;
        let mut t1: f64 = 1.0;
        for (start, delta, lo, hi) in axes {
            let (lo, hi) = (lo - EPSILON, hi + EPSILON);
            if delta == 0.0 {
                if start < lo || start > hi {
                    return None;
                }
                continue;
            }
            let ta = (lo - start) / delta;
            let tb = (hi - start) / delta;
            t0 = t0.max(ta.min(tb));
            t1 = t1.min(ta.max(tb));
            if t0 > t1 {
                return None;
            }
        }
        let cropped = Line::new(self.p1 + d * t0, self.p1 + d * t1);
        if cropped.len() < EPSILON {
            None
        } else {
            Some(cropped)
        }
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.p1, self.p2)
    }
}
