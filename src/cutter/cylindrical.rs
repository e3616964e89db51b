//! Flat end mill

use super::{ContactSpan, Cutter, CutterContact, ToolShape, ball_range, check_radius, overlap, slab};
use crate::config::EPSILON;
use crate::error::{Error, Result};
use crate::geometry::{Line, Point, Triangle, Vector};

/// Flat end mill: a vertical cylinder standing on its tip
///
/// Only horizontal moves are supported, which is all a waterline needs. The
/// part of a triangle between the tip height and the top of the flutes is
/// projected onto the XY plane; the tool overlaps the triangle while its
/// axis is within `radius` of that projection.
#[derive(Debug, Clone, PartialEq)]
pub struct CylindricalCutter {
    radius: f64,
    height: Option<f64>,
    location: Option<Point>,
}

impl CylindricalCutter {
    /// Create a cylinder of unbounded height
    ///
    /// # Errors
    ///
    /// [`Error::InvalidGeometry`] for a negative or non-finite radius.
    pub fn new(radius: f64) -> Result<Self> {
        check_radius(radius)?;
        Ok(Self {
            radius,
            height: None,
            location: None,
        })
    }

    /// Limit the flute length above the tip
    pub fn with_height(mut self, height: f64) -> Result<Self> {
        if !(height.is_finite() && height > 0.0) {
            return Err(Error::InvalidGeometry(format!(
                "tool height must be positive, got {}",
                height
            )));
        }
        self.height = Some(height);
        Ok(self)
    }

    /// Flute length, `None` when unbounded
    pub fn height(&self) -> Option<f64> {
        self.height
    }
}

impl Cutter for CylindricalCutter {
    fn radius(&self) -> f64 {
        self.radius
    }

    fn shape(&self) -> ToolShape {
        ToolShape::Cylinder {
            radius: self.radius,
            height: self.height,
        }
    }

    fn location(&self) -> Option<Point> {
        self.location
    }

    fn moveto(&mut self, location: Point) {
        self.location = Some(location);
    }

    fn contact_span(
        &self,
        start: Point,
        direction: Vector,
        triangle: &Triangle,
        clearance: f64,
    ) -> Result<Option<ContactSpan>> {
        if direction.z.abs() > EPSILON {
            return Err(Error::UnsupportedMove(format!(
                "cylindrical cutter only moves horizontally, direction was {}",
                direction
            )));
        }
        let Some(dir) = Vector::new(direction.x, direction.y, 0.0).normalized() else {
            return Ok(None);
        };

        let mut polygon = clip(&triangle.points, start.z + clearance, true);
        if let Some(height) = self.height {
            polygon = clip(&polygon, start.z + height, false);
        }
        if polygon.is_empty() {
            return Ok(None);
        }

        let radius = (self.radius - clearance).max(0.0);
        let origin = flat(&start);
        let mut span = None;
        if polygon.len() == 1 {
            corner_span(&mut span, &origin, &dir, &polygon[0], radius);
        } else {
            for (i, a) in polygon.iter().enumerate() {
                let b = &polygon[(i + 1) % polygon.len()];
                edge_span(&mut span, &origin, &dir, a, b, radius);
            }
        }
        let Some(span) = span else {
            return Ok(None);
        };

        if clearance > 0.0 {
            let middle = (span.enter.distance + span.exit.distance) / 2.0;
            let axis = origin + dir * middle;
            if signed_distance_xy(&axis, &polygon) >= self.radius - clearance {
                return Ok(None);
            }
        }
        Ok(Some(span))
    }
}

fn flat(p: &Point) -> Point {
    Point::new(p.x, p.y, 0.0)
}

/// Keep the part of a convex polygon above (or below) height `z`
fn clip(polygon: &[Point], z: f64, keep_above: bool) -> Vec<Point> {
    let inside = |p: &Point| if keep_above { p.z >= z } else { p.z <= z };
    let mut out: Vec<Point> = Vec::with_capacity(polygon.len() + 2);
    let mut push = |p: Point| {
        if out.last() != Some(&p) {
            out.push(p);
        }
    };
    if polygon.len() == 1 {
        if inside(&polygon[0]) {
            push(polygon[0]);
        }
        return out;
    }
    for (i, cur) in polygon.iter().enumerate() {
        let next = &polygon[(i + 1) % polygon.len()];
        let (cur_in, next_in) = (inside(cur), inside(next));
        if cur_in {
            push(*cur);
        }
        if cur_in != next_in {
            let t = (z - cur.z) / (next.z - cur.z);
            let mut crossing = cur.lerp(next, t);
            crossing.z = z;
            push(crossing);
        }
    }
    if out.len() > 1 && out.first() == out.last() {
        out.pop();
    }
    out
}

fn corner_span(span: &mut Option<ContactSpan>, origin: &Point, dir: &Vector, corner: &Point, radius: f64) {
    if let Some((t0, t1)) = ball_range(&(*origin - flat(corner)), dir, radius, 0.0) {
        ContactSpan::widen(
            span,
            CutterContact {
                distance: t0,
                point: *corner,
            },
            CutterContact {
                distance: t1,
                point: *corner,
            },
        );
    }
}

/// Widen `span` by the travel over which the axis is within `radius` of
/// the XY projection of segment `a..b`
fn edge_span(
    span: &mut Option<ContactSpan>,
    origin: &Point,
    dir: &Vector,
    a: &Point,
    b: &Point,
    radius: f64,
) {
    corner_span(span, origin, dir, a, radius);
    corner_span(span, origin, dir, b, radius);

    let (fa, fb) = (flat(a), flat(b));
    let len = fa.distance(&fb);
    if len == 0.0 {
        return;
    }
    let u = (fb - fa) * (1.0 / len);
    let n = Vector::new(-u.y, u.x, 0.0);
    let w = *origin - fa;
    let along = slab(w.dot(&u), dir.dot(&u), 0.0, len);
    let across = slab(w.dot(&n), dir.dot(&n), -radius, radius);
    let Some((t0, t1)) = along.zip(across).and_then(|(p, q)| overlap(p, q)) else {
        return;
    };
    let contact = |t: f64| CutterContact {
        distance: t,
        point: a.lerp(b, ((w + *dir * t).dot(&u) / len).clamp(0.0, 1.0)),
    };
    ContactSpan::widen(span, contact(t0), contact(t1));
}

/// Distance from `p` to the XY projection of a convex polygon, negative inside
fn signed_distance_xy(p: &Point, polygon: &[Point]) -> f64 {
    let flat_polygon: Vec<Point> = polygon.iter().map(flat).collect();
    let n = flat_polygon.len();
    if n == 1 {
        return p.distance(&flat_polygon[0]);
    }
    let edges = (0..n).map(|i| Line::new(flat_polygon[i], flat_polygon[(i + 1) % n]));
    let distance = edges
        .clone()
        .map(|edge| edge.distance_to_segment(p))
        .fold(f64::INFINITY, f64::min);

    let area: f64 = edges.clone().map(|e| e.p1.x * e.p2.y - e.p2.x * e.p1.y).sum();
    if n < 3 || area.abs() < EPSILON * EPSILON {
        return distance;
    }
    let inside = edges.into_iter().all(|e| {
        let turn = e.vector().cross(&(*p - e.p1)).z;
        turn * area.signum() > 0.0
    });
    if inside { -distance } else { distance }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn front_wall() -> Triangle {
        Triangle::new(
            0,
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 1.0),
        )
    }

    fn top_face() -> Triangle {
        Triangle::new(
            1,
            Point::new(0.0, 0.0, 1.0),
            Point::new(1.0, 0.0, 1.0),
            Point::new(1.0, 1.0, 1.0),
        )
    }

    #[test]
    fn test_approaching_a_wall() {
        let cutter = CylindricalCutter::new(0.1).unwrap();
        let span = cutter
            .contact_span(
                Point::new(0.8, -1.0, 0.5),
                Vector::new(0.0, 1.0, 0.0),
                &front_wall(),
                0.0,
            )
            .unwrap()
            .expect("tool should hit the wall");
        assert!((span.enter.distance - 0.9).abs() < 1e-9, "enter {}", span.enter.distance);
        assert!((span.exit.distance - 1.1).abs() < 1e-9, "exit {}", span.exit.distance);
        assert_eq!(span.enter.point.y, 0.0);
        assert!((span.enter.point.x - 0.8).abs() < 1e-9);
        assert!(span.enter.point.z >= 0.5);
    }

    #[test]
    fn test_sliding_along_a_wall_only_touches() {
        let cutter = CylindricalCutter::new(0.1).unwrap();
        let start = Point::new(-1.0, -0.1, 0.5);
        let dir = Vector::new(1.0, 0.0, 0.0);
        let touching = cutter.contact_span(start, dir, &front_wall(), 0.0).unwrap();
        assert!(touching.is_some(), "touching counts without clearance");
        let free = cutter.contact_span(start, dir, &front_wall(), EPSILON).unwrap();
        assert!(free.is_none(), "touching is free with clearance");
    }

    #[test]
    fn test_triangle_below_tip_is_ignored() {
        let cutter = CylindricalCutter::new(0.5).unwrap();
        let span = cutter
            .contact_span(
                Point::new(0.5, -1.0, 1.5),
                Vector::new(0.0, 1.0, 0.0),
                &front_wall(),
                0.0,
            )
            .unwrap();
        assert!(span.is_none());
    }

    #[test]
    fn test_triangle_above_flutes_is_ignored() {
        let cutter = CylindricalCutter::new(0.5).unwrap().with_height(0.5).unwrap();
        let span = cutter
            .contact_span(
                Point::new(0.5, -1.0, 0.0),
                Vector::new(0.0, 1.0, 0.0),
                &top_face(),
                0.0,
            )
            .unwrap();
        assert!(span.is_none());
        assert_eq!(cutter.height(), Some(0.5));
    }

    #[test]
    fn test_zero_radius_blocked_inside_overhang() {
        let cutter = CylindricalCutter::new(0.0).unwrap();
        // passes right under the top face, through the middle of its shadow
        let span = cutter
            .contact_span(
                Point::new(-1.0, 0.2, 0.5),
                Vector::new(1.0, 0.0, 0.0),
                &top_face(),
                EPSILON,
            )
            .unwrap()
            .expect("axis crosses the shadow of the face");
        assert!((span.enter.distance - 1.2).abs() < 1e-9);
        assert!((span.exit.distance - 2.0).abs() < 1e-9);

        // running exactly along the shadow's border is free
        let border = cutter
            .contact_span(
                Point::new(-1.0, 0.0, 0.5),
                Vector::new(1.0, 0.0, 0.0),
                &top_face(),
                EPSILON,
            )
            .unwrap();
        assert!(border.is_none());
    }

    #[test]
    fn test_vertical_move_is_unsupported() {
        let cutter = CylindricalCutter::new(1.0).unwrap();
        let err = cutter
            .contact_span(
                Point::default(),
                Vector::new(0.0, 0.0, -1.0),
                &front_wall(),
                0.0,
            )
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedMove(_)));
    }

    #[test]
    fn test_negative_radius_is_rejected() {
        assert!(CylindricalCutter::new(-0.5).is_err());
        assert!(CylindricalCutter::new(1.0).unwrap().with_height(0.0).is_err());
    }

    #[test]
    fn test_moveto_records_location() {
        let mut cutter = CylindricalCutter::new(1.0).unwrap();
        assert_eq!(cutter.location(), None);
        cutter.moveto(Point::new(1.0, 2.0, 3.0));
        assert_eq!(cutter.location(), Some(Point::new(1.0, 2.0, 3.0)));
        assert_eq!(
            cutter.shape(),
            ToolShape::Cylinder {
                radius: 1.0,
                height: None
            }
        );
    }

    #[test]
    fn test_clip() {
        let triangle = front_wall();
        let above = clip(&triangle.points, 0.5, true);
        assert_eq!(above.len(), 3);
        assert!(above.iter().all(|p| p.z >= 0.5));
        let below = clip(&triangle.points, 0.5, false);
        assert_eq!(below.len(), 4);
        assert!(clip(&triangle.points, 2.0, true).is_empty());
    }

    #[test]
    fn test_signed_distance_xy() {
        let square = [
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 0.0, 0.0),
            Point::new(1.0, 1.0, 0.0),
            Point::new(0.0, 1.0, 0.0),
        ];
        assert!((signed_distance_xy(&Point::new(0.5, 0.25, 0.0), &square) + 0.25).abs() < 1e-12);
        assert!((signed_distance_xy(&Point::new(2.0, 0.5, 0.0), &square) - 1.0).abs() < 1e-12);
        assert_eq!(signed_distance_xy(&Point::new(0.5, 0.0, 0.0), &square), 0.0);
    }
}
