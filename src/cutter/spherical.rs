//! Ball nose cutter

use super::{
    ContactSpan, Cutter, CutterContact, ToolShape, ball_range, check_radius, grazing, overlap, slab,
    touching_slab,
};
use crate::config::EPSILON;
use crate::error::Result;
use crate::geometry::{Point, Triangle, Vector};

/// Ball nose cutter
///
/// The tool is a ball of `radius` whose lowest point is the tool location.
/// Moves may go in any direction. The swept ball overlaps a triangle while
/// its centre is within `radius` of it, i.e. inside the union of the three
/// corner balls, the three edge cylinders and the face slab.
///
/// Without clearance, a ball passing within [`EPSILON`] of a triangle
/// touches it at the closest approach.
///
/// Waterlines with a ball nose only follow walls whose contact lies at the
/// layer height, i.e. vertical walls. On a sloped wall the ball rests against
/// the surface above the layer, so the edge is treated as shadowed and the
/// layer yields no contour there.
#[derive(Debug, Clone, PartialEq)]
pub struct SphericalCutter {
    radius: f64,
    location: Option<Point>,
}

impl SphericalCutter {
    /// Create a ball nose cutter
    ///
    /// # Errors
    ///
    /// [`crate::Error::InvalidGeometry`] for a negative or non-finite radius.
    pub fn new(radius: f64) -> Result<Self> {
        check_radius(radius)?;
        Ok(Self {
            radius,
            location: None,
        })
    }
}

impl Cutter for SphericalCutter {
    fn radius(&self) -> f64 {
        self.radius
    }

    fn shape(&self) -> ToolShape {
        ToolShape::Sphere {
            radius: self.radius,
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
        let Some(dir) = direction.normalized() else {
            return Ok(None);
        };
        let centre = start + Vector::up() * self.radius;
        let radius = (self.radius - clearance).max(0.0);
        let touch = if clearance > 0.0 { 0.0 } else { EPSILON };
        let mut span = None;

        for corner in &triangle.points {
            if let Some((t0, t1)) = ball_range(&(centre - *corner), &dir, radius, touch) {
                ContactSpan::widen(
                    &mut span,
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
        for edge in triangle.edges() {
            cylinder_span(&mut span, &centre, &dir, &edge.p1, &edge.p2, radius, touch);
        }
        face_span(&mut span, &centre, &dir, triangle, radius, touch);

        let Some(span) = span else {
            return Ok(None);
        };
        if clearance > 0.0 {
            let middle = (span.enter.distance + span.exit.distance) / 2.0;
            let probe = centre + dir * middle;
            if triangle.distance_to(&probe) >= self.radius - clearance {
                return Ok(None);
            }
        }
        Ok(Some(span))
    }
}

/// Widen `span` by the travel where the centre is within `radius` of the
/// segment `a..b` (excluding the end caps)
fn cylinder_span(
    span: &mut Option<ContactSpan>,
    centre: &Point,
    dir: &Vector,
    a: &Point,
    b: &Point,
    radius: f64,
    touch: f64,
) {
    let axis = *b - *a;
    let len_sq = axis.norm_squared();
    if len_sq == 0.0 {
        return;
    }
    let w = *centre - *a;
    let (we, de) = (w.dot(&axis), dir.dot(&axis));
    let w_perp = w - axis * (we / len_sq);
    let d_perp = *dir - axis * (de / len_sq);

    let qa = d_perp.norm_squared();
    let qb = w_perp.dot(&d_perp);
    let qc = w_perp.norm_squared() - radius * radius;
    let slack = grazing(radius, touch);
    let radial = if qa < 1e-24 {
        (qc <= slack).then_some((f64::NEG_INFINITY, f64::INFINITY))
    } else {
        let disc = qb * qb - qa * qc;
        (disc >= -qa * slack).then(|| {
            let root = disc.max(0.0).sqrt();
            ((-qb - root) / qa, (-qb + root) / qa)
        })
    };
    let axial = slab(we, de, 0.0, len_sq);
    let Some((t0, t1)) = radial.zip(axial).and_then(|(p, q)| overlap(p, q)) else {
        return;
    };
    let contact = |t: f64| CutterContact {
        distance: t,
        point: a.lerp(b, ((we + de * t) / len_sq).clamp(0.0, 1.0)),
    };
    ContactSpan::widen(span, contact(t0), contact(t1));
}

/// Widen `span` by the travel where the centre is inside the prism of
/// thickness `2 * radius` over the triangle's face
fn face_span(
    span: &mut Option<ContactSpan>,
    centre: &Point,
    dir: &Vector,
    triangle: &Triangle,
    radius: f64,
    touch: f64,
) {
    let normal = triangle.normal;
    let origin = triangle.points[0];
    let height = (*centre - origin).dot(&normal);
    let mut range = match touching_slab(height, dir.dot(&normal), -radius, radius, touch) {
        Some(range) => range,
        None => return,
    };
    for edge in triangle.edges() {
        let inward = normal.cross(&edge.vector());
        let side = touching_slab(
            (*centre - edge.p1).dot(&inward),
            dir.dot(&inward),
            0.0,
            f64::INFINITY,
            touch * edge.len(),
        );
        match side.and_then(|side| overlap(range, side)) {
            Some(next) => range = next,
            None => return,
        }
    }
    let (t0, t1) = range;
    if !(t0.is_finite() && t1.is_finite()) {
        return;
    }
    let contact = |t: f64| {
        let c = *centre + *dir * t;
        CutterContact {
            distance: t,
            point: c - normal * (c - origin).dot(&normal),
        }
    };
    ContactSpan::widen(span, contact(t0), contact(t1));
}
