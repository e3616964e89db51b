//! Cutting tools
//!
//! A [`Cutter`] answers one geometric question: moving the tool in a straight
//! line, over which stretch of travel does it overlap a given triangle? The
//! collision oracles build everything else on top of that.
//!
//! The tool's reference point (its *location*) is the centre of the tool tip.

mod cylindrical;
mod spherical;

pub use cylindrical::CylindricalCutter;
pub use spherical::SphericalCutter;

use crate::error::{Error, Result};
use crate::geometry::{Point, Triangle, Vector};

/// Geometric description of a tool, used by backends that need a solid shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToolShape {
    /// Flat end mill standing on its tip; `height` of `None` is unbounded
    Cylinder {
        /// Tool radius
        radius: f64,
        /// Flute length above the tip
        height: Option<f64>,
    },
    /// Ball nose; the ball's lowest point is the tip
    Sphere {
        /// Ball radius
        radius: f64,
    },
}

impl ToolShape {
    /// Radius of the tool
    pub fn radius(&self) -> f64 {
        match *self {
            ToolShape::Cylinder { radius, .. } | ToolShape::Sphere { radius } => radius,
        }
    }
}

/// Tool/triangle contact at one position along a move
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutterContact {
    /// Travel distance from the start of the move
    pub distance: f64,
    /// Touching point on the triangle
    pub point: Point,
}

/// Stretch of travel over which the tool overlaps one triangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactSpan {
    /// First contact
    pub enter: CutterContact,
    /// Last contact
    pub exit: CutterContact,
}

impl ContactSpan {
    /// Travel distance between first and last contact
    pub fn length(&self) -> f64 {
        self.exit.distance - self.enter.distance
    }

    fn widen(span: &mut Option<ContactSpan>, enter: CutterContact, exit: CutterContact) {
        match span {
            None => *span = Some(ContactSpan { enter, exit }),
            Some(current) => {
                if enter.distance < current.enter.distance {
                    current.enter = enter;
                }
                if exit.distance > current.exit.distance {
                    current.exit = exit;
                }
            }
        }
    }
}

/// A cutting tool that can be swept along straight moves
pub trait Cutter {
    /// Tool radius
    fn radius(&self) -> f64;

    /// Solid shape of the tool
    fn shape(&self) -> ToolShape;

    /// Last location passed to [`Cutter::moveto`]
    fn location(&self) -> Option<Point>;

    /// Record the tool's current location
    fn moveto(&mut self, location: Point);

    /// Travel interval over which the tool overlaps `triangle`
    ///
    /// The tool moves from `start` along the unit vector `direction`.
    /// Distances may be negative when the tool already overlaps the triangle
    /// at `start`.
    ///
    /// With `clearance == 0` touching counts as contact and single-point
    /// spans are reported. With a positive `clearance` a span is only
    /// reported where the tool penetrates the triangle by more than
    /// `clearance`.
    fn contact_span(
        &self,
        start: Point,
        direction: Vector,
        triangle: &Triangle,
        clearance: f64,
    ) -> Result<Option<ContactSpan>>;
}

pub(crate) fn check_radius(radius: f64) -> Result<()> {
    if radius.is_finite() && radius >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidGeometry(format!(
            "tool radius must be finite and non-negative, got {}",
            radius
        )))
    }
}

/// Parameter range where `value + t * rate` stays within `[lo, hi]`
///
/// A zero rate gives an unbounded range if the value is inside.
fn slab(value: f64, rate: f64, lo: f64, hi: f64) -> Option<(f64, f64)> {
    if rate == 0.0 {
        return (lo <= value && value <= hi).then_some((f64::NEG_INFINITY, f64::INFINITY));
    }
    let ta = (lo - value) / rate;
    let tb = (hi - value) / rate;
    Some((ta.min(tb), ta.max(tb)))
}

/// Like [`slab`], but a parallel value outside `[lo, hi]` by at most
/// `touch` still counts as inside
fn touching_slab(value: f64, rate: f64, lo: f64, hi: f64, touch: f64) -> Option<(f64, f64)> {
    slab(value, rate, lo, hi).or_else(|| slab(value, rate, lo - touch, hi + touch))
}

/// Squared-distance slack of a miss by `touch` around a radius
///
/// `r^2 - (r + touch)^2`, negated.
fn grazing(radius: f64, touch: f64) -> f64 {
    touch * (2.0 * radius + touch)
}

/// Intersection of two parameter ranges
fn overlap(a: (f64, f64), b: (f64, f64)) -> Option<(f64, f64)> {
    let lo = a.0.max(b.0);
    let hi = a.1.min(b.1);
    (lo <= hi).then_some((lo, hi))
}

/// Parameter range where `offset + t * dir` lies within `radius` of the
/// origin; `dir` must be a unit vector
///
/// A line missing the ball by at most `touch` grazes it at its closest
/// approach.
fn ball_range(offset: &Vector, dir: &Vector, radius: f64, touch: f64) -> Option<(f64, f64)> {
    let b = offset.dot(dir);
    let c = offset.norm_squared() - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return (disc >= -grazing(radius, touch)).then_some((-b, -b));
    }
    let root = disc.sqrt();
    Some((-b - root, -b + root))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slab() {
        assert_eq!(slab(0.0, 1.0, -1.0, 1.0), Some((-1.0, 1.0)));
        assert_eq!(slab(0.0, -2.0, -1.0, 1.0), Some((-0.5, 0.5)));
        assert_eq!(
            slab(0.5, 0.0, 0.0, 1.0),
            Some((f64::NEG_INFINITY, f64::INFINITY))
        );
        assert_eq!(slab(2.0, 0.0, 0.0, 1.0), None);
        assert_eq!(touching_slab(1.0 + 1e-12, 0.0, 0.0, 1.0, 0.0), None);
        assert_eq!(
            touching_slab(1.0 + 1e-12, 0.0, 0.0, 1.0, 1e-9),
            Some((f64::NEG_INFINITY, f64::INFINITY))
        );
        // moving values are unaffected by the tolerance
        assert_eq!(touching_slab(0.0, 1.0, -1.0, 1.0, 0.5), Some((-1.0, 1.0)));
    }

    #[test]
    fn test_ball_range() {
        let offset = Vector::new(-5.0, 0.0, 0.0);
        let dir = Vector::new(1.0, 0.0, 0.0);
        assert_eq!(ball_range(&offset, &dir, 1.0, 0.0), Some((4.0, 6.0)));
        let miss = Vector::new(-5.0, 2.0, 0.0);
        assert_eq!(ball_range(&miss, &dir, 1.0, 0.0), None);
        // passing one unit plus a hair away grazes with a tolerance
        let graze = Vector::new(-5.0, 1.0 + 1e-12, 0.0);
        assert_eq!(ball_range(&graze, &dir, 1.0, 0.0), None);
        assert_eq!(ball_range(&graze, &dir, 1.0, 1e-9), Some((5.0, 5.0)));
    }

    #[test]
    fn test_widen_keeps_extremes() {
        let contact = |distance| CutterContact {
            distance,
            point: Point::default(),
        };
        let mut span = None;
        ContactSpan::widen(&mut span, contact(1.0), contact(2.0));
        ContactSpan::widen(&mut span, contact(0.5), contact(1.5));
        ContactSpan::widen(&mut span, contact(1.2), contact(3.0));
        let span = span.unwrap();
        assert_eq!(span.enter.distance, 0.5);
        assert_eq!(span.exit.distance, 3.0);
        assert_eq!(span.length(), 2.5);
    }

    #[test]
    fn test_check_radius() {
        assert!(check_radius(0.0).is_ok());
        assert!(check_radius(-1.0).is_err());
        assert!(check_radius(f64::INFINITY).is_err());
    }
}
