//! Axis-aligned boxes and rectangles

use super::Point;
use crate::config::EPSILON;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Smallest X
    pub minx: f64,
    /// Largest X
    pub maxx: f64,
    /// Smallest Y
    pub miny: f64,
    /// Largest Y
    pub maxy: f64,
    /// Smallest Z
    pub minz: f64,
    /// Largest Z
    pub maxz: f64,
}

/// Axis-aligned rectangle in the XY plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Smallest X
    pub minx: f64,
    /// Largest X
    pub maxx: f64,
    /// Smallest Y
    pub miny: f64,
    /// Largest Y
    pub maxy: f64,
}

impl Bounds {
    /// Create a box from its extents
    pub const fn new(minx: f64, maxx: f64, miny: f64, maxy: f64, minz: f64, maxz: f64) -> Self {
        Self {
            minx,
            maxx,
            miny,
            maxy,
            minz,
            maxz,
        }
    }

    /// Smallest box containing all points, `None` for an empty iterator
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Bounds::new(first.x, first.x, first.y, first.y, first.z, first.z);
        for p in iter {
            bounds.include(p);
        }
        Some(bounds)
    }

    /// Grow the box to contain `p`
    pub fn include(&mut self, p: &Point) {
        self.minx = self.minx.min(p.x);
        self.maxx = self.maxx.max(p.x);
        self.miny = self.miny.min(p.y);
        self.maxy = self.maxy.max(p.y);
        self.minz = self.minz.min(p.z);
        self.maxz = self.maxz.max(p.z);
    }

    /// Whether `p` lies inside the box, with [`EPSILON`] tolerance
    pub fn contains(&self, p: &Point) -> bool {
        p.x >= self.minx - EPSILON
            && p.x <= self.maxx + EPSILON
            && p.y >= self.miny - EPSILON
            && p.y <= self.maxy + EPSILON
            && p.z >= self.minz - EPSILON
            && p.z <= self.maxz + EPSILON
    }

    /// Length of the space diagonal
    pub fn diagonal(&self) -> f64 {
        let dx = self.maxx - self.minx;
        let dy = self.maxy - self.miny;
        let dz = self.maxz - self.minz;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// The larger of the X and Y extents
    pub fn max_xy_extent(&self) -> f64 {
        (self.maxx - self.minx).max(self.maxy - self.miny)
    }

    /// XY footprint of the box
    pub fn xy(&self) -> Rect {
        Rect::new(self.minx, self.maxx, self.miny, self.maxy)
    }

    /// Same XY footprint, flattened to the single height `z`
    pub fn at_z(&self, z: f64) -> Bounds {
        Bounds {
            minz: z,
            maxz: z,
            ..*self
        }
    }
}

impl Rect {
    /// Create a rectangle from its extents
    pub const fn new(minx: f64, maxx: f64, miny: f64, maxy: f64) -> Self {
        Self {
            minx,
            maxx,
            miny,
            maxy,
        }
    }

    /// Rectangle grown by `margin` on every side
    pub fn expanded(&self, margin: f64) -> Rect {
        Rect::new(
            self.minx - margin,
            self.maxx + margin,
            self.miny - margin,
            self.maxy + margin,
        )
    }

    /// Whether the rectangle overlaps the XY footprint of `bounds`
    pub fn overlaps(&self, bounds: &Bounds) -> bool {
        bounds.maxx >= self.minx
            && bounds.minx <= self.maxx
            && bounds.maxy >= self.miny
            && bounds.miny <= self.maxy
    }

    /// Smallest rectangle containing the XY projections of both points
    pub fn spanning(a: &Point, b: &Point) -> Rect {
        Rect::new(a.x.min(b.x), a.x.max(b.x), a.y.min(b.y), a.y.max(b.y))
    }
}
