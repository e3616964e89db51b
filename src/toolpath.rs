//! Toolpath collection

use crate::geometry::Point;

/// Ordered points of one continuous tool motion
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    /// Tool locations in machining order
    pub points: Vec<Point>,
}

impl Path {
    /// Number of points
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the path has no points
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Total travel along the path
    pub fn length(&self) -> f64 {
        self.points.windows(2).map(|w| w[0].distance(&w[1])).sum()
    }
}

/// Main direction of a group of scanlines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Along X
    X,
    /// Along Y
    Y,
    /// Along Z
    Z,
}

/// Receives tool locations from a path generator
///
/// Calls arrive nested: `new_direction`, then any number of
/// `new_scanline` / `append` / `end_scanline` groups, then `end_direction`.
/// `finish` may follow each direction.
pub trait PathAccumulator {
    /// A new group of scanlines begins
    fn new_direction(&mut self, axis: Axis);

    /// The current group of scanlines is complete
    fn end_direction(&mut self);

    /// A new continuous motion begins
    fn new_scanline(&mut self);

    /// Add a tool location to the current scanline
    fn append(&mut self, point: Point);

    /// The current continuous motion is complete
    fn end_scanline(&mut self);

    /// No more points for now
    fn finish(&mut self);

    /// Paths collected so far
    fn paths(&self) -> &[Path];

    /// The scanline being collected, if the accumulator keeps one
    fn current(&self) -> Option<&Path> {
        None
    }
}

/// Keeps every non-empty scanline as one [`Path`]
///
/// Consecutive duplicate points are dropped.
#[derive(Debug, Clone, Default)]
pub struct SimplePathAccumulator {
    paths: Vec<Path>,
    current: Option<Path>,
    direction: Option<Axis>,
}

impl SimplePathAccumulator {
    /// Create an empty accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Direction of the group being collected, if any
    pub fn direction(&self) -> Option<Axis> {
        self.direction
    }

    /// Take the collected paths
    pub fn into_paths(mut self) -> Vec<Path> {
        self.end_scanline();
        self.paths
    }
}

impl PathAccumulator for SimplePathAccumulator {
    fn new_direction(&mut self, axis: Axis) {
        self.direction = Some(axis);
    }

    fn end_direction(&mut self) {
        self.end_scanline();
        self.direction = None;
    }

    fn new_scanline(&mut self) {
        self.end_scanline();
        self.current = Some(Path::default());
    }

    fn append(&mut self, point: Point) {
        let path = self.current.get_or_insert_with(Path::default);
        if path.points.last() != Some(&point) {
            path.points.push(point);
        }
    }

    fn end_scanline(&mut self) {
        if let Some(path) = self.current.take() {
            if !path.is_empty() {
                self.paths.push(path);
            }
        }
    }

    fn finish(&mut self) {
        self.end_scanline();
    }

    fn paths(&self) -> &[Path] {
        &self.paths
    }

    fn current(&self) -> Option<&Path> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scanlines_become_paths() {
        let mut pa = SimplePathAccumulator::new();
        pa.new_direction(Axis::X);
        assert_eq!(pa.direction(), Some(Axis::X));
        pa.new_scanline();
        pa.append(Point::new(0.0, 0.0, 0.0));
        pa.append(Point::new(1.0, 0.0, 0.0));
        pa.append(Point::new(1.0, 0.0, 0.0));
        pa.end_scanline();
        // empty scanlines leave no trace
        pa.new_scanline();
        pa.end_scanline();
        pa.new_scanline();
        pa.append(Point::new(5.0, 0.0, 0.0));
        pa.end_direction();
        pa.finish();

        assert_eq!(pa.direction(), None);
        assert_eq!(pa.paths().len(), 2);
        assert_eq!(pa.paths()[0].len(), 2);
        assert_eq!(pa.paths()[0].length(), 1.0);
        assert_eq!(pa.paths()[1].points, vec![Point::new(5.0, 0.0, 0.0)]);
    }

    #[test]
    fn test_new_scanline_closes_the_open_one() {
        let mut pa = SimplePathAccumulator::new();
        pa.new_scanline();
        pa.append(Point::new(0.0, 0.0, 0.0));
        assert_eq!(pa.current().map(Path::len), Some(1));
        assert!(pa.paths().is_empty());
        pa.new_scanline();
        pa.append(Point::new(2.0, 0.0, 0.0));
        assert_eq!(pa.paths().len(), 1);
        assert_eq!(pa.current().map(|p| p.points[0]), Some(Point::new(2.0, 0.0, 0.0)));
        let paths = pa.into_paths();
        assert_eq!(paths.len(), 2);
        assert!(!paths[1].is_empty());
    }
}
