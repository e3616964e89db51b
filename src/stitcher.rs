//! Stitching of offset waterline edges into closed contours
//!
//! Every triangle that touches a layer contributes a raw waterline edge and
//! the same edge pushed outward by the tool. Raw edges of neighbouring
//! triangles share endpoints exactly, which is what chains them together.
//! The offset edges of a chain generally overlap (convex corners) or leave
//! gaps (concave corners); [`WaterlineTriangles::extend_shifted_lines`]
//! trims or extends them to meet.

use tracing::trace;

use crate::config::EPSILON;
use crate::geometry::Line;

/// One triangle's contribution to a layer
#[derive(Debug, Clone, Copy, PartialEq)]
struct Record {
    waterline: Line,
    shifted: Option<Line>,
}

/// Raw and offset waterline edges of one layer
///
/// # Example
///
/// ```
/// use waterline::geometry::{Line, Point};
/// use waterline::stitcher::WaterlineTriangles;
///
/// let a = Point::new(0.0, 0.0, 0.0);
/// let b = Point::new(1.0, 0.0, 0.0);
/// let mut triangles = WaterlineTriangles::new();
/// triangles.add(Line::new(a, b), Line::new(a, b));
/// triangles.add(Line::new(a, b), Line::new(a, b));
/// assert_eq!(triangles.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct WaterlineTriangles {
    records: Vec<Record>,
}

impl WaterlineTriangles {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored edges
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether no edge is stored
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Add a raw edge and its offset
    ///
    /// A raw edge equal to a stored one is ignored, as is one lying within a
    /// stored edge of the same direction. Stored edges lying within the new
    /// one are dropped.
    pub fn add(&mut self, waterline: Line, shifted: Line) {
        if self
            .records
            .iter()
            .any(|r| r.waterline == waterline || covers(&r.waterline, &waterline))
        {
            trace!(%waterline, "ignoring known waterline edge");
            return;
        }
        self.records.retain(|r| !covers(&waterline, &r.waterline));
        self.records.push(Record {
            waterline,
            shifted: Some(shifted),
        });
    }

    /// Partition the records into chains of raw edges
    ///
    /// Within a chain, each edge ends exactly where the next one starts. A
    /// chain grows backwards and then forwards from its seed until it closes
    /// or no matching edge is left.
    pub fn groups(&self) -> Vec<Vec<usize>> {
        let mut queue: Vec<usize> = (0..self.records.len()).collect();
        let mut groups = Vec::new();

        while !queue.is_empty() {
            let mut group = std::collections::VecDeque::from([queue.remove(0)]);
            loop {
                if self.is_closed_chain(group.make_contiguous()) {
                    break;
                }
                let head = self.records[group[0]].waterline.p1;
                if let Some(pos) = queue
                    .iter()
                    .position(|&i| self.records[i].waterline.p2 == head)
                {
                    group.push_front(queue.remove(pos));
                    continue;
                }
                let tail = self.records[group[group.len() - 1]].waterline.p2;
                if let Some(pos) = queue
                    .iter()
                    .position(|&i| self.records[i].waterline.p1 == tail)
                {
                    group.push_back(queue.remove(pos));
                    continue;
                }
                break;
            }
            groups.push(group.into_iter().collect());
        }
        groups
    }

    /// Trim or extend neighbouring offset edges so that they meet
    ///
    /// Offset edges whose junction lies behind them are dropped.
    pub fn extend_shifted_lines(&mut self) {
        for group in self.groups() {
            let closed = self.is_closed_chain(&group);
            let len = group.len() as isize;
            let mut index: isize = 0;

            while index < len {
                let current = group[index.rem_euclid(len) as usize];
                let Some(cur) = self.records[current].shifted else {
                    index += 1;
                    continue;
                };
                let Some(neighbour) = self.right_neighbour(&group, index, closed) else {
                    break;
                };
                let Some(nb) = self.records[neighbour].shifted else {
                    break;
                };
                if cur.p2 == nb.p1 {
                    index += 1;
                    continue;
                }

                let crossing = cur
                    .intersection(&nb, true)
                    .zip(nb.intersection(&cur, true));
                match crossing {
                    Some(((_, dist), _)) if dist < EPSILON => {
                        self.records[current].shifted = None;
                        index = step_back(index, closed);
                    }
                    Some((_, (_, dist2))) if dist2 > 1.0 - EPSILON => {
                        self.records[neighbour].shifted = None;
                    }
                    Some(((point, _), _)) => {
                        self.records[current].shifted = Some(Line::new(cur.p1, point));
                        self.records[neighbour].shifted = Some(Line::new(point, nb.p2));
                        index += 1;
                    }
                    None if cur.dist_to_point(&nb.p1) < EPSILON => {
                        // collinear: run straight into the neighbour
                        if cur.parameter_of(&nb.p1) <= EPSILON {
                            self.records[current].shifted = None;
                            index = step_back(index, closed);
                        } else {
                            self.records[current].shifted = Some(Line::new(cur.p1, nb.p1));
                            index += 1;
                        }
                    }
                    None => {
                        trace!(current = %cur, neighbour = %nb, "parallel offsets left apart");
                        index += 1;
                    }
                }
            }
        }
    }

    /// Offset edges that survived, chain by chain
    pub fn shifted_lines(&self) -> Vec<Line> {
        self.groups()
            .into_iter()
            .flatten()
            .filter_map(|i| self.records[i].shifted)
            .collect()
    }

    fn is_closed_chain(&self, group: &[usize]) -> bool {
        match (group.first(), group.last()) {
            (Some(&first), Some(&last)) => {
                self.records[first].waterline.p1 == self.records[last].waterline.p2
            }
            _ => false,
        }
    }

    /// Next record after `index` in `group` that still has an offset edge
    fn right_neighbour(&self, group: &[usize], index: isize, closed: bool) -> Option<usize> {
        let len = group.len() as isize;
        let range = if closed {
            index + 1..index + len
        } else {
            index + 1..len
        };
        range
            .map(|i| group[i.rem_euclid(len) as usize])
            .find(|&id| self.records[id].shifted.is_some())
    }
}

/// Whether `inner` lies on `outer` and runs the same way
fn covers(outer: &Line, inner: &Line) -> bool {
    let (Some(a), Some(b)) = (outer.dir(), inner.dir()) else {
        return false;
    };
    a.dot(&b) > 1.0 - EPSILON && outer.is_point_inside(&inner.p1) && outer.is_point_inside(&inner.p2)
}

/// Step back one position; only closed chains wrap past the start
fn step_back(index: isize, closed: bool) -> isize {
    if closed { index - 1 } else { (index - 1).max(0) }
}
