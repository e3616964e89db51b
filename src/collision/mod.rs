//! Collision oracles
//!
//! An oracle sweeps a cutter along a straight segment and reports where the
//! tool can move without cutting into the model. Results are flat event
//! lists that alternate between the start (even index) and the end (odd
//! index) of a free stretch.
//!
//! Two backends implement [`CollisionOracle`]:
//!
//! - [`TriangleScan`]: exact sweep against every nearby triangle. It also
//!   offers [`TriangleScan::collisions`], which reports the triangle and
//!   contact point of every hit; the waterline engine uses that for tool
//!   offsetting.
//! - [`AcceleratedScan`] (feature `mesh-ops`): parry3d mesh queries with
//!   recursive bisection of the segment.

#[cfg(feature = "mesh-ops")]
mod accelerated;
mod triangle_scan;

#[cfg(feature = "mesh-ops")]
pub use accelerated::AcceleratedScan;
pub use triangle_scan::TriangleScan;

use crate::config::EPSILON;
use crate::cutter::Cutter;
use crate::error::Result;
use crate::geometry::{Point, Vector};

/// What happens to the tool at an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Start of the queried segment, tool free
    Start,
    /// End of the queried segment, tool free
    End,
    /// Tool starts touching the model
    Enter,
    /// Tool stops touching the model
    Exit,
}

impl Transition {
    /// Whether a free stretch begins here
    pub fn opens_free_stretch(&self) -> bool {
        matches!(self, Transition::Start | Transition::Exit)
    }
}

/// Boundary of a free stretch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathEvent {
    /// Tool location
    pub location: Point,
    /// Kind of boundary
    pub transition: Transition,
}

/// A touching point between tool and model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Id of the touched triangle
    pub triangle: usize,
    /// Touching point on the triangle
    pub point: Point,
}

/// Boundary of a free stretch with the contact that caused it
///
/// Events without a contact are segment boundaries, not collisions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionEvent {
    /// Tool location
    pub location: Point,
    /// Travel distance from the segment start
    pub distance: f64,
    /// Kind of boundary
    pub transition: Transition,
    /// Touched triangle, for `Enter` and `Exit`
    pub contact: Option<Contact>,
}

impl From<CollisionEvent> for PathEvent {
    fn from(event: CollisionEvent) -> Self {
        PathEvent {
            location: event.location,
            transition: event.transition,
        }
    }
}

/// Sweeps a cutter along segments of the model
pub trait CollisionOracle {
    /// Free stretches of the move from `start` to `end`
    ///
    /// Even entries open a free stretch, odd entries close it. An empty list
    /// means the move is blocked throughout or has zero length. Touching the
    /// model (within [`EPSILON`]) does not block.
    fn free_paths(&self, cutter: &dyn Cutter, start: Point, end: Point) -> Result<Vec<PathEvent>>;
}

/// Pair up an alternating event list into `(from, to)` free stretches
pub fn free_stretches(events: &[PathEvent]) -> impl Iterator<Item = (Point, Point)> + '_ {
    events
        .chunks_exact(2)
        .map(|pair| (pair[0].location, pair[1].location))
}

/// Travel range over which the tool is blocked
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct BlockedRange {
    pub from: f64,
    pub to: f64,
    pub enter: Option<Contact>,
    pub exit: Option<Contact>,
}

/// Sort ranges and merge those that overlap or nearly touch
pub(crate) fn merge_ranges(mut ranges: Vec<BlockedRange>) -> Vec<BlockedRange> {
    ranges.sort_by(|a, b| a.from.total_cmp(&b.from));
    let mut merged: Vec<BlockedRange> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if range.from <= last.to + EPSILON => {
                if range.to > last.to {
                    last.to = range.to;
                    last.exit = range.exit;
                }
            }
            _ => merged.push(range),
        }
    }
    merged
}

/// Alternating events for the free stretches between sorted, merged ranges
pub(crate) fn free_stretch_events(
    start: Point,
    end: Point,
    blocked: &[BlockedRange],
) -> Vec<CollisionEvent> {
    let length = start.distance(&end);
    let dir = if length > 0.0 {
        (end - start) * (1.0 / length)
    } else {
        Vector::default()
    };
    let event = |distance: f64, transition: Transition, contact: Option<Contact>| {
        let location = match transition {
            Transition::Start => start,
            Transition::End => end,
            Transition::Enter | Transition::Exit => start + dir * distance,
        };
        CollisionEvent {
            location,
            distance,
            transition,
            contact,
        }
    };

    let mut events = Vec::new();
    // where the pending free stretch begins
    let mut open = Some((0.0, Transition::Start, None));
    for range in blocked {
        if let Some((from, transition, contact)) = open.take() {
            if range.from > from + EPSILON {
                events.push(event(from, transition, contact));
                events.push(event(range.from.min(length), Transition::Enter, range.enter));
            }
        }
        if range.to >= length - EPSILON {
            return events;
        }
        open = Some((range.to.max(0.0), Transition::Exit, range.exit));
    }
    if let Some((from, transition, contact)) = open {
        if length > from + EPSILON {
            events.push(event(from, transition, contact));
            events.push(event(length, Transition::End, None));
        }
    }
    events
}
