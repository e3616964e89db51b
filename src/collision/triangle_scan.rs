//! Exact sweep against the model's triangles

use tracing::trace;

use super::{
    BlockedRange, CollisionEvent, CollisionOracle, Contact, PathEvent, free_stretch_events,
    merge_ranges,
};
use crate::config::EPSILON;
use crate::cutter::Cutter;
use crate::error::Result;
use crate::geometry::{Point, Rect};
use crate::model::Model;

/// Exact collision oracle over a [`Model`]
///
/// Every triangle near the move is asked for its [contact span]; the union
/// of all spans is blocked, the rest is free.
///
/// [contact span]: crate::cutter::Cutter::contact_span
pub struct TriangleScan<'a> {
    model: &'a dyn Model,
}

impl<'a> TriangleScan<'a> {
    /// Create an oracle over `model`
    pub fn new(model: &'a dyn Model) -> Self {
        Self { model }
    }

    /// Free stretches of a move, with the touched triangle on every boundary
    ///
    /// Unlike [`CollisionOracle::free_paths`], touching counts as contact: a
    /// tool resting against a wall at `start` yields an `Exit` event at
    /// `start` naming the wall.
    pub fn collisions(
        &self,
        cutter: &dyn Cutter,
        start: Point,
        end: Point,
    ) -> Result<Vec<CollisionEvent>> {
        self.sweep(cutter, start, end, 0.0)
    }

    fn sweep(
        &self,
        cutter: &dyn Cutter,
        start: Point,
        end: Point,
        clearance: f64,
    ) -> Result<Vec<CollisionEvent>> {
        let Some(dir) = (end - start).normalized() else {
            return Ok(Vec::new());
        };
        let length = start.distance(&end);
        let area = Rect::spanning(&start, &end).expanded(cutter.radius() + EPSILON);

        let mut blocked = Vec::new();
        let candidates = self.model.triangles_within(&area);
        for triangle in &candidates {
            let Some(span) = cutter.contact_span(start, dir, triangle, clearance)? else {
                continue;
            };
            if span.exit.distance < -EPSILON || span.enter.distance > length + EPSILON {
                continue;
            }
            blocked.push(BlockedRange {
                from: span.enter.distance,
                to: span.exit.distance,
                enter: Some(Contact {
                    triangle: triangle.id,
                    point: span.enter.point,
                }),
                exit: Some(Contact {
                    triangle: triangle.id,
                    point: span.exit.point,
                }),
            });
        }

        let hits = blocked.len();
        let blocked = merge_ranges(blocked);
        trace!(
            candidates = candidates.len(),
            hits,
            blocked = blocked.len(),
            "swept segment"
        );
        Ok(free_stretch_events(start, end, &blocked))
    }
}

impl CollisionOracle for TriangleScan<'_> {
    fn free_paths(&self, cutter: &dyn Cutter, start: Point, end: Point) -> Result<Vec<PathEvent>> {
        Ok(self
            .sweep(cutter, start, end, EPSILON)?
            .into_iter()
            .map(PathEvent::from)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::Transition;
    use crate::cutter::{CylindricalCutter, SphericalCutter};
    use crate::geometry::Point;
    use crate::mesh::Mesh;
    use crate::model::TriangleModel;

    fn cube() -> TriangleModel {
        TriangleModel::from_mesh(&Mesh::cuboid(
            Point::new(0.0, 0.0, 0.0),
            Point::new(1.0, 1.0, 1.0),
        ))
        .unwrap()
    }

    #[test]
    fn test_move_through_cube_is_split() {
        let model = cube();
        let scan = TriangleScan::new(&model);
        let cutter = CylindricalCutter::new(0.25).unwrap();
        let events = scan
            .free_paths(
                &cutter,
                Point::new(-2.0, 0.5, 0.5),
                Point::new(3.0, 0.5, 0.5),
            )
            .unwrap();
        assert_eq!(events.len(), 4, "events: {:?}", events);
        assert!((events[1].location.x - -0.25).abs() < 1e-9);
        assert!((events[2].location.x - 1.25).abs() < 1e-9);
        assert_eq!(events[3].transition, Transition::End);
    }

    #[test]
    fn test_move_past_cube_is_free() {
        let model = cube();
        let scan = TriangleScan::new(&model);
        let cutter = SphericalCutter::new(0.25).unwrap();
        let events = scan
            .free_paths(
                &cutter,
                Point::new(-2.0, -0.25, 0.5),
                Point::new(3.0, -0.25, 0.5),
            )
            .unwrap();
        assert_eq!(events.len(), 2, "touching the cube must not block");
    }

    #[test]
    fn test_collisions_report_touching_triangle() {
        let model = cube();
        let scan = TriangleScan::new(&model);
        // short flutes keep the top face out of reach
        let cutter = CylindricalCutter::new(0.1).unwrap().with_height(0.2).unwrap();
        // starts resting against the front wall, moves away from it
        let events = scan
            .collisions(
                &cutter,
                Point::new(0.5, -0.1, 0.5),
                Point::new(0.5, -3.0, 0.5),
            )
            .unwrap();
        assert_eq!(events[0].transition, Transition::Exit);
        let contact = events[0].contact.expect("exit event carries a contact");
        assert!((contact.point.y - 0.0).abs() < 1e-9);
        let wall = &model.triangles()[contact.triangle];
        assert!(wall.normal.y < -0.9, "contact should be on the front wall");
    }

    #[test]
    fn test_zero_length_move() {
        let model = cube();
        let scan = TriangleScan::new(&model);
        let cutter = CylindricalCutter::new(0.1).unwrap();
        let p = Point::new(5.0, 5.0, 0.5);
        assert!(scan.free_paths(&cutter, p, p).unwrap().is_empty());
    }
}
