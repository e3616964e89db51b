//! parry3d backed oracle with recursive bisection

use parry3d::na::Isometry3;
use parry3d::query;
use parry3d::shape::TriMesh;
use tracing::{debug, trace};

use super::{BlockedRange, CollisionOracle, PathEvent, free_stretch_events, merge_ranges};
use crate::config::EPSILON;
use crate::cutter::{Cutter, ToolShape};
use crate::error::{Error, Result};
use crate::geometry::{Point, Vector};
use crate::mesh_ops::{to_parry_trimesh, tool_placement, trimesh_bounds};
use crate::model::Model;

/// Approximate collision oracle over a parry3d copy of the model
///
/// A move is split in halves until either the tool, grown to cover a whole
/// cell, misses the mesh (the cell is free) or the depth limit is reached.
/// Leaf cells are blocked when the tool at the cell centre intersects the
/// mesh. The result is accurate to `length / 2^depth`.
///
/// Only the mesh surface is tested, so a tool entirely inside a closed
/// cavity is not detected. Unbounded cylinders reach up to the top of the
/// model, which keeps that case out of waterline runs.
pub struct AcceleratedScan {
    mesh: TriMesh,
    ceiling: f64,
    clearance: f64,
    depth: u32,
}

impl AcceleratedScan {
    /// Build the parry3d mesh for `model`
    ///
    /// # Errors
    ///
    /// [`Error::InvalidMesh`] if the model cannot be converted.
    pub fn new(model: &dyn Model, depth: u32) -> Result<Self> {
        let mesh = to_parry_trimesh(model.triangles())?;
        let bounds = trimesh_bounds(&mesh);
        let extent = bounds
            .max_xy_extent()
            .max(bounds.maxz.abs())
            .max(bounds.minz.abs());
        // parry3d computes in f32
        let clearance = EPSILON.max(extent * 8.0 * f32::EPSILON as f64);
        debug!(
            triangles = model.triangles().len(),
            depth, clearance, "built collision mesh"
        );
        Ok(Self {
            mesh,
            ceiling: bounds.maxz + 1.0,
            clearance,
            depth,
        })
    }

    /// Bisection depth limit
    pub fn depth(&self) -> u32 {
        self.depth
    }

    fn intersects(&self, tool: &ToolShape, tip: Point, grow: f64, vertical: f64) -> Result<bool> {
        let (shape, pose) = tool_placement(tool, tip, grow, vertical, self.clearance, self.ceiling);
        query::intersection_test(&pose, shape.as_ref(), &Isometry3::identity(), &self.mesh)
            .map_err(|e| Error::Collision(format!("parry3d query failed: {:?}", e)))
    }

    #[allow(clippy::too_many_arguments)]
    fn bisect(
        &self,
        tool: &ToolShape,
        start: Point,
        dir: Vector,
        from: f64,
        to: f64,
        level: u32,
        blocked: &mut Vec<BlockedRange>,
    ) -> Result<()> {
        let half = (to - from) / 2.0;
        let centre = start + dir * (from + half);

        if level >= self.depth {
            if self.intersects(tool, centre, 0.0, 0.0)? {
                blocked.push(BlockedRange {
                    from,
                    to,
                    enter: None,
                    exit: None,
                });
            }
            return Ok(());
        }
        if !self.intersects(tool, centre, half, dir.z.abs())? {
            return Ok(());
        }
        self.bisect(tool, start, dir, from, from + half, level + 1, blocked)?;
        self.bisect(tool, start, dir, from + half, to, level + 1, blocked)
    }
}

impl CollisionOracle for AcceleratedScan {
    fn free_paths(&self, cutter: &dyn Cutter, start: Point, end: Point) -> Result<Vec<PathEvent>> {
        let Some(dir) = (end - start).normalized() else {
            return Ok(Vec::new());
        };
        let length = start.distance(&end);
        let tool = cutter.shape();

        let mut blocked = Vec::new();
        self.bisect(&tool, start, dir, 0.0, length, 0, &mut blocked)?;
        let cells = blocked.len();
        let blocked = merge_ranges(blocked);
        trace!(cells, blocked = blocked.len(), "bisected segment");

        Ok(free_stretch_events(start, end, &blocked)
            .into_iter()
            .map(PathEvent::from)
            .collect())
    }
}
