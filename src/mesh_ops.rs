//! Triangle mesh operations using parry3d
//!
//! This module converts models and tools into parry3d shapes for the
//! accelerated collision backend:
//! - Triangle list to `TriMesh` conversion
//! - Bounding box of a converted mesh
//! - Tool placement (shape plus pose) at a cutter location
//!
//! parry3d works in `f32`; conversions happen only at this boundary.

use parry3d::na::{Isometry3, Point3, Vector3};
use parry3d::shape::{Ball, Cylinder, Shape, TriMesh};

use crate::cutter::ToolShape;
use crate::error::{Error, Result};
use crate::geometry::{Bounds, Point, Triangle};

/// Smallest radius or half-height handed to parry3d
const MIN_SHAPE_SIZE: f64 = 1e-9;

/// Convert a point to parry3d's `f32` representation
pub fn to_parry_point(p: &Point) -> Point3<f32> {
    Point3::new(p.x as f32, p.y as f32, p.z as f32)
}

/// Build a parry3d `TriMesh` from model triangles
///
/// Triangles are not welded; each contributes three vertices.
///
/// # Errors
///
/// [`Error::InvalidMesh`] for an empty triangle list or when parry3d rejects
/// the mesh.
pub fn to_parry_trimesh(triangles: &[Triangle]) -> Result<TriMesh> {
    if triangles.is_empty() {
        return Err(Error::InvalidMesh(
            "Cannot build a collision mesh without triangles".to_string(),
        ));
    }

    let vertices: Vec<Point3<f32>> = triangles
        .iter()
        .flat_map(|t| t.points.iter().map(to_parry_point))
        .collect();

    let indices: Vec<[u32; 3]> = (0..triangles.len() as u32)
        .map(|i| [3 * i, 3 * i + 1, 3 * i + 2])
        .collect();

    TriMesh::new(vertices, indices)
        .map_err(|e| Error::InvalidMesh(format!("parry3d rejected the mesh: {:?}", e)))
}

/// Axis-aligned bounding box of a parry3d mesh
pub fn trimesh_bounds(mesh: &TriMesh) -> Bounds {
    let aabb = mesh.local_aabb();
    Bounds::new(
        aabb.mins.x as f64,
        aabb.maxs.x as f64,
        aabb.mins.y as f64,
        aabb.maxs.y as f64,
        aabb.mins.z as f64,
        aabb.maxs.z as f64,
    )
}

/// parry3d shape and pose of a tool whose tip is at `tip`
///
/// * `grow` - added to the radius (and, scaled by `vertical`, to both ends
///   of a cylinder) so one shape covers a whole stretch of travel
/// * `vertical` - share of `grow` applied along Z
/// * `clearance` - removed from the radius and from the tip, so that a tool
///   merely touching the model does not intersect it
/// * `ceiling` - top of an unbounded cylinder
pub fn tool_placement(
    tool: &ToolShape,
    tip: Point,
    grow: f64,
    vertical: f64,
    clearance: f64,
    ceiling: f64,
) -> (Box<dyn Shape>, Isometry3<f32>) {
    let radius = ((tool.radius() - clearance).max(0.0) + grow).max(MIN_SHAPE_SIZE);
    match *tool {
        ToolShape::Sphere { radius: ball } => {
            let centre = Vector3::new(tip.x as f32, tip.y as f32, (tip.z + ball) as f32);
            (
                Box::new(Ball::new(radius as f32)),
                Isometry3::new(centre, Vector3::zeros()),
            )
        }
        ToolShape::Cylinder { height, .. } => {
            let bottom = tip.z + clearance - grow * vertical;
            let top = match height {
                Some(h) => tip.z + h,
                None => ceiling.max(tip.z),
            } + grow * vertical;
            let half_height = ((top - bottom) / 2.0).max(MIN_SHAPE_SIZE);
            let centre = Vector3::new(tip.x as f32, tip.y as f32, ((top + bottom) / 2.0) as f32);
            // parry3d cylinders stand along Y; tip them over onto Z
            let axis = Vector3::new(std::f32::consts::FRAC_PI_2, 0.0, 0.0);
            (
                Box::new(Cylinder::new(half_height as f32, radius as f32)),
                Isometry3::new(centre, axis),
            )
        }
    }
}
