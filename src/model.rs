//! Read-only triangle models queried by the waterline engine

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::geometry::{Bounds, Point, Rect, Triangle};
use crate::mesh::Mesh;

/// A solid described by triangles
///
/// The engine only reads from the model. Triangles must be wound
/// counter-clockwise seen from outside so that their normals point out of the
/// solid.
pub trait Model {
    /// All triangles; a triangle's `id` is its index in this slice
    fn triangles(&self) -> &[Triangle];

    /// Axis-aligned bounds of the whole model
    fn bounds(&self) -> Bounds;

    /// Triangles whose XY bounds overlap `area`
    fn triangles_within(&self, area: &Rect) -> Vec<&Triangle> {
        self.triangles()
            .iter()
            .filter(|t| area.overlaps(&t.bounds))
            .collect()
    }

    /// Length of the bounds' space diagonal
    fn diagonal(&self) -> f64 {
        self.bounds().diagonal()
    }
}

/// A [`Model`] holding its triangles in a flat list
#[derive(Debug, Clone, PartialEq)]
pub struct TriangleModel {
    triangles: Vec<Triangle>,
    bounds: Bounds,
}

impl TriangleModel {
    /// Build a model from an indexed mesh
    ///
    /// Degenerate faces are dropped. A closed mesh with inverted winding is
    /// accepted but logged, since its contours will be offset into the solid.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidMesh`] for out-of-range indices or a mesh without
    /// usable faces, [`Error::InvalidGeometry`] for non-finite vertices.
    pub fn from_mesh(mesh: &Mesh) -> Result<Self> {
        mesh.validate()?;
        if mesh.signed_volume() < 0.0 {
            warn!(
                faces = mesh.faces.len(),
                "mesh has negative volume, faces are probably wound inwards"
            );
        }
        let corners = mesh.faces.iter().map(|face| {
            let [a, b, c] = face.indices();
            [mesh.vertices[a], mesh.vertices[b], mesh.vertices[c]]
        });
        Self::from_corners(corners)
    }

    /// Build a model from triangle corners
    ///
    /// Ids are reassigned in order; degenerate triangles are dropped.
    pub fn from_corners(corners: impl IntoIterator<Item = [Point; 3]>) -> Result<Self> {
        let mut triangles = Vec::new();
        let mut dropped = 0usize;
        for [a, b, c] in corners {
            let triangle = Triangle::new(triangles.len(), a, b, c);
            if triangle.is_degenerate() {
                dropped += 1;
                continue;
            }
            triangles.push(triangle);
        }
        if dropped > 0 {
            debug!(dropped, "dropped degenerate triangles");
        }

        let bounds = Bounds::from_points(triangles.iter().flat_map(|t| t.points.iter()))
            .ok_or_else(|| Error::InvalidMesh("model has no non-degenerate triangles".to_string()))?;

        Ok(Self { triangles, bounds })
    }
}

impl Model for TriangleModel {
    fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    fn bounds(&self) -> Bounds {
        self.bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::Face;

    #[test]
    fn test_from_mesh_cube() {
        let mesh = Mesh::cuboid(Point::new(0.0, 0.0, 0.0), Point::new(1.0, 1.0, 1.0));
        let model = TriangleModel::from_mesh(&mesh).unwrap();
        assert_eq!(model.triangles().len(), 12);
        assert_eq!(model.bounds(), Bounds::new(0.0, 1.0, 0.0, 1.0, 0.0, 1.0));
        assert!((model.diagonal() - 3.0_f64.sqrt()).abs() < 1e-12);
        for (i, t) in model.triangles().iter().enumerate() {
            assert_eq!(t.id, i);
        }
    }

    #[test]
    fn test_degenerate_faces_are_dropped() {
        let mut mesh = Mesh::cuboid(Point::new(0.0, 0.0, 0.0), Point::new(1.0, 1.0, 1.0));
        mesh.faces.insert(0, Face::new(0, 0, 1));
        let model = TriangleModel::from_mesh(&mesh).unwrap();
        assert_eq!(model.triangles().len(), 12);
        assert_eq!(model.triangles()[0].id, 0);
    }

    #[test]
    fn test_empty_mesh_is_rejected() {
        let err = TriangleModel::from_mesh(&Mesh::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidMesh(_)));
    }

    #[test]
    fn test_triangles_within() {
        let a = Mesh::cuboid(Point::new(0.0, 0.0, 0.0), Point::new(1.0, 1.0, 1.0));
        let b = Mesh::cuboid(Point::new(5.0, 5.0, 0.0), Point::new(6.0, 6.0, 1.0));
        let corners = [&a, &b].into_iter().flat_map(|m| {
            m.faces.iter().map(move |f| {
                let [i, j, k] = f.indices();
                [m.vertices[i], m.vertices[j], m.vertices[k]]
            })
        });
        let model = TriangleModel::from_corners(corners).unwrap();
        assert_eq!(model.triangles().len(), 24);
        let near_first = model.triangles_within(&Rect::new(-1.0, 2.0, -1.0, 2.0));
        assert_eq!(near_first.len(), 12);
        assert!(near_first.iter().all(|t| t.bounds.maxx <= 1.0));
    }
}
