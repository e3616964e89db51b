//! Indexed triangle meshes

use crate::error::{Error, Result};
use crate::geometry::{Bounds, Point};

/// A face referencing three vertices of its mesh by index
///
/// Vertices are listed counter-clockwise when seen from outside the solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    /// Index of the first vertex
    pub v1: usize,
    /// Index of the second vertex
    pub v2: usize,
    /// Index of the third vertex
    pub v3: usize,
}

impl Face {
    /// Create a new face
    pub const fn new(v1: usize, v2: usize, v3: usize) -> Self {
        Self { v1, v2, v3 }
    }

    /// The vertex indices in winding order
    pub fn indices(&self) -> [usize; 3] {
        [self.v1, self.v2, self.v3]
    }
}

/// Triangle mesh with shared vertices
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Vertex positions
    pub vertices: Vec<Point>,
    /// Faces indexing into `vertices`
    pub faces: Vec<Face>,
}

impl Mesh {
    /// Create an empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty mesh with room for the given number of vertices and faces
    pub fn with_capacity(vertices: usize, faces: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            faces: Vec::with_capacity(faces),
        }
    }

    /// Axis-aligned box between `min` and `max`, 12 outward-facing triangles
    ///
    /// # Example
    ///
    /// ```
    /// use waterline::geometry::Point;
    /// use waterline::mesh::Mesh;
    ///
    /// let cube = Mesh::cuboid(Point::new(0.0, 0.0, 0.0), Point::new(1.0, 1.0, 1.0));
    /// assert_eq!(cube.faces.len(), 12);
    /// assert!((cube.signed_volume() - 1.0).abs() < 1e-12);
    /// ```
    pub fn cuboid(min: Point, max: Point) -> Self {
        let mut mesh = Mesh::with_capacity(8, 12);
        mesh.vertices.extend([
            Point::new(min.x, min.y, min.z), // 0
            Point::new(max.x, min.y, min.z), // 1
            Point::new(max.x, max.y, min.z), // 2
            Point::new(min.x, max.y, min.z), // 3
            Point::new(min.x, min.y, max.z), // 4
            Point::new(max.x, min.y, max.z), // 5
            Point::new(max.x, max.y, max.z), // 6
            Point::new(min.x, max.y, max.z), // 7
        ]);
        mesh.faces.extend([
            // bottom
            Face::new(0, 2, 1),
            Face::new(0, 3, 2),
            // top
            Face::new(4, 5, 6),
            Face::new(4, 6, 7),
            // front
            Face::new(0, 1, 5),
            Face::new(0, 5, 4),
            // back
            Face::new(2, 3, 7),
            Face::new(2, 7, 6),
            // left
            Face::new(0, 4, 7),
            Face::new(0, 7, 3),
            // right
            Face::new(1, 2, 6),
            Face::new(1, 6, 5),
        ]);
        mesh
    }

    /// Check that every face references existing vertices
    pub fn validate(&self) -> Result<()> {
        let count = self.vertices.len();
        for (index, face) in self.faces.iter().enumerate() {
            if let Some(&bad) = face.indices().iter().find(|&&v| v >= count) {
                return Err(Error::invalid_index(index, bad, count));
            }
        }
        if let Some(p) = self.vertices.iter().find(|p| !p.is_finite()) {
            return Err(Error::InvalidGeometry(format!(
                "vertex {} has non-finite coordinates",
                p
            )));
        }
        Ok(())
    }

    /// Bounds of all vertices, `None` for an empty mesh
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.vertices.iter())
    }

    /// Signed volume using the divergence theorem
    ///
    /// Positive for a closed mesh with outward (counter-clockwise) winding,
    /// negative when the winding is inverted. Faces with invalid indices are
    /// skipped.
    pub fn signed_volume(&self) -> f64 {
        let count = self.vertices.len();
        let mut volume = 0.0_f64;
        for face in &self.faces {
            if face.indices().iter().any(|&v| v >= count) {
                continue;
            }
            let a = &self.vertices[face.v1];
            let b = &self.vertices[face.v2];
            let c = &self.vertices[face.v3];
            volume += a.x * (b.y * c.z - b.z * c.y)
                + b.x * (c.y * a.z - c.z * a.y)
                + c.x * (a.y * b.z - a.z * b.y);
        }
        volume / 6.0
    }
}
