//! Error types for waterline toolpath generation
//!
//! All errors carry an error code so callers can categorize failures without
//! matching on message text.
//!
//! # Error Codes
//!
//! Error codes follow the pattern: `E<category><number>`
//!
//! Categories:
//! - **E1xxx**: Mesh and geometry input errors
//! - **E2xxx**: Collision and tool motion errors
//! - **E3xxx**: Configuration errors
//!
//! ## Common Error Codes
//!
//! - `E1001`: Invalid mesh (bad indices, empty mesh)
//! - `E1002`: Invalid geometry (non-finite coordinates)
//! - `E2001`: Probe found no collision for a waterline edge
//! - `E2002`: Tool cannot evaluate the requested move
//! - `E2003`: Collision backend failure
//! - `E3001`: Invalid configuration value

use crate::geometry::{Line, Point, Vector};
use thiserror::Error;

/// Result type for waterline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while generating waterline toolpaths
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Mesh input could not be turned into a model
    ///
    /// **Error Code**: E1001
    ///
    /// **Common Causes**:
    /// - Face indices outside the vertex list
    /// - Empty mesh passed to the accelerated backend
    ///
    /// **Suggestions**:
    /// - Verify all vertex indices are within bounds
    /// - Check that the mesh contains at least one non-degenerate face
    #[error("[E1001] Invalid mesh: {0}")]
    InvalidMesh(String),

    /// Geometry values that cannot be processed
    ///
    /// **Error Code**: E1002
    ///
    /// **Common Causes**:
    /// - NaN or infinite coordinates
    /// - Negative tool radius
    #[error("[E1002] Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// The outward probe from a waterline edge never left the model
    ///
    /// **Error Code**: E2001
    ///
    /// This is fatal for the computation: the edge cannot be offset and the
    /// contour of the layer would be incomplete.
    ///
    /// **Common Causes**:
    /// - Non-closed (leaky) meshes with inconsistent winding
    /// - Probe length too short for the model
    #[error("[E2001] No collision found for edge {edge} probing from {start} along {direction}")]
    NoCollision {
        /// The raw waterline edge being offset
        edge: Line,
        /// Start of the probe (edge midpoint)
        start: Point,
        /// Unit probe direction
        direction: Vector,
    },

    /// The cutter cannot evaluate contact for this kind of move
    ///
    /// **Error Code**: E2002
    ///
    /// **Common Causes**:
    /// - Non-horizontal move requested from a cylindrical cutter
    #[error("[E2002] Unsupported move: {0}")]
    UnsupportedMove(String),

    /// Collision backend failure
    ///
    /// **Error Code**: E2003
    ///
    /// **Common Causes**:
    /// - Shape pair not supported by the physics backend
    #[error("[E2003] Collision query failed: {0}")]
    Collision(String),

    /// Invalid configuration value
    ///
    /// **Error Code**: E3001
    ///
    /// **Common Causes**:
    /// - Non-positive layer step
    /// - Inverted Z range
    /// - Minimum tree depth larger than the maximum
    ///
    /// **Suggestions**:
    /// - Use a positive `dz`
    /// - Pass `minz <= maxz`
    #[error("[E3001] Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Create an InvalidMesh error for a face referencing a missing vertex
    ///
    /// # Arguments
    /// * `face` - Index of the offending face
    /// * `index` - The out-of-range vertex index
    /// * `vertex_count` - Number of vertices in the mesh
    pub fn invalid_index(face: usize, index: usize, vertex_count: usize) -> Self {
        Error::InvalidMesh(format!(
            "Face {} references vertex {} but the mesh has only {} vertices",
            face, index, vertex_count
        ))
    }

    /// Create an InvalidConfig error for a rejected setting
    ///
    /// # Arguments
    /// * `name` - The setting name (e.g. "dz")
    /// * `value` - The rejected value
    /// * `expected` - What an acceptable value looks like
    pub fn invalid_config_value(name: &str, value: impl std::fmt::Display, expected: &str) -> Self {
        Error::InvalidConfig(format!(
            "'{}' is {}, expected {}",
            name, value, expected
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_in_messages() {
        let mesh = Error::InvalidMesh("test".to_string());
        assert!(mesh.to_string().contains("[E1001]"));

        let geometry = Error::InvalidGeometry("test".to_string());
        assert!(geometry.to_string().contains("[E1002]"));

        let unsupported = Error::UnsupportedMove("test".to_string());
        assert!(unsupported.to_string().contains("[E2002]"));

        let collision = Error::Collision("test".to_string());
        assert!(collision.to_string().contains("[E2003]"));

        let config = Error::InvalidConfig("test".to_string());
        assert!(config.to_string().contains("[E3001]"));
    }

    #[test]
    fn test_no_collision_names_the_probe() {
        let err = Error::NoCollision {
            edge: Line::new(Point::new(0.0, 0.0, 1.0), Point::new(1.0, 0.0, 1.0)),
            start: Point::new(0.5, 0.0, 1.0),
            direction: Vector::new(0.0, -3.0, 0.0),
        };
        let message = err.to_string();
        assert!(message.contains("[E2001]"));
        assert!(message.contains("(0.5, 0, 1)"), "message was: {}", message);
        assert!(message.contains("(0, -3, 0)"), "message was: {}", message);
    }

    #[test]
    fn test_invalid_index_helper() {
        let err = Error::invalid_index(3, 17, 8);
        assert!(err.to_string().contains("Face 3"));
        assert!(err.to_string().contains("vertex 17"));
        assert!(err.to_string().contains("only 8 vertices"));
        assert!(err.to_string().contains("[E1001]"));
    }

    #[test]
    fn test_invalid_config_value_helper() {
        let err = Error::invalid_config_value("dz", -1.0, "a positive layer step");
        assert!(err.to_string().contains("'dz' is -1"));
        assert!(err.to_string().contains("positive layer step"));
        assert!(err.to_string().contains("[E3001]"));
    }
}
