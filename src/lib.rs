//! # waterline
//!
//! Waterline toolpaths for CNC machining of triangle meshes.
//!
//! A waterline is the outline of a solid at a fixed height, pushed outward
//! by the radius of the cutting tool. Milling along the waterlines of many
//! heights, top down, finishes steep walls of a part.
//!
//! ## Features
//!
//! - Pure Rust implementation with no unsafe code
//! - Flat end mill and ball nose cutters (ball nose contours follow vertical
//!   walls only; sloped walls yield no contour)
//! - Offset edges stitched into closed contours with mitred corners
//! - Exact collision checks against every triangle, or parry3d mesh queries
//!   with the `mesh-ops` feature
//! - Progress reporting with cooperative cancellation
//!
//! ## Example
//!
//! ```
//! use waterline::cutter::CylindricalCutter;
//! use waterline::geometry::{Bounds, Point};
//! use waterline::mesh::Mesh;
//! use waterline::model::TriangleModel;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mesh = Mesh::cuboid(Point::new(0.0, 0.0, 0.0), Point::new(2.0, 1.0, 1.0));
//! let model = TriangleModel::from_mesh(&mesh)?;
//! let cutter = CylindricalCutter::new(0.25)?;
//!
//! let bounds = Bounds::new(-1.0, 3.0, -1.0, 2.0, 0.0, 1.0);
//! let paths = waterline::waterline_toolpath(&model, cutter, &bounds, 0.25)?;
//! println!("{} contours", paths.len());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod collision;
pub mod config;
pub mod cutter;
pub mod error;
pub mod geometry;
pub mod mesh;
#[cfg(feature = "mesh-ops")]
pub mod mesh_ops;
pub mod model;
pub mod progress;
pub mod stitcher;
pub mod toolpath;
pub mod waterline;

pub use config::{Backend, WaterlineConfig};
pub use cutter::{Cutter, CylindricalCutter, SphericalCutter};
pub use error::{Error, Result};
pub use model::{Model, TriangleModel};
pub use toolpath::{Path, PathAccumulator, SimplePathAccumulator};
pub use waterline::{ToolpathOutcome, Waterline};

use geometry::Bounds;

/// Waterline paths for `model` with the default configuration
///
/// Layers run from `bounds.maxz` down to `bounds.minz`, `dz` apart. Each
/// continuous stretch of tool motion is one [`Path`].
///
/// # Errors
///
/// See [`Waterline::generate_toolpath`].
pub fn waterline_toolpath<C: Cutter>(
    model: &dyn Model,
    cutter: C,
    bounds: &Bounds,
    dz: f64,
) -> Result<Vec<Path>> {
    let mut generator = Waterline::new(model, cutter, SimplePathAccumulator::new())?;
    Ok(generator.generate_toolpath(bounds, dz, None)?.paths)
}
