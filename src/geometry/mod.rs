//! Geometry primitives
//!
//! Plain value types shared by every stage of the waterline computation.
//! All operations are pure; robustness decisions use [`crate::config::EPSILON`]
//! while point identity uses exact equality.

mod bounds;
mod line;
mod plane;
mod point;
mod triangle;

pub use bounds::{Bounds, Rect};
pub use line::Line;
pub use plane::Plane;
pub use point::{Point, Vector};
pub use triangle::Triangle;
