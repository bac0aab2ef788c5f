//! Levels and their vector fields.

pub mod level;
pub use level::{FieldId, GHOSTS, Geometry, Level};
pub mod vector_ops;
