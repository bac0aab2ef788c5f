//! Core traits shared by the operator and its collaborators.

pub mod traits;

pub use traits::{BoundaryExchange, Interpolation, Restriction, RestrictionKind, StencilShape};
