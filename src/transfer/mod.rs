//! Single-block implementations of the exchange, restriction and
//! interpolation contracts in [`crate::core::traits`].

pub mod exchange;
pub mod interpolation;
pub mod restriction;

pub use exchange::{BoundaryCondition, LocalExchange};
pub use interpolation::{InterpolationKind, Interpolator};
pub use restriction::Restrictor;
