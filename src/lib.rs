//! fvmg: finite-volume 7-point operator and smoothers for geometric multigrid
//!
//! This crate provides the level operator `a·alpha·u − b·∇·(beta∇u)` for
//! cell-centred Poisson and Helmholtz problems on block-structured grids, the
//! smoothers a multigrid cycle runs on each level (red-black Gauss-Seidel,
//! Chebyshev, weighted and L1 Jacobi, symmetric Gauss-Seidel), and the rebuild
//! that restricts coefficients to a coarser level and recomputes the diagonal,
//! L1 row norms and the spectral bound used by Chebyshev.
//!
//! Ghost exchange and inter-level transfer are consumed through traits in
//! [`core::traits`]; [`transfer`] ships single-block implementations.

pub mod parallel;

pub mod config;
pub mod core;
pub mod error;
pub mod grid;
pub mod operator;
pub mod smoother;
pub mod transfer;
pub mod utils;

// Re-exports for convenience
pub use crate::config::*;
pub use crate::core::*;
pub use crate::error::*;
pub use crate::grid::{FieldId, GHOSTS, Geometry, Level};
pub use crate::operator::{FvOperator, StencilKind, StencilOperator, assemble_dense, stencil_radius, stencil_shape};
pub use crate::smoother::{Smooth, Smoother};
pub use crate::transfer::{BoundaryCondition, InterpolationKind, Interpolator, LocalExchange, Restrictor};
