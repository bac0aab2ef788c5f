//! The level operator and the context a multigrid driver holds.
//!
//! `FvOperator` is built once from a validated [`OperatorConfig`] and exposes
//! every operation a V- or F-cycle needs on a level: apply, residual, smooth,
//! rebuild and the interpolation used by each cycle type.
//!
//! # Usage
//!
//! 1. Build an `OperatorConfig` (from `BuildFlags` or typed values).
//! 2. Create the context with `FvOperator::new`.
//! 3. Rebuild each level (finest first), then smooth/residual/apply as the cycle requires.

use log::info;

use crate::config::OperatorConfig;
use crate::core::traits::{BoundaryExchange, Interpolation, Restriction, StencilShape};
use crate::error::MgError;
use crate::grid::{FieldId, Level};
use crate::parallel::worker_count;
use crate::smoother::{Smooth, SmoothContext, Smoother};
use crate::transfer::{InterpolationKind, Interpolator};

pub mod apply;
pub mod dense;
pub mod rebuild;
pub mod stencil;

pub use apply::{apply_op, residual};
pub use dense::assemble_dense;
pub use rebuild::rebuild_operator;
pub use stencil::{STENCIL_RADIUS, StencilKind, StencilOperator, stencil_radius, stencil_shape};

/// Operator context for one multigrid build.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FvOperator {
    config: OperatorConfig,
    smoother: Smoother,
}

impl FvOperator {
    /// Create the context and log its description.
    pub fn new(config: OperatorConfig) -> Self {
        let smoother = Smoother::from_kind(config.smoother);
        let workers = if smoother.follows_backend() {
            format!("{} worker(s)", worker_count())
        } else {
            "serial sweeps".to_string()
        };
        info!(
            "{config}: stencil {:?} radius {}, {} sweeps per smooth, {workers}",
            config.stencil(),
            stencil_radius(),
            smoother.sweeps(),
        );
        Self { config, smoother }
    }

    pub fn config(&self) -> &OperatorConfig {
        &self.config
    }

    pub fn smoother(&self) -> &Smoother {
        &self.smoother
    }

    pub fn stencil_radius(&self) -> usize {
        stencil_radius()
    }

    pub fn stencil_shape(&self) -> StencilShape {
        stencil_shape()
    }

    /// See [`rebuild::rebuild_operator`].
    pub fn rebuild_operator<E, R>(
        &self,
        level: &mut Level,
        from: Option<&Level>,
        a: f64,
        b: f64,
        exchange: &E,
        restriction: &R,
    ) -> Result<(), MgError>
    where
        E: BoundaryExchange + ?Sized,
        R: Restriction + ?Sized,
    {
        rebuild_operator(&self.config, level, from, a, b, exchange, restriction)
    }

    /// `dst = A·src`; ghosts of `src` must be valid.
    pub fn apply_op(&self, level: &mut Level, dst: FieldId, src: FieldId, a: f64, b: f64) -> Result<(), MgError> {
        apply_op(self.config.backend, self.config.stencil(), level, dst, src, a, b)
    }

    /// `dst = rhs − A·x`; ghosts of `x` must be valid.
    pub fn residual(&self, level: &mut Level, dst: FieldId, rhs: FieldId, x: FieldId, a: f64, b: f64) -> Result<(), MgError> {
        residual(self.config.backend, self.config.stencil(), level, dst, rhs, x, a, b)
    }

    /// Run the configured smoother on `x` (one call = the smoother's full sweep count).
    pub fn smooth(
        &self,
        level: &mut Level,
        x: FieldId,
        rhs: FieldId,
        a: f64,
        b: f64,
        exchange: &dyn BoundaryExchange,
    ) -> Result<(), MgError> {
        let ctx = SmoothContext {
            backend: self.config.backend,
            stencil: self.config.stencil(),
            a,
            b,
            exchange,
        };
        self.smoother.smooth(&ctx, level, x, rhs)
    }

    /// Prolongation used on the way up a V-cycle: `fine = prescale·fine + P·coarse`.
    #[allow(clippy::too_many_arguments)]
    pub fn interpolation_vcycle<E: BoundaryExchange + ?Sized>(
        &self,
        fine: &mut Level,
        fine_field: FieldId,
        prescale: f64,
        coarse: &mut Level,
        coarse_field: FieldId,
        exchange: &E,
    ) -> Result<(), MgError> {
        self.prolong(fine, fine_field, prescale, coarse, coarse_field, exchange)
    }

    /// Prolongation of a coarse solution when an F-cycle moves to a finer level.
    #[allow(clippy::too_many_arguments)]
    pub fn interpolation_fcycle<E: BoundaryExchange + ?Sized>(
        &self,
        fine: &mut Level,
        fine_field: FieldId,
        prescale: f64,
        coarse: &mut Level,
        coarse_field: FieldId,
        exchange: &E,
    ) -> Result<(), MgError> {
        self.prolong(fine, fine_field, prescale, coarse, coarse_field, exchange)
    }

    #[allow(clippy::too_many_arguments)]
    fn prolong<E: BoundaryExchange + ?Sized>(
        &self,
        fine: &mut Level,
        fine_field: FieldId,
        prescale: f64,
        coarse: &mut Level,
        coarse_field: FieldId,
        exchange: &E,
    ) -> Result<(), MgError> {
        exchange.exchange(coarse, coarse_field, StencilShape::Box)?;
        Interpolator::new(InterpolationKind::PiecewiseLinear).interpolate(fine, fine_field, prescale, coarse, coarse_field)
    }
}
