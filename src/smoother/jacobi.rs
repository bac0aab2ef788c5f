//! Weighted and L1 Jacobi, ping-ponging between `x` and `Temp`.

use log::trace;

use crate::core::traits::StencilShape;
use crate::error::MgError;
use crate::grid::{FieldId, Level};
use crate::operator::stencil::{Kernel, with_kernel};
use crate::parallel::CellSet;

use super::{Smooth, SmoothContext, check_distinct, relax_into};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Jacobi {
    pub weight: f64,
    /// Scale by `L1inv` instead of `Dinv`.
    pub l1: bool,
    pub iterations: usize,
}

impl Jacobi {
    /// Damped Jacobi with ω = 2/3.
    pub fn weighted() -> Self {
        Self { weight: 2.0 / 3.0, l1: false, iterations: 6 }
    }

    /// Undamped Jacobi scaled by the inverse row L1 norm.
    pub fn l1() -> Self {
        Self { weight: 1.0, l1: true, iterations: 6 }
    }

    fn run<K: Kernel>(&self, ctx: &SmoothContext<'_>, level: &mut Level, x: FieldId, rhs: FieldId) -> Result<(), MgError> {
        let inv = if self.l1 { FieldId::L1Inv } else { FieldId::Dinv };
        for _ in 0..self.iterations {
            ctx.exchange.exchange(level, x, StencilShape::Star)?;
            relax_into::<K>(ctx, level, FieldId::Temp, x, rhs, inv, self.weight, CellSet::All)?;
            level.swap_fields(x, FieldId::Temp);
        }
        Ok(())
    }
}

impl Smooth for Jacobi {
    fn smooth(&self, ctx: &SmoothContext<'_>, level: &mut Level, x: FieldId, rhs: FieldId) -> Result<(), MgError> {
        check_distinct(x, rhs)?;
        trace!(
            "{}jacobi: {} iterations on {:?}",
            if self.l1 { "l1-" } else { "" },
            self.iterations,
            level.dim()
        );
        with_kernel!(ctx.stencil, K => self.run::<K>(ctx, level, x, rhs))
    }

    fn sweeps(&self) -> usize {
        self.iterations
    }
}
