//! Symmetric Gauss-Seidel: a forward lexicographic sweep followed by a
//! backward one, updating `x` in place. Always serial.

use log::trace;

use crate::core::traits::StencilShape;
use crate::error::MgError;
use crate::grid::{FieldId, Level};
use crate::operator::stencil::{Kernel, StencilOperator, with_kernel};

use super::{Smooth, SmoothContext, check_distinct};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SymGs {
    /// Forward+backward pairs per call.
    pub smooths: usize,
}

impl Default for SymGs {
    fn default() -> Self {
        Self { smooths: 2 }
    }
}

impl SymGs {
    fn run<K: Kernel>(&self, ctx: &SmoothContext<'_>, level: &mut Level, x: FieldId, rhs: FieldId) -> Result<(), MgError> {
        let geom = level.geometry();
        let order: Vec<usize> = geom.interior().map(|(_, ijk)| ijk).collect();
        for s in 0..self.sweeps() {
            ctx.exchange.exchange(level, x, StencilShape::Star)?;
            let forward = s % 2 == 0;
            level.with_field_mut(x, |lvl, xs| {
                let op = StencilOperator::new(lvl, K::KIND, ctx.a, ctx.b)?;
                let (f, dinv) = (lvl.field(rhs)?, lvl.field(FieldId::Dinv)?);
                let mut relax = |ijk: usize| {
                    let ax = K::apply_ijk(&op, xs, ijk);
                    xs[ijk] += dinv[ijk] * (f[ijk] - ax);
                };
                if forward {
                    order.iter().copied().for_each(&mut relax);
                } else {
                    order.iter().rev().copied().for_each(&mut relax);
                }
                Ok(())
            })?;
        }
        Ok(())
    }
}

impl Smooth for SymGs {
    fn smooth(&self, ctx: &SmoothContext<'_>, level: &mut Level, x: FieldId, rhs: FieldId) -> Result<(), MgError> {
        check_distinct(x, rhs)?;
        trace!("symgs: {} sweeps on {:?}", self.sweeps(), level.dim());
        with_kernel!(ctx.stencil, K => self.run::<K>(ctx, level, x, rhs))
    }

    fn sweeps(&self) -> usize {
        2 * self.smooths
    }

    fn follows_backend(&self) -> bool {
        false
    }
}
