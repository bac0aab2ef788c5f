//! Red-black Gauss-Seidel.
//!
//! Colour sweeps alternate red, black, red, ... starting with parity 0. A
//! cell of one colour only reads cells of the other, so a colour sweep is a
//! Jacobi update restricted to that colour.

use log::trace;

use crate::config::GsrbUpdate;
use crate::core::traits::StencilShape;
use crate::error::MgError;
use crate::grid::{FieldId, Level, vector_ops};
use crate::operator::stencil::{Kernel, StencilOperator, with_kernel};
use crate::parallel::CellSet;
use crate::utils::coloring::red_black;

use super::{Smooth, SmoothContext, check_distinct, relax_into};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gsrb {
    pub update: GsrbUpdate,
    /// Red+black pairs per call.
    pub smooths: usize,
}

impl Gsrb {
    pub fn new(update: GsrbUpdate) -> Self {
        Self { update, smooths: 3 }
    }

    fn in_place<K: Kernel>(&self, ctx: &SmoothContext<'_>, level: &mut Level, x: FieldId, rhs: FieldId) -> Result<(), MgError> {
        let geom = level.geometry();
        for s in 0..self.sweeps() {
            ctx.exchange.exchange(level, x, StencilShape::Star)?;
            let parity = s % 2;
            level.with_field_mut(x, |lvl, xs| {
                let op = StencilOperator::new(lvl, K::KIND, ctx.a, ctx.b)?;
                let (f, dinv) = (lvl.field(rhs)?, lvl.field(FieldId::Dinv)?);
                for ([i, j, k], ijk) in geom.interior() {
                    if red_black(i, j, k) != parity {
                        continue;
                    }
                    let ax = K::apply_ijk(&op, xs, ijk);
                    xs[ijk] += dinv[ijk] * (f[ijk] - ax);
                }
                Ok(())
            })?;
        }
        Ok(())
    }

    fn out_of_place<K: Kernel>(&self, ctx: &SmoothContext<'_>, level: &mut Level, x: FieldId, rhs: FieldId) -> Result<(), MgError> {
        for s in 0..self.sweeps() {
            ctx.exchange.exchange(level, x, StencilShape::Star)?;
            vector_ops::copy_vector(level, FieldId::Temp, x)?;
            relax_into::<K>(ctx, level, FieldId::Temp, x, rhs, FieldId::Dinv, 1.0, CellSet::Parity(s % 2))?;
            level.swap_fields(x, FieldId::Temp);
        }
        Ok(())
    }
}

impl Smooth for Gsrb {
    fn smooth(&self, ctx: &SmoothContext<'_>, level: &mut Level, x: FieldId, rhs: FieldId) -> Result<(), MgError> {
        check_distinct(x, rhs)?;
        trace!("gsrb ({:?}): {} colour sweeps on {:?}", self.update, self.sweeps(), level.dim());
        with_kernel!(ctx.stencil, K => match self.update {
            GsrbUpdate::InPlace => self.in_place::<K>(ctx, level, x, rhs),
            GsrbUpdate::OutOfPlace => self.out_of_place::<K>(ctx, level, x, rhs),
        })
    }

    fn sweeps(&self) -> usize {
        2 * self.smooths
    }

    fn follows_backend(&self) -> bool {
        self.update == GsrbUpdate::OutOfPlace
    }
}
