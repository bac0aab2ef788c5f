//! Field-wide operator application and residual.
//!
//! Both read their input with already-valid ghosts; exchanging them is the
//! caller's job. Cells are independent, so every backend gives the same bits.

use crate::config::Backend;
use crate::error::MgError;
use crate::grid::{FieldId, Level};
use crate::operator::stencil::{Kernel, StencilKind, StencilOperator, with_kernel};
use crate::parallel::{CellSet, sweep};

/// `dst = A·src` on every interior cell.
pub fn apply_op(
    backend: Backend,
    stencil: StencilKind,
    level: &mut Level,
    dst: FieldId,
    src: FieldId,
    a: f64,
    b: f64,
) -> Result<(), MgError> {
    if dst == src {
        return Err(MgError::AliasedFields(dst, src));
    }
    with_kernel!(stencil, K => apply_op_with::<K>(backend, level, dst, src, a, b))
}

fn apply_op_with<K: Kernel>(
    backend: Backend,
    level: &mut Level,
    dst: FieldId,
    src: FieldId,
    a: f64,
    b: f64,
) -> Result<(), MgError> {
    level.with_field_mut(dst, |lvl, out| {
        let op = StencilOperator::new(lvl, K::KIND, a, b)?;
        let x = lvl.field(src)?;
        sweep::<K, _>(backend, &op, x, out, CellSet::All, |_, ax, o| *o = ax);
        Ok(())
    })
}

/// `dst = rhs − A·x` on every interior cell. `dst` may alias `rhs` but not `x`.
#[allow(clippy::too_many_arguments)]
pub fn residual(
    backend: Backend,
    stencil: StencilKind,
    level: &mut Level,
    dst: FieldId,
    rhs: FieldId,
    x: FieldId,
    a: f64,
    b: f64,
) -> Result<(), MgError> {
    if dst == x {
        return Err(MgError::AliasedFields(dst, x));
    }
    with_kernel!(stencil, K => residual_with::<K>(backend, level, dst, rhs, x, a, b))
}

fn residual_with<K: Kernel>(
    backend: Backend,
    level: &mut Level,
    dst: FieldId,
    rhs: FieldId,
    x: FieldId,
    a: f64,
    b: f64,
) -> Result<(), MgError> {
    level.with_field_mut(dst, |lvl, out| {
        let op = StencilOperator::new(lvl, K::KIND, a, b)?;
        let xs = lvl.field(x)?;
        let f = if rhs == dst { None } else { Some(lvl.field(rhs)?) };
        sweep::<K, _>(backend, &op, xs, out, CellSet::All, |ijk, ax, o| {
            let fi = f.map_or(*o, |f| f[ijk]);
            *o = fi - ax;
        });
        Ok(())
    })
}
