//! Smoothers for the level operator.
//!
//! A build selects exactly one smoother. Each call performs the smoother's
//! fixed number of sweeps; every sweep first exchanges the field it reads
//! with a star-shaped ghost fill. `x`, `rhs` and `Temp` must be distinct.

use crate::config::{Backend, SmootherKind};
use crate::core::traits::BoundaryExchange;
use crate::error::MgError;
use crate::grid::{FieldId, Level};
use crate::operator::stencil::{Kernel, StencilKind, StencilOperator};
use crate::parallel::{CellSet, sweep};

pub mod chebyshev;
pub mod gsrb;
pub mod jacobi;
pub mod symgs;

pub use chebyshev::Chebyshev;
pub use gsrb::Gsrb;
pub use jacobi::Jacobi;
pub use symgs::SymGs;

/// Everything a sweep needs besides the level and the two fields.
#[derive(Clone, Copy)]
pub struct SmoothContext<'a> {
    pub backend: Backend,
    pub stencil: StencilKind,
    pub a: f64,
    pub b: f64,
    pub exchange: &'a dyn BoundaryExchange,
}

/// One smoothing pass: improve `x` towards the solution of `A·x = rhs`.
pub trait Smooth {
    fn smooth(&self, ctx: &SmoothContext<'_>, level: &mut Level, x: FieldId, rhs: FieldId) -> Result<(), MgError>;

    /// Operator sweeps per call.
    fn sweeps(&self) -> usize;

    /// Whether sweeps follow the configured backend. Sequential updates
    /// (in-place Gauss-Seidel orderings) run serially on every backend.
    fn follows_backend(&self) -> bool {
        true
    }
}

/// The smoother selected by an [`crate::config::OperatorConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Smoother {
    Gsrb(Gsrb),
    Chebyshev(Chebyshev),
    Jacobi(Jacobi),
    SymGs(SymGs),
}

impl Smoother {
    /// Smoother with the standard sweep counts for `kind`.
    pub fn from_kind(kind: SmootherKind) -> Self {
        match kind {
            SmootherKind::Gsrb(update) => Smoother::Gsrb(Gsrb::new(update)),
            SmootherKind::Chebyshev => Smoother::Chebyshev(Chebyshev::default()),
            SmootherKind::Jacobi => Smoother::Jacobi(Jacobi::weighted()),
            SmootherKind::L1Jacobi => Smoother::Jacobi(Jacobi::l1()),
            SmootherKind::SymGs => Smoother::SymGs(SymGs::default()),
        }
    }

    pub fn kind(&self) -> SmootherKind {
        match self {
            Smoother::Gsrb(g) => SmootherKind::Gsrb(g.update),
            Smoother::Chebyshev(_) => SmootherKind::Chebyshev,
            Smoother::Jacobi(j) if j.l1 => SmootherKind::L1Jacobi,
            Smoother::Jacobi(_) => SmootherKind::Jacobi,
            Smoother::SymGs(_) => SmootherKind::SymGs,
        }
    }
}

impl Smooth for Smoother {
    fn smooth(&self, ctx: &SmoothContext<'_>, level: &mut Level, x: FieldId, rhs: FieldId) -> Result<(), MgError> {
        match self {
            Smoother::Gsrb(s) => s.smooth(ctx, level, x, rhs),
            Smoother::Chebyshev(s) => s.smooth(ctx, level, x, rhs),
            Smoother::Jacobi(s) => s.smooth(ctx, level, x, rhs),
            Smoother::SymGs(s) => s.smooth(ctx, level, x, rhs),
        }
    }

    fn sweeps(&self) -> usize {
        match self {
            Smoother::Gsrb(s) => s.sweeps(),
            Smoother::Chebyshev(s) => s.sweeps(),
            Smoother::Jacobi(s) => s.sweeps(),
            Smoother::SymGs(s) => s.sweeps(),
        }
    }

    fn follows_backend(&self) -> bool {
        match self {
            Smoother::Gsrb(s) => s.follows_backend(),
            Smoother::Chebyshev(s) => s.follows_backend(),
            Smoother::Jacobi(s) => s.follows_backend(),
            Smoother::SymGs(s) => s.follows_backend(),
        }
    }
}

/// `x`, `rhs` and the scratch field must be three different buffers.
pub(crate) fn check_distinct(x: FieldId, rhs: FieldId) -> Result<(), MgError> {
    for (p, q) in [(x, rhs), (x, FieldId::Temp), (rhs, FieldId::Temp)] {
        if p == q {
            return Err(MgError::AliasedFields(p, q));
        }
    }
    Ok(())
}

/// Out-of-place point relaxation over `cells`:
/// `out = x + weight·inv·(rhs − A·x)`, leaving other cells of `out` untouched.
#[allow(clippy::too_many_arguments)]
pub(crate) fn relax_into<K: Kernel>(
    ctx: &SmoothContext<'_>,
    level: &mut Level,
    out: FieldId,
    x: FieldId,
    rhs: FieldId,
    inv: FieldId,
    weight: f64,
    cells: CellSet,
) -> Result<(), MgError> {
    level.with_field_mut(out, |lvl, o| {
        let op = StencilOperator::new(lvl, K::KIND, ctx.a, ctx.b)?;
        let (xs, f, d) = (lvl.field(x)?, lvl.field(rhs)?, lvl.field(inv)?);
        sweep::<K, _>(ctx.backend, &op, xs, o, cells, |ijk, ax, o| {
            *o = xs[ijk] + weight * d[ijk] * (f[ijk] - ax);
        });
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GsrbUpdate;

    #[test]
    fn kinds_round_trip() {
        for kind in [
            SmootherKind::Gsrb(GsrbUpdate::InPlace),
            SmootherKind::Gsrb(GsrbUpdate::OutOfPlace),
            SmootherKind::Chebyshev,
            SmootherKind::Jacobi,
            SmootherKind::L1Jacobi,
            SmootherKind::SymGs,
        ] {
            assert_eq!(Smoother::from_kind(kind).kind(), kind);
        }
    }

    #[test]
    fn sweep_counts() {
        assert_eq!(Smoother::from_kind(SmootherKind::Gsrb(GsrbUpdate::InPlace)).sweeps(), 6);
        assert_eq!(Smoother::from_kind(SmootherKind::Chebyshev).sweeps(), 6);
        assert_eq!(Smoother::from_kind(SmootherKind::L1Jacobi).sweeps(), 6);
        assert_eq!(Smoother::from_kind(SmootherKind::SymGs).sweeps(), 4);
    }

    #[test]
    fn aliasing_is_rejected() {
        assert!(check_distinct(FieldId::Solution, FieldId::Rhs).is_ok());
        assert!(check_distinct(FieldId::Solution, FieldId::Solution).is_err());
        assert!(check_distinct(FieldId::Temp, FieldId::Rhs).is_err());
        assert!(check_distinct(FieldId::Solution, FieldId::Temp).is_err());
    }
}
