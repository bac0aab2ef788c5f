//! The finite-volume 7-point operator `a·alpha·u − b·∇·(beta∇u)`.
//!
//! Each formula variant is a zero-sized [`Kernel`] type. Sweeps are generic
//! over the kernel, and [`with_kernel!`] selects it once per invocation from
//! the runtime [`StencilKind`], so the inner loops never branch on the variant.

use crate::core::traits::StencilShape;
use crate::error::MgError;
use crate::grid::{FieldId, Geometry, Level};

/// Bind the kernel type for a [`StencilKind`] to `$k` and evaluate `$body`.
macro_rules! with_kernel {
    ($kind:expr, $k:ident => $body:expr) => {
        match $kind {
            $crate::operator::stencil::StencilKind::Constant => {
                type $k = $crate::operator::stencil::ConstantCoefficient;
                $body
            }
            $crate::operator::stencil::StencilKind::VariablePoisson => {
                type $k = $crate::operator::stencil::VariablePoisson;
                $body
            }
            $crate::operator::stencil::StencilKind::VariableHelmholtz => {
                type $k = $crate::operator::stencil::VariableHelmholtz;
                $body
            }
        }
    };
}
pub(crate) use with_kernel;

/// Radius of the stencil: face neighbours only.
pub const STENCIL_RADIUS: usize = 1;

pub fn stencil_radius() -> usize {
    STENCIL_RADIUS
}

pub fn stencil_shape() -> StencilShape {
    StencilShape::Star
}

/// Formula variant of the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StencilKind {
    /// `a·x − b·h⁻²·(Σ neighbours − 6x)`; no coefficient arrays.
    Constant,
    /// `−b·h⁻²·Σ beta_face·(x_nbr − x)`; `alpha` is never read.
    VariablePoisson,
    /// `a·alpha·x − b·h⁻²·Σ beta_face·(x_nbr − x)`.
    VariableHelmholtz,
}

impl StencilKind {
    pub fn uses_alpha(self) -> bool {
        matches!(self, StencilKind::VariableHelmholtz)
    }

    pub fn uses_beta(self) -> bool {
        !matches!(self, StencilKind::Constant)
    }
}

/// Read-only operator data for one level: scalars, geometry and the
/// coefficient arrays the kind needs (empty slices otherwise).
#[derive(Debug, Clone, Copy)]
pub struct StencilOperator<'a> {
    kind: StencilKind,
    pub a: f64,
    pub b: f64,
    pub h2inv: f64,
    geom: Geometry,
    alpha: &'a [f64],
    beta_i: &'a [f64],
    beta_j: &'a [f64],
    beta_k: &'a [f64],
}

impl<'a> StencilOperator<'a> {
    pub fn new(level: &'a Level, kind: StencilKind, a: f64, b: f64) -> Result<Self, MgError> {
        let alpha = if kind.uses_alpha() { level.field(FieldId::Alpha)? } else { &[][..] };
        let (beta_i, beta_j, beta_k) = if kind.uses_beta() {
            (
                level.field(FieldId::BetaI)?,
                level.field(FieldId::BetaJ)?,
                level.field(FieldId::BetaK)?,
            )
        } else {
            (&[][..], &[][..], &[][..])
        };
        Ok(Self {
            kind,
            a,
            b,
            h2inv: level.h2inv(),
            geom: level.geometry(),
            alpha,
            beta_i,
            beta_j,
            beta_k,
        })
    }

    #[inline]
    pub fn kind(&self) -> StencilKind {
        self.kind
    }

    #[inline]
    pub fn geometry(&self) -> Geometry {
        self.geom
    }

    /// Operator applied to `x` at cell `ijk`. Dispatches on the kind per call;
    /// sweeps use [`Kernel::apply_ijk`] directly.
    pub fn apply_op_ijk(&self, x: &[f64], ijk: usize) -> f64 {
        with_kernel!(self.kind, K => K::apply_ijk(self, x, ijk))
    }
}

/// One formula variant of the operator.
pub trait Kernel: Send + Sync + 'static {
    const KIND: StencilKind;

    /// Evaluate at coefficient index `ijk`, reading `x` around `c` with strides
    /// `xj`/`xk`. The two layouts coincide except in tile-local buffers.
    fn apply(op: &StencilOperator<'_>, x: &[f64], c: usize, xj: usize, xk: usize, ijk: usize) -> f64;

    #[inline(always)]
    fn apply_ijk(op: &StencilOperator<'_>, x: &[f64], ijk: usize) -> f64 {
        Self::apply(op, x, ijk, op.geom.j_stride, op.geom.k_stride, ijk)
    }
}

pub struct ConstantCoefficient;
pub struct VariablePoisson;
pub struct VariableHelmholtz;

impl Kernel for ConstantCoefficient {
    const KIND: StencilKind = StencilKind::Constant;

    #[inline(always)]
    fn apply(op: &StencilOperator<'_>, x: &[f64], c: usize, xj: usize, xk: usize, _ijk: usize) -> f64 {
        op.a * x[c]
            - op.b
                * op.h2inv
                * (x[c + 1] + x[c - 1] + x[c + xj] + x[c - xj] + x[c + xk] + x[c - xk] - x[c] * 6.0)
    }
}

#[inline(always)]
fn beta_flux(op: &StencilOperator<'_>, x: &[f64], c: usize, xj: usize, xk: usize, ijk: usize) -> f64 {
    let js = op.geom.j_stride;
    let ks = op.geom.k_stride;
    let xc = x[c];
    op.beta_i[ijk + 1] * (x[c + 1] - xc)
        + op.beta_i[ijk] * (x[c - 1] - xc)
        + op.beta_j[ijk + js] * (x[c + xj] - xc)
        + op.beta_j[ijk] * (x[c - xj] - xc)
        + op.beta_k[ijk + ks] * (x[c + xk] - xc)
        + op.beta_k[ijk] * (x[c - xk] - xc)
}

impl Kernel for VariablePoisson {
    const KIND: StencilKind = StencilKind::VariablePoisson;

    #[inline(always)]
    fn apply(op: &StencilOperator<'_>, x: &[f64], c: usize, xj: usize, xk: usize, ijk: usize) -> f64 {
        -op.b * op.h2inv * beta_flux(op, x, c, xj, xk, ijk)
    }
}

impl Kernel for VariableHelmholtz {
    const KIND: StencilKind = StencilKind::VariableHelmholtz;

    #[inline(always)]
    fn apply(op: &StencilOperator<'_>, x: &[f64], c: usize, xj: usize, xk: usize, ijk: usize) -> f64 {
        op.a * op.alpha[ijk] * x[c] - op.b * op.h2inv * beta_flux(op, x, c, xj, xk, ijk)
    }
}
