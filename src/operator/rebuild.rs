//! Operator rebuild: coefficient restriction, ghost exchange and the black-box
//! recomputation of `Dinv`, `L1inv` and the dominant eigenvalue of `D⁻¹A`.
//!
//! The diagonal is never derived from the formula. Instead the operator is
//! probed with the probe-colour indicator vectors: two cells of one probe
//! colour never touch, even across a periodic wrap, so `A·e_c` reads `A_ii` at every colour-`c` cell and a sum of
//! off-diagonal entries everywhere else. Boundary conditions enter through the
//! exchange of the probe, so the diagonal includes their contribution.

use log::debug;

use crate::config::{CoefficientMode, Equation, OperatorConfig};
use crate::core::traits::{BoundaryExchange, Restriction, RestrictionKind, StencilShape};
use crate::error::MgError;
use crate::grid::{FieldId, Level};
use crate::operator::stencil::{Kernel, StencilOperator, with_kernel};
use crate::parallel::{CellSet, sweep};
use crate::utils::coloring::{probe_blocks, probe_color};

/// Rebuild the operator data of `level`, restricting coefficients from `from`
/// (the next finer level) first when given.
///
/// Order: restrict `Alpha`/betas, exchange them (box), probe the operator for
/// the diagonal and row sums, write `Dinv`/`L1Inv`, exchange those (box).
#[allow(clippy::too_many_arguments)]
pub fn rebuild_operator<E, R>(
    config: &OperatorConfig,
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
    let variable = config.coefficients == CoefficientMode::Variable;

    if variable {
        if let Some(fine) = from {
            if config.equation == Equation::Helmholtz || fine.is_allocated(FieldId::Alpha) {
                restriction.restrict(level, FieldId::Alpha, fine, FieldId::Alpha, RestrictionKind::Cell)?;
            }
            for beta in [FieldId::BetaI, FieldId::BetaJ, FieldId::BetaK] {
                restriction.restrict(level, beta, fine, beta, RestrictionKind::for_field(beta))?;
            }
        }

        if level.is_allocated(FieldId::Alpha) {
            exchange.exchange(level, FieldId::Alpha, StencilShape::Box)?;
        }
        for beta in [FieldId::BetaI, FieldId::BetaJ, FieldId::BetaK] {
            exchange.exchange(level, beta, StencilShape::Box)?;
        }
    }

    let lambda = with_kernel!(config.stencil(), K => blackbox::<K, E>(config, level, a, b, exchange))?;
    level.set_dominant_eigenvalue(lambda);

    exchange.exchange(level, FieldId::Dinv, StencilShape::Box)?;
    exchange.exchange(level, FieldId::L1Inv, StencilShape::Box)?;

    debug!(
        "rebuilt {} operator on {:?} level (h = {}): dominant eigenvalue of D^-1 A <= {lambda}",
        config.smoother.name(),
        level.dim(),
        level.h()
    );
    Ok(())
}

/// Probe the operator colour by colour, fill `Dinv` and `L1Inv` and return the
/// Gershgorin bound on the spectrum of `D⁻¹A`.
fn blackbox<K, E>(config: &OperatorConfig, level: &mut Level, a: f64, b: f64, exchange: &E) -> Result<f64, MgError>
where
    K: Kernel,
    E: BoundaryExchange + ?Sized,
{
    let geom = level.geometry();
    let blocks = probe_blocks(geom.dim);
    let mut diag = vec![0.0; geom.volume];
    let mut off = vec![0.0; geom.volume];
    let mut y = vec![0.0; geom.volume];

    for (color, cells) in blocks.iter().enumerate() {
        let probe = level.field_mut(FieldId::Temp)?;
        probe.fill(0.0);
        for &[i, j, k] in cells {
            probe[geom.index(i, j, k)] = 1.0;
        }
        exchange.exchange(level, FieldId::Temp, StencilShape::Star)?;

        let op = StencilOperator::new(level, K::KIND, a, b)?;
        let probe = level.field(FieldId::Temp)?;
        sweep::<K, _>(config.backend, &op, probe, &mut y, CellSet::All, |_, ax, o| *o = ax);

        for ([i, j, k], ijk) in geom.interior() {
            if probe_color(geom.dim, i, j, k) == color {
                diag[ijk] = y[ijk];
            } else {
                off[ijk] += y[ijk].abs();
            }
        }
    }
    level.fill(FieldId::Temp, 0.0)?;

    let mut lambda = f64::NEG_INFINITY;
    let mut dinv = vec![0.0; geom.volume];
    let mut l1inv = vec![0.0; geom.volume];
    for (_, ijk) in geom.interior() {
        let row = diag[ijk].abs() + off[ijk];
        dinv[ijk] = 1.0 / diag[ijk];
        l1inv[ijk] = 1.0 / row;
        let bound = row / diag[ijk];
        if bound > lambda || bound.is_nan() {
            lambda = bound;
        }
    }

    level.field_mut(FieldId::Dinv)?.copy_from_slice(&dinv);
    level.field_mut(FieldId::L1Inv)?.copy_from_slice(&l1inv);
    Ok(lambda)
}
