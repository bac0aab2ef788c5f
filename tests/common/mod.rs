//! Shared fixtures for the fvmg integration tests.
#![allow(dead_code)]

use std::f64::consts::PI;

use fvmg::core::traits::{BoundaryExchange, StencilShape};
use fvmg::grid::vector_ops::dot;
use fvmg::{FieldId, FvOperator, Level, MgError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Allocate and fill `Alpha` with values in `[1, 2)` and the betas (including
/// the owned high faces) with values in `[0.5, 1.5)`.
pub fn random_coefficients(level: &mut Level, rng: &mut StdRng) {
    level.allocate_coefficients();
    let alpha = level.field_mut(FieldId::Alpha).unwrap();
    alpha.iter_mut().for_each(|v| *v = rng.gen_range(1.0..2.0));
    for beta in [FieldId::BetaI, FieldId::BetaJ, FieldId::BetaK] {
        let data = level.field_mut(beta).unwrap();
        data.iter_mut().for_each(|v| *v = rng.gen_range(0.5..1.5));
    }
}

/// Unit coefficients everywhere.
pub fn unit_coefficients(level: &mut Level) {
    level.allocate_coefficients();
    for id in FieldId::COEFFICIENTS {
        level.fill(id, 1.0).unwrap();
    }
}

pub fn random_interior(level: &mut Level, id: FieldId, rng: &mut StdRng) {
    level.fill_interior(id, |_, _, _| rng.gen_range(-1.0..1.0)).unwrap();
}

/// `sin(πx)·sin(πy)·sin(πz)` at cell centres of the unit cube.
pub fn sine_rhs(level: &mut Level) {
    let h = level.h();
    level
        .fill_interior(FieldId::Rhs, |i, j, k| {
            let c = |n: usize| (PI * (n as f64 + 0.5) * h).sin();
            c(i) * c(j) * c(k)
        })
        .unwrap();
}

/// L2 norm of `rhs − A·x` after refreshing the ghosts of `x`.
pub fn residual_norm<E: BoundaryExchange + ?Sized>(
    op: &FvOperator,
    level: &mut Level,
    exchange: &E,
    a: f64,
    b: f64,
) -> Result<f64, MgError> {
    exchange.exchange(level, FieldId::Solution, StencilShape::Star)?;
    op.residual(level, FieldId::Residual, FieldId::Rhs, FieldId::Solution, a, b)?;
    Ok(dot(level, FieldId::Residual, FieldId::Residual)?.sqrt())
}
