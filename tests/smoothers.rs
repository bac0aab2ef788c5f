//! Smoother tests for fvmg
//!
//! Every smoother must reduce the residual of a 32³ Poisson problem
//! (`h = 1/32`, `a = 0`, `b = 1`, zero ghosts, sinusoidal right-hand side)
//! started from a rough initial guess, in constant and variable coefficient
//! modes.
//!
//! The halving checks start from a random guess rather than zero. With `x = 0`
//! the residual is the smooth sine mode itself, which a smoother barely
//! damps: red-black Gauss-Seidel even raises its L2 norm (about 64 to 88)
//! while the Jacobi-type smoothers, Chebyshev and SymGS lower it by a few
//! percent. The zero-guess case is covered separately with that weaker bound.

mod common;

use fvmg::config::GsrbUpdate;
use fvmg::core::traits::BoundaryExchange;
use fvmg::{
    Backend, BoundaryCondition, BuildFlags, CoefficientMode, Equation, FieldId, FvOperator, Level, LocalExchange,
    MgError, OperatorConfig, Restrictor, Smooth, SmootherKind,
};

use common::{random_coefficients, random_interior, residual_norm, rng, sine_rhs};

const ALL_SMOOTHERS: [SmootherKind; 6] = [
    SmootherKind::Gsrb(GsrbUpdate::InPlace),
    SmootherKind::Gsrb(GsrbUpdate::OutOfPlace),
    SmootherKind::Chebyshev,
    SmootherKind::Jacobi,
    SmootherKind::L1Jacobi,
    SmootherKind::SymGs,
];

fn poisson_level(n: usize, seed: u64) -> Level {
    let mut level = Level::cube(n, 1.0 / n as f64).unwrap();
    sine_rhs(&mut level);
    random_interior(&mut level, FieldId::Solution, &mut rng(seed));
    level
}

/// Rebuild, smooth once, and return the residual norms before and after.
fn smooth_once(op: &FvOperator, level: &mut Level, a: f64, b: f64) -> (f64, f64) {
    let exchange = LocalExchange::new(BoundaryCondition::ZeroGhost);
    op.rebuild_operator(level, None, a, b, &exchange, &Restrictor).unwrap();
    let before = residual_norm(op, level, &exchange, a, b).unwrap();
    op.smooth(level, FieldId::Solution, FieldId::Rhs, a, b, &exchange).unwrap();
    let after = residual_norm(op, level, &exchange, a, b).unwrap();
    (before, after)
}

/// Each smoother reduces the residual of the constant-coefficient Poisson problem.
#[test]
fn constant_coefficient_smoothers_reduce_residual() {
    for (seed, smoother) in ALL_SMOOTHERS.into_iter().enumerate() {
        let cfg = OperatorConfig::new(smoother, CoefficientMode::Constant, Equation::Poisson, Backend::Threaded).unwrap();
        let op = FvOperator::new(cfg);
        let mut level = poisson_level(32, seed as u64);
        let (before, after) = smooth_once(&op, &mut level, 0.0, 1.0);
        assert!(
            after < 0.5 * before,
            "{}: residual {before:.3e} -> {after:.3e}",
            smoother.name()
        );
    }
}

/// The same holds with unit-scale random coefficients in variable mode.
#[test]
fn variable_coefficient_smoothers_reduce_residual() {
    for (seed, smoother) in ALL_SMOOTHERS.into_iter().enumerate() {
        for equation in [Equation::Poisson, Equation::Helmholtz] {
            let cfg = OperatorConfig::new(smoother, CoefficientMode::Variable, equation, Backend::Threaded).unwrap();
            let op = FvOperator::new(cfg);
            let mut level = poisson_level(32, 100 + seed as u64);
            random_coefficients(&mut level, &mut rng(200 + seed as u64));
            let a = if equation == Equation::Helmholtz { 1.0 } else { 0.0 };
            let (before, after) = smooth_once(&op, &mut level, a, 1.0);
            assert!(
                after < 0.5 * before,
                "{} ({equation:?}): residual {before:.3e} -> {after:.3e}",
                smoother.name()
            );
        }
    }
}

/// From a zero guess the residual is the sine mode. Only the smoothers that
/// do not overshoot a smooth mode are required to lower it.
#[test]
fn zero_guess_on_smooth_mode() {
    for smoother in [SmootherKind::Chebyshev, SmootherKind::Jacobi, SmootherKind::L1Jacobi, SmootherKind::SymGs] {
        let cfg = OperatorConfig::new(smoother, CoefficientMode::Constant, Equation::Poisson, Backend::Serial).unwrap();
        let op = FvOperator::new(cfg);
        let mut level = Level::cube(32, 1.0 / 32.0).unwrap();
        sine_rhs(&mut level);
        let (before, after) = smooth_once(&op, &mut level, 0.0, 1.0);
        assert!(after < before, "{}: residual {before:.3e} -> {after:.3e}", smoother.name());
    }
}

/// Repeated smoothing keeps reducing the residual.
#[test]
fn repeated_smoothing_is_monotone() {
    let cfg = OperatorConfig::from_flags(BuildFlags::GSRB | BuildFlags::CONSTANT_COEFFICIENT).unwrap();
    let op = FvOperator::new(cfg);
    let exchange = LocalExchange::default();
    let mut level = poisson_level(16, 5);
    op.rebuild_operator(&mut level, None, 0.0, 1.0, &exchange, &Restrictor).unwrap();
    let mut last = residual_norm(&op, &mut level, &exchange, 0.0, 1.0).unwrap();
    for _ in 0..4 {
        op.smooth(&mut level, FieldId::Solution, FieldId::Rhs, 0.0, 1.0, &exchange).unwrap();
        let now = residual_norm(&op, &mut level, &exchange, 0.0, 1.0).unwrap();
        assert!(now < last);
        last = now;
    }
}

/// In-place and out-of-place GSRB compute the same iterate.
#[test]
fn gsrb_update_schemes_agree() {
    let exchange = LocalExchange::default();
    let mut results = Vec::new();
    for update in [GsrbUpdate::InPlace, GsrbUpdate::OutOfPlace] {
        let cfg = OperatorConfig::new(
            SmootherKind::Gsrb(update),
            CoefficientMode::Constant,
            Equation::Poisson,
            Backend::Serial,
        )
        .unwrap();
        let op = FvOperator::new(cfg);
        let mut level = poisson_level(8, 77);
        op.rebuild_operator(&mut level, None, 0.0, 1.0, &exchange, &Restrictor).unwrap();
        op.smooth(&mut level, FieldId::Solution, FieldId::Rhs, 0.0, 1.0, &exchange).unwrap();
        let x = level.field(FieldId::Solution).unwrap();
        results.push(level.geometry().interior().map(|(_, ijk)| x[ijk]).collect::<Vec<_>>());
    }
    assert_eq!(results[0], results[1]);
}

/// Smoothers refuse to run when `x`, `rhs` and `Temp` overlap.
#[test]
fn aliased_fields_are_rejected() {
    let cfg = OperatorConfig::from_flags(BuildFlags::JACOBI | BuildFlags::CONSTANT_COEFFICIENT).unwrap();
    let op = FvOperator::new(cfg);
    let exchange = LocalExchange::default();
    let mut level = poisson_level(4, 1);
    op.rebuild_operator(&mut level, None, 0.0, 1.0, &exchange, &Restrictor).unwrap();
    let err = op
        .smooth(&mut level, FieldId::Temp, FieldId::Rhs, 0.0, 1.0, &exchange)
        .unwrap_err();
    assert!(matches!(err, MgError::AliasedFields(..)));
    let err = op
        .smooth(&mut level, FieldId::Solution, FieldId::Solution, 0.0, 1.0, &exchange)
        .unwrap_err();
    assert!(matches!(err, MgError::AliasedFields(FieldId::Solution, FieldId::Solution)));
}

/// Invalid selections never produce an operator.
#[test]
fn invalid_configurations() {
    assert!(matches!(
        OperatorConfig::from_flags(BuildFlags::CHEBYSHEV | BuildFlags::SYMGS),
        Err(MgError::Config(_))
    ));
    assert!(matches!(
        OperatorConfig::new(SmootherKind::SymGs, CoefficientMode::Variable, Equation::Poisson, Backend::tiled()),
        Err(MgError::Config(_))
    ));
}

/// In-place Gauss-Seidel orderings run serially whatever the backend.
#[test]
fn sequential_smoothers_ignore_the_backend() {
    for (smoother, follows) in [
        (SmootherKind::Gsrb(GsrbUpdate::InPlace), false),
        (SmootherKind::Gsrb(GsrbUpdate::OutOfPlace), true),
        (SmootherKind::Chebyshev, true),
        (SmootherKind::Jacobi, true),
        (SmootherKind::L1Jacobi, true),
        (SmootherKind::SymGs, false),
    ] {
        let cfg = OperatorConfig::new(smoother, CoefficientMode::Constant, Equation::Poisson, Backend::Threaded).unwrap();
        assert_eq!(FvOperator::new(cfg).smoother().follows_backend(), follows, "{}", smoother.name());
    }
}

/// Rebuild, smooth and interpolate all accept an exchange behind a trait object.
#[test]
fn exchange_behind_a_trait_object() {
    let cfg = OperatorConfig::from_flags(BuildFlags::GSRB | BuildFlags::CONSTANT_COEFFICIENT).unwrap();
    let op = FvOperator::new(cfg);
    let exchange: Box<dyn BoundaryExchange> = Box::new(LocalExchange::new(BoundaryCondition::Periodic));
    let mut level = poisson_level(8, 11);
    op.rebuild_operator(&mut level, None, 0.0, 1.0, exchange.as_ref(), &Restrictor).unwrap();
    let before = residual_norm(&op, &mut level, exchange.as_ref(), 0.0, 1.0).unwrap();
    op.smooth(&mut level, FieldId::Solution, FieldId::Rhs, 0.0, 1.0, exchange.as_ref()).unwrap();
    let after = residual_norm(&op, &mut level, exchange.as_ref(), 0.0, 1.0).unwrap();
    assert!(after < before);

    let mut coarse = level.coarsened().unwrap();
    coarse.fill_interior(FieldId::Solution, |_, _, _| 1.0).unwrap();
    op.interpolation_vcycle(&mut level, FieldId::Residual, 0.0, &mut coarse, FieldId::Solution, exchange.as_ref())
        .unwrap();
    let r = level.field(FieldId::Residual).unwrap();
    assert!(level.geometry().interior().all(|(_, ijk)| (r[ijk] - 1.0).abs() < 1e-14));
}
