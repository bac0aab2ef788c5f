//! Chebyshev polynomial smoother.
//!
//! Targets the upper part `[λmax/8, λmax]` of the spectrum of `D⁻¹A`, with
//! `λmax` taken from the estimate the last rebuild stored on the level.

use log::trace;

use crate::core::traits::StencilShape;
use crate::error::MgError;
use crate::grid::{FieldId, Level, vector_ops};
use crate::operator::stencil::{Kernel, StencilOperator, with_kernel};
use crate::parallel::{CellSet, sweep};

use super::{Smooth, SmoothContext, check_distinct};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Chebyshev {
    pub degree: usize,
    /// Ratio `λmax / λmin` of the smoothed interval.
    pub interval_ratio: f64,
}

impl Default for Chebyshev {
    fn default() -> Self {
        Self { degree: 6, interval_ratio: 8.0 }
    }
}

impl Chebyshev {
    /// Three-term recurrence coefficients `(c1, c2)` for a spectrum bounded by `lambda_max`.
    pub fn coefficients(&self, lambda_max: f64) -> (Vec<f64>, Vec<f64>) {
        let beta = lambda_max;
        let alpha = beta / self.interval_ratio;
        let theta = 0.5 * (beta + alpha);
        let delta = 0.5 * (beta - alpha);
        let sigma = theta / delta;

        let mut c1 = vec![0.0; self.degree];
        let mut c2 = vec![0.0; self.degree];
        if self.degree == 0 {
            return (c1, c2);
        }
        c2[0] = 1.0 / theta;
        let mut rho_n = 1.0 / sigma;
        for s in 1..self.degree {
            let rho_nm1 = rho_n;
            rho_n = 1.0 / (2.0 * sigma - rho_nm1);
            c1[s] = rho_n * rho_nm1;
            c2[s] = rho_n * 2.0 / delta;
        }
        (c1, c2)
    }

    fn run<K: Kernel>(
        &self,
        ctx: &SmoothContext<'_>,
        level: &mut Level,
        x: FieldId,
        rhs: FieldId,
        lambda_max: f64,
    ) -> Result<(), MgError> {
        let (c1, c2) = self.coefficients(lambda_max);
        // x_{-1} = x_0 so the first step reads finite values
        vector_ops::copy_vector(level, FieldId::Temp, x)?;
        for (&c1, &c2) in c1.iter().zip(&c2) {
            ctx.exchange.exchange(level, x, StencilShape::Star)?;
            // Temp holds x_{n-1} and receives x_{n+1}
            level.with_field_mut(FieldId::Temp, |lvl, prev| {
                let op = StencilOperator::new(lvl, K::KIND, ctx.a, ctx.b)?;
                let (xn, f, dinv) = (lvl.field(x)?, lvl.field(rhs)?, lvl.field(FieldId::Dinv)?);
                sweep::<K, _>(ctx.backend, &op, xn, prev, CellSet::All, |ijk, ax, o| {
                    *o = xn[ijk] + c1 * (xn[ijk] - *o) + c2 * dinv[ijk] * (f[ijk] - ax);
                });
                Ok(())
            })?;
            level.swap_fields(x, FieldId::Temp);
        }
        Ok(())
    }
}

impl Smooth for Chebyshev {
    fn smooth(&self, ctx: &SmoothContext<'_>, level: &mut Level, x: FieldId, rhs: FieldId) -> Result<(), MgError> {
        check_distinct(x, rhs)?;
        let lambda_max = level.dominant_eigenvalue().ok_or(MgError::NotRebuilt)?;
        trace!("chebyshev: degree {} on {:?}, lambda_max = {lambda_max}", self.degree, level.dim());
        with_kernel!(ctx.stencil, K => self.run::<K>(ctx, level, x, rhs, lambda_max))
    }

    fn sweeps(&self) -> usize {
        self.degree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn first_step_is_scaled_jacobi() {
        let (c1, c2) = Chebyshev::default().coefficients(2.0);
        assert_eq!(c1.len(), 6);
        assert_eq!(c1[0], 0.0);
        // θ = (2 + 0.25) / 2
        assert_relative_eq!(c2[0], 1.0 / 1.125, epsilon = 1e-15);
    }

    #[test]
    fn recurrence_matches_closed_form() {
        let cheb = Chebyshev::default();
        let (c1, c2) = cheb.coefficients(1.0);
        let (theta, delta) = (0.5 * 1.125, 0.5 * 0.875);
        let sigma: f64 = theta / delta;
        let rho0 = 1.0 / sigma;
        let rho1 = 1.0 / (2.0 * sigma - rho0);
        assert_relative_eq!(c1[1], rho1 * rho0, epsilon = 1e-15);
        assert_relative_eq!(c2[1], 2.0 * rho1 / delta, epsilon = 1e-15);
        // ρ_n → σ − √(σ² − 1)
        let limit = sigma - (sigma * sigma - 1.0).sqrt();
        assert_relative_eq!(c1[5], limit * limit, epsilon = 1e-3);
    }
}
