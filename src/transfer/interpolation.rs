//! Coarse-to-fine interpolation of corrections.

use crate::core::traits::Interpolation;
use crate::error::MgError;
use crate::grid::{FieldId, Level};

use super::restriction::check_refinement;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpolationKind {
    /// Each fine cell takes its parent's value.
    PiecewiseConstant,
    /// Trilinear in the cell-centred sense: weights 3/4 and 1/4 per axis
    /// between the parent and its neighbour on the fine cell's side. Reads
    /// coarse ghosts.
    #[default]
    PiecewiseLinear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Interpolator {
    pub kind: InterpolationKind,
}

impl Interpolator {
    pub fn new(kind: InterpolationKind) -> Self {
        Self { kind }
    }
}

const NEAR: f64 = 0.75;
const FAR: f64 = 0.25;

impl Interpolation for Interpolator {
    fn interpolate(
        &self,
        fine: &mut Level,
        fine_field: FieldId,
        prescale: f64,
        coarse: &Level,
        coarse_field: FieldId,
    ) -> Result<(), MgError> {
        check_refinement(fine, coarse)?;
        let cg = coarse.geometry();
        let fg = fine.geometry();
        let c = coarse.field(coarse_field)?;
        let x = fine.field_mut(fine_field)?;

        for ([i, j, k], ijk) in fg.interior() {
            let (ci, cj, ck) = ((i / 2) as isize, (j / 2) as isize, (k / 2) as isize);
            let correction = match self.kind {
                InterpolationKind::PiecewiseConstant => c[cg.index_signed(ci, cj, ck)],
                InterpolationKind::PiecewiseLinear => {
                    let side = |f: usize| -> isize { if f % 2 == 1 { 1 } else { -1 } };
                    let (si, sj, sk) = (side(i), side(j), side(k));
                    let mut sum = 0.0;
                    for (dk, wk) in [(0, NEAR), (sk, FAR)] {
                        for (dj, wj) in [(0, NEAR), (sj, FAR)] {
                            for (di, wi) in [(0, NEAR), (si, FAR)] {
                                sum += wi * wj * wk * c[cg.index_signed(ci + di, cj + dj, ck + dk)];
                            }
                        }
                    }
                    sum
                }
            };
            x[ijk] = prescale * x[ijk] + correction;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_injection_with_prescale() {
        let mut fine = Level::cube(4, 0.25).unwrap();
        fine.fill(FieldId::Solution, 1.0).unwrap();
        let mut coarse = fine.coarsened().unwrap();
        coarse.fill_interior(FieldId::Solution, |i, j, k| (i + 2 * j + 4 * k) as f64).unwrap();
        Interpolator::new(InterpolationKind::PiecewiseConstant)
            .interpolate(&mut fine, FieldId::Solution, 2.0, &coarse, FieldId::Solution)
            .unwrap();
        let x = fine.field(FieldId::Solution).unwrap();
        assert_eq!(x[fine.index(0, 1, 0)], 2.0);
        assert_eq!(x[fine.index(3, 2, 1)], 2.0 + 3.0);
    }

    #[test]
    fn linear_weights_sum_to_one() {
        let total: f64 = [27.0, 9.0, 9.0, 9.0, 3.0, 3.0, 3.0, 1.0].iter().sum::<f64>() / 64.0;
        assert_eq!(total, 1.0);
        assert_eq!(NEAR * NEAR * NEAR, 27.0 / 64.0);
        assert_eq!(NEAR * NEAR * FAR, 9.0 / 64.0);
        assert_eq!(FAR * FAR * FAR, 1.0 / 64.0);
    }
}
