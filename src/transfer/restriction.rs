//! Conservative restriction by averaging.

use crate::core::traits::{Restriction, RestrictionKind};
use crate::error::MgError;
use crate::grid::{FieldId, Level};

/// Volume average for cell fields, area average for face fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Restrictor;

pub(crate) fn check_refinement(fine: &Level, coarse: &Level) -> Result<(), MgError> {
    let (f, c) = (fine.dim(), coarse.dim());
    if (0..3).any(|d| f[d] != 2 * c[d]) {
        return Err(MgError::Shape(format!("fine level {f:?} is not a 2x refinement of {c:?}")));
    }
    Ok(())
}

impl Restriction for Restrictor {
    fn restrict(
        &self,
        coarse: &mut Level,
        dst: FieldId,
        fine: &Level,
        src: FieldId,
        kind: RestrictionKind,
    ) -> Result<(), MgError> {
        check_refinement(fine, coarse)?;
        let fg = fine.geometry();
        let cg = coarse.geometry();
        let f = fine.field(src)?;
        let c = coarse.field_mut(dst)?;
        let fv = |i: usize, j: usize, k: usize| f[fg.index(i, j, k)];

        let [ci, cj, ck] = cg.dim;
        match kind {
            RestrictionKind::Cell => {
                for ([i, j, k], ijk) in cg.interior() {
                    let (i, j, k) = (2 * i, 2 * j, 2 * k);
                    c[ijk] = 0.125
                        * (fv(i, j, k)
                            + fv(i + 1, j, k)
                            + fv(i, j + 1, k)
                            + fv(i + 1, j + 1, k)
                            + fv(i, j, k + 1)
                            + fv(i + 1, j, k + 1)
                            + fv(i, j + 1, k + 1)
                            + fv(i + 1, j + 1, k + 1));
                }
            }
            RestrictionKind::FaceI => {
                for k in 0..ck {
                    for j in 0..cj {
                        for i in 0..=ci {
                            let (fi, fj, fk) = (2 * i, 2 * j, 2 * k);
                            c[cg.index(i, j, k)] = 0.25
                                * (fv(fi, fj, fk) + fv(fi, fj + 1, fk) + fv(fi, fj, fk + 1) + fv(fi, fj + 1, fk + 1));
                        }
                    }
                }
            }
            RestrictionKind::FaceJ => {
                for k in 0..ck {
                    for j in 0..=cj {
                        for i in 0..ci {
                            let (fi, fj, fk) = (2 * i, 2 * j, 2 * k);
                            c[cg.index(i, j, k)] = 0.25
                                * (fv(fi, fj, fk) + fv(fi + 1, fj, fk) + fv(fi, fj, fk + 1) + fv(fi + 1, fj, fk + 1));
                        }
                    }
                }
            }
            RestrictionKind::FaceK => {
                for k in 0..=ck {
                    for j in 0..cj {
                        for i in 0..ci {
                            let (fi, fj, fk) = (2 * i, 2 * j, 2 * k);
                            c[cg.index(i, j, k)] = 0.25
                                * (fv(fi, fj, fk) + fv(fi + 1, fj, fk) + fv(fi, fj + 1, fk) + fv(fi + 1, fj + 1, fk));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_average() {
        let mut fine = Level::cube(4, 0.25).unwrap();
        fine.fill_interior(FieldId::Solution, |i, _, _| i as f64).unwrap();
        let mut coarse = fine.coarsened().unwrap();
        Restrictor
            .restrict(&mut coarse, FieldId::Rhs, &fine, FieldId::Solution, RestrictionKind::Cell)
            .unwrap();
        let r = coarse.field(FieldId::Rhs).unwrap();
        assert_eq!(r[coarse.index(0, 0, 0)], 0.5);
        assert_eq!(r[coarse.index(1, 1, 1)], 2.5);
    }

    #[test]
    fn rejects_mismatched_levels() {
        let fine = Level::cube(4, 0.25).unwrap();
        let mut coarse = Level::cube(3, 0.5).unwrap();
        let err = Restrictor
            .restrict(&mut coarse, FieldId::Rhs, &fine, FieldId::Solution, RestrictionKind::Cell)
            .unwrap_err();
        assert!(matches!(err, MgError::Shape(_)));
    }
}
