//! Whole-field vector operations over the interior of a level.
//!
//! Element-wise updates run plane-parallel; reductions combine per-plane
//! partials in plane order, so every result is independent of thread count.
//! The destination may alias any input.

use crate::error::MgError;
use crate::grid::{FieldId, Level};
use crate::parallel::{for_each_plane, reduce_planes};

fn zip_into<F>(level: &mut Level, dst: FieldId, a: FieldId, b: FieldId, f: F) -> Result<(), MgError>
where
    F: Fn(f64, f64) -> f64 + Sync,
{
    let geom = level.geometry();
    let [di, dj, _] = geom.dim;
    level.with_field_mut(dst, |lvl, out| {
        let xa = if a == dst { None } else { Some(lvl.field(a)?) };
        let xb = if b == dst { None } else { Some(lvl.field(b)?) };
        for_each_plane(geom, out, |k, base, plane| {
            for j in 0..dj {
                let row = geom.index(0, j, k);
                for i in 0..di {
                    let ijk = row + i;
                    let o = &mut plane[ijk - base];
                    let av = xa.map_or(*o, |s| s[ijk]);
                    let bv = xb.map_or(*o, |s| s[ijk]);
                    *o = f(av, bv);
                }
            }
        });
        Ok(())
    })
}

fn reduce<F, C>(level: &Level, identity: f64, cell: F, combine: C) -> f64
where
    F: Fn(usize) -> f64 + Sync + Send,
    C: Fn(f64, f64) -> f64 + Sync + Send,
{
    let geom = level.geometry();
    let [di, dj, _] = geom.dim;
    reduce_planes(
        geom,
        identity,
        |k| {
            let mut acc = identity;
            for j in 0..dj {
                let row = geom.index(0, j, k);
                for i in 0..di {
                    acc = combine(acc, cell(row + i));
                }
            }
            acc
        },
        &combine,
    )
}

/// Zero every entry of a field, ghosts included.
pub fn zero_vector(level: &mut Level, id: FieldId) -> Result<(), MgError> {
    level.fill(id, 0.0)
}

/// Set every interior entry to `value`.
pub fn set_vector(level: &mut Level, id: FieldId, value: f64) -> Result<(), MgError> {
    zip_into(level, id, id, id, |_, _| value)
}

/// `dst = src` on the interior.
pub fn copy_vector(level: &mut Level, dst: FieldId, src: FieldId) -> Result<(), MgError> {
    zip_into(level, dst, src, src, |s, _| s)
}

/// `dst = scale·src`
pub fn scale_vector(level: &mut Level, dst: FieldId, scale: f64, src: FieldId) -> Result<(), MgError> {
    zip_into(level, dst, src, src, |s, _| scale * s)
}

/// `c = sa·a + sb·b`
pub fn add_vectors(level: &mut Level, c: FieldId, sa: f64, a: FieldId, sb: f64, b: FieldId) -> Result<(), MgError> {
    zip_into(level, c, a, b, |x, y| sa * x + sb * y)
}

/// `c = scale·a·b`
pub fn mul_vectors(level: &mut Level, c: FieldId, scale: f64, a: FieldId, b: FieldId) -> Result<(), MgError> {
    zip_into(level, c, a, b, |x, y| scale * x * y)
}

/// `dst = src + shift`
pub fn shift_vector(level: &mut Level, dst: FieldId, src: FieldId, shift: f64) -> Result<(), MgError> {
    zip_into(level, dst, src, src, |s, _| s + shift)
}

pub fn dot(level: &Level, a: FieldId, b: FieldId) -> Result<f64, MgError> {
    let (xa, xb) = (level.field(a)?, level.field(b)?);
    Ok(reduce(level, 0.0, |ijk| xa[ijk] * xb[ijk], |acc, v| acc + v))
}

/// Max-norm over the interior.
pub fn norm(level: &Level, id: FieldId) -> Result<f64, MgError> {
    let x = level.field(id)?;
    Ok(reduce(level, 0.0, |ijk| x[ijk].abs(), f64::max))
}

pub fn mean(level: &Level, id: FieldId) -> Result<f64, MgError> {
    let x = level.field(id)?;
    let sum = reduce(level, 0.0, |ijk| x[ijk], |acc, v| acc + v);
    Ok(sum / level.geometry().interior_cells() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level() -> Level {
        let mut level = Level::new([3, 2, 2], 1.0).unwrap();
        level.fill_interior(FieldId::Solution, |i, j, k| (i + 2 * j + 3 * k) as f64).unwrap();
        level.fill_interior(FieldId::Rhs, |_, _, _| 2.0).unwrap();
        level
    }

    #[test]
    fn reductions() {
        let level = level();
        assert_eq!(norm(&level, FieldId::Solution).unwrap(), 7.0);
        // Σ(i + 2j + 3k) over 3×2×2 = 12 + 12 + 18
        assert_eq!(dot(&level, FieldId::Solution, FieldId::Rhs).unwrap(), 2.0 * 42.0);
        assert_eq!(mean(&level, FieldId::Rhs).unwrap(), 2.0);
    }

    #[test]
    fn aliasing_destination() {
        let mut level = level();
        add_vectors(&mut level, FieldId::Solution, 2.0, FieldId::Solution, -1.0, FieldId::Rhs).unwrap();
        let x = level.field(FieldId::Solution).unwrap();
        assert_eq!(x[level.index(2, 1, 1)], 2.0 * 7.0 - 2.0);
        scale_vector(&mut level, FieldId::Rhs, 0.5, FieldId::Rhs).unwrap();
        assert_eq!(mean(&level, FieldId::Rhs).unwrap(), 1.0);
    }

    #[test]
    fn element_wise_ops_leave_ghosts_alone() {
        let mut level = level();
        level.fill(FieldId::Residual, 9.0).unwrap();
        mul_vectors(&mut level, FieldId::Residual, 1.0, FieldId::Rhs, FieldId::Rhs).unwrap();
        shift_vector(&mut level, FieldId::Residual, FieldId::Residual, -1.0).unwrap();
        let r = level.field(FieldId::Residual).unwrap();
        assert_eq!(r[level.index(0, 0, 0)], 3.0);
        assert_eq!(r[level.index_signed(-1, 0, 0)], 9.0);
        copy_vector(&mut level, FieldId::Temp, FieldId::Residual).unwrap();
        set_vector(&mut level, FieldId::Residual, 0.0).unwrap();
        assert_eq!(norm(&level, FieldId::Temp).unwrap(), 3.0);
        assert_eq!(norm(&level, FieldId::Residual).unwrap(), 0.0);
        zero_vector(&mut level, FieldId::Residual).unwrap();
        assert!(level.field(FieldId::Residual).unwrap().iter().all(|&v| v == 0.0));
    }
}
