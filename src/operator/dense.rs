//! Dense assembly of a level operator, for checking small levels against
//! direct linear algebra.

use faer::Mat;

use crate::error::MgError;
use crate::grid::Level;
use crate::operator::stencil::{StencilKind, StencilOperator};

/// Assemble the `n × n` matrix of the operator over the interior cells of
/// `level` (lexicographic order, i fastest) with zero ghost values.
///
/// Each column is the response to a unit vector; only the seven rows the
/// stencil can reach are evaluated.
pub fn assemble_dense(level: &Level, kind: StencilKind, a: f64, b: f64) -> Result<Mat<f64>, MgError> {
    let op = StencilOperator::new(level, kind, a, b)?;
    let geom = level.geometry();
    let cells: Vec<usize> = geom.interior().map(|(_, ijk)| ijk).collect();
    let n = cells.len();

    let mut row_of = vec![usize::MAX; geom.volume];
    for (row, &ijk) in cells.iter().enumerate() {
        row_of[ijk] = row;
    }

    let (js, ks) = (geom.j_stride, geom.k_stride);
    let mut x = vec![0.0; geom.volume];
    let mut data = vec![0.0; n * n];
    for (col, &src) in cells.iter().enumerate() {
        x[src] = 1.0;
        for dst in [src, src - 1, src + 1, src - js, src + js, src - ks, src + ks] {
            let row = row_of[dst];
            if row != usize::MAX {
                data[col * n + row] = op.apply_op_ijk(&x, dst);
            }
        }
        x[src] = 0.0;
    }

    Ok(Mat::from_fn(n, n, |i, j| data[j * n + i]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_laplacian_rows() {
        let level = Level::new([3, 2, 1], 1.0).unwrap();
        let m = assemble_dense(&level, StencilKind::Constant, 0.0, 1.0).unwrap();
        assert_eq!(m.nrows(), 6);
        for r in 0..6 {
            assert_eq!(m[(r, r)], 6.0);
        }
        assert_eq!(m[(0, 1)], -1.0);
        assert_eq!(m[(0, 3)], -1.0);
        assert_eq!(m[(0, 4)], 0.0);
    }
}
