//! Tiled execution backend.
//!
//! The interior is cut into `ti × tj × tk` tiles. Each tile gathers its input
//! values plus a one-cell halo into a contiguous local buffer and evaluates
//! the same kernel against that buffer with tile-local strides; coefficients
//! are still read from the level arrays. Slabs of `tk` planes run in parallel.

use crate::grid::{GHOSTS, Geometry};
use crate::operator::stencil::{Kernel, StencilOperator};

use super::CellSet;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Tile extents used when none are configured.
pub const DEFAULT_TILE: [usize; 3] = [32, 8, 2];

pub(crate) fn sweep<K, F>(tile: [usize; 3], op: &StencilOperator<'_>, x: &[f64], out: &mut [f64], cells: CellSet, update: &F)
where
    K: Kernel,
    F: Fn(usize, f64, &mut f64) + Sync,
{
    let geom = op.geometry();
    let ks = geom.k_stride;
    let dk = geom.dim[2];
    let tk = tile[2];
    let body = &mut out[GHOSTS * ks..(GHOSTS + dk) * ks];

    let run_slab = |(slab, chunk): (usize, &mut [f64])| {
        let k0 = slab * tk;
        let base = (k0 + GHOSTS) * ks;
        let mut local = Vec::new();
        slab_tiles::<K, F>(geom, tile, k0, op, x, chunk, base, cells, update, &mut local);
    };

    #[cfg(feature = "rayon")]
    body.par_chunks_mut(ks * tk).enumerate().for_each(run_slab);

    #[cfg(not(feature = "rayon"))]
    body.chunks_mut(ks * tk).enumerate().for_each(run_slab);
}

#[allow(clippy::too_many_arguments)]
fn slab_tiles<K, F>(
    geom: Geometry,
    tile: [usize; 3],
    k0: usize,
    op: &StencilOperator<'_>,
    x: &[f64],
    chunk: &mut [f64],
    base: usize,
    cells: CellSet,
    update: &F,
    local: &mut Vec<f64>,
) where
    K: Kernel,
    F: Fn(usize, f64, &mut f64) + Sync,
{
    let [di, dj, dk] = geom.dim;
    let nk = tile[2].min(dk - k0);
    for j0 in (0..dj).step_by(tile[1]) {
        let nj = tile[1].min(dj - j0);
        for i0 in (0..di).step_by(tile[0]) {
            let ni = tile[0].min(di - i0);
            let lj = ni + 2;
            let lk = lj * (nj + 2);

            local.clear();
            local.resize(lk * (nk + 2), 0.0);
            for kk in 0..nk + 2 {
                for jj in 0..nj + 2 {
                    let src = geom.index_signed(
                        i0 as isize - 1,
                        (j0 + jj) as isize - 1,
                        (k0 + kk) as isize - 1,
                    );
                    let dst = jj * lj + kk * lk;
                    local[dst..dst + ni + 2].copy_from_slice(&x[src..src + ni + 2]);
                }
            }

            for kk in 0..nk {
                let k = k0 + kk;
                for jj in 0..nj {
                    let j = j0 + jj;
                    for ii in 0..ni {
                        let i = i0 + ii;
                        if !cells.contains(i, j, k) {
                            continue;
                        }
                        let ijk = geom.index(i, j, k);
                        let l = (ii + 1) + (jj + 1) * lj + (kk + 1) * lk;
                        let ax = K::apply(op, local.as_slice(), l, lj, lk, ijk);
                        update(ijk, ax, &mut chunk[ijk - base]);
                    }
                }
            }
        }
    }
}
