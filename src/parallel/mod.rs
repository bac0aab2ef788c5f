//! Execution backends for cell sweeps.
//!
//! A sweep visits a set of interior cells, evaluates the stencil on an input
//! field and hands `(ijk, Ax, &mut out[ijk])` to an update closure. Cells are
//! independent within a sweep, so the serial, threaded and tiled backends all
//! produce bit-identical output.

use crate::config::Backend;
use crate::grid::{GHOSTS, Geometry};
use crate::operator::stencil::{Kernel, StencilOperator};
use crate::utils::coloring::red_black;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

pub mod tiled;

/// Interior cells visited by a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellSet {
    All,
    /// Cells whose red-black parity `(i+j+k) mod 2` equals the value.
    Parity(usize),
}

impl CellSet {
    #[inline(always)]
    pub fn contains(self, i: usize, j: usize, k: usize) -> bool {
        match self {
            CellSet::All => true,
            CellSet::Parity(p) => red_black(i, j, k) == p,
        }
    }
}

/// Build the global rayon pool. `None` sizes it by the number of CPUs. Calling
/// this more than once is harmless; the first pool wins.
#[cfg(feature = "rayon")]
pub fn init_thread_pool(threads: Option<usize>) {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads.unwrap_or_else(num_cpus::get))
        .build_global()
        .ok();
}

#[cfg(not(feature = "rayon"))]
pub fn init_thread_pool(_threads: Option<usize>) {}

/// Number of workers a threaded sweep can use.
pub fn worker_count() -> usize {
    #[cfg(feature = "rayon")]
    {
        rayon::current_num_threads()
    }
    #[cfg(not(feature = "rayon"))]
    {
        1
    }
}

/// Evaluate the stencil on `x` over `cells` and let `update` write each result.
pub(crate) fn sweep<K, F>(backend: Backend, op: &StencilOperator<'_>, x: &[f64], out: &mut [f64], cells: CellSet, update: F)
where
    K: Kernel,
    F: Fn(usize, f64, &mut f64) + Sync,
{
    match backend {
        Backend::Serial => sweep_serial::<K, F>(op, x, out, cells, &update),
        Backend::Threaded => sweep_threaded::<K, F>(op, x, out, cells, &update),
        Backend::Tiled { tile } => tiled::sweep::<K, F>(tile, op, x, out, cells, &update),
    }
}

fn sweep_serial<K, F>(op: &StencilOperator<'_>, x: &[f64], out: &mut [f64], cells: CellSet, update: &F)
where
    K: Kernel,
    F: Fn(usize, f64, &mut f64) + Sync,
{
    let geom = op.geometry();
    let [di, dj, dk] = geom.dim;
    for k in 0..dk {
        for j in 0..dj {
            let row = geom.index(0, j, k);
            for i in 0..di {
                if !cells.contains(i, j, k) {
                    continue;
                }
                let ijk = row + i;
                let ax = K::apply_ijk(op, x, ijk);
                update(ijk, ax, &mut out[ijk]);
            }
        }
    }
}

#[cfg(feature = "rayon")]
fn sweep_threaded<K, F>(op: &StencilOperator<'_>, x: &[f64], out: &mut [f64], cells: CellSet, update: &F)
where
    K: Kernel,
    F: Fn(usize, f64, &mut f64) + Sync,
{
    let geom = op.geometry();
    let [di, dj, _] = geom.dim;
    for_each_plane(geom, out, |k, base, plane| {
        for j in 0..dj {
            let row = geom.index(0, j, k);
            for i in 0..di {
                if !cells.contains(i, j, k) {
                    continue;
                }
                let ijk = row + i;
                let ax = K::apply_ijk(op, x, ijk);
                update(ijk, ax, &mut plane[ijk - base]);
            }
        }
    });
}

#[cfg(not(feature = "rayon"))]
fn sweep_threaded<K, F>(op: &StencilOperator<'_>, x: &[f64], out: &mut [f64], cells: CellSet, update: &F)
where
    K: Kernel,
    F: Fn(usize, f64, &mut f64) + Sync,
{
    sweep_serial::<K, F>(op, x, out, cells, update)
}

/// Run `f(k, base, plane)` for every interior k-plane of `out`, where `plane`
/// is the full (ghost-inclusive) plane starting at flat index `base`.
pub(crate) fn for_each_plane<F>(geom: Geometry, out: &mut [f64], f: F)
where
    F: Fn(usize, usize, &mut [f64]) + Sync,
{
    let ks = geom.k_stride;
    let dk = geom.dim[2];
    let body = &mut out[GHOSTS * ks..(GHOSTS + dk) * ks];

    #[cfg(feature = "rayon")]
    body.par_chunks_mut(ks).enumerate().for_each(|(k, plane)| f(k, (k + GHOSTS) * ks, plane));

    #[cfg(not(feature = "rayon"))]
    body.chunks_mut(ks).enumerate().for_each(|(k, plane)| f(k, (k + GHOSTS) * ks, plane));
}

/// Reduce one value per interior k-plane, combining the partials in plane
/// order so the result does not depend on the number of workers.
pub(crate) fn reduce_planes<F, C>(geom: Geometry, identity: f64, partial: F, combine: C) -> f64
where
    F: Fn(usize) -> f64 + Sync + Send,
    C: Fn(f64, f64) -> f64,
{
    let dk = geom.dim[2];

    #[cfg(feature = "rayon")]
    let partials: Vec<f64> = (0..dk).into_par_iter().map(partial).collect();

    #[cfg(not(feature = "rayon"))]
    let partials: Vec<f64> = (0..dk).map(partial).collect();

    partials.into_iter().fold(identity, combine)
}
