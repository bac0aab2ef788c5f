//! Structured-grid colourings for the 7-point stencil.
//!
//! Two cells of the same red-black colour never share a face, so each colour
//! can be relaxed independently. The probe colouring separates cells that
//! share a face, an edge or a corner, including across a periodic wrap;
//! probing the operator with one colour at a time recovers its diagonal
//! exactly.

/// Red-black parity `(i + j + k) mod 2`.
#[inline(always)]
pub fn red_black(i: usize, j: usize, k: usize) -> usize {
    (i + j + k) & 1
}

/// Probe colours along an axis of `n` cells. Odd extents give the last cell a
/// third colour, so it differs from both cell `n - 2` and the wrapped cell 0.
pub fn axis_colors(n: usize) -> usize {
    match n {
        1 => 1,
        n if n % 2 == 1 => 3,
        _ => 2,
    }
}

#[inline(always)]
fn axis_color(i: usize, n: usize) -> usize {
    if n > 1 && n % 2 == 1 && i + 1 == n { 2 } else { i & 1 }
}

/// Number of probe colours for a block of `dim` cells (8 when every extent is even).
pub fn probe_colors(dim: [usize; 3]) -> usize {
    dim.iter().map(|&n| axis_colors(n)).product()
}

/// Probe colour of cell `(i, j, k)` in a block of `dim` cells.
#[inline(always)]
pub fn probe_color(dim: [usize; 3], i: usize, j: usize, k: usize) -> usize {
    let (ni, nj) = (axis_colors(dim[0]), axis_colors(dim[1]));
    axis_color(i, dim[0]) + ni * (axis_color(j, dim[1]) + nj * axis_color(k, dim[2]))
}

/// Cells of each probe colour inside a block of `dim` cells:
/// `blocks[c]` lists interior coordinates with colour `c`.
pub fn probe_blocks(dim: [usize; 3]) -> Vec<Vec<[usize; 3]>> {
    let mut blocks = vec![Vec::new(); probe_colors(dim)];
    for k in 0..dim[2] {
        for j in 0..dim[1] {
            for i in 0..dim[0] {
                blocks[probe_color(dim, i, j, k)].push([i, j, k]);
            }
        }
    }
    blocks
}
