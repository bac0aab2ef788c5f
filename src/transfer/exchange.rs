//! Ghost fill for a single block whose every face is a physical boundary.

use crate::core::traits::{BoundaryExchange, StencilShape};
use crate::error::MgError;
use crate::grid::{FieldId, Geometry, Level};

/// Physical boundary condition applied to solution-like fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryCondition {
    /// Ghost cells hold zero.
    #[default]
    ZeroGhost,
    /// Homogeneous Dirichlet on the boundary face: ghost = −mirror cell.
    Dirichlet,
    /// The block wraps around in every direction.
    Periodic,
}

/// How the two ghost layers along one axis are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GhostRule {
    Zero,
    NegatedMirror,
    /// Zero gradient: copy the adjacent owned value.
    Copy,
    Wrap,
    /// Face field along its normal: the high face is owned, only the low ghost is set.
    CopyLow,
}

/// [`BoundaryExchange`] for a level that is the whole domain.
///
/// Solution-like fields follow the boundary condition. Operator data
/// (`Alpha`, `Dinv`, `L1Inv`, betas) is extended with zero gradient, or wrapped
/// when periodic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LocalExchange {
    pub bc: BoundaryCondition,
}

impl LocalExchange {
    pub fn new(bc: BoundaryCondition) -> Self {
        Self { bc }
    }

    fn rule(&self, field: FieldId, axis: usize) -> GhostRule {
        let periodic = self.bc == BoundaryCondition::Periodic;
        match field.face_axis() {
            Some(n) if n == axis && !periodic => GhostRule::CopyLow,
            _ if periodic => GhostRule::Wrap,
            _ if field.is_coefficient() => GhostRule::Copy,
            _ => match self.bc {
                BoundaryCondition::Dirichlet => GhostRule::NegatedMirror,
                _ => GhostRule::Zero,
            },
        }
    }
}

impl BoundaryExchange for LocalExchange {
    fn exchange(&self, level: &mut Level, field: FieldId, shape: StencilShape) -> Result<(), MgError> {
        let geom = level.geometry();
        let mut extent = geom.dim.map(|d| d as isize);
        if let Some(n) = field.face_axis() {
            extent[n] += 1;
        }
        let data = level.field_mut(field)?;

        // Axes are filled in order; for a box fill, the ranges of the axes
        // already done include their ghosts, which covers edges and corners.
        for axis in 0..3 {
            let mut ranges = [(0, 0); 3];
            for (o, range) in ranges.iter_mut().enumerate() {
                *range = if shape == StencilShape::Box && o < axis {
                    (-1, geom.dim[o] as isize + 1)
                } else {
                    (0, extent[o])
                };
            }
            fill_axis(data, &geom, axis, self.rule(field, axis), ranges);
        }
        Ok(())
    }
}

fn fill_axis(data: &mut [f64], geom: &Geometry, axis: usize, rule: GhostRule, ranges: [(isize, isize); 3]) {
    let d = geom.dim[axis] as isize;
    let (a1, a2) = match axis {
        0 => (1, 2),
        1 => (0, 2),
        _ => (0, 1),
    };
    for v2 in ranges[a2].0..ranges[a2].1 {
        for v1 in ranges[a1].0..ranges[a1].1 {
            let at = |t: isize| {
                let mut c = [0isize; 3];
                c[a1] = v1;
                c[a2] = v2;
                c[axis] = t;
                geom.index_signed(c[0], c[1], c[2])
            };
            let (lo, hi) = (at(-1), at(d));
            let (first, last) = (data[at(0)], data[at(d - 1)]);
            match rule {
                GhostRule::Zero => {
                    data[lo] = 0.0;
                    data[hi] = 0.0;
                }
                GhostRule::NegatedMirror => {
                    data[lo] = -first;
                    data[hi] = -last;
                }
                GhostRule::Copy => {
                    data[lo] = first;
                    data[hi] = last;
                }
                GhostRule::Wrap => {
                    data[lo] = last;
                    data[hi] = first;
                }
                GhostRule::CopyLow => data[lo] = first,
            }
        }
    }
}
