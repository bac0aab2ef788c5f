//! A single multigrid level: one regular 3D block of cells with a ghost layer.
//!
//! Fields are stored as flat `Vec<f64>` buffers with the i index running
//! fastest. Every buffer covers the interior plus `GHOSTS` layers on each
//! side, so a cell `(i, j, k)` with `i ∈ [-1, di]` lives at
//! `(i+1) + (j+1)·jStride + (k+1)·kStride`.

use crate::error::MgError;

/// Ghost layers on every side of a block; equals the stencil radius.
pub const GHOSTS: usize = 1;

/// Named vector fields of a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldId {
    /// Current solution / correction.
    Solution,
    /// Right-hand side.
    Rhs,
    /// Residual or operator output.
    Residual,
    /// Scratch buffer used by the out-of-place smoothers and the rebuild probe.
    Temp,
    /// Cell-centred Helmholtz coefficient.
    Alpha,
    /// Face-centred diffusion coefficient on i-faces.
    BetaI,
    /// Face-centred diffusion coefficient on j-faces.
    BetaJ,
    /// Face-centred diffusion coefficient on k-faces.
    BetaK,
    /// Reciprocal of the operator diagonal.
    Dinv,
    /// Reciprocal of the row L1 norm.
    L1Inv,
}

impl FieldId {
    pub const COUNT: usize = 10;

    /// Fields every level carries regardless of coefficient mode.
    pub const SOLVER: [FieldId; 6] = [
        FieldId::Solution,
        FieldId::Rhs,
        FieldId::Residual,
        FieldId::Temp,
        FieldId::Dinv,
        FieldId::L1Inv,
    ];

    /// Coefficient fields; absent in constant-coefficient mode.
    pub const COEFFICIENTS: [FieldId; 4] = [FieldId::Alpha, FieldId::BetaI, FieldId::BetaJ, FieldId::BetaK];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Operator data (coefficients and derived inverses) as opposed to
    /// solution-like vectors that obey the physical boundary condition.
    pub fn is_coefficient(self) -> bool {
        matches!(
            self,
            FieldId::Alpha | FieldId::BetaI | FieldId::BetaJ | FieldId::BetaK | FieldId::Dinv | FieldId::L1Inv
        )
    }

    /// Normal axis (0 = i, 1 = j, 2 = k) of a face-centred field.
    pub fn face_axis(self) -> Option<usize> {
        match self {
            FieldId::BetaI => Some(0),
            FieldId::BetaJ => Some(1),
            FieldId::BetaK => Some(2),
            _ => None,
        }
    }
}

/// Shape and stride metadata of a level, detached from its storage so sweeps
/// can hold it while fields are mutably borrowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub dim: [usize; 3],
    pub j_stride: usize,
    pub k_stride: usize,
    pub volume: usize,
}

impl Geometry {
    pub fn new(dim: [usize; 3]) -> Self {
        let j_stride = dim[0] + 2 * GHOSTS;
        let k_stride = j_stride * (dim[1] + 2 * GHOSTS);
        let volume = k_stride * (dim[2] + 2 * GHOSTS);
        Self { dim, j_stride, k_stride, volume }
    }

    /// Flat index of interior cell `(i, j, k)`.
    #[inline(always)]
    pub fn index(&self, i: usize, j: usize, k: usize) -> usize {
        (i + GHOSTS) + (j + GHOSTS) * self.j_stride + (k + GHOSTS) * self.k_stride
    }

    /// Flat index of any cell including ghosts; coordinates range over `[-1, dim]`.
    #[inline(always)]
    pub fn index_signed(&self, i: isize, j: isize, k: isize) -> usize {
        let g = GHOSTS as isize;
        debug_assert!(i >= -g && j >= -g && k >= -g);
        ((i + g) as usize) + ((j + g) as usize) * self.j_stride + ((k + g) as usize) * self.k_stride
    }

    pub fn interior_cells(&self) -> usize {
        self.dim[0] * self.dim[1] * self.dim[2]
    }

    /// Interior cells in lexicographic order (i fastest) as `(coords, index)`.
    pub fn interior(&self) -> impl Iterator<Item = ([usize; 3], usize)> + '_ {
        let [di, dj, dk] = self.dim;
        (0..dk).flat_map(move |k| {
            (0..dj).flat_map(move |j| (0..di).map(move |i| ([i, j, k], self.index(i, j, k))))
        })
    }
}

/// One multigrid level.
#[derive(Debug, Clone)]
pub struct Level {
    geom: Geometry,
    h: f64,
    fields: Vec<Vec<f64>>,
    dominant_eigenvalue: Option<f64>,
}

impl Level {
    /// Create a level of `dim` interior cells with spacing `h`. The solver
    /// fields are allocated and zeroed; coefficient fields are not.
    pub fn new(dim: [usize; 3], h: f64) -> Result<Self, MgError> {
        if dim.iter().any(|&d| d == 0) {
            return Err(MgError::Shape(format!("level dimensions must be positive, got {dim:?}")));
        }
        if !(h > 0.0 && h.is_finite()) {
            return Err(MgError::Shape(format!("grid spacing must be positive and finite, got {h}")));
        }
        let geom = Geometry::new(dim);
        let mut fields = vec![Vec::new(); FieldId::COUNT];
        for id in FieldId::SOLVER {
            fields[id.index()] = vec![0.0; geom.volume];
        }
        Ok(Self { geom, h, fields, dominant_eigenvalue: None })
    }

    /// Cubic level of `n³` cells.
    pub fn cube(n: usize, h: f64) -> Result<Self, MgError> {
        Self::new([n, n, n], h)
    }

    /// The next coarser level: half the cells per dimension, twice the spacing,
    /// coefficient fields allocated if this level has them.
    pub fn coarsened(&self) -> Result<Self, MgError> {
        if self.geom.dim.iter().any(|&d| d % 2 != 0) {
            return Err(MgError::Shape(format!("cannot coarsen odd dimensions {:?}", self.geom.dim)));
        }
        let dim = self.geom.dim.map(|d| d / 2);
        let mut coarse = Level::new(dim, 2.0 * self.h)?;
        for id in FieldId::COEFFICIENTS {
            if self.is_allocated(id) {
                coarse.allocate(id);
            }
        }
        Ok(coarse)
    }

    #[inline]
    pub fn geometry(&self) -> Geometry {
        self.geom
    }

    #[inline]
    pub fn dim(&self) -> [usize; 3] {
        self.geom.dim
    }

    #[inline]
    pub fn h(&self) -> f64 {
        self.h
    }

    #[inline]
    pub fn h2inv(&self) -> f64 {
        1.0 / (self.h * self.h)
    }

    #[inline]
    pub fn j_stride(&self) -> usize {
        self.geom.j_stride
    }

    #[inline]
    pub fn k_stride(&self) -> usize {
        self.geom.k_stride
    }

    #[inline]
    pub fn volume(&self) -> usize {
        self.geom.volume
    }

    #[inline]
    pub fn index(&self, i: usize, j: usize, k: usize) -> usize {
        self.geom.index(i, j, k)
    }

    #[inline]
    pub fn index_signed(&self, i: isize, j: isize, k: isize) -> usize {
        self.geom.index_signed(i, j, k)
    }

    /// Allocate (and zero) a field. Already allocated fields are left untouched.
    pub fn allocate(&mut self, id: FieldId) {
        let slot = &mut self.fields[id.index()];
        if slot.is_empty() {
            *slot = vec![0.0; self.geom.volume];
        }
    }

    /// Allocate `alpha` and the three `beta` components.
    pub fn allocate_coefficients(&mut self) {
        for id in FieldId::COEFFICIENTS {
            self.allocate(id);
        }
    }

    pub fn is_allocated(&self, id: FieldId) -> bool {
        !self.fields[id.index()].is_empty()
    }

    fn missing(&self, id: FieldId) -> MgError {
        MgError::MissingField { field: id, dim: self.geom.dim }
    }

    pub fn field(&self, id: FieldId) -> Result<&[f64], MgError> {
        let data = &self.fields[id.index()];
        if data.is_empty() { Err(self.missing(id)) } else { Ok(data) }
    }

    pub fn field_mut(&mut self, id: FieldId) -> Result<&mut [f64], MgError> {
        if self.fields[id.index()].is_empty() {
            return Err(self.missing(id));
        }
        Ok(&mut self.fields[id.index()])
    }

    /// Run `f` with `id` detached from the level so the closure can read the
    /// other fields while writing this one. Inside `f`, `id` reads as missing.
    pub fn with_field_mut<R>(
        &mut self,
        id: FieldId,
        f: impl FnOnce(&Level, &mut [f64]) -> Result<R, MgError>,
    ) -> Result<R, MgError> {
        if self.fields[id.index()].is_empty() {
            return Err(self.missing(id));
        }
        let mut data = std::mem::take(&mut self.fields[id.index()]);
        let out = f(self, &mut data);
        self.fields[id.index()] = data;
        out
    }

    /// Exchange the storage of two fields.
    pub fn swap_fields(&mut self, a: FieldId, b: FieldId) {
        self.fields.swap(a.index(), b.index());
    }

    /// Set every entry of a field, ghosts included.
    pub fn fill(&mut self, id: FieldId, value: f64) -> Result<(), MgError> {
        self.field_mut(id)?.fill(value);
        Ok(())
    }

    /// Set the interior entries of a field from `f(i, j, k)`; ghosts untouched.
    pub fn fill_interior(&mut self, id: FieldId, mut f: impl FnMut(usize, usize, usize) -> f64) -> Result<(), MgError> {
        let geom = self.geom;
        let data = self.field_mut(id)?;
        for ([i, j, k], ijk) in geom.interior() {
            data[ijk] = f(i, j, k);
        }
        Ok(())
    }

    /// Dominant eigenvalue estimate of `D⁻¹A` from the last rebuild.
    pub fn dominant_eigenvalue(&self) -> Option<f64> {
        self.dominant_eigenvalue
    }

    pub(crate) fn set_dominant_eigenvalue(&mut self, value: f64) {
        self.dominant_eigenvalue = Some(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strides_include_ghosts() {
        let level = Level::new([4, 3, 2], 0.25).unwrap();
        assert_eq!(level.j_stride(), 6);
        assert_eq!(level.k_stride(), 30);
        assert_eq!(level.volume(), 120);
        assert_eq!(level.index(0, 0, 0), 1 + 6 + 30);
        assert_eq!(level.index_signed(-1, -1, -1), 0);
        assert_eq!(level.index_signed(4, 3, 2), 119);
    }

    #[test]
    fn interior_iterates_lexicographically() {
        let geom = Geometry::new([2, 2, 2]);
        let cells: Vec<_> = geom.interior().map(|(c, _)| c).collect();
        assert_eq!(cells.len(), 8);
        assert_eq!(cells[0], [0, 0, 0]);
        assert_eq!(cells[1], [1, 0, 0]);
        assert_eq!(cells[2], [0, 1, 0]);
        assert_eq!(cells[7], [1, 1, 1]);
    }

    #[test]
    fn coefficients_are_allocated_on_demand() {
        let mut level = Level::cube(4, 1.0).unwrap();
        assert!(matches!(
            level.field(FieldId::BetaI),
            Err(MgError::MissingField { field: FieldId::BetaI, .. })
        ));
        level.allocate_coefficients();
        assert_eq!(level.field(FieldId::BetaI).unwrap().len(), level.volume());
    }

    #[test]
    fn detached_field_reads_as_missing() {
        let mut level = Level::cube(2, 1.0).unwrap();
        let seen_missing = level
            .with_field_mut(FieldId::Temp, |lvl, _| Ok(lvl.field(FieldId::Temp).is_err()))
            .unwrap();
        assert!(seen_missing);
        assert!(level.field(FieldId::Temp).is_ok());
    }

    #[test]
    fn coarsening_halves_and_doubles() {
        let mut fine = Level::new([8, 4, 2], 0.125).unwrap();
        fine.allocate_coefficients();
        let coarse = fine.coarsened().unwrap();
        assert_eq!(coarse.dim(), [4, 2, 1]);
        assert_eq!(coarse.h(), 0.25);
        assert!(coarse.is_allocated(FieldId::Alpha));
        assert!(coarse.coarsened().is_err());
    }

    #[test]
    fn rejects_degenerate_shapes() {
        assert!(Level::new([0, 4, 4], 1.0).is_err());
        assert!(Level::new([4, 4, 4], 0.0).is_err());
    }
}
