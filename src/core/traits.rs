//! Collaborator contracts consumed by the operator core.
//!
//! Ghost-zone exchange and inter-level transfer are implemented elsewhere
//! (see [`crate::transfer`] for single-block reference versions); the core
//! only calls them through these traits and propagates their errors.

use crate::error::MgError;
use crate::grid::{FieldId, Level};

/// Ghost pattern an exchange has to fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StencilShape {
    /// Face neighbours only.
    Star,
    /// Faces, edges and corners.
    Box,
}

/// Fill the ghost cells of a field from neighbouring blocks / the boundary condition.
pub trait BoundaryExchange {
    /// Fill every ghost cell of `field` required by `shape`. Fails as a whole;
    /// no partial fill is reported as success.
    fn exchange(&self, level: &mut Level, field: FieldId, shape: StencilShape) -> Result<(), MgError>;
}

/// Averaging used when restricting a field to a coarser level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestrictionKind {
    /// Volume average of the 8 child cells.
    Cell,
    /// Area average of the 4 fine i-faces covering a coarse i-face.
    FaceI,
    FaceJ,
    FaceK,
}

impl RestrictionKind {
    /// Restriction kind matching the centring of a field.
    pub fn for_field(field: FieldId) -> Self {
        match field.face_axis() {
            Some(0) => RestrictionKind::FaceI,
            Some(1) => RestrictionKind::FaceJ,
            Some(_) => RestrictionKind::FaceK,
            None => RestrictionKind::Cell,
        }
    }
}

/// Conservative fine → coarse transfer.
pub trait Restriction {
    fn restrict(
        &self,
        coarse: &mut Level,
        dst: FieldId,
        fine: &Level,
        src: FieldId,
        kind: RestrictionKind,
    ) -> Result<(), MgError>;
}

/// Coarse → fine prolongation of a correction: `fine = prescale·fine + P·coarse`.
pub trait Interpolation {
    fn interpolate(
        &self,
        fine: &mut Level,
        fine_field: FieldId,
        prescale: f64,
        coarse: &Level,
        coarse_field: FieldId,
    ) -> Result<(), MgError>;
}

impl<T: BoundaryExchange + ?Sized> BoundaryExchange for &T {
    fn exchange(&self, level: &mut Level, field: FieldId, shape: StencilShape) -> Result<(), MgError> {
        (**self).exchange(level, field, shape)
    }
}
