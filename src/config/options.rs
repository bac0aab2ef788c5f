//! Build-time operator selection.
//!
//! A multigrid build fixes its smoother, coefficient mode, equation and
//! execution backend once. `BuildFlags` mirrors the switch set a build is
//! configured with; `OperatorConfig` is the validated result. Any combination
//! that selects zero or several smoothers, or conflicting modes, is rejected
//! rather than defaulted.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;

use crate::error::MgError;
use crate::operator::stencil::StencilKind;
use crate::parallel::tiled::DEFAULT_TILE;

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct BuildFlags: u32 {
        const GSRB                 = 0b0000_0000_0001;
        const CHEBYSHEV            = 0b0000_0000_0010;
        const JACOBI               = 0b0000_0000_0100;
        const L1_JACOBI            = 0b0000_0000_1000;
        const SYMGS                = 0b0000_0001_0000;
        const SMOOTHERS            = Self::GSRB.bits() | Self::CHEBYSHEV.bits() | Self::JACOBI.bits()
                                   | Self::L1_JACOBI.bits() | Self::SYMGS.bits();
        const GSRB_OUT_OF_PLACE    = 0b0000_0010_0000;
        const CONSTANT_COEFFICIENT = 0b0000_0100_0000;
        const VARIABLE_COEFFICIENT = 0b0000_1000_0000;
        const HELMHOLTZ            = 0b0001_0000_0000;
        const TILED                = 0b0010_0000_0000;
    }
}

/// Update scheme of the red-black Gauss-Seidel smoother.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GsrbUpdate {
    /// Overwrite `x` colour by colour.
    InPlace,
    /// Read `x`, write a second buffer, swap; no read/write hazard, twice the memory.
    OutOfPlace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmootherKind {
    Gsrb(GsrbUpdate),
    Chebyshev,
    Jacobi,
    L1Jacobi,
    SymGs,
}

impl SmootherKind {
    pub fn name(self) -> &'static str {
        match self {
            SmootherKind::Gsrb(GsrbUpdate::InPlace) => "gsrb",
            SmootherKind::Gsrb(GsrbUpdate::OutOfPlace) => "gsrb-oop",
            SmootherKind::Chebyshev => "cheby",
            SmootherKind::Jacobi => "jacobi",
            SmootherKind::L1Jacobi => "l1jacobi",
            SmootherKind::SymGs => "symgs",
        }
    }
}

impl FromStr for SmootherKind {
    type Err = MgError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gsrb" | "rbgs" | "red-black" => Ok(SmootherKind::Gsrb(GsrbUpdate::InPlace)),
            "gsrb-oop" | "gsrb_oop" => Ok(SmootherKind::Gsrb(GsrbUpdate::OutOfPlace)),
            "cheby" | "chebyshev" => Ok(SmootherKind::Chebyshev),
            "jacobi" => Ok(SmootherKind::Jacobi),
            "l1jacobi" | "l1-jacobi" | "l1_jacobi" => Ok(SmootherKind::L1Jacobi),
            "symgs" | "sgs" => Ok(SmootherKind::SymGs),
            other => Err(MgError::Config(format!("unknown smoother '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoefficientMode {
    /// `alpha ≡ beta ≡ 1`; coefficient arrays do not exist.
    Constant,
    /// Per-cell `alpha` and per-face `beta_i/j/k`.
    Variable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Equation {
    /// No mass term.
    Poisson,
    /// Mass term `a·alpha·u`.
    Helmholtz,
}

/// Execution backend for stencil sweeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    Serial,
    /// Parallel over k-planes (rayon); serial without the `rayon` feature.
    #[default]
    Threaded,
    /// Tile-local gather of the input field, tiles of `[ti, tj, tk]` cells.
    Tiled { tile: [usize; 3] },
}

impl Backend {
    pub fn tiled() -> Self {
        Backend::Tiled { tile: DEFAULT_TILE }
    }
}

/// Validated operator configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorConfig {
    pub smoother: SmootherKind,
    pub coefficients: CoefficientMode,
    pub equation: Equation,
    pub backend: Backend,
}

impl OperatorConfig {
    pub fn new(
        smoother: SmootherKind,
        coefficients: CoefficientMode,
        equation: Equation,
        backend: Backend,
    ) -> Result<Self, MgError> {
        if let Backend::Tiled { tile } = backend {
            if smoother == SmootherKind::SymGs {
                return Err(MgError::Config("SYMGS smoother is not implemented for the tiled backend".into()));
            }
            if tile.iter().any(|&t| t == 0) {
                return Err(MgError::Config(format!("tile extents must be positive, got {tile:?}")));
            }
        }
        Ok(Self { smoother, coefficients, equation, backend })
    }

    /// Resolve a flag set. Without `TILED` the backend is `Threaded`; without
    /// `CONSTANT_COEFFICIENT` coefficients are variable.
    pub fn from_flags(flags: BuildFlags) -> Result<Self, MgError> {
        let unknown = flags.bits() & !BuildFlags::all().bits();
        if unknown != 0 {
            return Err(MgError::Config(format!("unknown build flag bits {unknown:#x}")));
        }

        let smoothers = flags & BuildFlags::SMOOTHERS;
        if smoothers.bits().count_ones() != 1 {
            return Err(MgError::Config(format!(
                "exactly one smoother must be selected (GSRB, CHEBYSHEV, JACOBI, L1_JACOBI or SYMGS), got {smoothers:?}"
            )));
        }
        if flags.contains(BuildFlags::GSRB_OUT_OF_PLACE) && !flags.contains(BuildFlags::GSRB) {
            return Err(MgError::Config("GSRB_OUT_OF_PLACE requires the GSRB smoother".into()));
        }
        if flags.contains(BuildFlags::CONSTANT_COEFFICIENT | BuildFlags::VARIABLE_COEFFICIENT) {
            return Err(MgError::Config(
                "CONSTANT_COEFFICIENT and VARIABLE_COEFFICIENT are mutually exclusive".into(),
            ));
        }

        let smoother = if smoothers == BuildFlags::GSRB {
            if flags.contains(BuildFlags::GSRB_OUT_OF_PLACE) {
                SmootherKind::Gsrb(GsrbUpdate::OutOfPlace)
            } else {
                SmootherKind::Gsrb(GsrbUpdate::InPlace)
            }
        } else if smoothers == BuildFlags::CHEBYSHEV {
            SmootherKind::Chebyshev
        } else if smoothers == BuildFlags::JACOBI {
            SmootherKind::Jacobi
        } else if smoothers == BuildFlags::L1_JACOBI {
            SmootherKind::L1Jacobi
        } else {
            SmootherKind::SymGs
        };
        let coefficients = if flags.contains(BuildFlags::CONSTANT_COEFFICIENT) {
            CoefficientMode::Constant
        } else {
            CoefficientMode::Variable
        };
        let equation = if flags.contains(BuildFlags::HELMHOLTZ) { Equation::Helmholtz } else { Equation::Poisson };
        let backend = if flags.contains(BuildFlags::TILED) { Backend::tiled() } else { Backend::Threaded };

        Self::new(smoother, coefficients, equation, backend)
    }

    /// Stencil formula implied by the coefficient mode and equation.
    pub fn stencil(&self) -> StencilKind {
        match (self.coefficients, self.equation) {
            (CoefficientMode::Constant, _) => StencilKind::Constant,
            (CoefficientMode::Variable, Equation::Poisson) => StencilKind::VariablePoisson,
            (CoefficientMode::Variable, Equation::Helmholtz) => StencilKind::VariableHelmholtz,
        }
    }
}

impl fmt::Display for OperatorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let equation = match self.equation {
            Equation::Poisson => "poisson",
            Equation::Helmholtz => "helmholtz",
        };
        let coefficients = match self.coefficients {
            CoefficientMode::Constant => "constant",
            CoefficientMode::Variable => "variable",
        };
        write!(
            f,
            "fv2(smoother={}, equation={}, coefficients={}, backend={:?})",
            self.smoother.name(),
            equation,
            coefficients,
            self.backend
        )
    }
}
