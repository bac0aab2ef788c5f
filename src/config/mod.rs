//! Operator configuration.

pub mod options;

pub use options::{Backend, BuildFlags, CoefficientMode, Equation, GsrbUpdate, OperatorConfig, SmootherKind};
