//! Grid utilities.

pub mod coloring;
