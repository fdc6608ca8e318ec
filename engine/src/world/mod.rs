//! World Module
//!
//! The build grid and the mapping between cell indices and world positions.

pub mod grid;

pub use grid::{BELOW_FLOOR_Y, Cell, Grid};
