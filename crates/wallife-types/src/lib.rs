//! Shared type definitions for the Wallife simulation.
//!
//! This crate is the single source of truth for the values that flow
//! between the stepping engine, the stuck detector, and the renderer.
//!
//! # Modules
//!
//! - [`color`] -- 8-bit RGB colors and the alpha-carrying draw color
//! - [`cell`] -- A single grid cell with optional color and age
//! - [`grid`] -- The row-major cell matrix and pattern parsing

pub mod cell;
pub mod color;
pub mod grid;

// Re-export all public types at crate root for convenience.
pub use cell::{Cell, Vitals};
pub use color::{Rgb, Rgba};
pub use grid::{Grid, GridError};
