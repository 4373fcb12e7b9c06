//! Generation stepping and genetic color inheritance for the Wallife simulation.
//!
//! This crate models the automaton itself: the birth/survival rule over a
//! toroidal or clipped grid, and the color genetics that let newborn cells
//! inherit, mutate, and saturate the colors of their parents.
//!
//! # Modules
//!
//! - [`neighborhood`] -- Moore-neighborhood enumeration under either edge
//!   topology.
//! - [`genetics`] -- Random, tweaked, averaged, and saturated colors.
//! - [`populate`] -- Random initial populations and the color palette used
//!   for cells that appear without parents.
//! - [`step`] -- One generation of the birth/survival rule.

pub mod genetics;
pub mod neighborhood;
pub mod populate;
pub mod step;

// Re-export primary types at crate root.
pub use genetics::GeneticsParams;
pub use neighborhood::{EdgeMode, Neighborhood};
pub use populate::{Palette, random_grid};
pub use step::{StepRules, step};
