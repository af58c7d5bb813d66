//! Uniform one-dimensional grids for layered heterostructures
//!
//! A structure is described as an ordered list of regions, each of which spans an
//! integer number of cells of a fixed size. Every vertex of the resulting mesh carries
//! an [`Assignment`] recording the region it was generated from, and for periodic
//! structures the period it belongs to.

mod generate;
mod mesh;
mod primitives;

pub use generate::*;
pub use mesh::*;
pub use primitives::*;
