//! The material parameters and the deserialization of structure files
//!
//! The `info_desk` yields every material quantity needed to build a band structure, the
//! `reader` turns a structure file on disk into layers and waveguide strata.

/// The material table and the `MaterialProvider` trait
pub mod info_desk;
/// The deserialization of a structure file
pub mod reader;

pub use info_desk::{MaterialName, MaterialProvider, MaterialTable};
pub use reader::Device;
