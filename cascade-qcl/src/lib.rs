// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Cascade is a quantum cascade laser design tool written in Rust
//!
//! # Overview
//! Cascade calculates the conduction band bound states of a semiconductor heterostructure in the
//! envelope function approximation, with a three band Kane model for the nonparabolicity of the
//! effective mass. Alloy parameters are interpolated from the binary constituents with bowing,
//! and corrected for the strain of pseudomorphic growth on the substrate. The bound states are
//! found with a shooting method, either for the whole structure at once or module by module in a
//! basis of isolated active regions and injectors.
//!
//! From the bound states Cascade estimates the quantities which determine the performance of a
//! laser: transition dipoles, longitudinal optical phonon scattering rates, interface roughness
//! broadening and intersubband absorption. An independent transfer matrix solver finds the guided
//! optical mode of the waveguide the structure sits in, and the threshold and efficiencies of the
//! resulting laser.
//!
//! # Usage
//! Cascade is distributed as a binary crate, and is intended to be run from the command line. To
//! run the software first define a structure in a `.toml` file:
//!
//! ```toml
//! temperature = 300.0
//!
//! [structure]
//! substrate = "InP"
//! field = 35.0
//! repeats = 2
//!
//! [[structure.layers]]
//! width = 40.0
//! material = 1
//! barrier = true
//!
//! [[structure.layers]]
//! width = 60.0
//! material = 1
//! active = true
//! ```
//!
//! where additional layers can be appended with subsequent `structure.layers` fields, and a
//! waveguide described in a `[waveguide]` table.

#![allow(clippy::too_many_arguments)]

/// Alloy mixing and strain corrections
pub mod alloy;

/// The command line global application, tracing and display primitives
pub mod app;

/// Partitioning of a structure into independently solved modules
pub mod basis;

/// Physical constants
pub mod constants;

/// Materials and structure files
pub mod device;

/// The shooting method eigen solver
pub mod eigen;

/// Error handling
pub mod error;

/// Layer stacks and their position grids
pub mod layers;

/// Dipoles, scattering rates, broadening and absorption
pub mod observables;

/// Root bracketing and refinement
pub mod roots;

/// The optical mode solver
pub mod strata;

/// Helper functions
mod utilities;
