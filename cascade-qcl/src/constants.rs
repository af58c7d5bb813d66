// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Constants
//!
//! Defines physical constants and unit conversions used in the simulation

pub const ELECTRON_CHARGE: f64 = 1.60217653e-19; // Single electron charge in C
pub const EPSILON_0: f64 = 8.854187e-12; // Permitivitty of free space in F / m
pub const ELECTRON_MASS: f64 = 9.10938188e-31; // Single electron mass in kg
pub const PLANCK: f64 = 6.6260693e-34; // Planck constant in J s
pub const HBAR: f64 = PLANCK / (2. * std::f64::consts::PI); // Reduced Planck constant
pub const SPEED_OF_LIGHT: f64 = 299792458.; // In m / s

pub const ANGSTROM: f64 = 1e-10; // Angstrom to metre
pub const KV_PER_CM: f64 = 1e5; // kV / cm to V / m
pub const MEV: f64 = 1e-3; // meV to eV

/// Conduction band edge of lattice matched In0.53Ga0.47As, used as the energy zero
pub const BAND_BASELINE: f64 = 0.22004154;

/// Placeholder returned for forbidden or non-physical scattering and absorption
pub const FORBIDDEN_RATE: f64 = 1e-20;

/// Free space impedance in the units of the optical transfer matrix
pub const FREE_SPACE_IMPEDANCE: f64 = 0.003768;

/// Potential drop in eV per angstrom for an applied field of 1 kV / cm
pub const FIELD_TO_EV_PER_ANGSTROM: f64 = ANGSTROM * KV_PER_CM;
