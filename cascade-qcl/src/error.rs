// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Error
//! Error types for the library. Configuration errors are raised before any numerical work,
//! solver errors are raised when a sweep or refinement exceeds its budget.

use crate::device::info_desk::MaterialName;
use miette::Diagnostic;

#[derive(thiserror::Error, Debug, Diagnostic)]
/// Umbrella error for a full pipeline run
pub enum QclError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Solver(#[from] SolverError),
    #[error(transparent)]
    ModeSolver(#[from] ModeSolverError),
}

#[derive(thiserror::Error, Debug, Diagnostic)]
/// Problems with the structure description
pub enum ConfigurationError {
    #[error("substrate `{0}` is not supported, expected one of InP, GaAs or GaSb")]
    #[diagnostic(code(cascade::unsupported_substrate))]
    UnsupportedSubstrate(String),
    #[error("layer {layer} uses material slot {slot}, slots run from 1 to 4")]
    #[diagnostic(code(cascade::material_slot))]
    InvalidMaterialSlot { layer: usize, slot: usize },
    #[error("unknown material `{0}`")]
    UnknownMaterial(String),
    #[error("{0} carries no band parameters and cannot be alloyed")]
    MissingBandParameters(MaterialName),
    #[error("{0} carries no dispersion model")]
    MissingDispersion(MaterialName),
    #[error("unknown facet combination `{0}`")]
    UnknownFacets(String),
}

#[derive(thiserror::Error, Debug, Diagnostic)]
/// Failures of the shooting eigensolver
pub enum SolverError {
    #[error("an energy sweep of {points} points exceeds the budget of {budget}")]
    #[diagnostic(help("coarsen the vertical resolution or raise `maximum_sweep_points`"))]
    SweepTooLarge { points: usize, budget: usize },
    #[error(transparent)]
    Roots(#[from] RootError),
}

#[derive(thiserror::Error, Debug, Diagnostic)]
/// Failures while bracketing and refining the zeros of a sampled function
pub enum RootError {
    #[error("found {found} sign changes, more than the budget of {budget}")]
    BracketBudgetExceeded { found: usize, budget: usize },
    #[error("{0}")]
    Spline(String),
}

#[derive(thiserror::Error, Debug, Diagnostic)]
/// Failures of the optical mode solver
pub enum ModeSolverError {
    #[error("no guided mode found between the extremal stratum indices")]
    NoGuidedMode,
    #[error("refinement of the propagation constant did not converge in {0} iterations")]
    RefinementBudgetExceeded(usize),
    #[error("the waveguide contains no active core")]
    NoActiveCore,
    #[error("active core spans {expected} cells but no sampling alignment matches, tried {tried:?}")]
    StructuralInconsistency { expected: usize, tried: Vec<usize> },
    #[error(transparent)]
    Roots(#[from] RootError),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}
