// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Error
//! The error type for the binary

use miette::Diagnostic;

#[derive(thiserror::Error, Debug, Diagnostic)]
pub(crate) enum CascadeError {
    #[error(transparent)]
    #[diagnostic(code(cascade::io_error))]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    Qcl(#[from] crate::error::QclError),
    #[error("the structure file defines no waveguide")]
    #[diagnostic(help("add a `[waveguide]` table with its `[[waveguide.strata]]`"))]
    MissingWaveguide,
}

impl From<crate::error::ConfigurationError> for CascadeError {
    fn from(e: crate::error::ConfigurationError) -> Self {
        CascadeError::Qcl(e.into())
    }
}

impl From<crate::error::SolverError> for CascadeError {
    fn from(e: crate::error::SolverError) -> Self {
        CascadeError::Qcl(e.into())
    }
}

impl From<crate::error::ModeSolverError> for CascadeError {
    fn from(e: crate::error::ModeSolverError) -> Self {
        CascadeError::Qcl(e.into())
    }
}
