// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! # Error
//! The error types surfaced by the self-energy evaluation

use crate::app::PhononModel;
use miette::Diagnostic;

#[derive(thiserror::Error, Debug, Diagnostic)]
/// Errors raised while validating inputs to, or evaluating, a self-energy
pub enum SelfEnergyError {
    /// The interaction model is part of the configuration schema but has no implementation
    #[error("the {0} interaction model is not implemented")]
    #[diagnostic(
        code(self_energy::unsupported_model),
        help("select the deformation_potential model in the phonon configuration")
    )]
    UnsupportedModel(PhononModel),
    /// The configuration is internally inconsistent, or could not be read
    #[error("invalid configuration: {0}")]
    #[diagnostic(code(self_energy::invalid_configuration))]
    InvalidConfiguration(String),
    /// Site or energy counts disagree between the coupling tensor and the Green's functions
    #[error("shape mismatch: {0}")]
    #[diagnostic(code(self_energy::shape_mismatch))]
    ShapeMismatch(String),
    /// A computed self-energy failed a physical consistency check
    #[error("security check failed for the {calculation} at energy index {index}")]
    #[diagnostic(code(self_energy::security_check))]
    SecurityCheck {
        /// The quantity being checked
        calculation: String,
        /// The energy index of the offending slice
        index: usize,
    },
    /// The sparse storage could not be assembled
    #[error(transparent)]
    #[diagnostic(code(self_energy::csr))]
    Csr(#[from] CsrError),
}

#[derive(thiserror::Error, Debug, Diagnostic)]
/// General error for Csr construction, patterns and element access problems
pub enum CsrError {
    /// An invalid sparsity pattern
    #[error(transparent)]
    Pattern(#[from] nalgebra_sparse::pattern::SparsityPatternFormatError),
    /// Values inconsistent with their sparsity pattern
    #[error(transparent)]
    Construction(#[from] nalgebra_sparse::SparseFormatError),
}

impl From<nalgebra_sparse::pattern::SparsityPatternFormatError> for SelfEnergyError {
    fn from(e: nalgebra_sparse::pattern::SparsityPatternFormatError) -> Self {
        Self::Csr(CsrError::Pattern(e))
    }
}

impl From<nalgebra_sparse::SparseFormatError> for SelfEnergyError {
    fn from(e: nalgebra_sparse::SparseFormatError) -> Self {
        Self::Csr(CsrError::Construction(e))
    }
}

impl From<config::ConfigError> for SelfEnergyError {
    fn from(e: config::ConfigError) -> Self {
        Self::InvalidConfiguration(e.to_string())
    }
}
