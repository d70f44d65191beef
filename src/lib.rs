// Copyright 2022 Chris Gubbin
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://apache.org/licenses/LICENSE-2.0> or the MIT license <LICENSE-MIT or
// http://opensource.org/licenses/MIT>, at your option. This file may not be
// copied, modified, or distributed except according to those terms.

//! Transporter-phonon evaluates the electron-phonon self-energy of an NEGF transport calculation
//!
//! # Overview
//! In the non-equilibrium Green's function formalism ([Lake 1997](https://doi.org/10.1063/1.365394)) incoherent
//! scattering enters the electron propagator through a self-energy. For scattering by phonons the lesser and greater
//! self-energies are built from the lesser and greater electron Green's functions, the electron-phonon coupling and
//! either an equilibrium phonon bath or the phonon Green's function. The self-energy is recomputed on every pass of
//! the outer self-consistent loop, which owns the Green's functions and the energy grids; this crate only evaluates
//! one contour component of the self-energy from a snapshot of those quantities.
//!
//! # Usage
//! The interaction model and the phonon bath are described in a `.toml` configuration:
//!
//! ```toml
//! [phonon]
//! model = "deformation_potential"
//! num_diagonals = 1
//! temperature = 300.0
//! mode_energies = [0.035]
//! ```
//!
//! An evaluator is then assembled from borrowed snapshots and computed, optionally in parallel over energy:
//!
//! ```ignore
//! let sigma_lesser = PhononSelfEnergyBuilder::new()
//!     .with_configuration(&config.phonon)
//!     .with_coupling(&coupling)
//!     .with_electron_greens_functions(&grid, &g_lesser, &g_greater)
//!     .with_contour_order(ContourOrder::Lesser)
//!     .build()
//!     .compute(true)?;
//! ```

#![warn(missing_docs)]
#![allow(clippy::type_complexity)]

/// Configuration and tracing primitives
pub mod app;

/// Physical constants
mod constants;

/// The electron-phonon interaction tensor
pub mod coupling;

/// Error handling
pub mod error;

/// Banded sparse Green's functions
pub mod greens_functions;

/// Self energies for incoherent transport
pub mod self_energy;

/// Discrete energy spaces
pub mod spectral;

/// Helper functions and traits
mod utilities;

pub use app::{Configuration, PhononConfiguration, PhononModel};
pub use coupling::InteractionTensor;
pub use error::SelfEnergyError;
pub use greens_functions::{AggregateGreensFunctions, BandedMatrix};
pub use self_energy::{ContourOrder, PhononSelfEnergy, PhononSelfEnergyBuilder, SelfEnergy};
pub use spectral::EnergyGrid;
