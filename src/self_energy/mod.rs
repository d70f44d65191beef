//! # Self energy
//!
//! The electron-phonon self-energy for a single contour component. An evaluator borrows the per-iteration
//! snapshots of the electron (and optionally phonon) Green's functions, and each call to `compute` allocates a
//! fresh self-energy over the electron energy grid.
mod deformation_potential;
mod execution;

pub use execution::{ExecutionStrategy, Parallel, Sequential};

use crate::{
    app::{PhononConfiguration, PhononModel},
    coupling::InteractionTensor,
    error::SelfEnergyError,
    greens_functions::{AggregateGreensFunctions, BandedMatrix},
    spectral::EnergyGrid,
    utilities::matrices::is_anti_hermitian,
};
use nalgebra::RealField;
use std::{fmt, marker::PhantomData, ops::Index};

/// The contour component computed by an evaluator
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ContourOrder {
    /// Σ^<, the in-scattering component
    Lesser,
    /// Σ^>, the out-scattering component
    Greater,
}

impl fmt::Display for ContourOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContourOrder::Lesser => write!(f, "lesser"),
            ContourOrder::Greater => write!(f, "greater"),
        }
    }
}

/// A propagator sampled on an energy grid
#[derive(Clone, Copy, Debug)]
pub struct Propagator<'a, T: RealField + Copy> {
    pub(crate) grid: &'a EnergyGrid<T>,
    pub(crate) greens_functions: AggregateGreensFunctions<'a, T>,
}

impl<'a, T: RealField + Copy> Propagator<'a, T> {
    /// The component of the propagator with the same contour order as the self-energy
    pub(crate) fn component(&self, contour_order: ContourOrder) -> &'a [BandedMatrix<T>] {
        match contour_order {
            ContourOrder::Lesser => self.greens_functions.lesser,
            ContourOrder::Greater => self.greens_functions.greater,
        }
    }
}

/// The self-energy at every point of the electron energy grid
#[derive(Clone, Debug, PartialEq)]
pub struct SelfEnergy<T: RealField + Copy> {
    contour_order: ContourOrder,
    matrices: Vec<BandedMatrix<T>>,
}

impl<T: RealField + Copy> SelfEnergy<T> {
    /// The contour component held
    pub fn contour_order(&self) -> ContourOrder {
        self.contour_order
    }

    /// One matrix is held for each point of the electron energy grid
    pub fn number_of_energies(&self) -> usize {
        self.matrices.len()
    }

    /// Whether no energies were evaluated
    pub fn is_empty(&self) -> bool {
        self.matrices.is_empty()
    }

    /// The slice at `energy_index`, if present
    pub fn get(&self, energy_index: usize) -> Option<&BandedMatrix<T>> {
        self.matrices.get(energy_index)
    }

    /// Iterate the slices in energy order
    pub fn iter(&self) -> impl Iterator<Item = &BandedMatrix<T>> {
        self.matrices.iter()
    }

    /// The slices in energy order
    pub fn as_slice(&self) -> &[BandedMatrix<T>] {
        &self.matrices
    }

    /// Consume into the slices in energy order
    pub fn into_inner(self) -> Vec<BandedMatrix<T>> {
        self.matrices
    }
}

impl<T: RealField + Copy> Index<usize> for SelfEnergy<T> {
    type Output = BandedMatrix<T>;

    fn index(&self, energy_index: usize) -> &Self::Output {
        &self.matrices[energy_index]
    }
}

/// Builder for the phonon self-energy evaluator, the placeholder types are filled as the required inputs are
/// attached
pub struct PhononSelfEnergyBuilder<'a, T: RealField + Copy, RefConfiguration, RefCoupling, RefElectrons> {
    configuration: RefConfiguration,
    coupling: RefCoupling,
    electrons: RefElectrons,
    phonons: Option<Propagator<'a, T>>,
    contour_order: ContourOrder,
    marker: PhantomData<T>,
}

impl<'a, T: RealField + Copy> PhononSelfEnergyBuilder<'a, T, (), (), ()> {
    /// Initialise an empty builder, evaluating the lesser self-energy unless told otherwise
    pub fn new() -> Self {
        Self {
            configuration: (),
            coupling: (),
            electrons: (),
            phonons: None,
            contour_order: ContourOrder::Lesser,
            marker: PhantomData,
        }
    }
}

impl<'a, T: RealField + Copy> Default for PhononSelfEnergyBuilder<'a, T, (), (), ()> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T: RealField + Copy, RefConfiguration, RefCoupling, RefElectrons>
    PhononSelfEnergyBuilder<'a, T, RefConfiguration, RefCoupling, RefElectrons>
{
    /// Attach the phonon configuration
    pub fn with_configuration(
        self,
        configuration: &'a PhononConfiguration<T>,
    ) -> PhononSelfEnergyBuilder<'a, T, &'a PhononConfiguration<T>, RefCoupling, RefElectrons> {
        PhononSelfEnergyBuilder {
            configuration,
            coupling: self.coupling,
            electrons: self.electrons,
            phonons: self.phonons,
            contour_order: self.contour_order,
            marker: PhantomData,
        }
    }

    /// Attach the electron-phonon interaction tensor
    pub fn with_coupling(
        self,
        coupling: &'a InteractionTensor<T>,
    ) -> PhononSelfEnergyBuilder<'a, T, RefConfiguration, &'a InteractionTensor<T>, RefElectrons>
    {
        PhononSelfEnergyBuilder {
            configuration: self.configuration,
            coupling,
            electrons: self.electrons,
            phonons: self.phonons,
            contour_order: self.contour_order,
            marker: PhantomData,
        }
    }

    /// Attach the lesser and greater electron Green's functions, sampled on `grid`
    pub fn with_electron_greens_functions(
        self,
        grid: &'a EnergyGrid<T>,
        lesser: &'a [BandedMatrix<T>],
        greater: &'a [BandedMatrix<T>],
    ) -> PhononSelfEnergyBuilder<'a, T, RefConfiguration, RefCoupling, Propagator<'a, T>> {
        PhononSelfEnergyBuilder {
            configuration: self.configuration,
            coupling: self.coupling,
            electrons: Propagator {
                grid,
                greens_functions: AggregateGreensFunctions::new(lesser, greater),
            },
            phonons: self.phonons,
            contour_order: self.contour_order,
            marker: PhantomData,
        }
    }

    /// Attach the lesser and greater phonon Green's functions, sampled on `grid`.
    ///
    /// When omitted the phonons are treated as an equilibrium bath at the configured temperature.
    pub fn with_phonon_greens_functions(
        mut self,
        grid: &'a EnergyGrid<T>,
        lesser: &'a [BandedMatrix<T>],
        greater: &'a [BandedMatrix<T>],
    ) -> Self {
        self.phonons = Some(Propagator {
            grid,
            greens_functions: AggregateGreensFunctions::new(lesser, greater),
        });
        self
    }

    /// Select the contour component to evaluate
    pub fn with_contour_order(mut self, contour_order: ContourOrder) -> Self {
        self.contour_order = contour_order;
        self
    }
}

impl<'a, T: RealField + Copy>
    PhononSelfEnergyBuilder<
        'a,
        T,
        &'a PhononConfiguration<T>,
        &'a InteractionTensor<T>,
        Propagator<'a, T>,
    >
{
    /// Assemble the evaluator, this is only available once the configuration, coupling and electron Green's
    /// functions are attached
    pub fn build(self) -> PhononSelfEnergy<'a, T> {
        PhononSelfEnergy {
            configuration: self.configuration,
            coupling: self.coupling,
            electrons: self.electrons,
            phonons: self.phonons,
            contour_order: self.contour_order,
        }
    }
}

/// Evaluates the electron-phonon self-energy for one contour component
#[derive(Clone, Copy, Debug)]
pub struct PhononSelfEnergy<'a, T: RealField + Copy> {
    configuration: &'a PhononConfiguration<T>,
    coupling: &'a InteractionTensor<T>,
    electrons: Propagator<'a, T>,
    phonons: Option<Propagator<'a, T>>,
    contour_order: ContourOrder,
}

impl<'a, T: RealField + Copy> PhononSelfEnergy<'a, T> {
    /// The configured interaction model
    pub fn model(&self) -> PhononModel {
        self.configuration.model
    }

    /// The contour component this evaluator computes
    pub fn contour_order(&self) -> ContourOrder {
        self.contour_order
    }

    /// Computes the self-energy, fanning the electron energies out over the rayon thread pool when `parallel`
    /// is set. The result does not depend on `parallel`.
    pub fn compute(&self, parallel: bool) -> Result<SelfEnergy<T>, SelfEnergyError> {
        if parallel {
            self.compute_with(&Parallel)
        } else {
            self.compute_with(&Sequential)
        }
    }

    /// Computes the self-energy, evaluating the electron energies with `strategy`
    pub fn compute_with<S: ExecutionStrategy>(
        &self,
        strategy: &S,
    ) -> Result<SelfEnergy<T>, SelfEnergyError> {
        tracing::info!(
            "Calculating {} phonon self energy with the {} model ({})",
            self.contour_order,
            self.configuration.model,
            strategy.name()
        );
        let self_energy = match self.configuration.model {
            PhononModel::GreensFunction => {
                return Err(SelfEnergyError::UnsupportedModel(
                    PhononModel::GreensFunction,
                ))
            }
            PhononModel::DeformationPotential => {
                self.validate()?;
                self.deformation_potential(strategy)?
            }
        };

        // Security check for the self energy
        //
        // The lesser and greater Green's functions are anti-hermitian, and the coupling enters as the symmetric
        // product M_ij M_ji with real scalar weights, so each slice of the self-energy should also be
        // anti-hermitian.
        if self.configuration.security_checks {
            self_energy
                .iter()
                .enumerate()
                .try_for_each(|(index, matrix)| {
                    if is_anti_hermitian(matrix) {
                        Ok(())
                    } else {
                        Err(SelfEnergyError::SecurityCheck {
                            calculation: format!("{} phonon self-energy", self.contour_order),
                            index,
                        })
                    }
                })?;
        }

        Ok(self_energy)
    }

    /// Checks every input is consistent before any contraction work is carried out
    fn validate(&self) -> Result<(), SelfEnergyError> {
        let num_sites = self.coupling.num_sites();
        let num_diagonals = self.configuration.num_diagonals;
        if num_diagonals > num_sites {
            return Err(SelfEnergyError::InvalidConfiguration(format!(
                "{num_diagonals} off-diagonals were requested for a system of {num_sites} sites"
            )));
        }

        self.electrons.greens_functions.validate(
            "electron Green's function",
            self.electrons.grid.num_points(),
        )?;
        if let Some(electron_sites) = self.electrons.greens_functions.num_sites() {
            if electron_sites != num_sites {
                return Err(SelfEnergyError::ShapeMismatch(format!(
                    "the electron Green's function spans {electron_sites} sites but the interaction tensor spans {num_sites}"
                )));
            }
        }

        match &self.phonons {
            Some(phonons) => {
                phonons
                    .greens_functions
                    .validate("phonon Green's function", phonons.grid.num_points())?;
                if let Some(phonon_sites) = phonons.greens_functions.num_sites() {
                    if phonon_sites != num_sites {
                        return Err(SelfEnergyError::ShapeMismatch(format!(
                            "the phonon Green's function spans {phonon_sites} sites but the electron Green's function spans {num_sites}"
                        )));
                    }
                }
            }
            None => {
                let mode_energies = &self.configuration.mode_energies;
                if mode_energies.len() != self.coupling.num_modes() {
                    return Err(SelfEnergyError::ShapeMismatch(format!(
                        "{} phonon mode energies were configured for an interaction tensor with {} modes",
                        mode_energies.len(),
                        self.coupling.num_modes()
                    )));
                }
                if let Some(mode) = mode_energies
                    .iter()
                    .position(|energy| !energy.is_finite() || *energy <= T::zero())
                {
                    return Err(SelfEnergyError::InvalidConfiguration(format!(
                        "the energy of phonon mode {mode} must be positive and finite"
                    )));
                }
                let temperature = self.configuration.temperature;
                if !temperature.is_finite() || temperature <= T::zero() {
                    return Err(SelfEnergyError::InvalidConfiguration(
                        "the lattice temperature must be positive and finite".into(),
                    ));
                }
            }
        }
        tracing::debug!("Validated inputs over {} sites", num_sites);
        Ok(())
    }
}
