//! Deformation potential self-energy
//!
//! Without a phonon propagator the phonons are an equilibrium bath of modes with energy `ħω_ν` and Bose-Einstein
//! occupation `N_ν`. An electron at energy `E` is scattered in from `E - ħω_ν` by absorption and from `E + ħω_ν` by
//! emission:
//!
//! Σ^<_ij(E) = Σ_ν g_ijν [ N_ν G^<_ij(E - ħω_ν) + (N_ν + 1) G^<_ij(E + ħω_ν) ]
//!
//! Σ^>_ij(E) = Σ_ν g_ijν [ (N_ν + 1) G^>_ij(E - ħω_ν) + N_ν G^>_ij(E + ħω_ν) ]
//!
//! where `g_ijν = M_ijν M_jiν`. When the phonon Green's function is supplied the bath is replaced by a convolution
//! over the phonon energy grid
//!
//! Σ^≶_ij(E) = (i / 2π) g_ij Σ_m w_m G^≶_ij(E - ω_m) D^≶_ij(ω_m)
//!
//! with `g_ij` the pair coupling summed over modes. The electron Green's function is linearly interpolated between
//! grid points, and scattering to or from energies outside of the electron grid is neglected.
use super::{ContourOrder, ExecutionStrategy, PhononSelfEnergy, Propagator, SelfEnergy};
use crate::{
    constants::thermal_energy_in_electron_volts,
    error::SelfEnergyError,
    greens_functions::{banded_entries, BandedMatrix},
};
use nalgebra::RealField;
use num_complex::Complex;

/// A single term in the self-energy at fixed electron energy
enum Contribution<'a, T: RealField + Copy> {
    /// `weight * g_ijν * G_ij`
    Bath {
        electron: &'a BandedMatrix<T>,
        mode: usize,
        weight: T,
    },
    /// `weight * g_ij * G_ij * D_ij`
    Propagator {
        electron: &'a BandedMatrix<T>,
        phonon: &'a BandedMatrix<T>,
        weight: Complex<T>,
    },
}

impl<'a, T: RealField + Copy> PhononSelfEnergy<'a, T> {
    pub(super) fn deformation_potential<S: ExecutionStrategy>(
        &self,
        strategy: &S,
    ) -> Result<SelfEnergy<T>, SelfEnergyError> {
        let num_sites = self.coupling.num_sites();
        let num_diagonals = self.configuration.num_diagonals;
        let number_of_energies = self.electrons.grid.num_points();
        tracing::info!(
            "Calculating deformation potential self energy at {} energies",
            number_of_energies
        );

        let occupations = match self.phonons {
            Some(_) => Vec::new(),
            None => self.bose_einstein_occupations(),
        };

        let slices = strategy.map_energies(number_of_energies, |energy_index| {
            let contributions = match &self.phonons {
                Some(phonons) => self.propagator_contributions(energy_index, phonons),
                None => self.bath_contributions(energy_index, &occupations),
            };
            tracing::trace!(
                "Energy index {} receives {} contributions",
                energy_index,
                contributions.len()
            );
            self.contract(&contributions)
        });

        let matrices = slices
            .into_iter()
            .map(|values| BandedMatrix::from_band_values(num_sites, num_diagonals, values))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SelfEnergy {
            contour_order: self.contour_order,
            matrices,
        })
    }

    /// The equilibrium occupation `1 / (exp(ħω / k_B T) - 1)` of each phonon mode
    fn bose_einstein_occupations(&self) -> Vec<T> {
        let thermal_energy = thermal_energy_in_electron_volts(self.configuration.temperature);
        self.configuration
            .mode_energies
            .iter()
            .map(|&mode_energy| T::one() / (mode_energy / thermal_energy).exp_m1())
            .collect()
    }

    fn bath_contributions(
        &self,
        energy_index: usize,
        occupations: &[T],
    ) -> Vec<Contribution<'a, T>> {
        let grid = self.electrons.grid;
        let electrons = self.electrons.component(self.contour_order);
        let energy = grid.energy_at(energy_index);

        let mut contributions = Vec::new();
        for (mode, (&mode_energy, &occupation)) in self
            .configuration
            .mode_energies
            .iter()
            .zip(occupations.iter())
            .enumerate()
        {
            // Weights for scattering in from below and from above
            let (below, above) = match self.contour_order {
                ContourOrder::Lesser => (occupation, occupation + T::one()),
                ContourOrder::Greater => (occupation + T::one(), occupation),
            };
            for (energy_scattered_from, occupation_weight) in
                [(energy - mode_energy, below), (energy + mode_energy, above)]
            {
                let stencil = match grid.interpolation_stencil(energy_scattered_from) {
                    Some(stencil) => stencil,
                    None => continue,
                };
                contributions.extend(
                    stencil
                        .into_iter()
                        .filter(|(_, weight)| *weight != T::zero())
                        .map(|(electron_index, weight)| Contribution::Bath {
                            electron: &electrons[electron_index],
                            mode,
                            weight: weight * occupation_weight,
                        }),
                );
            }
        }
        contributions
    }

    fn propagator_contributions(
        &self,
        energy_index: usize,
        phonons: &Propagator<'a, T>,
    ) -> Vec<Contribution<'a, T>> {
        let grid = self.electrons.grid;
        let electrons = self.electrons.component(self.contour_order);
        let phonon_component = phonons.component(self.contour_order);
        let energy = grid.energy_at(energy_index);
        // i / 2π
        let prefactor = Complex::new(T::zero(), T::one() / T::two_pi());

        let mut contributions = Vec::new();
        for (phonon_index, (&phonon_energy, &phonon_weight)) in phonons
            .grid
            .points()
            .zip(phonons.grid.weights())
            .enumerate()
        {
            let stencil = match grid.interpolation_stencil(energy - phonon_energy) {
                Some(stencil) => stencil,
                None => continue,
            };
            contributions.extend(
                stencil
                    .into_iter()
                    .filter(|(_, weight)| *weight != T::zero())
                    .map(|(electron_index, weight)| Contribution::Propagator {
                        electron: &electrons[electron_index],
                        phonon: &phonon_component[phonon_index],
                        weight: prefactor * (phonon_weight * weight),
                    }),
            );
        }
        contributions
    }

    /// Sums `contributions` at every position in the band, returning the values in band order
    fn contract(&self, contributions: &[Contribution<'a, T>]) -> Vec<Complex<T>> {
        let num_sites = self.coupling.num_sites();
        let num_diagonals = self.configuration.num_diagonals;
        banded_entries(num_sites, num_diagonals)
            .map(|(row, column)| {
                contributions
                    .iter()
                    .fold(Complex::from(T::zero()), |acc, contribution| {
                        match contribution {
                            Contribution::Bath {
                                electron,
                                mode,
                                weight,
                            } => {
                                acc + electron.get(row, column)
                                    * (*weight * self.coupling.pair_coupling(row, column, *mode))
                            }
                            Contribution::Propagator {
                                electron,
                                phonon,
                                weight,
                            } => {
                                acc + electron.get(row, column)
                                    * phonon.get(row, column)
                                    * *weight
                                    * self.coupling.total_pair_coupling(row, column)
                            }
                        }
                    })
            })
            .collect()
    }
}

#[cfg(test)]
mod test {
    use crate::app::{PhononConfiguration, PhononModel};
    use crate::coupling::InteractionTensor;
    use crate::greens_functions::BandedMatrix;
    use crate::self_energy::{ContourOrder, PhononSelfEnergyBuilder};
    use crate::spectral::EnergyGrid;
    use num_complex::Complex;

    fn configuration(mode_energies: Vec<f64>) -> PhononConfiguration<f64> {
        PhononConfiguration {
            model: PhononModel::DeformationPotential,
            num_diagonals: 1,
            temperature: 300.,
            mode_energies,
            security_checks: true,
        }
    }

    #[test]
    fn scattering_outside_of_the_grid_gives_no_self_energy() {
        let configuration = configuration(vec![1.]);
        let coupling = InteractionTensor::from_elem(3, 1, 1.);
        let grid = EnergyGrid::new(vec![0., 0.01]).unwrap();
        let lesser = vec![BandedMatrix::identity(3, 1).unwrap(); 2];
        let greater = lesser.clone();

        let self_energy = PhononSelfEnergyBuilder::new()
            .with_configuration(&configuration)
            .with_coupling(&coupling)
            .with_electron_greens_functions(&grid, &lesser, &greater)
            .build()
            .compute(false)
            .unwrap();

        assert_eq!(self_energy.number_of_energies(), 2);
        for matrix in self_energy.iter() {
            assert!(matrix.values().iter().all(|v| *v == Complex::from(0_f64)));
        }
    }

    #[test]
    fn greater_self_energy_weights_absorption_and_emission_oppositely() {
        // With one mode the lesser and greater self energies at the top of a two point grid differ only in
        // the occupation weight applied to the point below.
        let mode_energy = 0.035;
        let configuration = configuration(vec![mode_energy]);
        let coupling = InteractionTensor::from_elem(3, 1, 1.);
        let grid = EnergyGrid::new(vec![0., mode_energy]).unwrap();
        let gf = BandedMatrix::from_band_fn(3, 1, |_, _| Complex::new(0., 1.)).unwrap();
        let lesser = vec![gf.clone(), gf.clone()];
        let greater = lesser.clone();

        let evaluate = |contour_order| {
            PhononSelfEnergyBuilder::new()
                .with_configuration(&configuration)
                .with_coupling(&coupling)
                .with_electron_greens_functions(&grid, &lesser, &greater)
                .with_contour_order(contour_order)
                .build()
                .compute(false)
                .unwrap()
        };
        let sigma_lesser = evaluate(ContourOrder::Lesser);
        let sigma_greater = evaluate(ContourOrder::Greater);
        assert_eq!(sigma_lesser.contour_order(), ContourOrder::Lesser);
        assert_eq!(sigma_greater.contour_order(), ContourOrder::Greater);

        // At the top of the grid only scattering from below survives: N for lesser, N + 1 for greater
        let difference = sigma_greater[1].get(0, 0) - sigma_lesser[1].get(0, 0);
        approx::assert_relative_eq!(difference.im, 1., epsilon = 1e-12);
        // At the bottom only scattering from above survives: N + 1 for lesser, N for greater
        let difference = sigma_lesser[0].get(0, 0) - sigma_greater[0].get(0, 0);
        approx::assert_relative_eq!(difference.im, 1., epsilon = 1e-12);
    }

    #[test]
    fn interpolates_the_greens_function_between_grid_points() {
        let configuration = configuration(vec![0.015]);
        let coupling = InteractionTensor::from_elem(2, 1, 1.);
        let grid = EnergyGrid::new(vec![0., 0.01, 0.02]).unwrap();
        let lesser = (0..3)
            .map(|k| {
                BandedMatrix::from_band_fn(2, 1, |_, _| Complex::new(0., k as f64)).unwrap()
            })
            .collect::<Vec<_>>();
        let greater = lesser.clone();

        let self_energy = PhononSelfEnergyBuilder::new()
            .with_configuration(&configuration)
            .with_coupling(&coupling)
            .with_electron_greens_functions(&grid, &lesser, &greater)
            .build()
            .compute(false)
            .unwrap();

        // At E = 0 only emission from E = 0.015 contributes, halfway between 1i and 2i
        let occupation = 1. / ((0.015_f64 / super::thermal_energy_in_electron_volts(300.)).exp() - 1.);
        approx::assert_relative_eq!(
            self_energy[0].get(0, 1).im,
            1.5 * (occupation + 1.),
            epsilon = 1e-12
        );
        // At E = 0.01 neither E - 0.015 nor E + 0.015 are on the grid
        assert_eq!(self_energy[1].get(1, 1), Complex::from(0_f64));
    }
}
