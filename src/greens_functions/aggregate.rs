//! Methods for aggregated Green's functions
//!
//! Aggregated Green's functions pair the lesser and greater components of a propagator, each a sequence of
//! banded matrices evaluated at every point of an energy grid. They borrow the snapshots produced by the outer
//! solver and are never mutated here.
use super::BandedMatrix;
use crate::error::SelfEnergyError;
use nalgebra::RealField;

/// The lesser and greater components of a propagator over an energy grid
#[derive(Clone, Copy, Debug)]
pub struct AggregateGreensFunctions<'a, T: RealField + Copy> {
    /// One lesser matrix per energy
    pub lesser: &'a [BandedMatrix<T>],
    /// One greater matrix per energy
    pub greater: &'a [BandedMatrix<T>],
}

impl<'a, T: RealField + Copy> AggregateGreensFunctions<'a, T> {
    /// Pair lesser and greater sequences sampled on the same grid
    pub fn new(lesser: &'a [BandedMatrix<T>], greater: &'a [BandedMatrix<T>]) -> Self {
        Self { lesser, greater }
    }

    /// Length of the lesser sequence
    pub fn number_of_energies(&self) -> usize {
        self.lesser.len()
    }

    /// The site count of the propagator, `None` if no energies are held
    pub fn num_sites(&self) -> Option<usize> {
        self.lesser.first().map(BandedMatrix::num_sites)
    }

    /// Checks the lesser and greater sequences are consistent with each other and with an energy grid of
    /// `number_of_energies` points.
    ///
    /// `label` names the propagator in any resulting error.
    pub(crate) fn validate(
        &self,
        label: &str,
        number_of_energies: usize,
    ) -> Result<(), SelfEnergyError> {
        if self.lesser.len() != self.greater.len() {
            return Err(SelfEnergyError::ShapeMismatch(format!(
                "the lesser {label} has {} energies but the greater has {}",
                self.lesser.len(),
                self.greater.len()
            )));
        }
        if self.lesser.len() != number_of_energies {
            return Err(SelfEnergyError::ShapeMismatch(format!(
                "the {label} has {} energies but its grid has {number_of_energies}",
                self.lesser.len(),
            )));
        }
        let num_sites = match self.num_sites() {
            Some(num_sites) => num_sites,
            None => return Ok(()),
        };

        for (index, (lesser, greater)) in self.lesser.iter().zip(self.greater.iter()).enumerate() {
            if lesser.num_sites() != num_sites || greater.num_sites() != num_sites {
                return Err(SelfEnergyError::ShapeMismatch(format!(
                    "the {label} at energy index {index} does not span {num_sites} sites"
                )));
            }
            if !lesser.has_same_pattern(greater) {
                return Err(SelfEnergyError::ShapeMismatch(format!(
                    "the lesser and greater {label} at energy index {index} have different sparsity patterns"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::AggregateGreensFunctions;
    use crate::error::SelfEnergyError;
    use crate::greens_functions::BandedMatrix;

    #[test]
    fn consistent_sequences_validate() {
        let lesser = vec![BandedMatrix::<f64>::identity(4, 1).unwrap(); 3];
        let greater = vec![BandedMatrix::<f64>::zeros(4, 1).unwrap(); 3];
        let gfs = AggregateGreensFunctions::new(&lesser, &greater);
        assert_eq!(gfs.num_sites(), Some(4));
        assert!(gfs.validate("electron Green's function", 3).is_ok());
    }

    #[test]
    fn energy_count_disagreeing_with_the_grid_is_a_shape_mismatch() {
        let lesser = vec![BandedMatrix::<f64>::identity(4, 1).unwrap(); 3];
        let greater = lesser.clone();
        let gfs = AggregateGreensFunctions::new(&lesser, &greater);
        assert!(matches!(
            gfs.validate("electron Green's function", 2),
            Err(SelfEnergyError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn lesser_and_greater_with_different_bands_are_a_shape_mismatch() {
        let lesser = vec![BandedMatrix::<f64>::identity(4, 1).unwrap(); 2];
        let greater = vec![BandedMatrix::<f64>::identity(4, 2).unwrap(); 2];
        let gfs = AggregateGreensFunctions::new(&lesser, &greater);
        assert!(matches!(
            gfs.validate("electron Green's function", 2),
            Err(SelfEnergyError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn mixed_site_counts_are_a_shape_mismatch() {
        let lesser = vec![
            BandedMatrix::<f64>::identity(4, 1).unwrap(),
            BandedMatrix::<f64>::identity(5, 1).unwrap(),
        ];
        let greater = lesser.clone();
        let gfs = AggregateGreensFunctions::new(&lesser, &greater);
        assert!(matches!(
            gfs.validate("phonon Green's function", 2),
            Err(SelfEnergyError::ShapeMismatch(_))
        ));
    }
}
