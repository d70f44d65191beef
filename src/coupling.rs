use crate::error::SelfEnergyError;
use nalgebra::RealField;
use ndarray::Array3;

/// The electron-phonon coupling strength `M[i, j, ν]` between sites `i` and `j` for phonon mode `ν`
#[derive(Clone, Debug)]
pub struct InteractionTensor<T> {
    data: Array3<T>,
}

impl<T: RealField + Copy> InteractionTensor<T> {
    /// Wraps `data` of shape `(num_sites, num_sites, num_modes)`
    pub fn new(data: Array3<T>) -> Result<Self, SelfEnergyError> {
        let shape = data.shape();
        if shape[0] != shape[1] {
            return Err(SelfEnergyError::ShapeMismatch(format!(
                "the interaction tensor site axes must agree, received {} and {}",
                shape[0], shape[1]
            )));
        }
        Ok(Self { data })
    }

    /// A tensor with every element equal to `value`
    pub fn from_elem(num_sites: usize, num_modes: usize, value: T) -> Self {
        Self {
            data: Array3::from_elem((num_sites, num_sites, num_modes), value),
        }
    }

    /// The number of sites spanned by each site axis
    pub fn num_sites(&self) -> usize {
        self.data.shape()[0]
    }

    /// The number of phonon modes
    pub fn num_modes(&self) -> usize {
        self.data.shape()[2]
    }

    /// The vertex product `M[i, j, ν] M[j, i, ν]` entering the self-energy for mode `ν`
    pub fn pair_coupling(&self, row: usize, column: usize, mode: usize) -> T {
        self.data[[row, column, mode]] * self.data[[column, row, mode]]
    }

    /// The vertex product summed over all phonon modes
    pub fn total_pair_coupling(&self, row: usize, column: usize) -> T {
        (0..self.num_modes()).fold(T::zero(), |acc, mode| {
            acc + self.pair_coupling(row, column, mode)
        })
    }

}

#[cfg(test)]
mod test {
    use super::InteractionTensor;
    use crate::error::SelfEnergyError;
    use ndarray::Array3;

    #[test]
    fn pair_coupling_is_symmetric_in_the_sites() {
        let data = Array3::from_shape_fn((3, 3, 2), |(i, j, mode)| {
            (1 + i + 2 * j + 5 * mode) as f64
        });
        let coupling = InteractionTensor::new(data).unwrap();
        assert_eq!(coupling.num_sites(), 3);
        assert_eq!(coupling.num_modes(), 2);
        assert_eq!(coupling.pair_coupling(0, 2, 1), coupling.pair_coupling(2, 0, 1));
        // M[0, 2, 1] = 10, M[2, 0, 1] = 8
        assert_eq!(coupling.pair_coupling(0, 2, 1), 80.);
        // M[1, 1, 0] = 4, M[1, 1, 1] = 9
        assert_eq!(coupling.total_pair_coupling(1, 1), 16. + 81.);
    }

    #[test]
    fn non_square_site_axes_are_a_shape_mismatch() {
        let data = Array3::<f64>::zeros((3, 2, 1));
        assert!(matches!(
            InteractionTensor::new(data),
            Err(SelfEnergyError::ShapeMismatch(_))
        ));
    }
}
