//! Banded sparse matrices
//!
//! Green's functions and self-energies are stored as CSR matrices whose sparsity pattern is exactly the band
//! `|i - j| <= num_diagonals`. Every matrix with the same `(num_sites, num_diagonals)` therefore shares one
//! pattern, and the stored values are ordered row-major across the band.
use crate::error::SelfEnergyError;
use nalgebra::{DMatrix, RealField};
use nalgebra_sparse::{pattern::SparsityPattern, CsrMatrix};
use num_complex::Complex;

/// Iterates the `(row, column)` positions inside the band in row-major order
pub(crate) fn banded_entries(
    num_sites: usize,
    num_diagonals: usize,
) -> impl Iterator<Item = (usize, usize)> {
    (0..num_sites).flat_map(move |row| {
        let first_column = row.saturating_sub(num_diagonals);
        let last_column = (row + num_diagonals + 1).min(num_sites);
        (first_column..last_column).map(move |column| (row, column))
    })
}

fn check_band(num_sites: usize, num_diagonals: usize) -> Result<(), SelfEnergyError> {
    if num_diagonals > num_sites {
        return Err(SelfEnergyError::InvalidConfiguration(format!(
            "{num_diagonals} off-diagonals were requested for a system of {num_sites} sites"
        )));
    }
    Ok(())
}

/// Constructs the sparsity pattern of a `num_sites` square matrix with `num_diagonals` off-diagonals either side
/// of the main diagonal
pub fn banded_sparsity_pattern(
    num_sites: usize,
    num_diagonals: usize,
) -> Result<SparsityPattern, SelfEnergyError> {
    check_band(num_sites, num_diagonals)?;
    let mut row_offsets = Vec::with_capacity(num_sites + 1);
    let mut col_indices = Vec::new();
    row_offsets.push(0);
    let mut current_row = 0;
    for (row, column) in banded_entries(num_sites, num_diagonals) {
        while current_row < row {
            row_offsets.push(col_indices.len());
            current_row += 1;
        }
        col_indices.push(column);
    }
    while row_offsets.len() < num_sites + 1 {
        row_offsets.push(col_indices.len());
    }

    Ok(SparsityPattern::try_from_offsets_and_indices(
        num_sites,
        num_sites,
        row_offsets,
        col_indices,
    )?)
}

/// A square complex matrix restricted to a band around the main diagonal
#[derive(Clone, Debug, PartialEq)]
pub struct BandedMatrix<T: RealField + Copy> {
    num_diagonals: usize,
    matrix: CsrMatrix<Complex<T>>,
}

impl<T: RealField + Copy> BandedMatrix<T> {
    /// A band of zeros
    pub fn zeros(num_sites: usize, num_diagonals: usize) -> Result<Self, SelfEnergyError> {
        Self::from_band_fn(num_sites, num_diagonals, |_, _| Complex::from(T::zero()))
    }

    /// The identity, stored over the full band
    pub fn identity(num_sites: usize, num_diagonals: usize) -> Result<Self, SelfEnergyError> {
        Self::from_band_fn(num_sites, num_diagonals, |row, column| {
            if row == column {
                Complex::from(T::one())
            } else {
                Complex::from(T::zero())
            }
        })
    }

    /// Fill the band by evaluating `f(row, column)` at every position inside it
    pub fn from_band_fn<F>(
        num_sites: usize,
        num_diagonals: usize,
        mut f: F,
    ) -> Result<Self, SelfEnergyError>
    where
        F: FnMut(usize, usize) -> Complex<T>,
    {
        let values = banded_entries(num_sites, num_diagonals)
            .map(|(row, column)| f(row, column))
            .collect();
        Self::from_band_values(num_sites, num_diagonals, values)
    }

    /// Wrap values already ordered row-major across the band
    pub fn from_band_values(
        num_sites: usize,
        num_diagonals: usize,
        values: Vec<Complex<T>>,
    ) -> Result<Self, SelfEnergyError> {
        let pattern = banded_sparsity_pattern(num_sites, num_diagonals)?;
        if pattern.nnz() != values.len() {
            return Err(SelfEnergyError::ShapeMismatch(format!(
                "a band of {} off-diagonals over {} sites holds {} values, received {}",
                num_diagonals,
                num_sites,
                pattern.nnz(),
                values.len()
            )));
        }
        let matrix = CsrMatrix::try_from_pattern_and_values(pattern, values)?;
        Ok(Self {
            num_diagonals,
            matrix,
        })
    }

    /// Truncate a dense matrix to the band, entries outside of the band are discarded
    pub fn from_dense(
        dense: &DMatrix<Complex<T>>,
        num_diagonals: usize,
    ) -> Result<Self, SelfEnergyError> {
        if dense.nrows() != dense.ncols() {
            return Err(SelfEnergyError::ShapeMismatch(format!(
                "banded matrices are square, received a {}x{} matrix",
                dense.nrows(),
                dense.ncols()
            )));
        }
        Self::from_band_fn(dense.nrows(), num_diagonals, |row, column| {
            dense[(row, column)]
        })
    }

    /// Number of rows and columns
    pub fn num_sites(&self) -> usize {
        self.matrix.nrows()
    }

    /// Off-diagonals stored either side of the main diagonal
    pub fn num_diagonals(&self) -> usize {
        self.num_diagonals
    }

    /// Number of stored entries
    pub fn nnz(&self) -> usize {
        self.matrix.nnz()
    }

    /// Whether `(row, column)` is stored
    pub fn is_within_band(&self, row: usize, column: usize) -> bool {
        row < self.num_sites()
            && column < self.num_sites()
            && row.max(column) - row.min(column) <= self.num_diagonals
    }

    /// The element at `(row, column)`, which is zero outside of the band
    pub fn get(&self, row: usize, column: usize) -> Complex<T> {
        self.matrix
            .get_entry(row, column)
            .map(|entry| entry.into_value())
            .unwrap_or_else(|| Complex::from(T::zero()))
    }

    /// The stored values, ordered row-major across the band
    pub fn values(&self) -> &[Complex<T>] {
        self.matrix.values()
    }

    /// The shared banded sparsity pattern
    pub fn pattern(&self) -> &SparsityPattern {
        self.matrix.pattern()
    }

    /// Whether `other` stores exactly the same positions
    pub fn has_same_pattern(&self, other: &Self) -> bool {
        self.pattern() == other.pattern()
    }

    /// Iterates `(row, column, value)` over the band
    pub fn iter_band(&self) -> impl Iterator<Item = (usize, usize, &Complex<T>)> {
        self.matrix.triplet_iter()
    }

    /// Expand to a dense matrix, zero outside of the band
    pub fn to_dense(&self) -> DMatrix<Complex<T>> {
        nalgebra_sparse::convert::serial::convert_csr_dense(&self.matrix)
    }

    /// The underlying CSR storage
    pub fn as_csr(&self) -> &CsrMatrix<Complex<T>> {
        &self.matrix
    }

    /// Consume into the underlying CSR storage
    pub fn into_csr(self) -> CsrMatrix<Complex<T>> {
        self.matrix
    }
}

impl<T: RealField + Copy> AsRef<CsrMatrix<Complex<T>>> for BandedMatrix<T> {
    fn as_ref(&self) -> &CsrMatrix<Complex<T>> {
        &self.matrix
    }
}

#[cfg(test)]
mod test {
    use super::{banded_sparsity_pattern, BandedMatrix};
    use crate::error::SelfEnergyError;
    use nalgebra::DMatrix;
    use num_complex::Complex;

    #[test]
    fn tridiagonal_pattern_has_expected_offsets() {
        let nrows = 5;
        let pattern = banded_sparsity_pattern(nrows, 1).unwrap();
        assert_eq!(pattern.nnz(), 3 * nrows - 2);
        assert_eq!(pattern.major_offsets(), &[0, 2, 5, 8, 11, 13]);
        assert_eq!(pattern.lane(0), &[0, 1]);
        assert_eq!(pattern.lane(2), &[1, 2, 3]);
        assert_eq!(pattern.lane(4), &[3, 4]);
    }

    #[test]
    fn band_wider_than_the_matrix_is_dense() {
        let nrows = 4;
        let pattern = banded_sparsity_pattern(nrows, nrows).unwrap();
        assert_eq!(pattern.nnz(), nrows * nrows);
    }

    #[test]
    fn too_many_diagonals_is_an_invalid_configuration() {
        assert!(matches!(
            banded_sparsity_pattern(3, 4),
            Err(SelfEnergyError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn dense_conversion_discards_entries_outside_of_the_band() {
        let nrows = 4;
        let dense = DMatrix::from_fn(nrows, nrows, |row, column| {
            Complex::new((row * nrows + column) as f64, 1.)
        });
        let banded = BandedMatrix::from_dense(&dense, 1).unwrap();
        let round_trip = banded.to_dense();

        for row in 0..nrows {
            for column in 0..nrows {
                if row.max(column) - row.min(column) <= 1 {
                    assert_eq!(round_trip[(row, column)], dense[(row, column)]);
                    assert_eq!(banded.get(row, column), dense[(row, column)]);
                } else {
                    assert_eq!(round_trip[(row, column)], Complex::from(0_f64));
                    assert_eq!(banded.get(row, column), Complex::from(0_f64));
                }
            }
        }
    }

    #[test]
    fn non_square_dense_matrix_is_a_shape_mismatch() {
        let dense = DMatrix::from_element(3, 2, Complex::from(1_f64));
        assert!(matches!(
            BandedMatrix::from_dense(&dense, 1),
            Err(SelfEnergyError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn identity_is_unity_on_the_diagonal_only() {
        let identity = BandedMatrix::<f64>::identity(3, 1).unwrap();
        assert_eq!(identity.get(1, 1), Complex::from(1_f64));
        assert_eq!(identity.get(1, 2), Complex::from(0_f64));
        assert_eq!(identity.nnz(), 7);
        assert!(identity.has_same_pattern(&BandedMatrix::zeros(3, 1).unwrap()));
        assert!(!identity.has_same_pattern(&BandedMatrix::zeros(3, 2).unwrap()));
    }

    #[test]
    fn band_values_of_the_wrong_length_are_rejected() {
        let values = vec![Complex::from(1_f64); 6];
        assert!(matches!(
            BandedMatrix::from_band_values(3, 1, values),
            Err(SelfEnergyError::ShapeMismatch(_))
        ));
    }
}
