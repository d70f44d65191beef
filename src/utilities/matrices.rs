use crate::greens_functions::BandedMatrix;
use nalgebra::RealField;

/// Tests for anti-hermiticity of a banded matrix
///
/// The band is symmetric about the main diagonal, so the adjoint of every stored element is also stored.
pub(crate) fn is_anti_hermitian<T: RealField + Copy>(matrix: &BandedMatrix<T>) -> bool {
    let values = matrix.values();
    if values.is_empty() {
        return true;
    }
    let mut mean = values
        .iter()
        .fold(T::zero(), |acc, value| acc + value.norm_sqr().sqrt())
        / nalgebra::convert::<f64, T>(values.len() as f64);
    if mean == T::zero() {
        mean = T::one();
    }
    let tolerance = nalgebra::convert::<f64, T>(f64::EPSILON * 10000_f64);
    matrix.iter_band().all(|(row, column, element)| {
        let adjoint_element = matrix.get(column, row);
        (element + adjoint_element.conj()).norm_sqr().sqrt() / mean < tolerance
    })
}
