use ndarray::Array3;
use num_complex::Complex;
use rand::{thread_rng, Rng};
use transporter_phonon::{BandedMatrix, EnergyGrid, InteractionTensor};

/// An evenly spaced grid of `number_of_points` energies from `start` to `end`
pub fn uniform_energy_grid(start: f64, end: f64, number_of_points: usize) -> EnergyGrid<f64> {
    let step = if number_of_points > 1 {
        (end - start) / (number_of_points - 1) as f64
    } else {
        0.
    };
    let points = (0..number_of_points)
        .map(|index| start + step * index as f64)
        .collect();
    EnergyGrid::new(points).expect("Energy grid must be strictly increasing")
}

/// A random anti-hermitian banded matrix, `i` times a real symmetric matrix
pub fn construct_anti_hermitian_matrix(num_sites: usize, num_diagonals: usize) -> BandedMatrix<f64> {
    let mut rng = thread_rng();
    let mut upper = vec![0_f64; num_sites * num_sites];
    for row in 0..num_sites {
        for column in row..num_sites {
            upper[row * num_sites + column] = rng.gen::<f64>() - 0.5;
        }
    }
    BandedMatrix::from_band_fn(num_sites, num_diagonals, |row, column| {
        let (row, column) = (row.min(column), row.max(column));
        Complex::new(0., upper[row * num_sites + column])
    })
    .expect("Band data is invalid")
}

/// One random anti-hermitian matrix per energy
pub fn construct_test_greens_functions(
    num_sites: usize,
    num_diagonals: usize,
    number_of_energies: usize,
) -> Vec<BandedMatrix<f64>> {
    (0..number_of_energies)
        .map(|_| construct_anti_hermitian_matrix(num_sites, num_diagonals))
        .collect()
}

/// A sequence `i (k + 1) T` where `T` is tridiagonal with unit diagonal and `off_diagonal` either side
pub fn construct_scaled_tridiagonal_greens_functions(
    num_sites: usize,
    off_diagonal: f64,
    number_of_energies: usize,
) -> Vec<BandedMatrix<f64>> {
    (0..number_of_energies)
        .map(|index| {
            let scale = (index + 1) as f64;
            BandedMatrix::from_band_fn(num_sites, 1, |row, column| {
                let value = if row == column { 1. } else { off_diagonal };
                Complex::new(0., scale * value)
            })
            .expect("Band data is invalid")
        })
        .collect()
}

/// A random real interaction tensor, symmetric in the site indices
pub fn construct_test_coupling(num_sites: usize, num_modes: usize) -> InteractionTensor<f64> {
    let mut rng = thread_rng();
    let mut data = Array3::zeros((num_sites, num_sites, num_modes));
    for mode in 0..num_modes {
        for row in 0..num_sites {
            for column in row..num_sites {
                let value: f64 = rng.gen();
                data[[row, column, mode]] = value;
                data[[column, row, mode]] = value;
            }
        }
    }
    InteractionTensor::new(data).expect("Interaction tensor site axes must agree")
}
