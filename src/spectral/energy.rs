use crate::error::SelfEnergyError;
use itertools::Itertools;
use nalgebra::{DVector, RealField};

/// An ordered discrete energy axis and its trapezium integration weights
#[derive(Clone, Debug)]
pub struct EnergyGrid<T: Copy + RealField> {
    points: DVector<T>,
    weights: DVector<T>,
}

impl<T: Copy + RealField> EnergyGrid<T> {
    /// Wrap a set of energies in electron volts, which must be finite and strictly increasing
    pub fn new(points: Vec<T>) -> Result<Self, SelfEnergyError> {
        if points.is_empty() {
            return Err(SelfEnergyError::InvalidConfiguration(
                "an energy grid needs at least one point".into(),
            ));
        }
        if let Some(index) = points.iter().position(|point| !point.is_finite()) {
            return Err(SelfEnergyError::InvalidConfiguration(format!(
                "energy grid point {index} is not finite"
            )));
        }
        if let Some((index, _)) = points
            .iter()
            .tuple_windows()
            .find_position(|(lower, upper)| upper <= lower)
        {
            return Err(SelfEnergyError::InvalidConfiguration(format!(
                "energy grid is not strictly increasing between points {} and {}",
                index,
                index + 1
            )));
        }

        let weights = trapezium_weights(&points);
        Ok(Self {
            points: DVector::from_vec(points),
            weights: DVector::from_vec(weights),
        })
    }

    /// Number of points in the grid
    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    /// The energy at grid point `index`
    pub fn energy_at(&self, index: usize) -> T {
        self.points[index]
    }

    /// The grid points in increasing order
    pub fn points(&self) -> impl Iterator<Item = &T> {
        self.points.iter()
    }

    /// Trapezium integration weights for each point
    pub fn weights(&self) -> impl Iterator<Item = &T> {
        self.weights.iter()
    }

    /// The integration weight of grid point `index`
    pub fn weight_at(&self, index: usize) -> T {
        self.weights[index]
    }

    /// Whether `target_energy` lies between the first and last points inclusive
    pub fn contains(&self, target_energy: T) -> bool {
        target_energy >= self.points[0] && target_energy <= self.points[self.num_points() - 1]
    }

    /// The indices of the two grid points which bracket `target_energy`, or `None` if the target
    /// lies outside the grid.
    pub fn identify_bracketing_indices(&self, target_energy: T) -> Option<[usize; 2]> {
        if !self.contains(target_energy) {
            return None;
        }
        let num_points = self.num_points();
        if num_points == 1 {
            return Some([0, 0]);
        }
        let idx_upper = self
            .points
            .as_slice()
            .partition_point(|&energy| energy <= target_energy);
        // `target_energy` sits on the final point
        if idx_upper == num_points {
            return Some([num_points - 2, num_points - 1]);
        }
        Some([idx_upper - 1, idx_upper])
    }

    /// Linear interpolation weights for the points returned by `identify_bracketing_indices`.
    ///
    /// The weights sum to one, and a target on a grid point places unit weight on that point.
    pub fn identify_bracketing_weights(&self, target_energy: T) -> Option<[T; 2]> {
        let [idx_lower, idx_upper] = self.identify_bracketing_indices(target_energy)?;
        if idx_lower == idx_upper {
            return Some([T::one(), T::zero()]);
        }
        let delta = self.points[idx_upper] - self.points[idx_lower];
        let delta_upper = self.points[idx_upper] - target_energy;
        let delta_lower = target_energy - self.points[idx_lower];
        Some([delta_upper / delta, delta_lower / delta])
    }

    /// The interpolation stencil `[(index, weight); 2]` at `target_energy`
    pub fn interpolation_stencil(&self, target_energy: T) -> Option<[(usize, T); 2]> {
        let indices = self.identify_bracketing_indices(target_energy)?;
        let weights = self.identify_bracketing_weights(target_energy)?;
        Some([(indices[0], weights[0]), (indices[1], weights[1])])
    }
}

fn trapezium_weights<T: Copy + RealField>(points: &[T]) -> Vec<T> {
    if points.len() == 1 {
        return vec![T::one()];
    }
    let two = T::one() + T::one();
    let widths = points
        .iter()
        .tuple_windows()
        .map(|(lower, upper)| *upper - *lower)
        .collect::<Vec<_>>();
    (0..points.len())
        .map(|index| {
            let left = if index == 0 {
                T::zero()
            } else {
                widths[index - 1]
            };
            let right = widths.get(index).copied().unwrap_or_else(T::zero);
            (left + right) / two
        })
        .collect()
}
