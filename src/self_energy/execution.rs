//! Execution strategies for the per-energy self-energy slices
//!
//! Each slice of the self-energy depends only on borrowed, read-only inputs, so slices can be evaluated in any
//! order. A strategy decides where they run; both strategies return the slices ordered by energy index.
use rayon::prelude::*;

/// Decides how the independent per-energy slices are scheduled
pub trait ExecutionStrategy {
    /// A short label used in tracing output
    fn name(&self) -> &'static str;

    /// Evaluates `f` at every energy index in `0..number_of_energies`, returning the results in index order
    fn map_energies<R, F>(&self, number_of_energies: usize, f: F) -> Vec<R>
    where
        R: Send,
        F: Fn(usize) -> R + Send + Sync;
}

/// Evaluates the slices one after another on the calling thread
#[derive(Copy, Clone, Debug, Default)]
pub struct Sequential;

/// Fans the slices out over the global rayon thread pool
#[derive(Copy, Clone, Debug, Default)]
pub struct Parallel;

impl ExecutionStrategy for Sequential {
    fn name(&self) -> &'static str {
        "sequential"
    }

    fn map_energies<R, F>(&self, number_of_energies: usize, f: F) -> Vec<R>
    where
        R: Send,
        F: Fn(usize) -> R + Send + Sync,
    {
        (0..number_of_energies).map(f).collect()
    }
}

impl ExecutionStrategy for Parallel {
    fn name(&self) -> &'static str {
        "parallel"
    }

    fn map_energies<R, F>(&self, number_of_energies: usize, f: F) -> Vec<R>
    where
        R: Send,
        F: Fn(usize) -> R + Send + Sync,
    {
        // Indexed parallel iterators collect in order
        (0..number_of_energies).into_par_iter().map(f).collect()
    }
}

#[cfg(test)]
mod test {
    use super::{ExecutionStrategy, Parallel, Sequential};

    #[test]
    fn parallel_results_keep_energy_order() {
        let number_of_energies = 1024;
        let sequential = Sequential.map_energies(number_of_energies, |index| index * index);
        let parallel = Parallel.map_energies(number_of_energies, |index| index * index);
        assert_eq!(sequential, parallel);
        assert_eq!(parallel[31], 961);
    }

    #[test]
    fn no_energies_gives_no_slices() {
        assert!(Parallel.map_energies(0, |index| index).is_empty());
        assert!(Sequential.map_energies(0, |index| index).is_empty());
    }
}
