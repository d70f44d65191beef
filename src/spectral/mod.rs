/// This module provides the discrete energy axes on which the electron and phonon Green's
/// functions are sampled
mod energy;

pub use energy::EnergyGrid;
