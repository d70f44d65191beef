//! Green's function containers consumed by the self-energy evaluation
//!
//! The outer NEGF solver produces the electron (and optionally phonon) Green's functions once per iteration;
//! this module holds the banded sparse storage they arrive in and the lesser/greater aggregate which borrows them.
mod aggregate;
mod banded;

pub use aggregate::AggregateGreensFunctions;
pub use banded::{banded_sparsity_pattern, BandedMatrix};

pub(crate) use banded::banded_entries;
