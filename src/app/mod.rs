//! Configuration and tracing primitives shared by callers of the self-energy evaluator
mod configuration;
/// Tracing subscribers writing to the terminal and a json log file
pub mod telemetry;

pub use configuration::{Configuration, PhononConfiguration, PhononModel};
