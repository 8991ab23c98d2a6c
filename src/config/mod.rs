//! Configuration models for the simulation driver.

pub mod simulation;

pub use simulation::{DispatchPolicy, SimulationConfig};
