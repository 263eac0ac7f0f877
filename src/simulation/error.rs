//! Error types for the bridge simulation

use thiserror::Error;

use super::plot_function::DependentVariable;
use super::run_state::RunState;

/// Errors raised by the simulation and its plot adapter
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    /// Configuration rejected at the boundary
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// A run exceeded its joint-cycle cap without reaching its goal
    #[error("Simulation for N = {n} did not settle within {cycles} cycles")]
    Diverged { n: i64, cycles: usize },

    /// A dependent series was requested before any sweep populated it
    #[error("No data for '{0}': run an independent variable sweep first")]
    NoData(DependentVariable),

    /// Variable name not known to the plot function
    #[error("Unknown plot variable '{0}'")]
    UnknownVariable(String),

    /// The runner was asked to move between incompatible states
    #[error("Illegal run state transition from {from:?} to {to:?}")]
    IllegalTransition { from: RunState, to: RunState },
}
