//! Standalone bridge simulation module
//!
//! This module contains the Model 2 queue simulation for a single-lane
//! bridge with alternating right-of-way, plus the adapter that exposes its
//! sweeps as named plot variables.

mod bridge_side;
mod error;
mod general_properties;
mod model;
mod plot_function;
mod run_state;
mod solver;
mod types;

// Re-export public types for external use
pub use bridge_side::{BridgeSide, SideDefaults};
pub use error::SimError;
pub use general_properties::{GeneralProperties, PropertyDefaults, SolverSettings};
pub use model::{Model2, ModelSettings, SimulationResults, WaitingTime, ZeroComponentPolicy};
pub use plot_function::{
    DependentVariable, IndependentVariable, Model2PlotFunction, PlotData, PlotVariable,
    SeriesLimits, CONSTANT_STRINGS, PLOT_TYPE_STRING,
};
pub use run_state::RunState;
pub use solver::{fixed_point, newton, Solution, SolverOptions};
pub use types::{
    arrivals_during, kmph_to_metres, truncate_count, whole_arrivals_during, BridgeConfig,
    CONSTANT_COUNT, DEFAULT_MAX_CYCLES, FIXED_POINT_ITERATIONS, MAX_ARRIVAL_RATE,
    NEWTON_ITERATIONS, NEWTON_START, SECONDS_PER_MINUTE, WARM_UP_OPPOSING_GREEN,
};
