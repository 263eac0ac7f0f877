//! Properties shared by both sides of the bridge
//!
//! Holds the bridge geometry and crossing velocity, the constants derived
//! from them, and the simulation clock.

use super::error::SimError;
use super::solver::SolverOptions;
use super::types::{kmph_to_metres, BridgeConfig, FIXED_POINT_ITERATIONS, NEWTON_ITERATIONS};

/// Solver limits used by the cycle event engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverSettings {
    /// Queue growth estimate during green
    pub queue_growth: SolverOptions,
    /// Departure capacity solve
    pub departure_capacity: SolverOptions,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            queue_growth: SolverOptions::fixed(FIXED_POINT_ITERATIONS),
            departure_capacity: SolverOptions::fixed(NEWTON_ITERATIONS),
        }
    }
}

/// Values `restore_defaults` rebuilds the working constants from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PropertyDefaults {
    pub bridge_length: f64,
    pub car_length: f64,
    /// Metres per second
    pub crossing_velocity: f64,
    pub n: i64,
    pub tg_max: f64,
}

/// Shared constants, derived values and clock for one model
#[derive(Debug, Clone, PartialEq)]
pub struct GeneralProperties {
    defaults: PropertyDefaults,

    /// Bridge length, metres
    pub bridge_length: f64,
    /// Car length, metres
    pub car_length: f64,
    /// Crossing velocity, metres per second
    pub crossing_velocity: f64,
    /// Target arrival index used when no explicit N is given
    pub n: i64,
    /// Maximum green duration, seconds
    pub tg_max: f64,

    /// Discharge headway constant, seconds per vehicle
    pub h0: f64,
    /// Single-vehicle crossing time with safety margin, seconds
    pub trij: f64,

    /// Duration of the most recent joint cycle, seconds
    pub cycle_duration: f64,
    /// Simulated time since the start of the run, seconds
    pub elapsed_time: f64,

    pub solver: SolverSettings,
}

impl Default for GeneralProperties {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneralProperties {
    /// Properties loaded with the default configuration
    pub fn new() -> Self {
        let config = BridgeConfig::default();
        let defaults = PropertyDefaults {
            bridge_length: config.bridge_length,
            car_length: config.car_length,
            crossing_velocity: kmph_to_metres(config.crossing_velocity_kmph),
            n: config.n,
            tg_max: config.tg_max,
        };
        let mut props = Self {
            defaults,
            bridge_length: 0.0,
            car_length: 0.0,
            crossing_velocity: 0.0,
            n: 0,
            tg_max: 0.0,
            h0: 0.0,
            trij: 0.0,
            cycle_duration: 0.0,
            elapsed_time: 0.0,
            solver: SolverSettings::default(),
        };
        props.restore_defaults();
        props
    }

    pub fn defaults(&self) -> &PropertyDefaults {
        &self.defaults
    }

    /// Store new defaults. Velocity is given in km/h.
    ///
    /// The working constants are untouched until `restore_defaults`.
    pub fn load_defaults(
        &mut self,
        bridge_length: f64,
        car_length: f64,
        velocity_kmph: f64,
        n: i64,
        tg_max: f64,
    ) -> Result<(), SimError> {
        BridgeConfig {
            bridge_length,
            car_length,
            crossing_velocity_kmph: velocity_kmph,
            tg_max,
            n,
            ..BridgeConfig::default()
        }
        .validate()?;

        self.defaults = PropertyDefaults {
            bridge_length,
            car_length,
            crossing_velocity: kmph_to_metres(velocity_kmph),
            n,
            tg_max,
        };
        Ok(())
    }

    /// Reset the working constants and clock to the defaults and
    /// recompute the derived values
    pub fn restore_defaults(&mut self) {
        self.bridge_length = self.defaults.bridge_length;
        self.car_length = self.defaults.car_length;
        self.crossing_velocity = self.defaults.crossing_velocity;
        self.n = self.defaults.n;
        self.tg_max = self.defaults.tg_max;
        self.cycle_duration = 0.0;
        self.elapsed_time = 0.0;
        self.calc_variables();
    }

    pub fn reset_vars(&mut self) {
        self.elapsed_time = 0.0;
    }

    pub fn calc_variables(&mut self) {
        self.calc_h0();
        self.calc_trij();
    }

    pub fn calc_h0(&mut self) {
        self.h0 = (self.car_length / self.crossing_velocity) + 2.0;
    }

    pub fn calc_trij(&mut self) {
        self.trij = ((self.bridge_length + self.car_length) / self.crossing_velocity) * 4.0 / 3.0;
    }

    /// Time to discharge `count` queued vehicles: `ln(count) + h0 (count - 1)`
    ///
    /// Only meaningful for `count >= 1`.
    pub fn discharge_time_for(&self, count: f64) -> f64 {
        debug_assert!(count >= 1.0, "discharge time needs at least one vehicle, got {}", count);
        count.ln() + self.h0 * (count - 1.0)
    }
}
