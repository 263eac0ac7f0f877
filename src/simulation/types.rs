//! Core types for the bridge simulation
//!
//! Unit conversions, model constants and the configuration record shared
//! between the model and whatever drives it.

use super::error::SimError;

/// Seconds in a minute, used to turn per-minute arrival rates into counts
pub const SECONDS_PER_MINUTE: f64 = 60.0;

/// Opposing green duration used to seed the warm-up cycle, in seconds
pub const WARM_UP_OPPOSING_GREEN: f64 = 40.0;

/// Starting guess for the departure-capacity Newton solve
pub const NEWTON_START: f64 = 10.0;

/// Fixed-point iterations used to estimate queue growth during green
pub const FIXED_POINT_ITERATIONS: usize = 9;

/// Newton iterations used to solve for the departure capacity
pub const NEWTON_ITERATIONS: usize = 2;

/// Default cap on joint cycles per simulation stage
pub const DEFAULT_MAX_CYCLES: usize = 10_000;

/// Number of values in the positional configuration form
pub const CONSTANT_COUNT: usize = 7;

/// Largest accepted arrival rate, vehicles per minute
pub const MAX_ARRIVAL_RATE: f64 = 600.0;

/// Convert kilometres per hour to metres per second
pub fn kmph_to_metres(value: f64) -> f64 {
    value * 5.0 / 18.0
}

/// Expected number of arrivals during `duration_secs` at `rate_per_minute`
///
/// Durations are always seconds and rates always vehicles per minute.
pub fn arrivals_during(duration_secs: f64, rate_per_minute: f64) -> f64 {
    debug_assert!(rate_per_minute >= 0.0, "arrival rate must be non-negative");
    duration_secs * rate_per_minute / SECONDS_PER_MINUTE
}

/// Whole vehicles arriving during `duration_secs`, truncated toward zero
pub fn whole_arrivals_during(duration_secs: f64, rate_per_minute: f64) -> u64 {
    truncate_count(arrivals_during(duration_secs, rate_per_minute))
}

/// Truncate a vehicle count toward zero. NaN and negatives map to zero.
pub fn truncate_count(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.trunc() as u64
    } else {
        0
    }
}

/// User-facing configuration for one Model 2 run
///
/// Velocity is kept in km/h exactly as entered so that reading the
/// configuration back returns the same bits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BridgeConfig {
    /// Length of the bridge, metres
    pub bridge_length: f64,
    /// Length of an average car, metres
    pub car_length: f64,
    /// Crossing velocity, km/h
    pub crossing_velocity_kmph: f64,
    /// Arrival rate on side i, vehicles per minute
    pub arrival_rate_i: f64,
    /// Arrival rate on side j, vehicles per minute
    pub arrival_rate_j: f64,
    /// Maximum green duration, seconds
    pub tg_max: f64,
    /// Target arrival index
    pub n: i64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            bridge_length: 200.0,
            car_length: 4.8,
            crossing_velocity_kmph: 40.0,
            arrival_rate_i: 10.0,
            arrival_rate_j: 10.0,
            tg_max: 120.0,
            n: 5,
        }
    }
}

impl BridgeConfig {
    /// Check the configuration can be fed to the model without producing
    /// NaN or infinite derived constants
    pub fn validate(&self) -> Result<(), SimError> {
        if !(self.crossing_velocity_kmph.is_finite() && self.crossing_velocity_kmph > 0.0) {
            return Err(SimError::Configuration(format!(
                "crossing velocity must be positive, got {}",
                self.crossing_velocity_kmph
            )));
        }

        let non_negative = [
            ("bridge length", self.bridge_length),
            ("car length", self.car_length),
            ("arrival rate i", self.arrival_rate_i),
            ("arrival rate j", self.arrival_rate_j),
            ("tg max", self.tg_max),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(SimError::Configuration(format!(
                    "{} must be a finite non-negative number, got {}",
                    name, value
                )));
            }
        }

        for (name, rate) in [
            ("arrival rate i", self.arrival_rate_i),
            ("arrival rate j", self.arrival_rate_j),
        ] {
            if rate > MAX_ARRIVAL_RATE {
                return Err(SimError::Configuration(format!(
                    "{} must be at most {} vehicles per minute, got {}",
                    name, MAX_ARRIVAL_RATE, rate
                )));
            }
        }

        Ok(())
    }

    /// Positional form `[L, l, v_kmph, Qi, Qj, tgmax, N]`
    pub fn to_values(&self) -> [f64; CONSTANT_COUNT] {
        [
            self.bridge_length,
            self.car_length,
            self.crossing_velocity_kmph,
            self.arrival_rate_i,
            self.arrival_rate_j,
            self.tg_max,
            self.n as f64,
        ]
    }

    /// Build a configuration from its positional form and validate it
    pub fn from_values(values: &[f64]) -> Result<Self, SimError> {
        let values: [f64; CONSTANT_COUNT] = values.try_into().map_err(|_| {
            SimError::Configuration(format!(
                "expected {} constant values, got {}",
                CONSTANT_COUNT,
                values.len()
            ))
        })?;

        let n = values[6];
        if !n.is_finite() || n.fract() != 0.0 {
            return Err(SimError::Configuration(format!(
                "N must be a whole number, got {}",
                n
            )));
        }

        let config = Self {
            bridge_length: values[0],
            car_length: values[1],
            crossing_velocity_kmph: values[2],
            arrival_rate_i: values[3],
            arrival_rate_j: values[4],
            tg_max: values[5],
            n: n as i64,
        };
        config.validate()?;
        Ok(config)
    }
}
