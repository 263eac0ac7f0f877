//! One side of the bridge and its cycle event engine
//!
//! Each call to `calc_cycle_events` simulates one red phase followed by one
//! green phase for this side. The red phase lasts as long as the opposing
//! side's green plus the clearance time, which is what couples the two sides.

use log::trace;

use super::general_properties::GeneralProperties;
use super::solver::{fixed_point, newton};
use super::types::{arrivals_during, truncate_count, whole_arrivals_during, NEWTON_START};

/// Values `restore_defaults` rebuilds a side from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SideDefaults {
    /// Vehicles per minute
    pub arrival_rate: f64,
    /// Vehicles queued when a run starts
    pub initial_queue: u64,
}

impl Default for SideDefaults {
    fn default() -> Self {
        Self {
            arrival_rate: 10.0,
            initial_queue: 0,
        }
    }
}

/// Mutable simulation state for one direction of traffic
#[derive(Debug, Clone, PartialEq)]
pub struct BridgeSide {
    defaults: SideDefaults,

    /// Arrival rate `Q`, vehicles per minute
    pub arrival_rate: f64,
    /// Queue at the start of a run
    pub initial_queue: u64,

    // Per-cycle state, overwritten every cycle
    /// `tg`, seconds
    pub green_duration: f64,
    /// `tr`, seconds
    pub red_duration: f64,
    /// `nq0`: queue carried in from the previous cycle
    pub queue_at_cycle_start: u64,
    /// `nar`
    pub arrivals_during_red: u64,
    /// `nag`
    pub arrivals_during_green: u64,
    /// `na`
    pub total_arrivals: u64,
    /// `np`
    pub departures: u64,
    /// `npmax`
    pub max_departure_capacity: u64,
    /// `nq`
    pub queue_length: u64,

    // Cumulative state for the current run
    /// `na_total`
    pub total_arrivals_so_far: u64,
    /// `np_total`
    pub total_departures_so_far: u64,

    // Waiting-time breakdown for the tracked arrival
    /// `Na`: position of the tracked vehicle among this cycle's arrivals
    pub arrival_position: f64,
    /// `Np`: position of the tracked vehicle in this cycle's discharge order
    pub departure_position: f64,
    /// `psi_a`
    pub delay_before_queue_join: f64,
    /// `psi_c`
    pub cycles_waited_in_queue: f64,
    /// `psi_d`
    pub departure_delay_within_cycle: f64,
    /// `psi_ar`
    pub red_phase_arrival_delay: f64,
    /// `psi_ag`
    pub green_phase_arrival_delay: f64,
    /// `tw`
    pub waiting_time: f64,
}

impl Default for BridgeSide {
    fn default() -> Self {
        Self::new()
    }
}

impl BridgeSide {
    pub fn new() -> Self {
        Self::with_defaults(SideDefaults::default())
    }

    pub fn with_defaults(defaults: SideDefaults) -> Self {
        let mut side = Self {
            defaults,
            arrival_rate: 0.0,
            initial_queue: 0,
            green_duration: 0.0,
            red_duration: 0.0,
            queue_at_cycle_start: 0,
            arrivals_during_red: 0,
            arrivals_during_green: 0,
            total_arrivals: 0,
            departures: 0,
            max_departure_capacity: 0,
            queue_length: 0,
            total_arrivals_so_far: 0,
            total_departures_so_far: 0,
            arrival_position: 0.0,
            departure_position: 0.0,
            delay_before_queue_join: 0.0,
            cycles_waited_in_queue: 0.0,
            departure_delay_within_cycle: 0.0,
            red_phase_arrival_delay: 0.0,
            green_phase_arrival_delay: 0.0,
            waiting_time: 0.0,
        };
        side.restore_defaults();
        side
    }

    pub fn defaults(&self) -> &SideDefaults {
        &self.defaults
    }

    /// Store new defaults; applied by the next `restore_defaults`
    pub fn load_defaults(&mut self, arrival_rate: f64, initial_queue: u64) {
        self.defaults = SideDefaults {
            arrival_rate,
            initial_queue,
        };
    }

    /// Zero all state and reload the constants from the defaults
    pub fn restore_defaults(&mut self) {
        let defaults = self.defaults;
        *self = Self {
            defaults,
            arrival_rate: defaults.arrival_rate,
            initial_queue: defaults.initial_queue,
            queue_at_cycle_start: defaults.initial_queue,
            queue_length: defaults.initial_queue,
            green_duration: 0.0,
            red_duration: 0.0,
            arrivals_during_red: 0,
            arrivals_during_green: 0,
            total_arrivals: 0,
            departures: 0,
            max_departure_capacity: 0,
            total_arrivals_so_far: 0,
            total_departures_so_far: 0,
            arrival_position: 0.0,
            departure_position: 0.0,
            delay_before_queue_join: 0.0,
            cycles_waited_in_queue: 0.0,
            departure_delay_within_cycle: 0.0,
            red_phase_arrival_delay: 0.0,
            green_phase_arrival_delay: 0.0,
            waiting_time: 0.0,
        };
    }

    /// Clear counters and waiting-time components between warm-up and the
    /// measured run. The last cycle's timings are kept so the opposing side
    /// has a green duration to work from.
    pub fn reset_vars(&mut self) {
        self.total_arrivals_so_far = 0;
        self.total_departures_so_far = 0;
        self.queue_at_cycle_start = self.initial_queue;
        self.queue_length = self.initial_queue;
        self.arrival_position = 0.0;
        self.departure_position = 0.0;
        self.delay_before_queue_join = 0.0;
        self.cycles_waited_in_queue = 0.0;
        self.departure_delay_within_cycle = 0.0;
        self.red_phase_arrival_delay = 0.0;
        self.green_phase_arrival_delay = 0.0;
        self.waiting_time = 0.0;
    }

    /// Simulate one red + green cycle given the opposing green duration
    pub fn calc_cycle_events(&mut self, other_green: f64, props: &GeneralProperties) {
        self.queue_at_cycle_start = self.queue_length;

        self.calc_tr(other_green, props);
        self.calc_nar();
        self.queue_length = self.queue_length.saturating_add(self.arrivals_during_red);

        self.calc_tg_nag(props);
        self.total_arrivals = self
            .arrivals_during_red
            .saturating_add(self.arrivals_during_green);
        self.queue_length = self.queue_length.saturating_add(self.arrivals_during_green);

        self.calc_npmax_np(props);
        // departures never exceed the queue
        self.queue_length -= self.departures;

        self.total_arrivals_so_far = self
            .total_arrivals_so_far
            .saturating_add(self.total_arrivals);
        self.total_departures_so_far = self
            .total_departures_so_far
            .saturating_add(self.departures);

        trace!(
            "cycle: tr={:.2} tg={:.2} nar={} nag={} np={} nq={}",
            self.red_duration,
            self.green_duration,
            self.arrivals_during_red,
            self.arrivals_during_green,
            self.departures,
            self.queue_length
        );
    }

    fn calc_tr(&mut self, other_green: f64, props: &GeneralProperties) {
        self.red_duration = 2.0 * props.trij + other_green;
    }

    fn calc_nar(&mut self) {
        self.arrivals_during_red = whole_arrivals_during(self.red_duration, self.arrival_rate);
    }

    /// Green lasts long enough to discharge the post-red queue plus the
    /// vehicles that join it while it discharges, up to `tg_max`
    fn calc_tg_nag(&mut self, props: &GeneralProperties) {
        let queued = self.queue_length as f64;
        if self.queue_length == 0 {
            self.green_duration = 0.0;
            self.arrivals_during_green = 0;
            return;
        }

        let rate = self.arrival_rate;
        let grown = fixed_point(
            |nq| queued + arrivals_during(props.discharge_time_for(nq), rate),
            queued,
            props.solver.queue_growth,
        )
        .value;

        self.green_duration = props.discharge_time_for(grown);
        if self.green_duration > props.tg_max {
            self.green_duration = props.tg_max;
            self.arrivals_during_green = whole_arrivals_during(self.green_duration, rate);
        } else {
            self.arrivals_during_green = truncate_count(grown - queued);
        }
    }

    /// Solve `ln(n) + h0 (n - 1) = tg` for the number of vehicles the green
    /// phase can discharge
    fn calc_npmax_np(&mut self, props: &GeneralProperties) {
        if self.queue_length == 0 || self.green_duration <= 0.0 {
            self.max_departure_capacity = 0;
            self.departures = 0;
            return;
        }

        let h0 = props.h0;
        let tg = self.green_duration;
        let capacity = newton(
            |n| n.ln() + h0 * (n - 1.0) - tg,
            |n| 1.0 / n + h0,
            NEWTON_START,
            props.solver.departure_capacity,
        );

        self.max_departure_capacity = truncate_count(capacity.value);
        self.departures = self.max_departure_capacity.min(self.queue_length);
    }

    /// `Na = N - na_total + na`
    pub fn calc_arrival_position(&mut self, n: i64) {
        self.arrival_position =
            (n as f64) - (self.total_arrivals_so_far as f64) + (self.total_arrivals as f64);
    }

    /// `Np = N - np_total + np`, falling back to `Na` below one
    pub fn calc_departure_position(&mut self, n: i64) {
        let position =
            (n as f64) - (self.total_departures_so_far as f64) + (self.departures as f64);
        self.departure_position = if position < 1.0 {
            self.arrival_position
        } else {
            position
        };
    }

    /// Part of the arrival cycle left once the vehicle has joined the queue
    pub fn calc_psi_a(&mut self, cycle_duration: f64) {
        self.delay_before_queue_join = if self.total_arrivals == 0 {
            0.0
        } else {
            (1.0 - self.arrival_position / self.total_arrivals as f64) * cycle_duration
        };
    }

    /// Red phase of the departure cycle plus time to reach the front
    pub fn calc_psi_d(&mut self, props: &GeneralProperties) {
        self.departure_delay_within_cycle =
            self.red_duration + props.discharge_time_for(self.departure_position);
    }

    /// Remainder of the red phase after arriving during it
    pub fn calc_psi_ar(&mut self) {
        self.red_phase_arrival_delay = if self.arrivals_during_red == 0 {
            0.0
        } else {
            (1.0 - self.arrival_position / self.arrivals_during_red as f64) * self.red_duration
        };
    }

    /// Time for the queue ahead to discharge during green
    pub fn calc_psi_ag(&mut self, props: &GeneralProperties) {
        self.green_phase_arrival_delay = props.discharge_time_for(self.departure_position);
    }

    pub fn table_header() -> String {
        let titles = [
            "N", "tr", "tg", "Na", "nar", "nag", "na", "na_total", "Np", "np", "np_total",
            "psi_a", "psi_c", "psi_d", "psi_ar", "psi_ag",
        ];
        titles
            .iter()
            .map(|title| format!(" {:<8} |", title))
            .collect()
    }

    pub fn table_row(&self, n: i64) -> String {
        let values = [
            n as f64,
            self.red_duration,
            self.green_duration,
            self.arrival_position,
            self.arrivals_during_red as f64,
            self.arrivals_during_green as f64,
            self.total_arrivals as f64,
            self.total_arrivals_so_far as f64,
            self.departure_position,
            self.departures as f64,
            self.total_departures_so_far as f64,
            self.delay_before_queue_join,
            self.cycles_waited_in_queue,
            self.departure_delay_within_cycle,
            self.red_phase_arrival_delay,
            self.green_phase_arrival_delay,
        ];
        values
            .iter()
            .map(|value| format!(" {:<8.2} |", value))
            .collect()
    }
}
