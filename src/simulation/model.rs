//! The Model 2 simulation runner
//!
//! Drives both bridge sides through alternating cycles until the `N`-th
//! vehicle on side i has arrived and departed, then records its waiting time.

use log::{debug, trace, warn};

use super::bridge_side::BridgeSide;
use super::error::SimError;
use super::general_properties::{GeneralProperties, SolverSettings};
use super::run_state::RunState;
use super::types::{
    BridgeConfig, CONSTANT_COUNT, DEFAULT_MAX_CYCLES, SECONDS_PER_MINUTE,
    WARM_UP_OPPOSING_GREEN,
};

/// How waiting-time components equal to zero are recorded in the series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZeroComponentPolicy {
    /// Record the zero as is
    #[default]
    ReportZero,
    /// Record `f64::INFINITY`, marking a phase that did not occur
    Infinite,
}

impl ZeroComponentPolicy {
    pub fn apply(self, value: f64) -> f64 {
        match self {
            ZeroComponentPolicy::Infinite if value == 0.0 => f64::INFINITY,
            _ => value,
        }
    }
}

/// Runner settings that are not part of the physical configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelSettings {
    pub solver: SolverSettings,
    /// Joint cycles allowed per stage before a run is abandoned
    pub max_cycles: usize,
    pub zero_policy: ZeroComponentPolicy,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            solver: SolverSettings::default(),
            max_cycles: DEFAULT_MAX_CYCLES,
            zero_policy: ZeroComponentPolicy::default(),
        }
    }
}

/// Waiting time of one tracked vehicle and its components, in seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaitingTime {
    pub n: i64,
    /// `tw`
    pub total: f64,
    pub psi_a: f64,
    pub psi_c: f64,
    pub psi_d: f64,
    pub psi_ar: f64,
    pub psi_ag: f64,
    /// Simulated time at the end of the run, seconds
    pub elapsed_time: f64,
}

/// Series accumulated over a sweep, one entry per run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimulationResults {
    pub tw: Vec<f64>,
    /// Elapsed time, minutes
    pub t: Vec<f64>,
    pub psi_a: Vec<f64>,
    pub psi_c: Vec<f64>,
    pub psi_d: Vec<f64>,
    pub psi_ar: Vec<f64>,
    pub psi_ag: Vec<f64>,
}

impl SimulationResults {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn len(&self) -> usize {
        self.tw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tw.is_empty()
    }

    pub fn push(&mut self, waiting_time: &WaitingTime, policy: ZeroComponentPolicy) {
        self.tw.push(waiting_time.total);
        self.t.push(waiting_time.elapsed_time / SECONDS_PER_MINUTE);
        self.psi_a.push(policy.apply(waiting_time.psi_a));
        self.psi_c.push(policy.apply(waiting_time.psi_c));
        self.psi_d.push(policy.apply(waiting_time.psi_d));
        self.psi_ar.push(policy.apply(waiting_time.psi_ar));
        self.psi_ag.push(policy.apply(waiting_time.psi_ag));
    }
}

/// Two bridge sides sharing one set of general properties
#[derive(Debug, Clone)]
pub struct Model2 {
    pub props: GeneralProperties,
    pub side_i: BridgeSide,
    pub side_j: BridgeSide,
    /// Crossing velocity as entered, so it reads back unchanged
    velocity_kmph: f64,
    settings: ModelSettings,
    state: RunState,
    results: SimulationResults,
}

impl Default for Model2 {
    fn default() -> Self {
        Self::new()
    }
}

impl Model2 {
    pub fn new() -> Self {
        Self::with_settings(ModelSettings::default())
    }

    pub fn with_settings(settings: ModelSettings) -> Self {
        let mut props = GeneralProperties::new();
        props.solver = settings.solver;
        Self {
            props,
            side_i: BridgeSide::new(),
            side_j: BridgeSide::new(),
            velocity_kmph: BridgeConfig::default().crossing_velocity_kmph,
            settings,
            state: RunState::Idle,
            results: SimulationResults::default(),
        }
    }

    /// Build a model from a configuration record
    pub fn from_config(config: &BridgeConfig, settings: ModelSettings) -> Result<Self, SimError> {
        let mut model = Self::with_settings(settings);
        model.set_config(config)?;
        Ok(model)
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: ModelSettings) {
        self.props.solver = settings.solver;
        self.settings = settings;
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn results(&self) -> &SimulationResults {
        &self.results
    }

    /// The configuration record the model is currently loaded with
    pub fn config(&self) -> BridgeConfig {
        let defaults = self.props.defaults();
        BridgeConfig {
            bridge_length: defaults.bridge_length,
            car_length: defaults.car_length,
            crossing_velocity_kmph: self.velocity_kmph,
            arrival_rate_i: self.side_i.defaults().arrival_rate,
            arrival_rate_j: self.side_j.defaults().arrival_rate,
            tg_max: defaults.tg_max,
            n: defaults.n,
        }
    }

    /// Load a configuration record. Nothing changes if it is invalid.
    pub fn set_config(&mut self, config: &BridgeConfig) -> Result<(), SimError> {
        config.validate()?;
        self.props.load_defaults(
            config.bridge_length,
            config.car_length,
            config.crossing_velocity_kmph,
            config.n,
            config.tg_max,
        )?;
        self.velocity_kmph = config.crossing_velocity_kmph;

        let initial_i = self.side_i.defaults().initial_queue;
        let initial_j = self.side_j.defaults().initial_queue;
        self.side_i.load_defaults(config.arrival_rate_i, initial_i);
        self.side_j.load_defaults(config.arrival_rate_j, initial_j);
        self.restore_defaults();
        Ok(())
    }

    /// `[L, l, v_kmph, Qi, Qj, tgmax, N]`
    pub fn get_constant_vals(&self) -> [f64; CONSTANT_COUNT] {
        self.config().to_values()
    }

    /// Load the positional configuration form
    pub fn set_constant_vals(&mut self, values: &[f64]) -> Result<(), SimError> {
        let config = BridgeConfig::from_values(values)?;
        self.set_config(&config)
    }

    /// Queue on each side when a run starts
    pub fn set_initial_queues(&mut self, queue_i: u64, queue_j: u64) {
        let rate_i = self.side_i.defaults().arrival_rate;
        let rate_j = self.side_j.defaults().arrival_rate;
        self.side_i.load_defaults(rate_i, queue_i);
        self.side_j.load_defaults(rate_j, queue_j);
        self.restore_defaults();
    }

    pub fn restore_defaults(&mut self) {
        self.props.restore_defaults();
        self.side_i.restore_defaults();
        self.side_j.restore_defaults();
    }

    /// Run the model for the configured target arrival
    pub fn run_default(&mut self) -> Result<Option<WaitingTime>, SimError> {
        let n = self.props.defaults().n;
        self.run_simulation(n)
    }

    /// Simulate from scratch until arrival `n` on side i has departed and
    /// append its waiting time to the results
    ///
    /// `n < 1` is a no-op returning `Ok(None)`.
    pub fn run_simulation(&mut self, n: i64) -> Result<Option<WaitingTime>, SimError> {
        if n < 1 {
            debug!("Skipping run for N = {}", n);
            self.state.transition(RunState::Idle)?;
            return Ok(None);
        }

        match self.run_stages(n) {
            Ok(waiting_time) => {
                self.results.push(&waiting_time, self.settings.zero_policy);
                trace!("{}", self.side_i.table_row(n));
                Ok(Some(waiting_time))
            }
            Err(err) => {
                self.state = RunState::Idle;
                Err(err)
            }
        }
    }

    fn run_stages(&mut self, n: i64) -> Result<WaitingTime, SimError> {
        self.warm_up()?;
        self.accumulate_arrivals(n)?;
        self.locate_departure(n)?;

        self.props.elapsed_time += self.side_i.waiting_time;
        self.state.transition(RunState::Done)?;

        let side = &self.side_i;
        Ok(WaitingTime {
            n,
            total: side.waiting_time,
            psi_a: side.delay_before_queue_join,
            psi_c: side.cycles_waited_in_queue,
            psi_d: side.departure_delay_within_cycle,
            psi_ar: side.red_phase_arrival_delay,
            psi_ag: side.green_phase_arrival_delay,
            elapsed_time: self.props.elapsed_time,
        })
    }

    /// One throwaway joint cycle so side j has a green duration, then clear
    /// everything it counted
    fn warm_up(&mut self) -> Result<(), SimError> {
        self.state.transition(RunState::WarmingUp)?;

        self.props.calc_variables();
        self.side_i.restore_defaults();
        self.side_j.restore_defaults();
        self.side_j.green_duration = WARM_UP_OPPOSING_GREEN;
        self.calc_joint_cycle();

        self.side_i.reset_vars();
        self.side_j.reset_vars();
        self.props.reset_vars();
        Ok(())
    }

    fn accumulate_arrivals(&mut self, n: i64) -> Result<(), SimError> {
        self.state.transition(RunState::Accumulating)?;

        let target = n as u64;
        self.calc_joint_cycle();
        let mut cycles = 1;
        while self.side_i.total_arrivals_so_far < target {
            self.check_cycle_cap(n, cycles)?;
            self.calc_joint_cycle();
            cycles += 1;
        }

        self.side_i.calc_arrival_position(n);
        Ok(())
    }

    fn locate_departure(&mut self, n: i64) -> Result<(), SimError> {
        self.state.transition(RunState::LocatingDeparture)?;

        let target = n as u64;
        if target <= self.side_i.total_departures_so_far {
            // Departs in the cycle it arrived in
            self.side_i.calc_departure_position(n);
            if self.side_i.arrival_position <= self.side_i.arrivals_during_red as f64 {
                self.side_i.calc_psi_ar();
                self.side_i.calc_psi_ag(&self.props);
                self.side_i.waiting_time =
                    self.side_i.red_phase_arrival_delay + self.side_i.green_phase_arrival_delay;
            } else {
                self.side_i.calc_psi_ag(&self.props);
                self.side_i.waiting_time = self.side_i.green_phase_arrival_delay;
            }
            return Ok(());
        }

        self.side_i.calc_psi_a(self.props.cycle_duration);
        let mut cycles = 0;
        loop {
            self.check_cycle_cap(n, cycles)?;
            self.calc_joint_cycle();
            cycles += 1;

            if target <= self.side_i.total_departures_so_far {
                self.side_i.calc_departure_position(n);
                self.side_i.calc_psi_d(&self.props);
                self.side_i.waiting_time = self.side_i.delay_before_queue_join
                    + self.side_i.cycles_waited_in_queue
                    + self.side_i.departure_delay_within_cycle;
                return Ok(());
            }
            self.side_i.cycles_waited_in_queue += self.props.cycle_duration;
        }
    }

    fn check_cycle_cap(&self, n: i64, cycles: usize) -> Result<(), SimError> {
        if cycles >= self.settings.max_cycles {
            warn!(
                "Run for N = {} abandoned after {} cycles in {:?}",
                n, cycles, self.state
            );
            return Err(SimError::Diverged { n, cycles });
        }
        Ok(())
    }

    /// Side i goes red while j is green, then j goes red while i is green
    fn calc_joint_cycle(&mut self) {
        let green_j = self.side_j.green_duration;
        self.side_i.calc_cycle_events(green_j, &self.props);
        let green_i = self.side_i.green_duration;
        self.side_j.calc_cycle_events(green_i, &self.props);

        self.props.cycle_duration = self.side_i.green_duration + self.side_i.red_duration;
        self.props.elapsed_time += self.props.cycle_duration;
    }

    /// Clear the results and run every `N` in `[min, max]`
    ///
    /// Returns the `N` values that produced a result, so the returned list
    /// lines up with every series in `results`.
    pub fn sweep_n(&mut self, min: i64, max: i64) -> Result<Vec<i64>, SimError> {
        self.results.clear();
        debug!("Sweeping N over [{}, {}]", min, max);

        let mut values = Vec::new();
        for n in min..=max {
            if self.run_simulation(n)?.is_some() {
                values.push(n);
            }
        }

        debug!("Sweep produced {} results", self.results.len());
        Ok(values)
    }
}
