use serde::{Deserialize, Serialize};

use crate::{
    network::{ReachNetwork, StabilityLimit},
    output::{Output, StepRecord},
};

use super::{ClockConfig, Error, SimClock, StepLength};

/// Simulation-wide settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub clock: ClockConfig,
    /// Whether to refresh derived properties and collaborators once before
    /// the first step.
    pub refresh_at_start: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            clock: ClockConfig::default(),
            refresh_at_start: true,
        }
    }
}

/// The top-level stepping engine.
///
/// Advances a [`ReachNetwork`] through simulated time with a
/// stability-driven adaptive step. Each step runs the network hooks in
/// strict order — change rates, step sizing, downstream propagation,
/// side-channel actions, change application, derived-property refresh,
/// collaborator refresh — then advances the clock and notifies the output
/// collaborator. Guard checks around every iteration turn a degenerate or
/// diverging run into a typed fatal error instead of silent bad physics.
#[derive(Debug)]
pub struct Simulation<N: ReachNetwork> {
    network: N,
    clock: SimClock,
    refresh_at_start: bool,
    initialized: bool,
    steps_completed: usize,
}

impl<N: ReachNetwork> Simulation<N> {
    /// Creates a simulation over the given network.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the clock parameters are
    /// degenerate.
    pub fn new(network: N, config: &SimConfig) -> Result<Self, Error> {
        config
            .clock
            .validate()
            .map_err(|reason| Error::InvalidConfig { reason })?;
        Ok(Self {
            network,
            clock: SimClock::from_config(&config.clock),
            refresh_at_start: config.refresh_at_start,
            initialized: false,
            steps_completed: 0,
        })
    }

    /// The simulated network.
    pub fn network(&self) -> &N {
        &self.network
    }

    /// The simulation clock.
    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// Number of completed steps.
    pub fn steps_completed(&self) -> usize {
        self.steps_completed
    }

    /// Consumes the simulation, returning the network in its final state.
    pub fn into_network(self) -> N {
        self.network
    }

    /// Runs the simulation to its finish time.
    ///
    /// The output collaborator is notified after every completed step and
    /// once more at finalization.
    ///
    /// # Errors
    ///
    /// Returns the first fatal condition encountered; the run cannot be
    /// resumed afterwards.
    pub fn run<O: Output<N>>(&mut self, output: &mut O) -> Result<(), Error> {
        self.initialize()?;
        while !self.clock.is_finished() {
            self.step(output)?;
        }
        self.check_elapsed_finite()?;
        let record = self.record();
        output
            .finalize(&record, &self.network)
            .map_err(Error::output)?;
        Ok(())
    }

    /// Advances the simulation by exactly one step.
    ///
    /// # Errors
    ///
    /// Returns the first fatal condition encountered during the step.
    pub fn step<O: Output<N>>(&mut self, output: &mut O) -> Result<StepRecord, Error> {
        self.initialize()?;
        self.network
            .compute_change_rates()
            .map_err(Error::network)?;
        let limit = self.network.stability_limit().map_err(Error::network)?;
        let step = self.size_step(limit)?;

        self.network
            .propagate_changes_downstream(step.into_inner())
            .map_err(Error::network)?;
        self.network
            .perform_step_actions(step.into_inner())
            .map_err(Error::network)?;
        self.network
            .apply_changes(step.into_inner())
            .map_err(Error::network)?;
        self.network
            .refresh_derived_properties()
            .map_err(Error::network)?;
        self.network
            .refresh_collaborators()
            .map_err(Error::network)?;

        self.clock.advance(step);
        self.check_elapsed_finite()?;
        self.steps_completed += 1;

        let record = self.record();
        output
            .record_step(&record, &self.network)
            .map_err(Error::output)?;
        Ok(record)
    }

    fn initialize(&mut self) -> Result<(), Error> {
        if self.initialized {
            return Ok(());
        }
        if self.refresh_at_start {
            self.network
                .refresh_derived_properties()
                .map_err(Error::network)?;
            self.network
                .refresh_collaborators()
                .map_err(Error::network)?;
        }
        self.initialized = true;
        Ok(())
    }

    /// Scales the stability limit into the next step length.
    ///
    /// Fails when the candidate step falls below the configured minimum,
    /// naming the reach with the flattest bed slope, or when the candidate
    /// is not finite.
    fn size_step(&self, limit: StabilityLimit) -> Result<StepLength, Error> {
        let seconds = self.clock.candidate_step_seconds(limit.seconds);
        if !seconds.is_finite() {
            return Err(Error::NonFiniteTime { seconds });
        }

        let threshold = self.clock.minimum_step_seconds();
        match StepLength::from_seconds(seconds) {
            Ok(step) if seconds >= threshold => Ok(step),
            _ => Err(Error::StepTooSmall {
                step_seconds: seconds,
                threshold_seconds: threshold,
                flattest: self.network.smallest_bed_slope(),
            }),
        }
    }

    fn check_elapsed_finite(&self) -> Result<(), Error> {
        let seconds = self.clock.elapsed_seconds();
        if seconds.is_finite() {
            Ok(())
        } else {
            Err(Error::NonFiniteTime { seconds })
        }
    }

    fn record(&self) -> StepRecord {
        StepRecord {
            step: self.steps_completed,
            elapsed: self.clock.elapsed(),
            step_length: self.clock.current_step(),
        }
    }
}
