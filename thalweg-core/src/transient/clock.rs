use serde::{Deserialize, Serialize};
use uom::si::{f64::Time, time::second};

use super::StepLength;

/// Clock and stability parameters, built once at simulation start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Simulated time at which the run terminates, in seconds.
    pub finish_seconds: f64,
    /// Courant number applied to the network's stability limit.
    pub courant_number: f64,
    /// Extra scaling applied on top of the Courant criterion.
    pub step_scaling_factor: f64,
    /// Steps below this length abort the run as degenerate, in seconds.
    pub minimum_step_seconds: f64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            finish_seconds: 3600.0,
            courant_number: 0.7,
            step_scaling_factor: 1.0,
            minimum_step_seconds: 1e-6,
        }
    }
}

impl ClockConfig {
    /// Validates the clock parameters.
    ///
    /// # Errors
    ///
    /// Returns the failing requirement as a static string.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !self.finish_seconds.is_finite() || self.finish_seconds <= 0.0 {
            return Err("finish_seconds must be finite and positive");
        }
        if !self.courant_number.is_finite() || self.courant_number <= 0.0 {
            return Err("courant_number must be finite and positive");
        }
        if !self.step_scaling_factor.is_finite() || self.step_scaling_factor <= 0.0 {
            return Err("step_scaling_factor must be finite and positive");
        }
        if !self.minimum_step_seconds.is_finite() || self.minimum_step_seconds < 0.0 {
            return Err("minimum_step_seconds must be finite and non-negative");
        }
        Ok(())
    }
}

/// The engine's clock: elapsed time, the current step, and the stability
/// scaling state. Mutated only by the stepping engine, once per step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimClock {
    elapsed: Time,
    current_step: Option<StepLength>,
    finish: Time,
    courant_number: f64,
    step_scaling_factor: f64,
    minimum_step_seconds: f64,
}

impl SimClock {
    /// Builds a clock from a validated config.
    pub(super) fn from_config(config: &ClockConfig) -> Self {
        Self {
            elapsed: Time::new::<second>(0.0),
            current_step: None,
            finish: Time::new::<second>(config.finish_seconds),
            courant_number: config.courant_number,
            step_scaling_factor: config.step_scaling_factor,
            minimum_step_seconds: config.minimum_step_seconds,
        }
    }

    /// Elapsed simulation time.
    #[must_use]
    pub fn elapsed(&self) -> Time {
        self.elapsed
    }

    /// Elapsed simulation time in seconds.
    #[must_use]
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.get::<second>()
    }

    /// The step most recently taken, if any.
    #[must_use]
    pub fn current_step(&self) -> Option<StepLength> {
        self.current_step
    }

    /// The termination threshold.
    #[must_use]
    pub fn finish(&self) -> Time {
        self.finish
    }

    /// True once elapsed time has reached the finish threshold.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.finish
    }

    /// The minimum acceptable step, in seconds.
    #[must_use]
    pub fn minimum_step_seconds(&self) -> f64 {
        self.minimum_step_seconds
    }

    /// Scales a raw stability bound into a candidate step, in seconds.
    #[must_use]
    pub fn candidate_step_seconds(&self, stability_seconds: f64) -> f64 {
        stability_seconds * self.courant_number * self.step_scaling_factor
    }

    /// Advances elapsed time by one step.
    pub(super) fn advance(&mut self, step: StepLength) {
        self.elapsed = self.elapsed + step;
        self.current_step = Some(step);
    }
}
