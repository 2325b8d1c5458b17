//! The transient stepping engine.
//!
//! A simulation advances a [`ReachNetwork`](crate::network::ReachNetwork)
//! through time with a step size derived from the network's stability limit
//! (a Courant-style criterion): `step = stability × courant_number ×
//! step_scaling_factor`. The loop terminates once elapsed time reaches the
//! finish threshold. A step below the configured minimum or a non-finite
//! elapsed time aborts the run with a typed error — divergence is detected,
//! never simulated through.

mod clock;
mod error;
mod simulation;
mod step_length;

#[cfg(test)]
mod test_utils;

pub use clock::{ClockConfig, SimClock};
pub use error::Error;
pub use simulation::{SimConfig, Simulation};
pub use step_length::{StepLength, StepLengthError};
