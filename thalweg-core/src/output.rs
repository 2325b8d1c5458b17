//! The output collaborator produced-to by the stepping engine.

use std::convert::Infallible;

use uom::si::f64::Time;

use crate::transient::StepLength;

/// A completed step, as seen by output collaborators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepRecord {
    /// Number of completed steps, 1-based after the first step.
    pub step: usize,
    /// Elapsed simulation time after the step.
    pub elapsed: Time,
    /// Length of the step just taken; `None` before any step completes.
    pub step_length: Option<StepLength>,
}

/// Receives notifications from the stepping engine: once per completed step
/// and once at finalization.
///
/// `flush` exists so a driver can force out buffered results before
/// terminating on a fatal error; the default does nothing.
pub trait Output<N: ?Sized> {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Called after each completed step.
    fn record_step(&mut self, record: &StepRecord, network: &N) -> Result<(), Self::Error>;

    /// Called once when the simulation reaches its finish time.
    fn finalize(&mut self, record: &StepRecord, network: &N) -> Result<(), Self::Error>;

    /// Best-effort flush of buffered results.
    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// A no-op output for runs that only need the final network state.
impl<N: ?Sized> Output<N> for () {
    type Error = Infallible;

    fn record_step(&mut self, _record: &StepRecord, _network: &N) -> Result<(), Self::Error> {
        Ok(())
    }

    fn finalize(&mut self, _record: &StepRecord, _network: &N) -> Result<(), Self::Error> {
        Ok(())
    }
}
