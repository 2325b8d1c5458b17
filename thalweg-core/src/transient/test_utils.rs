//! Fixtures for stepping-engine tests.

use std::convert::Infallible;

use thiserror::Error;
use uom::si::f64::Time;

use crate::{
    network::{ReachNetwork, SlopeDiagnostic, StabilityLimit},
    output::{Output, StepRecord},
    reach::ReachId,
};

#[derive(Debug, Error)]
#[error("scripted failure")]
pub(crate) struct ScriptedFailure;

/// A network whose hooks record their call order and report a fixed
/// stability limit.
#[derive(Debug)]
pub(crate) struct ScriptedNetwork {
    pub(crate) calls: Vec<&'static str>,
    stability_seconds: f64,
    fail_on_change_rate_call: Option<usize>,
    change_rate_calls: usize,
}

impl ScriptedNetwork {
    pub(crate) const FLATTEST_REACH: ReachId = ReachId(2);

    pub(crate) fn with_stability_seconds(stability_seconds: f64) -> Self {
        Self {
            calls: Vec::new(),
            stability_seconds,
            fail_on_change_rate_call: None,
            change_rate_calls: 0,
        }
    }

    pub(crate) fn failing_after(successful_calls: usize) -> Self {
        Self {
            fail_on_change_rate_call: Some(successful_calls),
            ..Self::with_stability_seconds(10.0)
        }
    }
}

impl ReachNetwork for ScriptedNetwork {
    type Error = ScriptedFailure;

    fn compute_change_rates(&mut self) -> Result<(), Self::Error> {
        self.calls.push("compute_change_rates");
        if self.fail_on_change_rate_call == Some(self.change_rate_calls) {
            return Err(ScriptedFailure);
        }
        self.change_rate_calls += 1;
        Ok(())
    }

    fn stability_limit(&self) -> Result<StabilityLimit, Self::Error> {
        Ok(StabilityLimit {
            seconds: self.stability_seconds,
            limiting_reach: Some(ReachId(1)),
        })
    }

    fn propagate_changes_downstream(&mut self, _dt: Time) -> Result<(), Self::Error> {
        self.calls.push("propagate_changes_downstream");
        Ok(())
    }

    fn perform_step_actions(&mut self, _dt: Time) -> Result<(), Self::Error> {
        self.calls.push("perform_step_actions");
        Ok(())
    }

    fn apply_changes(&mut self, _dt: Time) -> Result<(), Self::Error> {
        self.calls.push("apply_changes");
        Ok(())
    }

    fn refresh_derived_properties(&mut self) -> Result<(), Self::Error> {
        self.calls.push("refresh_derived_properties");
        Ok(())
    }

    fn refresh_collaborators(&mut self) -> Result<(), Self::Error> {
        self.calls.push("refresh_collaborators");
        Ok(())
    }

    fn smallest_bed_slope(&self) -> Option<SlopeDiagnostic> {
        Some(SlopeDiagnostic {
            reach: Self::FLATTEST_REACH,
            bed_slope: 1e-8,
        })
    }
}

/// Records every notification the engine sends.
#[derive(Debug, Default)]
pub(crate) struct RecordingOutput {
    pub(crate) steps: Vec<StepRecord>,
    pub(crate) finalized: usize,
}

impl<N> Output<N> for RecordingOutput {
    type Error = Infallible;

    fn record_step(&mut self, record: &StepRecord, _network: &N) -> Result<(), Self::Error> {
        self.steps.push(*record);
        Ok(())
    }

    fn finalize(&mut self, _record: &StepRecord, _network: &N) -> Result<(), Self::Error> {
        self.finalized += 1;
        Ok(())
    }
}
