use std::error::Error as StdError;

use thiserror::Error;

use crate::network::SlopeDiagnostic;

/// Fatal conditions detected by the stepping engine.
///
/// All of these abort the run. The driver is expected to force-flush the
/// output collaborator and terminate; nothing here is retried.
#[derive(Debug, Error)]
pub enum Error {
    #[error(
        "time step of {step_seconds} s is below the {threshold_seconds} s minimum{}",
        flattest_note(.flattest)
    )]
    StepTooSmall {
        step_seconds: f64,
        threshold_seconds: f64,
        /// The reach with the flattest bed slope, the usual culprit when
        /// the stability calculation degenerates.
        flattest: Option<SlopeDiagnostic>,
    },

    #[error("simulation time is not finite: {seconds} s")]
    NonFiniteTime { seconds: f64 },

    #[error("invalid simulation config: {reason}")]
    InvalidConfig { reason: &'static str },

    #[error("reach network failed")]
    Network(#[source] Box<dyn StdError + Send + Sync>),

    #[error("output collaborator failed")]
    Output(#[source] Box<dyn StdError + Send + Sync>),
}

impl Error {
    pub(super) fn network<E>(source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Network(Box::new(source))
    }

    pub(super) fn output<E>(source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Output(Box::new(source))
    }
}

fn flattest_note(flattest: &Option<SlopeDiagnostic>) -> String {
    match flattest {
        Some(diagnostic) => format!("; flattest {diagnostic}"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::reach::ReachId;

    #[test]
    fn step_too_small_names_the_flattest_reach() {
        let error = Error::StepTooSmall {
            step_seconds: 1e-9,
            threshold_seconds: 1e-6,
            flattest: Some(SlopeDiagnostic {
                reach: ReachId(4),
                bed_slope: 1e-8,
            }),
        };
        let message = error.to_string();
        assert!(message.contains("reach 4"), "{message}");
        assert!(message.contains("0.000001"), "{message}");
    }

    #[test]
    fn step_too_small_without_diagnostic_still_formats() {
        let error = Error::StepTooSmall {
            step_seconds: 0.0,
            threshold_seconds: 1e-6,
            flattest: None,
        };
        assert!(error.to_string().contains("below"));
    }
}
