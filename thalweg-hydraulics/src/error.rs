use std::error::Error as StdError;

use thiserror::Error;

use thalweg_core::ReachId;

/// Errors raised by the hydraulic solvers and the river system.
///
/// Domain-invalid scalars fail immediately rather than being clamped;
/// root-finder failures propagate unchanged so the caller can tell a
/// bracketing problem from an invalid input.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid {quantity}: {value}")]
    InvalidInput { quantity: &'static str, value: f64 },

    #[error("unknown {0}")]
    UnknownReach(ReachId),

    #[error("invalid network: {reason}")]
    InvalidNetwork { reason: &'static str },

    #[error(transparent)]
    Solve(#[from] thalweg_solve::Error),

    #[error("change model failed")]
    Change(#[source] Box<dyn StdError + Send + Sync>),
}

impl Error {
    pub(crate) fn invalid(quantity: &'static str, value: f64) -> Self {
        Self::InvalidInput { quantity, value }
    }

    pub(crate) fn change<E>(source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Change(Box::new(source))
    }
}
