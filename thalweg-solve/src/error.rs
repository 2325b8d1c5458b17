use std::error::Error as StdError;

use thiserror::Error;

/// Errors that can occur while searching for a bracket or a root.
///
/// All variants are fatal for the solve in progress; there is no retry at
/// this level. Callers get the offending values so they can report where the
/// equation went wrong, not just that it did.
#[derive(Debug, Error)]
pub enum Error {
    #[error("bracket contains non-finite value: {value}")]
    NonFiniteBracket { value: f64 },

    #[error("bracket has zero width: both ends are {value}")]
    ZeroWidthBracket { value: f64 },

    #[error("no root in bracket: f({low}) = {f_low}, f({high}) = {f_high}")]
    NoBracket {
        low: f64,
        high: f64,
        f_low: f64,
        f_high: f64,
    },

    #[error("sign change on both sides of {expected}: lower bracket {lower:?}, upper bracket {upper:?}")]
    AmbiguousBracket {
        expected: f64,
        lower: [f64; 2],
        upper: [f64; 2],
    },

    #[error("no convergence within {iters} iterations")]
    IterationBudget { iters: usize },

    #[error("non-finite residual {residual} at x = {x}")]
    NonFiniteResidual { x: f64, residual: f64 },

    #[error("secant update stalled at x = {x}: zero residual difference")]
    StalledSecant { x: f64 },

    #[error("bracket lost at x = {x}: residual signs match no expected pattern")]
    LostBracket { x: f64 },

    #[error("invalid config: {reason}")]
    InvalidConfig { reason: &'static str },

    #[error("residual evaluation failed")]
    Residual(#[source] Box<dyn StdError + Send + Sync>),
}

/// Evaluates the residual at `x`, rejecting non-finite results.
///
/// Every probe in this crate goes through here so that a NaN or infinite
/// residual surfaces as a typed error instead of poisoning the iteration.
pub(crate) fn eval<F, E>(f: &F, x: f64) -> Result<f64, Error>
where
    F: Fn(f64) -> Result<f64, E>,
    E: StdError + Send + Sync + 'static,
{
    let residual = f(x).map_err(|e| Error::Residual(Box::new(e)))?;
    if residual.is_finite() {
        Ok(residual)
    } else {
        Err(Error::NonFiniteResidual { x, residual })
    }
}
