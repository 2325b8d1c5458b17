//! The root-finding family.
//!
//! Every method shares the same contract: given a residual function and a
//! bracket whose endpoint residuals bound a sign change, return an `x` with
//! `|f(x)|` within the residual tolerance or the bracket width / iterate
//! delta within the x tolerance, inside the iteration budget. A bracket
//! that does not bound a sign change and an exhausted budget are both typed
//! fatal errors, never silent.

mod bisection;
mod brent;
mod false_position;
mod ridders;
mod secant;

use std::error::Error as StdError;

use serde::{Deserialize, Serialize};

use crate::{Bracket, Config, Error, Solution};

/// Selects a root-finding algorithm.
///
/// The set is closed: construction-time selection happens through this tag,
/// typically deserialized from an external configuration description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Guaranteed convergence by interval halving.
    #[default]
    Bisection,
    /// Linear interpolation through the two most recent points.
    Secant,
    /// Regula falsi on the maintained bracket.
    FalsePosition,
    /// Midpoint evaluation plus exponential-factor extrapolation.
    Ridders,
    /// Inverse-quadratic/secant hybrid with a bisection safeguard.
    Brent,
}

impl Method {
    /// Finds a root of `f` between `a` and `b`.
    ///
    /// The endpoints are evaluated once here; if either residual is already
    /// within tolerance that endpoint is returned without iterating.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid, the endpoints do not
    /// bracket a root, the iteration budget is exhausted, or a residual
    /// evaluation fails.
    pub fn find_root<F, E>(self, f: &F, a: f64, b: f64, config: &Config) -> Result<Solution, Error>
    where
        F: Fn(f64) -> Result<f64, E>,
        E: StdError + Send + Sync + 'static,
    {
        let bracket = Bracket::evaluate(f, a, b)?;
        self.find_root_in(f, bracket, config)
    }

    /// Finds a root of `f` inside an already-evaluated bracket.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid, the iteration budget is
    /// exhausted, or a residual evaluation fails.
    pub fn find_root_in<F, E>(
        self,
        f: &F,
        bracket: Bracket,
        config: &Config,
    ) -> Result<Solution, Error>
    where
        F: Fn(f64) -> Result<f64, E>,
        E: StdError + Send + Sync + 'static,
    {
        config
            .validate()
            .map_err(|reason| Error::InvalidConfig { reason })?;

        let [a, b] = bracket.as_array();
        let [f_a, f_b] = bracket.residuals();
        if f_a.abs() <= config.residual_tol {
            return Ok(Solution {
                x: a,
                residual: f_a,
                iters: 0,
            });
        }
        if f_b.abs() <= config.residual_tol {
            return Ok(Solution {
                x: b,
                residual: f_b,
                iters: 0,
            });
        }

        match self {
            Method::Bisection => bisection::solve(f, bracket, config),
            Method::Secant => secant::solve(f, bracket, config),
            Method::FalsePosition => false_position::solve(f, bracket, config),
            Method::Ridders => ridders::solve(f, bracket, config),
            Method::Brent => brent::solve(f, bracket, config),
        }
    }
}
