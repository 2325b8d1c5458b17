use std::error::Error as StdError;

use serde::{Deserialize, Serialize};

use crate::{
    Bracket, Config, Error, Method, Solution,
    search::{self, BoundarySide, SearchConfig},
};

/// A method paired with its convergence and bracket-search settings.
///
/// Each equilibrium problem owns one of these, so different problems can
/// run different methods and tolerances. The whole struct deserializes from
/// an external configuration description.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RootSolver {
    pub method: Method,
    pub config: Config,
    pub search: SearchConfig,
}

impl RootSolver {
    /// Finds a root inside an already-evaluated bracket.
    ///
    /// # Errors
    ///
    /// Returns an error on invalid config, exhausted iteration budget, or
    /// failed residual evaluation.
    pub fn solve_in<F, E>(&self, f: &F, bracket: Bracket) -> Result<Solution, Error>
    where
        F: Fn(f64) -> Result<f64, E>,
        E: StdError + Send + Sync + 'static,
    {
        self.method.find_root_in(f, bracket, &self.config)
    }

    /// Expands a bracket around `guess` and finds the root inside it.
    ///
    /// # Errors
    ///
    /// Returns an error if the expansion fails (ambiguity, budget) or the
    /// subsequent root-find fails.
    pub fn solve_from_guess<F, E>(&self, f: &F, guess: f64) -> Result<Solution, Error>
    where
        F: Fn(f64) -> Result<f64, E>,
        E: StdError + Send + Sync + 'static,
    {
        let bracket = search::from_expected(f, guess, &self.search)?;
        self.solve_in(f, bracket)
    }

    /// Expands a bracket away from a one-sided boundary and finds the root.
    ///
    /// # Errors
    ///
    /// Returns an error if the expansion or the root-find fails.
    pub fn solve_from_boundary<F, E>(
        &self,
        f: &F,
        boundary: f64,
        side: BoundarySide,
    ) -> Result<Solution, Error>
    where
        F: Fn(f64) -> Result<f64, E>,
        E: StdError + Send + Sync + 'static,
    {
        let bracket = search::from_boundary(f, boundary, side, self.search.max_iters)?;
        self.solve_in(f, bracket)
    }
}
