//! Scalar root finding for implicit hydraulic equations.
//!
//! The flow-resistance relationships in a river model rarely have closed
//! forms, so depths and velocities come out of root finds on residual
//! functions ("predicted minus required"). This crate provides:
//!
//! - [`Method`] — five interchangeable bracketing algorithms behind one
//!   contract (bisection, secant, false position, Ridders, Brent),
//! - [`search`] — procedures that locate a sign-changing [`Bracket`] by
//!   geometric expansion from a guess or a one-sided boundary,
//! - [`RootSolver`] — a method plus its settings, ready to be owned by one
//!   equilibrium problem and built from external configuration.
//!
//! Residual functions are plain closures `Fn(f64) -> Result<f64, E>` that
//! capture their boundary conditions and may be called any number of times
//! without side effects. Every failure mode is a typed [`Error`]: a bracket
//! that does not bound a sign change, an ambiguous expansion, an exhausted
//! iteration budget, or a non-finite value. None of them are recoverable at
//! this level.

mod bracket;
mod config;
mod error;
mod method;
mod solution;
mod solver;

pub mod search;

pub use bracket::{Bracket, Sign};
pub use config::Config;
pub use error::Error;
pub use method::Method;
pub use solution::Solution;
pub use solver::RootSolver;
