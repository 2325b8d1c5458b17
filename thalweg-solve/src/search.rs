//! Bracket-search procedures.
//!
//! Root finding needs an interval that is guaranteed to contain a sign
//! change. These searches build one by geometric expansion: either outward
//! in both directions from a best-guess value, or away from a known
//! one-sided boundary. Both work on a signum-of-residual probe and fail
//! fatally when the iteration budget runs out.

use std::error::Error as StdError;

use serde::{Deserialize, Serialize};

use crate::{
    bracket::{Bracket, Sign},
    error::{Error, eval},
};

/// What to do when expansion finds a sign change on both sides at once.
///
/// Both candidate brackets are plausible but different; the caller must
/// choose one explicitly or treat the situation as a root-isolation
/// failure. There is no silent default guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguityPolicy {
    /// Fail with [`Error::AmbiguousBracket`].
    #[default]
    Fail,
    /// Return the bracket on the lower side of the expected value.
    PreferLower,
    /// Return the bracket on the upper side of the expected value.
    PreferUpper,
}

/// Settings for expansion from an expected value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Iteration budget for the expansion; exhausting it is a fatal error.
    pub max_iters: usize,
    /// Tie-break when both probes cross the root simultaneously.
    pub ambiguity: AmbiguityPolicy,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_iters: 50,
            ambiguity: AmbiguityPolicy::Fail,
        }
    }
}

/// Which side of the domain a known boundary sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundarySide {
    /// The boundary is below the root; expand away from it by doubling.
    Lower,
    /// The boundary is above the root; contract toward zero by halving.
    Upper,
}

/// Expands a bracket outward from a best-guess value.
///
/// Starting from `expected`, a lower candidate is halved and an upper
/// candidate is doubled each iteration. The search stops as soon as any two
/// of {previous lower, previous upper, new lower, new upper} disagree in
/// sign:
///
/// 1. If both new probes land on the same sign as each other while each
///    differs from its previous sign, the root was crossed on both sides at
///    once; the outcome is governed by [`AmbiguityPolicy`].
/// 2. Otherwise the pair that actually disagrees is returned (new lower vs
///    previous lower, or previous upper vs new upper).
/// 3. Otherwise the full outer pair is returned when the two new probes
///    disagree with each other.
///
/// # Errors
///
/// Returns an error if `expected` is not a positive finite number, if the
/// expansion is ambiguous under [`AmbiguityPolicy::Fail`], if the iteration
/// budget is exhausted, or if a residual evaluation fails.
pub fn from_expected<F, E>(f: &F, expected: f64, config: &SearchConfig) -> Result<Bracket, Error>
where
    F: Fn(f64) -> Result<f64, E>,
    E: StdError + Send + Sync + 'static,
{
    if !expected.is_finite() || expected <= 0.0 {
        return Err(Error::InvalidConfig {
            reason: "bracket expansion requires a positive finite expected value",
        });
    }

    let f_start = eval(f, expected)?;
    let (mut lower, mut upper) = (expected, expected);
    let (mut f_lower, mut f_upper) = (f_start, f_start);
    let (mut sign_lower, mut sign_upper) = (Sign::of(f_start), Sign::of(f_start));

    for _ in 0..config.max_iters {
        let next_lower = 0.5 * lower;
        let next_upper = 2.0 * upper;
        let f_next_lower = eval(f, next_lower)?;
        let f_next_upper = eval(f, next_upper)?;
        let sign_next_lower = Sign::of(f_next_lower);
        let sign_next_upper = Sign::of(f_next_upper);

        let lower_flipped = sign_next_lower != sign_lower;
        let upper_flipped = sign_next_upper != sign_upper;

        if lower_flipped && upper_flipped && sign_next_lower == sign_next_upper {
            return match config.ambiguity {
                AmbiguityPolicy::Fail => Err(Error::AmbiguousBracket {
                    expected,
                    lower: [next_lower, lower],
                    upper: [upper, next_upper],
                }),
                AmbiguityPolicy::PreferLower => {
                    Bracket::new(next_lower, lower, f_next_lower, f_lower)
                }
                AmbiguityPolicy::PreferUpper => {
                    Bracket::new(upper, next_upper, f_upper, f_next_upper)
                }
            };
        }
        if lower_flipped {
            return Bracket::new(next_lower, lower, f_next_lower, f_lower);
        }
        if upper_flipped {
            return Bracket::new(upper, next_upper, f_upper, f_next_upper);
        }
        if sign_next_lower != sign_next_upper {
            return Bracket::new(next_lower, next_upper, f_next_lower, f_next_upper);
        }

        lower = next_lower;
        upper = next_upper;
        f_lower = f_next_lower;
        f_upper = f_next_upper;
        sign_lower = sign_next_lower;
        sign_upper = sign_next_upper;
    }

    Err(Error::IterationBudget {
        iters: config.max_iters,
    })
}

/// Expands a bracket away from a known one-sided boundary.
///
/// From a lower boundary the probe doubles away from it; from an upper
/// boundary it halves toward zero. The search stops at the first sign flip
/// and returns the bracket with the lower-residual end first.
///
/// # Errors
///
/// Returns an error if `boundary` is not a positive finite number, if the
/// iteration budget is exhausted before the sign flips, or if a residual
/// evaluation fails.
pub fn from_boundary<F, E>(
    f: &F,
    boundary: f64,
    side: BoundarySide,
    max_iters: usize,
) -> Result<Bracket, Error>
where
    F: Fn(f64) -> Result<f64, E>,
    E: StdError + Send + Sync + 'static,
{
    if !boundary.is_finite() || boundary <= 0.0 {
        return Err(Error::InvalidConfig {
            reason: "boundary bracket expansion requires a positive finite boundary",
        });
    }

    let factor = match side {
        BoundarySide::Lower => 2.0,
        BoundarySide::Upper => 0.5,
    };

    let f_boundary = eval(f, boundary)?;
    let start_sign = Sign::of(f_boundary);
    let (mut x, mut f_x) = (boundary, f_boundary);

    for _ in 0..max_iters {
        let next = factor * x;
        let f_next = eval(f, next)?;
        if Sign::of(f_next) != start_sign {
            return if f_next <= f_x {
                Bracket::new(next, x, f_next, f_x)
            } else {
                Bracket::new(x, next, f_x, f_next)
            };
        }
        x = next;
        f_x = f_next;
    }

    Err(Error::IterationBudget { iters: max_iters })
}
