use std::error::Error as StdError;

use crate::{
    Bracket, Config, Error, Solution,
    error::eval,
};

/// Halves the bracket each iteration, tracking which side holds the sign
/// change, and returns the midpoint once the half-width or residual is
/// within tolerance.
pub(super) fn solve<F, E>(f: &F, bracket: Bracket, config: &Config) -> Result<Solution, Error>
where
    F: Fn(f64) -> Result<f64, E>,
    E: StdError + Send + Sync + 'static,
{
    let (mut low, mut high, mut f_low, _) = bracket.ordered_by_x();

    for iter in 1..=config.max_iters {
        let mid = 0.5 * (low + high);
        let f_mid = eval(f, mid)?;

        if f_mid.abs() <= config.residual_tol || 0.5 * (high - low) <= config.x_tol {
            return Ok(Solution {
                x: mid,
                residual: f_mid,
                iters: iter,
            });
        }

        if (f_mid > 0.0) == (f_low > 0.0) {
            low = mid;
            f_low = f_mid;
        } else {
            high = mid;
        }
    }

    Err(Error::IterationBudget {
        iters: config.max_iters,
    })
}
