use std::error::Error as StdError;

use crate::{
    Bracket, Config, Error, Solution,
    error::eval,
};

/// Regula falsi: the bracket shrinks toward the root by replacing the end
/// that shares the sign of the interpolated point's residual.
pub(super) fn solve<F, E>(f: &F, bracket: Bracket, config: &Config) -> Result<Solution, Error>
where
    F: Fn(f64) -> Result<f64, E>,
    E: StdError + Send + Sync + 'static,
{
    let (mut low, mut high, mut f_low, mut f_high) = bracket.ordered_by_x();
    let mut previous = f64::NAN;

    for iter in 1..=config.max_iters {
        let x = (low * f_high - high * f_low) / (f_high - f_low);
        let f_x = eval(f, x)?;

        let delta_converged = !previous.is_nan() && (x - previous).abs() <= config.x_tol;
        if f_x.abs() <= config.residual_tol || delta_converged {
            return Ok(Solution {
                x,
                residual: f_x,
                iters: iter,
            });
        }
        previous = x;

        if (f_x > 0.0) == (f_low > 0.0) {
            low = x;
            f_low = f_x;
        } else {
            high = x;
            f_high = f_x;
        }
    }

    Err(Error::IterationBudget {
        iters: config.max_iters,
    })
}
