use std::error::Error as StdError;

use crate::{
    Bracket, Config, Error, Solution,
    error::eval,
};

/// Linear-interpolation updates between the two most recent points.
///
/// The point with the smaller residual magnitude is always kept as the
/// leading point, so the interpolation extrapolates from the better
/// estimate. A zero residual difference between the two points means the
/// update cannot proceed and is a typed failure.
pub(super) fn solve<F, E>(f: &F, bracket: Bracket, config: &Config) -> Result<Solution, Error>
where
    F: Fn(f64) -> Result<f64, E>,
    E: StdError + Send + Sync + 'static,
{
    let [a, b] = bracket.as_array();
    let [f_a, f_b] = bracket.residuals();

    let (mut lead, mut f_lead, mut trail, mut f_trail) = if f_a.abs() <= f_b.abs() {
        (a, f_a, b, f_b)
    } else {
        (b, f_b, a, f_a)
    };

    for iter in 1..=config.max_iters {
        let denom = f_lead - f_trail;
        if denom == 0.0 {
            return Err(Error::StalledSecant { x: lead });
        }

        let step = f_lead * (lead - trail) / denom;
        let next = lead - step;
        let f_next = eval(f, next)?;

        if f_next.abs() <= config.residual_tol || step.abs() <= config.x_tol {
            return Ok(Solution {
                x: next,
                residual: f_next,
                iters: iter,
            });
        }

        if f_next.abs() <= f_lead.abs() {
            trail = lead;
            f_trail = f_lead;
            lead = next;
            f_lead = f_next;
        } else {
            trail = next;
            f_trail = f_next;
        }
    }

    Err(Error::IterationBudget {
        iters: config.max_iters,
    })
}
