use std::error::Error as StdError;

use crate::{
    Bracket, Config, Error, Solution,
    bracket::Sign,
    error::eval,
};

/// Ridders' method: a midpoint evaluation combined with an exponential
/// correction factor that places the next guess inside the bracket.
///
/// After each corrected guess the bracket is narrowed by three-way sign
/// comparison: against the midpoint, against the low end, and against the
/// high end. For a continuous residual one of the three must produce a
/// valid sub-bracket; anything else means the bracket was lost and is
/// reported as a typed error rather than guessed around.
pub(super) fn solve<F, E>(f: &F, bracket: Bracket, config: &Config) -> Result<Solution, Error>
where
    F: Fn(f64) -> Result<f64, E>,
    E: StdError + Send + Sync + 'static,
{
    let (mut low, mut high, mut f_low, mut f_high) = bracket.ordered_by_x();
    let mut previous = f64::NAN;

    for iter in 1..=config.max_iters {
        let mid = 0.5 * (low + high);
        let f_mid = eval(f, mid)?;
        if f_mid.abs() <= config.residual_tol {
            return Ok(Solution {
                x: mid,
                residual: f_mid,
                iters: iter,
            });
        }

        // With opposite-signed ends the discriminant exceeds |f_mid|, so a
        // zero here means the bracket invariant no longer holds.
        let discriminant = (f_mid * f_mid - f_low * f_high).sqrt();
        if discriminant == 0.0 || !discriminant.is_finite() {
            return Err(Error::LostBracket { x: mid });
        }

        let direction = if f_low >= f_high { 1.0 } else { -1.0 };
        let guess = mid + (mid - low) * direction * f_mid / discriminant;
        let f_guess = eval(f, guess)?;

        let delta_converged = !previous.is_nan() && (guess - previous).abs() <= config.x_tol;
        if f_guess.abs() <= config.residual_tol || delta_converged {
            return Ok(Solution {
                x: guess,
                residual: f_guess,
                iters: iter,
            });
        }
        previous = guess;

        if Sign::of(f_mid) != Sign::of(f_guess) {
            if mid < guess {
                low = mid;
                f_low = f_mid;
                high = guess;
                f_high = f_guess;
            } else {
                low = guess;
                f_low = f_guess;
                high = mid;
                f_high = f_mid;
            }
        } else if Sign::of(f_low) != Sign::of(f_guess) {
            high = guess;
            f_high = f_guess;
        } else if Sign::of(f_high) != Sign::of(f_guess) {
            low = guess;
            f_low = f_guess;
        } else {
            return Err(Error::LostBracket { x: guess });
        }

        if (high - low).abs() <= config.x_tol {
            return Ok(Solution {
                x: guess,
                residual: f_guess,
                iters: iter,
            });
        }
    }

    Err(Error::IterationBudget {
        iters: config.max_iters,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::convert::Infallible;

    use approx::assert_relative_eq;

    #[test]
    fn converges_on_transcendental_root() {
        let f = |x: f64| Ok::<_, Infallible>(x.cos() - x);
        let bracket = Bracket::evaluate(&f, 0.1, 2.0).expect("bracket");
        let solution = solve(&f, bracket, &Config::default()).expect("root");
        assert_relative_eq!(solution.x, 0.739_085_133_215_160_6, epsilon = 1e-8);
    }

    #[test]
    fn converges_faster_than_the_bisection_bound() {
        let f = |x: f64| Ok::<_, Infallible>(x * x - 612.0);
        let bracket = Bracket::evaluate(&f, 1.0, 100.0).expect("bracket");
        let solution = solve(&f, bracket, &Config::default()).expect("root");
        assert_relative_eq!(solution.x, 612.0_f64.sqrt(), epsilon = 1e-8);
        assert!(solution.iters < 15);
    }
}
