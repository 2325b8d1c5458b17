use std::error::Error as StdError;

use crate::{
    Bracket, Config, Error, Solution,
    error::eval,
};

/// Brent's method: inverse quadratic interpolation with a secant fallback
/// and a bisection safeguard.
///
/// `b` is always the best current estimate and `[b, c]` always brackets the
/// root. An interpolated step is accepted only when it stays inside the
/// bracket and shrinks faster than the step before last; otherwise the
/// iteration bisects.
pub(super) fn solve<F, E>(f: &F, bracket: Bracket, config: &Config) -> Result<Solution, Error>
where
    F: Fn(f64) -> Result<f64, E>,
    E: StdError + Send + Sync + 'static,
{
    let (mut a, mut b, mut f_a, mut f_b) = bracket.ordered_by_x();
    let mut c = a;
    let mut f_c = f_a;
    let mut d = b - a;
    let mut e = d;

    for iter in 1..=config.max_iters {
        if (f_b > 0.0) == (f_c > 0.0) {
            c = a;
            f_c = f_a;
            d = b - a;
            e = d;
        }
        if f_c.abs() < f_b.abs() {
            a = b;
            b = c;
            c = a;
            f_a = f_b;
            f_b = f_c;
            f_c = f_a;
        }

        let tol1 = 2.0 * f64::EPSILON * b.abs() + 0.5 * config.x_tol;
        let m = 0.5 * (c - b);

        if m.abs() <= tol1 || f_b.abs() <= config.residual_tol {
            return Ok(Solution {
                x: b,
                residual: f_b,
                iters: iter,
            });
        }

        if e.abs() >= tol1 && f_a.abs() > f_b.abs() {
            #[allow(clippy::float_cmp)]
            let (mut p, mut q) = if a == c {
                // Only two distinct points: secant step.
                let s = f_b / f_a;
                (2.0 * m * s, 1.0 - s)
            } else {
                // Three distinct points: inverse quadratic interpolation.
                let q = f_a / f_c;
                let r = f_b / f_c;
                let s = f_b / f_a;
                (
                    s * (2.0 * m * q * (q - r) - (b - a) * (r - 1.0)),
                    (q - 1.0) * (r - 1.0) * (s - 1.0),
                )
            };

            if q > 0.0 {
                p = -p;
            } else {
                q = -q;
            }

            let within_bracket = 3.0 * m * q - (tol1 * q).abs();
            let shrinking = (e * q).abs();
            if 2.0 * p.abs() < within_bracket.min(shrinking) {
                e = d;
                d = p / q;
            } else {
                d = m;
                e = m;
            }
        } else {
            d = m;
            e = m;
        }

        a = b;
        f_a = f_b;
        if d.abs() > tol1 {
            b += d;
        } else {
            b += if m > 0.0 { tol1 } else { -tol1 };
        }
        f_b = eval(f, b)?;
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
    fn converges_on_classic_cubic() {
        let f = |x: f64| Ok::<_, Infallible>(x.powi(3) - 2.0 * x - 5.0);
        let bracket = Bracket::evaluate(&f, 2.0, 3.0).expect("bracket");
        let solution = solve(&f, bracket, &Config::default()).expect("root");
        assert_relative_eq!(solution.x, 2.094_551_481_542_326_5, epsilon = 1e-9);
        assert!(solution.iters < 20);
    }

    #[test]
    fn handles_root_near_endpoint() {
        let f = |x: f64| Ok::<_, Infallible>(x - 0.001);
        let bracket = Bracket::evaluate(&f, 0.0, 1.0).expect("bracket");
        let solution = solve(&f, bracket, &Config::default()).expect("root");
        assert_relative_eq!(solution.x, 0.001, epsilon = 1e-9);
    }

    #[test]
    fn survives_flat_high_order_root() {
        let f = |x: f64| Ok::<_, Infallible>((x - 3.0).powi(3));
        let bracket = Bracket::evaluate(&f, 0.0, 10.0).expect("bracket");
        let config = Config {
            max_iters: 200,
            x_tol: 1e-10,
            residual_tol: 1e-12,
        };
        let solution = solve(&f, bracket, &config).expect("root");
        assert_relative_eq!(solution.x, 3.0, epsilon = 1e-3);
    }
}
