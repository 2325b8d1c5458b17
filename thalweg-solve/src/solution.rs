/// The result of a successful root-finding run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Solution {
    /// The root estimate.
    pub x: f64,
    /// Residual at the root estimate.
    pub residual: f64,
    /// Iteration count when the solver finished.
    pub iters: usize,
}
