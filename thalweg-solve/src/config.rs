use serde::{Deserialize, Serialize};

/// Convergence settings shared by all root-finding methods.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Iteration budget; exhausting it is a fatal error.
    pub max_iters: usize,
    /// Tolerance on the bracket width or iterate delta.
    pub x_tol: f64,
    /// Tolerance on the residual magnitude.
    pub residual_tol: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_iters: 100,
            x_tol: 1e-9,
            residual_tol: 1e-9,
        }
    }
}

impl Config {
    /// Validates that the tolerances are finite and non-negative.
    ///
    /// # Errors
    ///
    /// Returns the failing requirement as a static string.
    pub fn validate(&self) -> Result<(), &'static str> {
        if !self.x_tol.is_finite() || self.x_tol < 0.0 {
            return Err("x_tol must be finite and non-negative");
        }
        if !self.residual_tol.is_finite() || self.residual_tol < 0.0 {
            return Err("residual_tol must be finite and non-negative");
        }
        Ok(())
    }
}
