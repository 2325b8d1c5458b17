use std::{fmt, ops::Deref};

use thiserror::Error;
use uom::si::{f64::Time, time::second};

/// A unit-safe, strictly positive duration used to advance simulation time.
///
/// The stepping engine recomputes one of these every step from the
/// network's stability limit; wrapping the value enforces that a step can
/// never be zero or negative once it passes the engine's guards.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct StepLength(Time);

/// Error type returned when constructing an invalid [`StepLength`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum StepLengthError {
    #[error("step length must be greater than zero, got {0} s")]
    NotPositive(f64),
}

impl StepLength {
    /// Constructs a step length from a value in seconds.
    ///
    /// # Errors
    ///
    /// Returns [`StepLengthError::NotPositive`] if the value is zero,
    /// negative, or NaN.
    pub fn from_seconds(seconds: f64) -> Result<Self, StepLengthError> {
        if seconds > 0.0 {
            Ok(Self(Time::new::<second>(seconds)))
        } else {
            Err(StepLengthError::NotPositive(seconds))
        }
    }

    /// Constructs a step length from an existing [`Time`] value.
    ///
    /// # Errors
    ///
    /// Returns [`StepLengthError::NotPositive`] if the time is zero or
    /// negative.
    pub fn from_time(time: Time) -> Result<Self, StepLengthError> {
        Self::from_seconds(time.get::<second>())
    }

    /// Returns the step length in seconds.
    #[must_use]
    pub fn seconds(&self) -> f64 {
        self.0.get::<second>()
    }

    /// Consumes the step length and returns the underlying [`Time`].
    #[must_use]
    pub fn into_inner(self) -> Time {
        self.0
    }
}

impl TryFrom<Time> for StepLength {
    type Error = StepLengthError;

    fn try_from(t: Time) -> Result<Self, Self::Error> {
        Self::from_time(t)
    }
}

impl Deref for StepLength {
    type Target = Time;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl std::ops::Add<StepLength> for Time {
    type Output = Time;

    fn add(self, rhs: StepLength) -> Self::Output {
        self + rhs.0
    }
}

impl fmt::Display for StepLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} s", self.seconds())
    }
}
