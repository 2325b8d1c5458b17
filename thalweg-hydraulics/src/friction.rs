//! Friction laws: the velocity a channel sustains at a given depth and
//! energy slope.
//!
//! The set is closed and selected by a serde tag, so an external
//! configuration description picks the law per simulation. A negative
//! energy slope is a domain error at this level — callers that want a
//! fallback for non-positive slopes must branch before evaluating the law.

use serde::{Deserialize, Serialize};

use thalweg_core::ChannelGeometry;

use crate::Error;

/// An interchangeable flow-resistance relationship.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "law", rename_all = "snake_case")]
pub enum FrictionLaw {
    /// `v = √(8 g R S / f)` with a constant friction factor `f`.
    DarcyWeisbach { friction_factor: f64 },
    /// `v = k·R^(2/3)·√S` with the Strickler coefficient `k`.
    ManningStrickler { strickler_coefficient: f64 },
}

impl FrictionLaw {
    /// Validates the law's parameter.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a non-positive or non-finite
    /// coefficient.
    pub fn validate(&self) -> Result<(), Error> {
        match *self {
            FrictionLaw::DarcyWeisbach { friction_factor } => {
                if !friction_factor.is_finite() || friction_factor <= 0.0 {
                    return Err(Error::invalid("friction factor", friction_factor));
                }
            }
            FrictionLaw::ManningStrickler {
                strickler_coefficient,
            } => {
                if !strickler_coefficient.is_finite() || strickler_coefficient <= 0.0 {
                    return Err(Error::invalid(
                        "Strickler coefficient",
                        strickler_coefficient,
                    ));
                }
            }
        }
        Ok(())
    }

    /// Mean flow velocity at the given depth and energy slope, in m/s.
    ///
    /// Uses the geometry's hydraulic-radius power law when one is
    /// advertised, avoiding the wetted-perimeter computation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a negative energy slope.
    pub fn velocity<G>(
        &self,
        geometry: &G,
        depth: f64,
        energy_slope: f64,
        gravity: f64,
    ) -> Result<f64, Error>
    where
        G: ChannelGeometry + ?Sized,
    {
        if !energy_slope.is_finite() || energy_slope < 0.0 {
            return Err(Error::invalid("water energy slope", energy_slope));
        }
        if depth <= 0.0 {
            return Ok(0.0);
        }

        let radius = match geometry.hydraulic_radius_power_law() {
            Some(law) => law.apply(depth),
            None => geometry.hydraulic_radius(depth),
        };

        let velocity = match *self {
            FrictionLaw::DarcyWeisbach { friction_factor } => {
                (8.0 * gravity * radius * energy_slope / friction_factor).sqrt()
            }
            FrictionLaw::ManningStrickler {
                strickler_coefficient,
            } => strickler_coefficient * radius.powf(2.0 / 3.0) * energy_slope.sqrt(),
        };
        Ok(velocity)
    }

    /// Discharge implied by the given depth and energy slope, in m³/s.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a negative energy slope.
    pub fn discharge<G>(
        &self,
        geometry: &G,
        depth: f64,
        energy_slope: f64,
        gravity: f64,
    ) -> Result<f64, Error>
    where
        G: ChannelGeometry + ?Sized,
    {
        let velocity = self.velocity(geometry, depth, energy_slope, gravity)?;
        Ok(velocity * geometry.area(depth))
    }
}
