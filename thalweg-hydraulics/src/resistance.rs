//! The flow-resistance equilibrium solver.
//!
//! Converts a discharge into the flow depth and velocity that satisfy the
//! configured friction law, subject to two physical constraints: the depth
//! may not fall below the one producing the maximum allowed Froude number,
//! and the hydraulic slope toward the downstream reach may not fall below
//! the configured minimum. The inverse conversions (depth → discharge,
//! velocity → depth) share the same law.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use thalweg_core::{ChannelGeometry, Reach, ReachId};
use thalweg_solve::{RootSolver, search::BoundarySide};

use crate::{Error, FrictionLaw};

/// Standard gravitational acceleration, in m/s².
pub const STANDARD_GRAVITY: f64 = 9.81;

/// Configuration for a [`FlowResistance`] solver.
///
/// Each of the three equilibrium problems the solver owns — equilibrium
/// depth for a discharge, Froude-ceiling depth, minimum-slope depth — has
/// its own root solver, so methods and tolerances can differ per problem.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResistanceConfig {
    pub friction: FrictionLaw,
    /// Ceiling on the Froude number; bounds the depth from below.
    #[serde(default = "default_maximum_froude_number")]
    pub maximum_froude_number: f64,
    /// Smallest hydraulic slope tolerated toward the downstream reach.
    #[serde(default = "default_minimum_hydraulic_slope")]
    pub minimum_hydraulic_slope: f64,
    /// Seed depth when no previous or downstream depth is available.
    #[serde(default = "default_fallback_start_depth")]
    pub fallback_start_depth: f64,
    #[serde(default = "default_gravity")]
    pub gravity: f64,
    #[serde(default)]
    pub depth_solver: RootSolver,
    #[serde(default)]
    pub froude_solver: RootSolver,
    #[serde(default)]
    pub min_slope_solver: RootSolver,
}

fn default_maximum_froude_number() -> f64 {
    1.0
}

fn default_minimum_hydraulic_slope() -> f64 {
    0.0004
}

fn default_fallback_start_depth() -> f64 {
    0.1
}

fn default_gravity() -> f64 {
    STANDARD_GRAVITY
}

impl ResistanceConfig {
    /// A config with default constraints around the given friction law.
    pub fn with_friction(friction: FrictionLaw) -> Self {
        Self {
            friction,
            maximum_froude_number: default_maximum_froude_number(),
            minimum_hydraulic_slope: default_minimum_hydraulic_slope(),
            fallback_start_depth: default_fallback_start_depth(),
            gravity: default_gravity(),
            depth_solver: RootSolver::default(),
            froude_solver: RootSolver::default(),
            min_slope_solver: RootSolver::default(),
        }
    }

    fn validate(&self) -> Result<(), Error> {
        self.friction.validate()?;
        if !self.maximum_froude_number.is_finite() || self.maximum_froude_number <= 0.0 {
            return Err(Error::invalid(
                "maximum Froude number",
                self.maximum_froude_number,
            ));
        }
        if !self.minimum_hydraulic_slope.is_finite() || self.minimum_hydraulic_slope < 0.0 {
            return Err(Error::invalid(
                "minimum hydraulic slope",
                self.minimum_hydraulic_slope,
            ));
        }
        if !self.fallback_start_depth.is_finite() || self.fallback_start_depth <= 0.0 {
            return Err(Error::invalid(
                "fallback start depth",
                self.fallback_start_depth,
            ));
        }
        if !self.gravity.is_finite() || self.gravity <= 0.0 {
            return Err(Error::invalid("gravity", self.gravity));
        }
        Ok(())
    }
}

/// Solves per-reach hydraulic equilibria for a configured friction law.
///
/// The solver owns one piece of mutable state: the set of reaches it has
/// ever solved. A reach it has never treated seeds its bracket search from
/// the downstream reach's depth (or the configured fallback at the
/// outlet); afterwards it seeds from the reach's own last solved depth.
/// The set only grows, is never reset between steps, and is copied — not
/// aliased — when the solver is cloned.
#[derive(Debug, Clone)]
pub struct FlowResistance {
    config: ResistanceConfig,
    ever_treated: HashSet<ReachId>,
}

impl FlowResistance {
    /// Creates a solver, validating the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a domain-invalid parameter.
    pub fn new(config: ResistanceConfig) -> Result<Self, Error> {
        config.validate()?;
        Ok(Self {
            config,
            ever_treated: HashSet::new(),
        })
    }

    /// The solver's configuration.
    pub fn config(&self) -> &ResistanceConfig {
        &self.config
    }

    /// Whether this solver has ever solved the given reach.
    pub fn has_treated(&self, id: ReachId) -> bool {
        self.ever_treated.contains(&id)
    }

    /// Converts a discharge into the equilibrium (depth, velocity) pair.
    ///
    /// Zero discharge short-circuits to `(0, 0)`. With a positive energy
    /// slope the friction-law residual is solved from a seeded bracket
    /// expansion; otherwise the Froude-ceiling depth stands in as the
    /// physically bounded fallback. The minimum-slope condition toward the
    /// downstream reach is then enforced unless the downstream reach has a
    /// free overfall.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a negative or non-finite
    /// discharge; bracket-search and root-finder failures propagate
    /// unchanged.
    pub fn depth_and_velocity_from_discharge<G>(
        &mut self,
        discharge: f64,
        reach: &Reach<G>,
        downstream: Option<&Reach<G>>,
    ) -> Result<(f64, f64), Error>
    where
        G: ChannelGeometry,
    {
        if !discharge.is_finite() || discharge < 0.0 {
            return Err(Error::invalid("discharge", discharge));
        }
        if discharge == 0.0 {
            return Ok((0.0, 0.0));
        }

        let froude_depth = self.froude_ceiling_depth(discharge, reach)?;

        let mut depth = if reach.hydraulics.energy_slope > 0.0 {
            let seed = self.start_depth(reach, downstream);
            let this = &*self;
            let f = |d: f64| -> Result<f64, Error> {
                let implied = this.config.friction.discharge(
                    &reach.geometry,
                    d,
                    reach.hydraulics.energy_slope,
                    this.config.gravity,
                )?;
                Ok(implied - discharge)
            };
            self.config.depth_solver.solve_from_guess(&f, seed)?.x
        } else {
            froude_depth
        };

        if depth < froude_depth {
            depth = froude_depth;
        }

        if let Some(ds) = downstream
            && !ds.has_free_overfall
        {
            depth = self.enforce_minimum_slope(discharge, depth, froude_depth, reach, ds)?;
        }

        let velocity = discharge / reach.geometry.area(depth);
        self.ever_treated.insert(reach.id);
        Ok((depth, velocity))
    }

    /// Converts a depth into the (discharge, velocity) pair implied by the
    /// friction law. No iteration is involved.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a negative depth or a negative
    /// energy slope.
    pub fn discharge_and_velocity_from_depth<G>(
        &self,
        depth: f64,
        reach: &Reach<G>,
    ) -> Result<(f64, f64), Error>
    where
        G: ChannelGeometry,
    {
        if !depth.is_finite() || depth < 0.0 {
            return Err(Error::invalid("flow depth", depth));
        }
        let velocity = self.config.friction.velocity(
            &reach.geometry,
            depth,
            reach.hydraulics.energy_slope,
            self.config.gravity,
        )?;
        Ok((velocity * reach.geometry.area(depth), velocity))
    }

    /// Converts a velocity into the (discharge, depth) pair implied by the
    /// friction law, via a root find on the velocity residual.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] for a negative or non-finite
    /// velocity; solver failures propagate unchanged.
    pub fn discharge_and_depth_from_velocity<G>(
        &mut self,
        velocity: f64,
        reach: &Reach<G>,
        downstream: Option<&Reach<G>>,
    ) -> Result<(f64, f64), Error>
    where
        G: ChannelGeometry,
    {
        if !velocity.is_finite() || velocity < 0.0 {
            return Err(Error::invalid("flow velocity", velocity));
        }
        if velocity == 0.0 {
            return Ok((0.0, 0.0));
        }

        let depth = {
            let seed = self.start_depth(reach, downstream);
            let this = &*self;
            let f = |d: f64| -> Result<f64, Error> {
                let implied = this.config.friction.velocity(
                    &reach.geometry,
                    d,
                    reach.hydraulics.energy_slope,
                    this.config.gravity,
                )?;
                Ok(implied - velocity)
            };
            self.config.depth_solver.solve_from_guess(&f, seed)?.x
        };

        self.ever_treated.insert(reach.id);
        Ok((velocity * reach.geometry.area(depth), depth))
    }

    /// The depth at which the reach flows at the maximum Froude number.
    ///
    /// Geometries advertising a depth→area power law are inverted in
    /// closed form; anything else goes through the Froude-residual root
    /// find.
    ///
    /// # Errors
    ///
    /// Returns solver failures from the root-find path unchanged.
    pub fn froude_ceiling_depth<G>(&self, discharge: f64, reach: &Reach<G>) -> Result<f64, Error>
    where
        G: ChannelGeometry,
    {
        let target = self.config.maximum_froude_number;
        let gravity = self.config.gravity;

        if let Some(law) = reach.geometry.area_power_law() {
            // With area = c·d^m the surface width is c·m·d^(m-1), giving
            // Fr(d) = Q·√(m/g) / (c·d^(m+1/2)).
            let depth = (discharge * (law.exponent / gravity).sqrt() / (law.factor * target))
                .powf((law.exponent + 0.5).recip());
            return Ok(depth);
        }

        let f = |d: f64| -> Result<f64, Error> {
            Ok(self.froude_number(discharge, d, &reach.geometry) - target)
        };
        // Rectangular-equivalent critical depth as the expansion seed.
        let width = reach.geometry.top_width(1.0);
        let guess = (discharge * discharge / (gravity * width * width)).cbrt();
        Ok(self.config.froude_solver.solve_from_guess(&f, guess)?.x)
    }

    /// The Froude number of the reach at the given discharge and depth.
    pub fn froude_number<G>(&self, discharge: f64, depth: f64, geometry: &G) -> f64
    where
        G: ChannelGeometry + ?Sized,
    {
        let area = geometry.area(depth);
        if area <= 0.0 {
            return f64::INFINITY;
        }
        let mean_depth = area / geometry.top_width(depth);
        discharge / (area * (self.config.gravity * mean_depth).sqrt())
    }

    /// Seeds the bracket search for a reach.
    fn start_depth<G>(&self, reach: &Reach<G>, downstream: Option<&Reach<G>>) -> f64
    where
        G: ChannelGeometry,
    {
        let seed = if self.ever_treated.contains(&reach.id) {
            reach.hydraulics.max_water_depth
        } else if let Some(ds) = downstream {
            ds.hydraulics.max_water_depth
        } else {
            self.config.fallback_start_depth
        };
        if seed.is_finite() && seed > 0.0 {
            seed
        } else {
            self.config.fallback_start_depth
        }
    }

    /// Enforces the minimum hydraulic slope toward the downstream reach.
    ///
    /// The residual is the hydraulic head at the candidate depth minus the
    /// smallest head the minimum slope allows. When violated, the depth
    /// satisfying the condition exactly is found by expanding a bracket
    /// upward from the Froude-ceiling depth.
    fn enforce_minimum_slope<G>(
        &self,
        discharge: f64,
        candidate_depth: f64,
        froude_depth: f64,
        reach: &Reach<G>,
        downstream: &Reach<G>,
    ) -> Result<f64, Error>
    where
        G: ChannelGeometry,
    {
        let ds = &downstream.hydraulics;
        let kinetic = ds.flow_velocity * ds.flow_velocity / (2.0 * self.config.gravity);
        if !kinetic.is_finite() || kinetic < 0.0 {
            return Err(Error::invalid("downstream kinetic head", kinetic));
        }
        let downstream_head = ds.bed_elevation + ds.max_water_depth + kinetic;
        let minimum_head =
            downstream_head + self.config.minimum_hydraulic_slope * reach.length;

        let gravity = self.config.gravity;
        let f = |d: f64| -> Result<f64, Error> {
            let area = reach.geometry.area(d);
            if area <= 0.0 {
                return Err(Error::invalid("flow depth", d));
            }
            let velocity = discharge / area;
            let head =
                reach.hydraulics.bed_elevation + d + velocity * velocity / (2.0 * gravity);
            Ok(head - minimum_head)
        };

        if f(candidate_depth)? >= 0.0 {
            return Ok(candidate_depth);
        }

        let solution =
            self.config
                .min_slope_solver
                .solve_from_boundary(&f, froude_depth, BoundarySide::Lower)?;
        Ok(solution.x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use thalweg_core::{RectangularProfile, TrapezoidalProfile};

    fn manning() -> FrictionLaw {
        FrictionLaw::ManningStrickler {
            strickler_coefficient: 30.0,
        }
    }

    fn solver() -> FlowResistance {
        FlowResistance::new(ResistanceConfig::with_friction(manning())).expect("valid config")
    }

    fn rect_reach(id: u32, energy_slope: f64) -> Reach<RectangularProfile> {
        let mut reach = Reach::new(ReachId(id), 100.0, RectangularProfile { width: 10.0 });
        reach.hydraulics.energy_slope = energy_slope;
        reach
    }

    #[test]
    fn zero_discharge_is_dry() {
        let mut solver = solver();
        let reach = rect_reach(0, 0.001);
        let (depth, velocity) = solver
            .depth_and_velocity_from_discharge(0.0, &reach, None)
            .expect("zero discharge");
        assert_relative_eq!(depth, 0.0);
        assert_relative_eq!(velocity, 0.0);
        assert!(!solver.has_treated(reach.id));
    }

    #[test]
    fn discharge_round_trips_through_the_law() {
        let mut solver = solver();
        let reach = rect_reach(0, 0.001);
        let discharge = 5.0;

        let (depth, velocity) = solver
            .depth_and_velocity_from_discharge(discharge, &reach, None)
            .expect("solve");
        assert!(depth > 0.0 && velocity > 0.0);

        let (implied, _) = solver
            .discharge_and_velocity_from_depth(depth, &reach)
            .expect("inverse");
        assert_relative_eq!(implied, discharge, epsilon = 1e-6);
        assert_relative_eq!(velocity, discharge / reach.geometry.area(depth), epsilon = 1e-12);
    }

    #[test]
    fn negative_discharge_is_a_domain_error() {
        let mut solver = solver();
        let reach = rect_reach(0, 0.001);
        let result = solver.depth_and_velocity_from_discharge(-1.0, &reach, None);
        assert!(matches!(result, Err(Error::InvalidInput { .. })));
    }

    #[test]
    fn non_positive_slope_falls_back_to_froude_ceiling() {
        let mut solver = solver();
        let reach = rect_reach(0, 0.0);
        let discharge = 5.0;

        let (depth, _) = solver
            .depth_and_velocity_from_discharge(discharge, &reach, None)
            .expect("solve");
        let froude = solver.froude_number(discharge, depth, &reach.geometry);
        assert_relative_eq!(froude, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn froude_ceiling_closed_form_matches_root_find() {
        let solver = solver();
        let discharge = 5.0;

        // Rectangle advertises an area power law; the equivalent trapezoid
        // with vertical banks does not and takes the iterative path.
        let rect = rect_reach(0, 0.001);
        let mut trap = Reach::new(
            ReachId(1),
            100.0,
            TrapezoidalProfile {
                bottom_width: 10.0,
                side_slope: 0.0,
            },
        );
        trap.hydraulics.energy_slope = 0.001;

        let closed = solver
            .froude_ceiling_depth(discharge, &rect)
            .expect("closed form");
        let iterated = solver
            .froude_ceiling_depth(discharge, &trap)
            .expect("root find");
        assert_relative_eq!(closed, iterated, epsilon = 1e-6);
    }

    #[test]
    fn first_solve_marks_reach_as_treated() {
        let mut solver = solver();
        let reach = rect_reach(0, 0.001);
        assert!(!solver.has_treated(reach.id));

        solver
            .depth_and_velocity_from_discharge(5.0, &reach, None)
            .expect("solve");
        assert!(solver.has_treated(reach.id));
    }

    #[test]
    fn cloned_solver_copies_the_cache() {
        let mut solver = solver();
        let reach = rect_reach(0, 0.001);
        solver
            .depth_and_velocity_from_discharge(5.0, &reach, None)
            .expect("solve");

        let mut cloned = solver.clone();
        assert!(cloned.has_treated(reach.id));

        let other = rect_reach(1, 0.001);
        cloned
            .depth_and_velocity_from_discharge(5.0, &other, None)
            .expect("solve");
        assert!(cloned.has_treated(other.id));
        assert!(!solver.has_treated(other.id));
    }

    #[test]
    fn first_solve_seeds_from_downstream_depth() {
        let mut solver = solver();
        let reach = rect_reach(1, 0.001);
        let mut downstream = rect_reach(0, 0.001);
        downstream.hydraulics.max_water_depth = 2.0;
        downstream.hydraulics.flow_velocity = 0.25;
        downstream.has_free_overfall = true;

        let (depth, _) = solver
            .depth_and_velocity_from_discharge(5.0, &reach, Some(&downstream))
            .expect("solve");
        // Seeded from 2.0 m, the expansion still isolates the equilibrium.
        let (implied, _) = solver
            .discharge_and_velocity_from_depth(depth, &reach)
            .expect("inverse");
        assert_relative_eq!(implied, 5.0, epsilon = 1e-6);
    }

    #[test]
    fn later_solves_seed_from_own_depth() {
        let mut solver = solver();
        let mut reach = rect_reach(0, 0.001);

        let (first_depth, _) = solver
            .depth_and_velocity_from_discharge(5.0, &reach, None)
            .expect("first solve");
        reach.hydraulics.max_water_depth = first_depth;

        let (second_depth, _) = solver
            .depth_and_velocity_from_discharge(5.5, &reach, None)
            .expect("second solve");
        assert!(second_depth > first_depth);
    }

    #[test]
    fn minimum_slope_is_enforced_against_a_high_downstream_head() {
        let mut solver = solver();
        let mut reach = rect_reach(1, 0.001);
        reach.hydraulics.bed_elevation = 0.105;

        let mut downstream = rect_reach(0, 0.001);
        downstream.hydraulics.bed_elevation = 0.0;
        downstream.hydraulics.max_water_depth = 2.0;
        downstream.hydraulics.flow_velocity = 0.1;

        let (enforced, _) = solver
            .depth_and_velocity_from_discharge(1.0, &reach, Some(&downstream))
            .expect("solve");

        // The unconstrained equilibrium depth for 1 m³/s is far below the
        // depth needed to keep the energy line at the minimum slope.
        let mut free = solver.clone();
        downstream.has_free_overfall = true;
        let (unconstrained, _) = free
            .depth_and_velocity_from_discharge(1.0, &reach, Some(&downstream))
            .expect("solve");

        assert!(enforced > unconstrained);

        // At the enforced depth the head sits on the minimum-slope line.
        let g = solver.config().gravity;
        let v = 1.0 / reach.geometry.area(enforced);
        let head = reach.hydraulics.bed_elevation + enforced + v * v / (2.0 * g);
        let ds_kinetic = 0.1 * 0.1 / (2.0 * g);
        let minimum = 2.0 + ds_kinetic + solver.config().minimum_hydraulic_slope * reach.length;
        assert_relative_eq!(head, minimum, epsilon = 1e-6);
    }

    #[test]
    fn velocity_inverse_round_trips() {
        let mut solver = solver();
        let reach = rect_reach(0, 0.001);

        let (discharge, depth) = solver
            .discharge_and_depth_from_velocity(0.9, &reach, None)
            .expect("solve");
        let (_, velocity) = solver
            .discharge_and_velocity_from_depth(depth, &reach)
            .expect("inverse");
        assert_relative_eq!(velocity, 0.9, epsilon = 1e-6);
        assert_relative_eq!(discharge, 0.9 * reach.geometry.area(depth), epsilon = 1e-9);
    }

    #[test]
    fn rejects_invalid_configuration() {
        let mut config = ResistanceConfig::with_friction(manning());
        config.maximum_froude_number = 0.0;
        assert!(matches!(
            FlowResistance::new(config),
            Err(Error::InvalidInput { .. })
        ));

        let mut config = ResistanceConfig::with_friction(manning());
        config.fallback_start_depth = -0.1;
        assert!(matches!(
            FlowResistance::new(config),
            Err(Error::InvalidInput { .. })
        ));
    }
}
