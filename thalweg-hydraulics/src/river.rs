//! A serial river system: reaches in a chain, solved downstream to
//! upstream.
//!
//! The hydraulic refresh must run from the outlet upward because a reach's
//! solve reads its downstream neighbour's already-solved state twice: to
//! seed the bracket search and to enforce the minimum hydraulic slope. The
//! sweep order is computed once at construction by walking each reach's
//! downstream links.

use std::collections::HashMap;
use std::convert::Infallible;

use uom::si::{f64::Time, time::second};

use thalweg_core::{
    ChannelGeometry, Reach, ReachId, ReachNetwork, SlopeDiagnostic, StabilityLimit,
};

use crate::{Error, FlowResistance};

/// Density of water, in kg/m³.
const WATER_DENSITY: f64 = 1000.0;

/// Supplies the per-reach change rates the network steps with.
///
/// This is the seam to the external catalog of sediment strategies; the
/// river system only needs a net bed-elevation rate per reach plus the two
/// optional side hooks the stepping engine exposes.
pub trait ChangeModel<G: ChannelGeometry> {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Net bed-elevation change rate from local processes, in m/s.
    fn bed_change_rate(&mut self, reach: &Reach<G>) -> Result<f64, Self::Error>;

    /// Reach- or network-level actions outside the main change pipeline.
    fn perform_step_actions(&mut self, reaches: &[Reach<G>], dt: Time) -> Result<(), Self::Error> {
        let _ = (reaches, dt);
        Ok(())
    }

    /// Refresh of external-collaborator state after changes are applied.
    fn refresh(&mut self, reaches: &[Reach<G>]) -> Result<(), Self::Error> {
        let _ = reaches;
        Ok(())
    }
}

/// A change model that leaves the bed untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticBed;

impl<G: ChannelGeometry> ChangeModel<G> for StaticBed {
    type Error = Infallible;

    fn bed_change_rate(&mut self, _reach: &Reach<G>) -> Result<f64, Self::Error> {
        Ok(0.0)
    }
}

/// The reach network: topology, hydraulic solving, and change routing.
#[derive(Debug)]
pub struct RiverSystem<G, C> {
    reaches: Vec<Reach<G>>,
    index: HashMap<ReachId, usize>,
    /// Reach indices ordered outlet-first.
    sweep: Vec<usize>,
    resistance: FlowResistance,
    change_model: C,
    /// Local bed change rates, m/s, parallel to `reaches`.
    local_rates: Vec<f64>,
    /// Rates after downstream routing, m/s, parallel to `reaches`.
    routed_rates: Vec<f64>,
}

impl<G, C> RiverSystem<G, C>
where
    G: ChannelGeometry + Clone,
    C: ChangeModel<G>,
{
    /// Builds a river system, checking the topology.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidNetwork`] for an empty network, a duplicate
    /// reach id, a downstream link to an unknown reach, or a cycle.
    pub fn new(
        reaches: Vec<Reach<G>>,
        resistance: FlowResistance,
        change_model: C,
    ) -> Result<Self, Error> {
        if reaches.is_empty() {
            return Err(Error::InvalidNetwork {
                reason: "network has no reaches",
            });
        }

        let mut index = HashMap::with_capacity(reaches.len());
        for (i, reach) in reaches.iter().enumerate() {
            if index.insert(reach.id, i).is_some() {
                return Err(Error::InvalidNetwork {
                    reason: "duplicate reach id",
                });
            }
        }

        // Distance to the outlet orders the sweep; walking further than the
        // reach count means the downstream links loop.
        let mut hops = vec![0usize; reaches.len()];
        for (i, reach) in reaches.iter().enumerate() {
            let mut current = reach;
            let mut count = 0;
            while let Some(downstream) = current.downstream {
                let j = *index.get(&downstream).ok_or(Error::UnknownReach(downstream))?;
                count += 1;
                if count > reaches.len() {
                    return Err(Error::InvalidNetwork {
                        reason: "downstream links form a cycle",
                    });
                }
                current = &reaches[j];
            }
            hops[i] = count;
        }
        let mut sweep: Vec<usize> = (0..reaches.len()).collect();
        sweep.sort_by_key(|&i| hops[i]);

        let n = reaches.len();
        Ok(Self {
            reaches,
            index,
            sweep,
            resistance,
            change_model,
            local_rates: vec![0.0; n],
            routed_rates: vec![0.0; n],
        })
    }

    /// All reaches, in construction order.
    pub fn reaches(&self) -> &[Reach<G>] {
        &self.reaches
    }

    /// Looks up one reach by id.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownReach`] for an id outside the network.
    pub fn reach(&self, id: ReachId) -> Result<&Reach<G>, Error> {
        self.index
            .get(&id)
            .map(|&i| &self.reaches[i])
            .ok_or(Error::UnknownReach(id))
    }

    /// The flow-resistance solver, with its iteration-start cache.
    pub fn resistance(&self) -> &FlowResistance {
        &self.resistance
    }

    /// Reach indices in downstream-to-upstream solve order.
    pub fn sweep_order(&self) -> impl Iterator<Item = ReachId> + '_ {
        self.sweep.iter().map(|&i| self.reaches[i].id)
    }

    /// Solves hydraulics and refreshes derived properties, outlet first.
    fn refresh_hydraulics(&mut self) -> Result<(), Error> {
        for k in 0..self.sweep.len() {
            let i = self.sweep[k];

            let downstream = match self.reaches[i].downstream {
                Some(id) => {
                    let j = *self.index.get(&id).ok_or(Error::UnknownReach(id))?;
                    Some(self.reaches[j].clone())
                }
                None => None,
            };

            // Bed slope follows the elevations; the energy line is taken
            // parallel to the bed (kinematic approximation). The outlet
            // keeps its configured slopes.
            if let Some(ds) = &downstream {
                let drop = self.reaches[i].hydraulics.bed_elevation - ds.hydraulics.bed_elevation;
                let slope = drop / self.reaches[i].length;
                self.reaches[i].hydraulics.bed_slope = slope;
                self.reaches[i].hydraulics.energy_slope = slope;
            }

            let discharge = self.reaches[i].hydraulics.discharge;
            let (depth, velocity) = self.resistance.depth_and_velocity_from_discharge(
                discharge,
                &self.reaches[i],
                downstream.as_ref(),
            )?;

            let gravity = self.resistance.config().gravity;
            let radius = self.reaches[i].geometry.hydraulic_radius(depth);
            let width = self.reaches[i].geometry.top_width(depth);
            let hydraulics = &mut self.reaches[i].hydraulics;
            hydraulics.max_water_depth = depth;
            hydraulics.flow_velocity = velocity;
            hydraulics.shear_stress =
                WATER_DENSITY * gravity * radius * hydraulics.energy_slope.max(0.0);
            hydraulics.active_width = width;
        }
        Ok(())
    }
}

impl<G, C> ReachNetwork for RiverSystem<G, C>
where
    G: ChannelGeometry + Clone,
    C: ChangeModel<G>,
{
    type Error = Error;

    fn compute_change_rates(&mut self) -> Result<(), Self::Error> {
        for (i, reach) in self.reaches.iter().enumerate() {
            self.local_rates[i] = self
                .change_model
                .bed_change_rate(reach)
                .map_err(Error::change)?;
        }
        Ok(())
    }

    fn stability_limit(&self) -> Result<StabilityLimit, Self::Error> {
        let gravity = self.resistance.config().gravity;
        let mut seconds = f64::INFINITY;
        let mut limiting_reach = None;

        for reach in &self.reaches {
            let h = &reach.hydraulics;
            if h.max_water_depth <= 0.0 {
                continue;
            }
            let area = reach.geometry.area(h.max_water_depth);
            let mean_depth = area / reach.geometry.top_width(h.max_water_depth);
            let celerity = (gravity * mean_depth).sqrt();
            let speed = h.flow_velocity.abs() + celerity;
            if speed <= 0.0 {
                continue;
            }
            let bound = reach.length / speed;
            if bound < seconds {
                seconds = bound;
                limiting_reach = Some(reach.id);
            }
        }

        Ok(StabilityLimit {
            seconds,
            limiting_reach,
        })
    }

    fn propagate_changes_downstream(&mut self, _dt: Time) -> Result<(), Self::Error> {
        self.routed_rates.copy_from_slice(&self.local_rates);

        // Eroded volume re-deposits in the next reach downstream; the
        // outlet exports it out of the network.
        for k in (0..self.sweep.len()).rev() {
            let i = self.sweep[k];
            let rate = self.routed_rates[i];
            if rate >= 0.0 {
                continue;
            }
            let Some(downstream) = self.reaches[i].downstream else {
                continue;
            };
            let j = *self
                .index
                .get(&downstream)
                .ok_or(Error::UnknownReach(downstream))?;

            let eroding = &self.reaches[i];
            let volume_rate =
                -rate * eroding.length * eroding.hydraulics.active_width;
            let receiving = &self.reaches[j];
            let receiving_area = receiving.length * receiving.hydraulics.active_width;
            if receiving_area > 0.0 {
                self.routed_rates[j] += volume_rate / receiving_area;
            }
        }
        Ok(())
    }

    fn perform_step_actions(&mut self, dt: Time) -> Result<(), Self::Error> {
        self.change_model
            .perform_step_actions(&self.reaches, dt)
            .map_err(Error::change)
    }

    fn apply_changes(&mut self, dt: Time) -> Result<(), Self::Error> {
        let dt_seconds = dt.get::<second>();
        for (reach, &rate) in self.reaches.iter_mut().zip(&self.routed_rates) {
            reach.hydraulics.bed_elevation += rate * dt_seconds;
        }
        Ok(())
    }

    fn refresh_derived_properties(&mut self) -> Result<(), Self::Error> {
        self.refresh_hydraulics()
    }

    fn refresh_collaborators(&mut self) -> Result<(), Self::Error> {
        self.change_model
            .refresh(&self.reaches)
            .map_err(Error::change)
    }

    fn smallest_bed_slope(&self) -> Option<SlopeDiagnostic> {
        self.reaches
            .iter()
            .min_by(|a, b| a.hydraulics.bed_slope.total_cmp(&b.hydraulics.bed_slope))
            .map(|reach| SlopeDiagnostic {
                reach: reach.id,
                bed_slope: reach.hydraulics.bed_slope,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use thalweg_core::RectangularProfile;

    use crate::{FrictionLaw, ResistanceConfig};

    fn resistance() -> FlowResistance {
        FlowResistance::new(ResistanceConfig::with_friction(FrictionLaw::ManningStrickler {
            strickler_coefficient: 30.0,
        }))
        .expect("valid config")
    }

    /// Three reaches in a chain, ids upstream-to-downstream 2 → 1 → 0,
    /// beds falling 0.1 m per 100 m reach.
    fn chain(discharge: f64) -> Vec<Reach<RectangularProfile>> {
        let profile = RectangularProfile { width: 10.0 };
        (0..3u32)
            .map(|i| {
                let mut reach = Reach::new(ReachId(i), 100.0, profile);
                if i > 0 {
                    reach.downstream = Some(ReachId(i - 1));
                }
                reach.hydraulics.bed_elevation = f64::from(i) * 0.1;
                reach.hydraulics.energy_slope = 0.001;
                reach.hydraulics.bed_slope = 0.001;
                reach.hydraulics.discharge = discharge;
                reach
            })
            .collect()
    }

    #[test]
    fn sweep_runs_outlet_first() {
        let system = RiverSystem::new(chain(5.0), resistance(), StaticBed).expect("network");
        let order: Vec<ReachId> = system.sweep_order().collect();
        assert_eq!(order, vec![ReachId(0), ReachId(1), ReachId(2)]);
    }

    #[test]
    fn refresh_solves_every_reach() {
        let mut system = RiverSystem::new(chain(5.0), resistance(), StaticBed).expect("network");
        system.refresh_derived_properties().expect("refresh");

        for reach in system.reaches() {
            let h = &reach.hydraulics;
            assert!(h.max_water_depth > 0.0, "{}", reach.id);
            assert!(h.flow_velocity > 0.0, "{}", reach.id);
            assert!(h.shear_stress > 0.0, "{}", reach.id);
            assert_relative_eq!(h.active_width, 10.0);
            assert_relative_eq!(
                h.flow_velocity * reach.geometry.area(h.max_water_depth),
                5.0,
                epsilon = 1e-6
            );
        }
        for reach in system.reaches() {
            assert!(system.resistance().has_treated(reach.id));
        }
    }

    #[test]
    fn refresh_recomputes_slopes_from_elevations() {
        let mut system = RiverSystem::new(chain(5.0), resistance(), StaticBed).expect("network");
        system.refresh_derived_properties().expect("refresh");

        let upstream = system.reach(ReachId(2)).expect("reach");
        assert_relative_eq!(upstream.hydraulics.bed_slope, 0.001, epsilon = 1e-12);
        assert_relative_eq!(upstream.hydraulics.energy_slope, 0.001, epsilon = 1e-12);
    }

    #[test]
    fn stability_limit_names_a_wetted_reach() {
        let mut system = RiverSystem::new(chain(5.0), resistance(), StaticBed).expect("network");
        system.refresh_derived_properties().expect("refresh");

        let limit = system.stability_limit().expect("limit");
        assert!(limit.seconds.is_finite() && limit.seconds > 0.0);
        assert!(limit.limiting_reach.is_some());
    }

    #[test]
    fn dry_network_reports_unbounded_stability() {
        let system = RiverSystem::new(chain(0.0), resistance(), StaticBed).expect("network");
        let limit = system.stability_limit().expect("limit");
        assert!(limit.seconds.is_infinite());
        assert_eq!(limit.limiting_reach, None);
    }

    #[test]
    fn erosion_routes_to_the_downstream_reach() {
        #[derive(Debug)]
        struct ErodeUpstream;
        impl ChangeModel<RectangularProfile> for ErodeUpstream {
            type Error = Infallible;

            fn bed_change_rate(
                &mut self,
                reach: &Reach<RectangularProfile>,
            ) -> Result<f64, Self::Error> {
                Ok(if reach.id == ReachId(2) { -1e-6 } else { 0.0 })
            }
        }

        let mut system = RiverSystem::new(chain(5.0), resistance(), ErodeUpstream).expect("network");
        system.refresh_derived_properties().expect("refresh");
        system.compute_change_rates().expect("rates");
        system
            .propagate_changes_downstream(Time::new::<second>(1.0))
            .expect("propagate");

        let before: Vec<f64> = system
            .reaches()
            .iter()
            .map(|r| r.hydraulics.bed_elevation)
            .collect();
        system.apply_changes(Time::new::<second>(10.0)).expect("apply");
        let after: Vec<f64> = system
            .reaches()
            .iter()
            .map(|r| r.hydraulics.bed_elevation)
            .collect();

        // Reach 2 eroded, reach 1 received the volume, the outlet is
        // untouched.
        assert!(after[2] < before[2]);
        assert!(after[1] > before[1]);
        assert_relative_eq!(after[0], before[0]);
        // Identical reach dimensions: the deposit mirrors the erosion.
        assert_relative_eq!(after[1] - before[1], before[2] - after[2], epsilon = 1e-15);
    }

    #[test]
    fn smallest_bed_slope_finds_the_flattest_reach() {
        let mut reaches = chain(5.0);
        reaches[1].hydraulics.bed_slope = 1e-7;
        let system = RiverSystem::new(reaches, resistance(), StaticBed).expect("network");

        let diagnostic = system.smallest_bed_slope().expect("diagnostic");
        assert_eq!(diagnostic.reach, ReachId(1));
        assert_relative_eq!(diagnostic.bed_slope, 1e-7);
    }

    #[test]
    fn rejects_unknown_downstream_link() {
        let mut reaches = chain(5.0);
        reaches[2].downstream = Some(ReachId(9));
        let result = RiverSystem::new(reaches, resistance(), StaticBed);
        assert!(matches!(result, Err(Error::UnknownReach(ReachId(9)))));
    }

    #[test]
    fn rejects_cyclic_topology() {
        let mut reaches = chain(5.0);
        reaches[0].downstream = Some(ReachId(2));
        let result = RiverSystem::new(reaches, resistance(), StaticBed);
        assert!(matches!(result, Err(Error::InvalidNetwork { .. })));
    }

    #[test]
    fn rejects_duplicate_reach_ids() {
        let mut reaches = chain(5.0);
        reaches[2].id = ReachId(0);
        let result = RiverSystem::new(reaches, resistance(), StaticBed);
        assert!(matches!(result, Err(Error::InvalidNetwork { .. })));
    }

    #[test]
    fn rejects_empty_network() {
        let result =
            RiverSystem::<RectangularProfile, _>::new(Vec::new(), resistance(), StaticBed);
        assert!(matches!(result, Err(Error::InvalidNetwork { .. })));
    }
}
