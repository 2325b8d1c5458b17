//! Reaches: the spatial unit of the river network.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies one reach within a network.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct ReachId(pub u32);

impl fmt::Display for ReachId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "reach {}", self.0)
    }
}

/// The hydraulic state of one reach.
///
/// Written by the flow-resistance solver and the derived-property refresh;
/// read by the stepping engine for stability sizing and by neighbouring
/// solves for boundary conditions. All values are SI.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HydraulicState {
    /// Water discharge through the reach, in m³/s.
    pub discharge: f64,
    /// Mean flow velocity, in m/s.
    pub flow_velocity: f64,
    /// Maximum water depth, in m.
    pub max_water_depth: f64,
    /// Slope of the water-energy line, dimensionless.
    pub energy_slope: f64,
    /// Bed slope toward the downstream reach, dimensionless.
    pub bed_slope: f64,
    /// Bed elevation at the reach, in m.
    pub bed_elevation: f64,
    /// Bed shear stress, in N/m².
    pub shear_stress: f64,
    /// Width of the hydraulically active bed, in m.
    pub active_width: f64,
}

/// One river segment: identity, linkage, geometry, and hydraulic state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reach<G> {
    pub id: ReachId,
    /// Reach length along the channel, in m.
    pub length: f64,
    /// The next reach downstream; `None` marks the network outlet.
    pub downstream: Option<ReachId>,
    /// Whether flow leaves this reach over a free-overfall structure.
    ///
    /// A sill decouples the energy line: the minimum-slope condition cannot
    /// be enforced across it.
    #[serde(default)]
    pub has_free_overfall: bool,
    pub geometry: G,
    #[serde(default)]
    pub hydraulics: HydraulicState,
}

impl<G> Reach<G> {
    /// Creates a reach with default (dry) hydraulic state and no linkage.
    pub fn new(id: ReachId, length: f64, geometry: G) -> Self {
        Self {
            id,
            length,
            downstream: None,
            has_free_overfall: false,
            geometry,
            hydraulics: HydraulicState::default(),
        }
    }

    /// Sets the downstream neighbour.
    #[must_use]
    pub fn flowing_into(mut self, downstream: ReachId) -> Self {
        self.downstream = Some(downstream);
        self
    }
}
