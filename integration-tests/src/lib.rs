//! Shared fixtures for the end-to-end tests.

use thalweg_core::{Reach, ReachId, RectangularProfile};
use thalweg_hydraulics::{FlowResistance, FrictionLaw, ResistanceConfig};

/// A straight chain of rectangular reaches, ids upstream-to-downstream
/// `n-1 → … → 1 → 0`, with a uniform bed drop per reach and the same
/// steady discharge everywhere.
pub fn chain_of_reaches(
    count: u32,
    reach_length: f64,
    bed_drop_per_reach: f64,
    discharge: f64,
) -> Vec<Reach<RectangularProfile>> {
    let profile = RectangularProfile { width: 10.0 };
    let slope = bed_drop_per_reach / reach_length;
    (0..count)
        .map(|i| {
            let mut reach = Reach::new(ReachId(i), reach_length, profile);
            if i > 0 {
                reach.downstream = Some(ReachId(i - 1));
            }
            reach.hydraulics.bed_elevation = f64::from(i) * bed_drop_per_reach;
            reach.hydraulics.bed_slope = slope;
            reach.hydraulics.energy_slope = slope;
            reach.hydraulics.discharge = discharge;
            reach
        })
        .collect()
}

/// A Manning–Strickler flow-resistance solver with default constraints.
pub fn default_resistance() -> FlowResistance {
    FlowResistance::new(ResistanceConfig::with_friction(
        FrictionLaw::ManningStrickler {
            strickler_coefficient: 30.0,
        },
    ))
    .expect("default resistance config is valid")
}
