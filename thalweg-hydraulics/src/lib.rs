//! Friction laws and the flow-resistance equilibrium solver for the
//! Thalweg river model.
//!
//! Given a discharge, [`FlowResistance`] produces the flow depth and
//! velocity consistent with a configured [`FrictionLaw`], bounded by a
//! maximum Froude number and a minimum hydraulic slope. [`RiverSystem`]
//! wires those per-reach solves into the downstream-to-upstream sweep the
//! stepping engine drives through `thalweg-core`.

mod error;
mod friction;
mod resistance;
mod river;

pub use error::Error;
pub use friction::FrictionLaw;
pub use resistance::{FlowResistance, ResistanceConfig, STANDARD_GRAVITY};
pub use river::{ChangeModel, RiverSystem, StaticBed};
