//! Core contracts and the transient stepping engine for the Thalweg river
//! model.
//!
//! This crate defines the shape of a simulated river without committing to
//! any particular physics: reaches and their hydraulic state, the
//! channel-geometry and reach-network collaborator traits, the output
//! collaborator, and the adaptive stepping engine that drives a network
//! through simulated time. The hydraulic laws themselves live in
//! `thalweg-hydraulics`; everything here is consumed through the traits.

pub mod geometry;
pub mod network;
pub mod output;
pub mod reach;
pub mod transient;

pub use geometry::{ChannelGeometry, PowerLaw, RectangularProfile, TrapezoidalProfile};
pub use network::{ReachNetwork, SlopeDiagnostic, StabilityLimit};
pub use output::{Output, StepRecord};
pub use reach::{HydraulicState, Reach, ReachId};
