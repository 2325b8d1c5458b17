//! The reach-network collaborator consumed by the stepping engine.

use std::fmt;

use uom::si::f64::Time;

use crate::reach::ReachId;

/// The step-size limit contributed by the most restrictive reach.
///
/// `seconds` is the raw stability bound, `min(length / (|v| + √(g·h)))`
/// over the wetted reaches; the engine scales it by the Courant number and
/// the step scaling factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StabilityLimit {
    pub seconds: f64,
    pub limiting_reach: Option<ReachId>,
}

/// Names the reach whose bed slope is flattest.
///
/// A near-zero slope degenerates the stability calculation, so this is the
/// diagnostic attached to a too-small-step failure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlopeDiagnostic {
    pub reach: ReachId,
    pub bed_slope: f64,
}

impl fmt::Display for SlopeDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bed slope {} at {}", self.bed_slope, self.reach)
    }
}

/// A network of reaches, advanced in time by the stepping engine.
///
/// The engine calls these hooks in a strict per-step order: change rates,
/// stability limit, downstream propagation, side-channel actions, change
/// application, derived-property refresh, collaborator refresh. Any error
/// aborts the run; there is no partial-step recovery.
pub trait ReachNetwork {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Computes the per-reach change rates for the coming step.
    fn compute_change_rates(&mut self) -> Result<(), Self::Error>;

    /// Returns the stability-driven step-size limit of the network.
    fn stability_limit(&self) -> Result<StabilityLimit, Self::Error>;

    /// Routes the computed changes downstream before they are applied.
    fn propagate_changes_downstream(&mut self, dt: Time) -> Result<(), Self::Error>;

    /// Runs reach- or network-level actions that sit outside the main
    /// change pipeline.
    fn perform_step_actions(&mut self, dt: Time) -> Result<(), Self::Error>;

    /// Applies the computed changes to reach state.
    fn apply_changes(&mut self, dt: Time) -> Result<(), Self::Error>;

    /// Refreshes derived per-reach properties (slopes, shear stresses,
    /// active widths, hydraulics).
    fn refresh_derived_properties(&mut self) -> Result<(), Self::Error>;

    /// Refreshes any external-collaborator state tied to the network.
    fn refresh_collaborators(&mut self) -> Result<(), Self::Error>;

    /// Returns the flattest bed slope in the network, if any reach exists.
    fn smallest_bed_slope(&self) -> Option<SlopeDiagnostic>;
}
