//! Channel cross-section geometry.
//!
//! The equilibrium solver only ever talks to a channel through this trait:
//! depth to area, depth to hydraulic radius, and the water-surface width.
//! Where a geometry can advertise an exact power-law form for one of those
//! conversions, the solver uses it to bypass iteration entirely.

use serde::{Deserialize, Serialize};

/// An exact relationship `value = factor * depth^exponent` with no offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PowerLaw {
    pub factor: f64,
    pub exponent: f64,
}

impl PowerLaw {
    /// Evaluates the law at `depth`.
    #[must_use]
    pub fn apply(&self, depth: f64) -> f64 {
        self.factor * depth.powf(self.exponent)
    }

    /// Inverts the law, returning the depth that produces `value`.
    #[must_use]
    pub fn invert(&self, value: f64) -> f64 {
        (value / self.factor).powf(self.exponent.recip())
    }
}

/// Cross-section conversions for one reach.
///
/// Implementations must be consistent: `depth_from_area(area(d)) == d`, and
/// `top_width` is the water-surface width, which for a prismatic channel is
/// the derivative of area with respect to depth.
pub trait ChannelGeometry {
    /// Cross-sectional flow area at the given depth, in m².
    fn area(&self, depth: f64) -> f64;

    /// Flow depth producing the given cross-sectional area, in m.
    fn depth_from_area(&self, area: f64) -> f64;

    /// Hydraulic radius (area over wetted perimeter) at the given depth, in m.
    fn hydraulic_radius(&self, depth: f64) -> f64;

    /// Water-surface width at the given depth, in m.
    fn top_width(&self, depth: f64) -> f64;

    /// Exact power-law form of the depth→area conversion, if one exists.
    fn area_power_law(&self) -> Option<PowerLaw> {
        None
    }

    /// Exact power-law form of the depth→hydraulic-radius conversion, if one
    /// exists.
    fn hydraulic_radius_power_law(&self) -> Option<PowerLaw> {
        None
    }
}

/// A rectangular cross-section of fixed width.
///
/// The depth→area conversion is an exact power law, so solvers can invert
/// it without iteration. The hydraulic radius accounts for both banks and
/// has no power-law form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectangularProfile {
    pub width: f64,
}

impl ChannelGeometry for RectangularProfile {
    fn area(&self, depth: f64) -> f64 {
        self.width * depth
    }

    fn depth_from_area(&self, area: f64) -> f64 {
        area / self.width
    }

    fn hydraulic_radius(&self, depth: f64) -> f64 {
        if depth <= 0.0 {
            return 0.0;
        }
        self.width * depth / (self.width + 2.0 * depth)
    }

    fn top_width(&self, _depth: f64) -> f64 {
        self.width
    }

    fn area_power_law(&self) -> Option<PowerLaw> {
        Some(PowerLaw {
            factor: self.width,
            exponent: 1.0,
        })
    }
}

/// A symmetric trapezoidal cross-section.
///
/// `side_slope` is horizontal over vertical; zero degenerates to a
/// rectangle. No conversion has a power-law form, so solvers that consult
/// this geometry always iterate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrapezoidalProfile {
    pub bottom_width: f64,
    pub side_slope: f64,
}

impl ChannelGeometry for TrapezoidalProfile {
    fn area(&self, depth: f64) -> f64 {
        depth * (self.bottom_width + self.side_slope * depth)
    }

    fn depth_from_area(&self, area: f64) -> f64 {
        if self.side_slope == 0.0 {
            return area / self.bottom_width;
        }
        let b = self.bottom_width;
        let z = self.side_slope;
        ((b * b + 4.0 * z * area).sqrt() - b) / (2.0 * z)
    }

    fn hydraulic_radius(&self, depth: f64) -> f64 {
        if depth <= 0.0 {
            return 0.0;
        }
        let perimeter =
            self.bottom_width + 2.0 * depth * (1.0 + self.side_slope * self.side_slope).sqrt();
        self.area(depth) / perimeter
    }

    fn top_width(&self, depth: f64) -> f64 {
        self.bottom_width + 2.0 * self.side_slope * depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn power_law_inverts_itself() {
        let law = PowerLaw {
            factor: 3.5,
            exponent: 1.4,
        };
        let depth = 0.82;
        assert_relative_eq!(law.invert(law.apply(depth)), depth, epsilon = 1e-12);
    }

    #[test]
    fn rectangular_conversions_are_consistent() {
        let profile = RectangularProfile { width: 8.0 };
        let depth = 1.25;
        assert_relative_eq!(profile.area(depth), 10.0);
        assert_relative_eq!(profile.depth_from_area(profile.area(depth)), depth);
        assert_relative_eq!(profile.top_width(depth), 8.0);
        assert_relative_eq!(
            profile.hydraulic_radius(depth),
            10.0 / (8.0 + 2.5),
            epsilon = 1e-12
        );
    }

    #[test]
    fn rectangular_area_law_matches_area() {
        let profile = RectangularProfile { width: 8.0 };
        let law = profile.area_power_law().expect("power law");
        assert_relative_eq!(law.apply(0.6), profile.area(0.6));
    }

    #[test]
    fn trapezoidal_depth_from_area_round_trips() {
        let profile = TrapezoidalProfile {
            bottom_width: 4.0,
            side_slope: 1.5,
        };
        let depth = 0.9;
        assert_relative_eq!(
            profile.depth_from_area(profile.area(depth)),
            depth,
            epsilon = 1e-12
        );
    }

    #[test]
    fn trapezoid_with_vertical_banks_matches_rectangle() {
        let trapezoid = TrapezoidalProfile {
            bottom_width: 5.0,
            side_slope: 0.0,
        };
        let rectangle = RectangularProfile { width: 5.0 };
        let depth = 0.7;
        assert_relative_eq!(trapezoid.area(depth), rectangle.area(depth));
        assert_relative_eq!(
            trapezoid.depth_from_area(3.5),
            rectangle.depth_from_area(3.5)
        );
        assert_relative_eq!(
            trapezoid.hydraulic_radius(depth),
            rectangle.hydraulic_radius(depth)
        );
    }

    #[test]
    fn zero_depth_has_zero_hydraulic_radius() {
        let profile = RectangularProfile { width: 8.0 };
        assert_relative_eq!(profile.hydraulic_radius(0.0), 0.0);
    }
}
