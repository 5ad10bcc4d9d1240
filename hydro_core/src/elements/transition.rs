//! # Transition
//!
//! Connects two cross sections of differing shape or size. The wall flare
//! limits follow the usual open-channel guidance: 12.5° for expansions,
//! 25° for contractions.

use serde::{Deserialize, Serialize};

use super::section::CrossSection;
use super::{require_non_negative, require_positive, Conveyance};
use crate::errors::DesignResult;
use crate::hydraulics::GRAVITY;

/// Maximum wall flare angle for an expansion (degrees)
pub const MAX_EXPANSION_ANGLE_DEG: f64 = 12.5;

/// Maximum wall flare angle for a contraction (degrees)
pub const MAX_CONTRACTION_ANGLE_DEG: f64 = 25.0;

/// Wall shape of the transition, which sets its head-loss coefficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionType {
    #[default]
    Linear,
    Warped,
    Cylindrical,
    Inlet,
    Outlet,
}

impl TransitionType {
    /// Default head-loss coefficient K
    pub fn loss_coefficient(&self) -> f64 {
        match self {
            TransitionType::Linear => 0.3,
            TransitionType::Warped => 0.1,
            TransitionType::Cylindrical => 0.15,
            TransitionType::Inlet => 0.5,
            TransitionType::Outlet => 0.2,
        }
    }
}

/// Geometry of a transition structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    /// Horizontal length (m)
    pub length: f64,

    /// Section at the upstream end
    pub inlet: CrossSection,

    /// Section at the downstream end
    pub outlet: CrossSection,

    /// Explicit elevation drop (m); when absent the drop is `length * slope`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drop_height: Option<f64>,

    #[serde(default)]
    pub transition_type: TransitionType,
}

impl Transition {
    pub fn new(length: f64, inlet: CrossSection, outlet: CrossSection) -> Self {
        Transition {
            length,
            inlet,
            outlet,
            drop_height: None,
            transition_type: TransitionType::default(),
        }
    }

    pub fn with_drop(mut self, drop_height: f64) -> Self {
        self.drop_height = Some(drop_height);
        self
    }

    /// True when the top width grows in the flow direction
    pub fn is_expansion(&self) -> bool {
        self.outlet.top_width() > self.inlet.top_width()
    }

    /// Shortest length that keeps the wall flare within the allowed angle (m).
    pub fn min_length(&self) -> f64 {
        let half_change = (self.outlet.top_width() - self.inlet.top_width()).abs() / 2.0;
        let angle = if self.is_expansion() {
            MAX_EXPANSION_ANGLE_DEG
        } else {
            MAX_CONTRACTION_ANGLE_DEG
        };
        half_change / angle.to_radians().tan()
    }

    /// Head loss hL = K |V2² - V1²| / 2g for inlet/outlet velocities (m)
    pub fn head_loss(&self, v_in: f64, v_out: f64) -> f64 {
        self.transition_type.loss_coefficient() * (v_out.powi(2) - v_in.powi(2)).abs() / (2.0 * GRAVITY)
    }

    /// Section at fractional position `t` in [0, 1] along the transition.
    ///
    /// Dimensions are blended linearly; the shape switches from inlet to
    /// outlet type at mid-length when the two differ.
    pub fn section_at(&self, t: f64) -> CrossSection {
        let t = t.clamp(0.0, 1.0);
        let lerp = |a: f64, b: f64| a + (b - a) * t;
        match (self.inlet, self.outlet) {
            (CrossSection::Rectangular { width: w1, depth: d1 }, CrossSection::Rectangular { width: w2, depth: d2 }) => {
                CrossSection::rectangular(lerp(w1, w2), lerp(d1, d2))
            }
            (
                CrossSection::Trapezoidal { bottom_width: b1, depth: d1, side_slope: z1 },
                CrossSection::Trapezoidal { bottom_width: b2, depth: d2, side_slope: z2 },
            ) => CrossSection::trapezoidal(lerp(b1, b2), lerp(d1, d2), lerp(z1, z2)),
            (CrossSection::Triangular { depth: d1, side_slope: z1 }, CrossSection::Triangular { depth: d2, side_slope: z2 }) => {
                CrossSection::triangular(lerp(d1, d2), lerp(z1, z2))
            }
            (inlet, outlet) => {
                if t < 0.5 {
                    inlet
                } else {
                    outlet
                }
            }
        }
    }
}

impl Conveyance for Transition {
    fn horizontal_length(&self) -> f64 {
        self.length
    }

    fn total_drop(&self, bed_slope: f64) -> f64 {
        self.drop_height.unwrap_or(self.length * bed_slope)
    }

    fn section(&self) -> CrossSection {
        self.inlet
    }

    fn validate(&self) -> DesignResult<()> {
        require_positive("length", self.length)?;
        if let Some(drop) = self.drop_height {
            require_non_negative("drop_height", drop)?;
        }
        self.inlet.validate("inlet")?;
        self.outlet.validate("outlet")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widening() -> Transition {
        Transition::new(
            5.0,
            CrossSection::rectangular(1.0, 1.0),
            CrossSection::rectangular(2.0, 1.0),
        )
    }

    #[test]
    fn test_slope_drop_and_override() {
        let t = widening();
        assert!((t.total_drop(0.02) - 0.1).abs() < 1e-12);
        let t = t.with_drop(0.75);
        assert!((t.total_drop(0.02) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_min_length_expansion() {
        let t = widening();
        assert!(t.is_expansion());
        // 0.5 / tan(12.5°) = 2.255
        assert!((t.min_length() - 2.255).abs() < 0.01);
    }

    #[test]
    fn test_min_length_contraction() {
        let t = Transition::new(
            5.0,
            CrossSection::rectangular(3.0, 1.0),
            CrossSection::rectangular(2.0, 1.0),
        );
        assert!(!t.is_expansion());
        // 0.5 / tan(25°) = 1.072
        assert!((t.min_length() - 1.072).abs() < 0.01);
    }

    #[test]
    fn test_head_loss() {
        let t = widening();
        // K = 0.3, |1² - 2²| / (2 * 9.81) = 0.1529
        assert!((t.head_loss(2.0, 1.0) - 0.3 * 3.0 / 19.62).abs() < 1e-9);
    }

    #[test]
    fn test_section_blending() {
        let t = widening();
        match t.section_at(0.5) {
            CrossSection::Rectangular { width, .. } => assert!((width - 1.5).abs() < 1e-12),
            other => panic!("unexpected section {:?}", other),
        }

        let mixed = Transition::new(
            4.0,
            CrossSection::rectangular(2.0, 1.0),
            CrossSection::trapezoidal(2.0, 1.0, 1.0),
        );
        assert_eq!(mixed.section_at(0.25), mixed.inlet);
        assert_eq!(mixed.section_at(0.75), mixed.outlet);
    }

    #[test]
    fn test_rejects_bad_drop() {
        assert!(widening().with_drop(f64::INFINITY).validate().is_err());
        assert!(widening().with_drop(-1.0).validate().is_err());
    }
}
