//! # Hydraulic Jump
//!
//! Relations for a free hydraulic jump on a horizontal rectangular floor.
//!
//! | Quantity       | Relation                                   |
//! |----------------|--------------------------------------------|
//! | Conjugate depth| `d2 = d1 (sqrt(1 + 8 Fr²) - 1) / 2`        |
//! | Jump length    | `Lj = 6.9 (d2 - d1)`                       |
//! | Head loss      | `ΔE = (d2 - d1)³ / (4 d1 d2)`              |

use serde::{Deserialize, Serialize};

/// Jump length coefficient for a free jump
pub const JUMP_LENGTH_RATIO: f64 = 6.9;

/// Jump classification by upstream Froude number (Chow, 1959).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HydraulicJumpType {
    /// Fr ≤ 1.0, no jump forms
    NoJump,
    /// 1.0 < Fr ≤ 1.7
    Undular,
    /// 1.7 < Fr ≤ 2.5
    Weak,
    /// 2.5 < Fr ≤ 4.5, unstable and wave-producing
    Oscillating,
    /// 4.5 < Fr ≤ 9.0
    Steady,
    /// Fr > 9.0
    Strong,
}

impl HydraulicJumpType {
    pub fn from_froude(froude: f64) -> Self {
        match froude {
            f if f <= 1.0 => HydraulicJumpType::NoJump,
            f if f <= 1.7 => HydraulicJumpType::Undular,
            f if f <= 2.5 => HydraulicJumpType::Weak,
            f if f <= 4.5 => HydraulicJumpType::Oscillating,
            f if f <= 9.0 => HydraulicJumpType::Steady,
            _ => HydraulicJumpType::Strong,
        }
    }

    /// Typical fraction of incoming specific energy dissipated
    pub fn efficiency_range(&self) -> (f64, f64) {
        match self {
            HydraulicJumpType::NoJump => (0.0, 0.0),
            HydraulicJumpType::Undular => (0.0, 0.05),
            HydraulicJumpType::Weak => (0.05, 0.15),
            HydraulicJumpType::Oscillating => (0.15, 0.45),
            HydraulicJumpType::Steady => (0.45, 0.70),
            HydraulicJumpType::Strong => (0.70, 0.85),
        }
    }
}

/// Sequent depth downstream of the jump (m).
pub fn conjugate_depth(d1: f64, froude: f64) -> f64 {
    d1 * ((1.0 + 8.0 * froude * froude).sqrt() - 1.0) / 2.0
}

/// Length of a free jump (m).
pub fn jump_length(d1: f64, d2: f64) -> f64 {
    JUMP_LENGTH_RATIO * (d2 - d1)
}

/// Head dissipated in the jump (m).
pub fn energy_loss(d1: f64, d2: f64) -> f64 {
    (d2 - d1).powi(3) / (4.0 * d1 * d2)
}
