//! # Open-Channel Flow
//!
//! Uniform-flow and critical-flow helpers used by the design engine and by
//! front-ends that report channel capacity.
//!
//! - Manning: `Q = (1/n) A R^(2/3) S^(1/2)`
//! - Froude: `Fr = V / sqrt(g D)`, D = hydraulic depth
//! - Critical depth: `Q²/g = A³/T`
//!
//! Depth solvers use bisection; both functions are monotonic in depth for
//! the prismatic sections supported here.
//!
//! ## Example
//!
//! ```rust
//! use hydro_core::elements::CrossSection;
//! use hydro_core::hydraulics::{manning_flow, FlowRegime};
//!
//! let section = CrossSection::rectangular(2.0, 1.5);
//! let flow = manning_flow(&section, 0.001, 0.015, 1.0);
//! assert_eq!(flow.regime, FlowRegime::Subcritical);
//! ```

use serde::{Deserialize, Serialize};

use crate::elements::CrossSection;
use crate::errors::{DesignError, DesignResult};

/// Gravitational acceleration (m/s²)
pub const GRAVITY: f64 = 9.81;

const DEPTH_TOLERANCE: f64 = 1e-6;
const MAX_ITERATIONS: usize = 200;
const MIN_DEPTH: f64 = 1e-4;

/// Flow regime by Froude number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowRegime {
    Subcritical,
    Critical,
    Supercritical,
}

impl FlowRegime {
    /// Classify with a ±5% band around Fr = 1 treated as critical
    pub fn from_froude(froude: f64) -> Self {
        if froude < 0.95 {
            FlowRegime::Subcritical
        } else if froude <= 1.05 {
            FlowRegime::Critical
        } else {
            FlowRegime::Supercritical
        }
    }
}

/// Uniform-flow state at a given depth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FlowState {
    pub water_depth: f64,
    pub discharge: f64,
    pub velocity: f64,
    pub froude: f64,
    pub regime: FlowRegime,
    pub area: f64,
    pub hydraulic_radius: f64,
    pub top_width: f64,
    /// Specific energy E = y + V²/2g (m)
    pub specific_energy: f64,
}

/// Uniform flow at `water_depth` by Manning's equation.
pub fn manning_flow(section: &CrossSection, slope: f64, manning_n: f64, water_depth: f64) -> FlowState {
    let props = section.properties(water_depth);
    let slope = slope.abs();

    let velocity = if props.hydraulic_radius > 0.0 && slope > 0.0 && manning_n > 0.0 {
        props.hydraulic_radius.powf(2.0 / 3.0) * slope.sqrt() / manning_n
    } else {
        0.0
    };

    let froude = if props.hydraulic_depth > 0.0 {
        velocity / (GRAVITY * props.hydraulic_depth).sqrt()
    } else {
        0.0
    };

    FlowState {
        water_depth: props.water_depth,
        discharge: velocity * props.area,
        velocity,
        froude,
        regime: FlowRegime::from_froude(froude),
        area: props.area,
        hydraulic_radius: props.hydraulic_radius,
        top_width: props.top_width,
        specific_energy: props.water_depth + velocity.powi(2) / (2.0 * GRAVITY),
    }
}

/// Normal (uniform-flow) depth carrying `discharge` (m).
pub fn normal_depth(section: &CrossSection, discharge: f64, slope: f64, manning_n: f64) -> DesignResult<f64> {
    require_discharge(discharge)?;
    if !(slope.is_finite() && slope > 0.0) {
        return Err(DesignError::invalid_input(
            "slope",
            slope.to_string(),
            "Normal depth needs a positive bed slope",
        ));
    }
    if !(manning_n.is_finite() && manning_n > 0.0) {
        return Err(DesignError::invalid_input(
            "manning_n",
            manning_n.to_string(),
            "Manning's n must be positive",
        ));
    }

    Ok(bisect(discharge, section.depth(), |y| {
        manning_flow(section, slope, manning_n, y).discharge
    }))
}

/// Critical depth for `discharge` (m).
pub fn critical_depth(section: &CrossSection, discharge: f64) -> DesignResult<f64> {
    require_discharge(discharge)?;
    let target = discharge.powi(2) / GRAVITY;

    Ok(bisect(target, section.depth(), |y| {
        let props = section.properties(y);
        if props.top_width > 0.0 {
            props.area.powi(3) / props.top_width
        } else {
            0.0
        }
    }))
}

fn require_discharge(discharge: f64) -> DesignResult<()> {
    if discharge.is_finite() && discharge > 0.0 {
        Ok(())
    } else {
        Err(DesignError::invalid_input(
            "discharge",
            discharge.to_string(),
            "Discharge must be positive",
        ))
    }
}

/// Find y with f(y) = target for an increasing f. The upper bracket starts
/// at the section depth and doubles until it encloses the root.
fn bisect(target: f64, start_depth: f64, f: impl Fn(f64) -> f64) -> f64 {
    let mut low = MIN_DEPTH;
    let mut high = start_depth.max(MIN_DEPTH * 10.0);
    while f(high) < target && high < 1e4 {
        high *= 2.0;
    }

    for _ in 0..MAX_ITERATIONS {
        let mid = 0.5 * (low + high);
        if f(mid) < target {
            low = mid;
        } else {
            high = mid;
        }
        if high - low < DEPTH_TOLERANCE {
            break;
        }
    }
    0.5 * (low + high)
}
