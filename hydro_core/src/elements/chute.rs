//! # Chute
//!
//! A steep conveyance made of a short, mild inlet reach followed by the main
//! steep section. High-velocity flow leaves the chute at its toe, which is
//! where the optional stilling basin sits.
//!
//! ```text
//!  start ─── inlet (inlet_length @ inlet_slope)
//!                 ╲
//!                  ╲  main section (length, drop)
//!                   ╲
//!                    ╲____ basin
//! ```

use serde::{Deserialize, Serialize};

use super::section::CrossSection;
use super::{require_non_negative, require_positive, Conveyance};
use crate::basin::StillingBasinConfig;
use crate::errors::DesignResult;

/// Surface treatment of the main chute section.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChuteType {
    #[default]
    Smooth,
    Stepped { step_height: f64, step_length: f64 },
    Baffled { baffle_spacing: f64, baffle_height: f64 },
    Ogee,
    Converging,
}

impl ChuteType {
    pub fn name(&self) -> &'static str {
        match self {
            ChuteType::Smooth => "smooth",
            ChuteType::Stepped { .. } => "stepped",
            ChuteType::Baffled { .. } => "baffled",
            ChuteType::Ogee => "ogee",
            ChuteType::Converging => "converging",
        }
    }
}

/// Geometry of a chute.
///
/// ## JSON Example
///
/// ```json
/// {
///   "inlet_length": 1.0,
///   "inlet_slope": 0.0,
///   "length": 20.0,
///   "drop": 10.0,
///   "width": 2.0,
///   "depth": 1.0,
///   "side_slope": 0.0,
///   "thickness": 0.2,
///   "chute_type": { "kind": "smooth" },
///   "stilling_basin": null
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chute {
    /// Horizontal length of the inlet reach (m)
    pub inlet_length: f64,

    /// Bed slope of the inlet reach (m/m)
    pub inlet_slope: f64,

    /// Horizontal length of the main steep section (m)
    pub length: f64,

    /// Elevation drop over the main section (m)
    pub drop: f64,

    /// Bottom width (m)
    pub width: f64,

    /// Wall height (m)
    pub depth: f64,

    /// Side slope H:V, 0 for vertical walls
    #[serde(default)]
    pub side_slope: f64,

    /// Wall/floor thickness (m)
    pub thickness: f64,

    #[serde(default)]
    pub chute_type: ChuteType,

    /// Energy dissipator at the toe; replaced wholesale, never patched
    #[serde(default)]
    pub stilling_basin: Option<StillingBasinConfig>,
}

impl Chute {
    pub fn new(length: f64, drop: f64, width: f64, depth: f64) -> Self {
        Chute {
            inlet_length: 0.0,
            inlet_slope: 0.0,
            length,
            drop,
            width,
            depth,
            side_slope: 0.0,
            thickness: 0.2,
            chute_type: ChuteType::default(),
            stilling_basin: None,
        }
    }

    pub fn with_inlet(mut self, inlet_length: f64, inlet_slope: f64) -> Self {
        self.inlet_length = inlet_length;
        self.inlet_slope = inlet_slope;
        self
    }

    pub fn with_type(mut self, chute_type: ChuteType) -> Self {
        self.chute_type = chute_type;
        self
    }

    /// Slope of the main steep section (m/m)
    pub fn main_slope(&self) -> f64 {
        if self.length > 0.0 {
            self.drop / self.length
        } else {
            0.0
        }
    }

    /// Drop over the inlet reach (m)
    pub fn inlet_drop(&self) -> f64 {
        self.inlet_length * self.inlet_slope
    }

    /// Number of steps for a stepped chute, `None` for other types
    pub fn step_count(&self) -> Option<u32> {
        match self.chute_type {
            ChuteType::Stepped { step_height, .. } if step_height > 0.0 => {
                Some((self.drop / step_height).ceil() as u32)
            }
            _ => None,
        }
    }
}

impl Conveyance for Chute {
    fn horizontal_length(&self) -> f64 {
        self.inlet_length + self.length
    }

    fn total_drop(&self, _bed_slope: f64) -> f64 {
        self.inlet_drop() + self.drop
    }

    fn drop_at(&self, distance: f64, _bed_slope: f64) -> f64 {
        let x = distance.clamp(0.0, self.horizontal_length());
        if x <= self.inlet_length {
            x * self.inlet_slope
        } else {
            self.inlet_drop() + (x - self.inlet_length) * self.main_slope()
        }
    }

    fn section(&self) -> CrossSection {
        if self.side_slope > 0.0 {
            CrossSection::trapezoidal(self.width, self.depth, self.side_slope)
        } else {
            CrossSection::rectangular(self.width, self.depth)
        }
    }

    fn validate(&self) -> DesignResult<()> {
        require_non_negative("inlet_length", self.inlet_length)?;
        require_non_negative("inlet_slope", self.inlet_slope)?;
        require_positive("length", self.length)?;
        require_non_negative("drop", self.drop)?;
        require_positive("width", self.width)?;
        require_positive("depth", self.depth)?;
        require_non_negative("side_slope", self.side_slope)?;
        require_non_negative("thickness", self.thickness)?;
        match self.chute_type {
            ChuteType::Stepped { step_height, step_length } => {
                require_positive("step_height", step_height)?;
                require_positive("step_length", step_length)?;
            }
            ChuteType::Baffled { baffle_spacing, baffle_height } => {
                require_positive("baffle_spacing", baffle_spacing)?;
                require_positive("baffle_height", baffle_height)?;
            }
            _ => {}
        }
        Ok(())
    }
}
