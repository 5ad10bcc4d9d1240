//! # Cross Sections
//!
//! Prismatic cross-section descriptors shared by all element kinds, plus the
//! geometric properties needed for open-channel flow at a given water depth.
//!
//! ## JSON Example
//!
//! ```json
//! { "shape": "trapezoidal", "bottom_width": 2.0, "depth": 1.2, "side_slope": 1.5 }
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{DesignError, DesignResult};

/// Cross-section shape and size. Side slopes are horizontal:vertical.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum CrossSection {
    Rectangular { width: f64, depth: f64 },
    Trapezoidal { bottom_width: f64, depth: f64, side_slope: f64 },
    Triangular { depth: f64, side_slope: f64 },
}

/// Flow-area properties at a particular water depth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SectionProperties {
    /// Water depth the properties were evaluated at (m)
    pub water_depth: f64,
    /// Flow area A (m²)
    pub area: f64,
    /// Wetted perimeter P (m)
    pub wetted_perimeter: f64,
    /// Hydraulic radius R = A/P (m)
    pub hydraulic_radius: f64,
    /// Free-surface width T (m)
    pub top_width: f64,
    /// Hydraulic depth D = A/T (m)
    pub hydraulic_depth: f64,
}

impl CrossSection {
    pub fn rectangular(width: f64, depth: f64) -> Self {
        CrossSection::Rectangular { width, depth }
    }

    pub fn trapezoidal(bottom_width: f64, depth: f64, side_slope: f64) -> Self {
        CrossSection::Trapezoidal {
            bottom_width,
            depth,
            side_slope,
        }
    }

    pub fn triangular(depth: f64, side_slope: f64) -> Self {
        CrossSection::Triangular { depth, side_slope }
    }

    /// Section name as used in the `shape` tag
    pub fn shape_name(&self) -> &'static str {
        match self {
            CrossSection::Rectangular { .. } => "rectangular",
            CrossSection::Trapezoidal { .. } => "trapezoidal",
            CrossSection::Triangular { .. } => "triangular",
        }
    }

    /// Structural depth of the section (m)
    pub fn depth(&self) -> f64 {
        match *self {
            CrossSection::Rectangular { depth, .. }
            | CrossSection::Trapezoidal { depth, .. }
            | CrossSection::Triangular { depth, .. } => depth,
        }
    }

    /// Bottom (invert) width (m); zero for triangular sections
    pub fn bottom_width(&self) -> f64 {
        match *self {
            CrossSection::Rectangular { width, .. } => width,
            CrossSection::Trapezoidal { bottom_width, .. } => bottom_width,
            CrossSection::Triangular { .. } => 0.0,
        }
    }

    /// Width at the top of the section (m)
    pub fn top_width(&self) -> f64 {
        self.surface_width(self.depth())
    }

    fn side_slope(&self) -> f64 {
        match *self {
            CrossSection::Rectangular { .. } => 0.0,
            CrossSection::Trapezoidal { side_slope, .. } | CrossSection::Triangular { side_slope, .. } => side_slope,
        }
    }

    fn surface_width(&self, water_depth: f64) -> f64 {
        self.bottom_width() + 2.0 * self.side_slope() * water_depth
    }

    /// Flow properties at `water_depth`.
    ///
    /// Depths above the section rim are evaluated as if the walls continued;
    /// the caller decides whether overtopping matters.
    pub fn properties(&self, water_depth: f64) -> SectionProperties {
        let y = water_depth.max(0.0);
        let b = self.bottom_width();
        let z = self.side_slope();

        let area = (b + z * y) * y;
        let wetted_perimeter = b + 2.0 * y * (1.0 + z * z).sqrt();
        let top_width = self.surface_width(y);

        SectionProperties {
            water_depth: y,
            area,
            wetted_perimeter,
            hydraulic_radius: if wetted_perimeter > 0.0 { area / wetted_perimeter } else { 0.0 },
            top_width,
            hydraulic_depth: if top_width > 0.0 { area / top_width } else { 0.0 },
        }
    }

    /// Validate dimensions. `field` prefixes the reported field name.
    pub fn validate(&self, field: &str) -> DesignResult<()> {
        let depth = self.depth();
        if !(depth.is_finite() && depth > 0.0) {
            return Err(DesignError::invalid_input(
                format!("{}.depth", field),
                depth.to_string(),
                "Section depth must be positive",
            ));
        }
        let side_slope = self.side_slope();
        if !(side_slope.is_finite() && side_slope >= 0.0) {
            return Err(DesignError::invalid_input(
                format!("{}.side_slope", field),
                side_slope.to_string(),
                "Side slope cannot be negative",
            ));
        }
        match *self {
            CrossSection::Rectangular { width, .. } if !(width.is_finite() && width > 0.0) => {
                Err(DesignError::invalid_input(
                    format!("{}.width", field),
                    width.to_string(),
                    "Width must be positive",
                ))
            }
            CrossSection::Trapezoidal { bottom_width, .. } if !(bottom_width.is_finite() && bottom_width >= 0.0) => {
                Err(DesignError::invalid_input(
                    format!("{}.bottom_width", field),
                    bottom_width.to_string(),
                    "Bottom width cannot be negative",
                ))
            }
            CrossSection::Triangular { side_slope, .. } if side_slope <= 0.0 => Err(DesignError::invalid_input(
                format!("{}.side_slope", field),
                side_slope.to_string(),
                "Triangular section needs a positive side slope",
            )),
            _ => Ok(()),
        }
    }
}
