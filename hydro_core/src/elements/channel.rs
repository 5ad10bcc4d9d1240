//! # Open Channel
//!
//! A prismatic reach with a uniform bed slope. The simplest element: its
//! horizontal length is its length and its drop is `length * slope`.

use serde::{Deserialize, Serialize};

use super::section::CrossSection;
use super::{require_non_negative, require_positive, Conveyance};
use crate::errors::DesignResult;

/// Geometry of an open channel reach.
///
/// ## JSON Example
///
/// ```json
/// {
///   "length": 50.0,
///   "section": { "shape": "rectangular", "width": 2.0, "depth": 1.0 },
///   "thickness": 0.2,
///   "free_board": 0.3
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    /// Horizontal length of the reach (m)
    pub length: f64,

    /// Cross section
    pub section: CrossSection,

    /// Wall/floor thickness (m)
    pub thickness: f64,

    /// Free board above the design water surface (m)
    pub free_board: f64,
}

impl Channel {
    pub fn new(length: f64, section: CrossSection) -> Self {
        Channel {
            length,
            section,
            thickness: 0.2,
            free_board: 0.3,
        }
    }

    /// Water depth available below the free board (m)
    pub fn usable_depth(&self) -> f64 {
        (self.section.depth() - self.free_board).max(0.0)
    }
}

impl Conveyance for Channel {
    fn horizontal_length(&self) -> f64 {
        self.length
    }

    fn total_drop(&self, bed_slope: f64) -> f64 {
        self.length * bed_slope
    }

    fn section(&self) -> CrossSection {
        self.section
    }

    fn validate(&self) -> DesignResult<()> {
        require_positive("length", self.length)?;
        require_non_negative("thickness", self.thickness)?;
        require_non_negative("free_board", self.free_board)?;
        self.section.validate("section")
    }
}
