//! # Stilling Basin Configuration
//!
//! The persisted description of a basin: USBR type, overall dimensions and
//! the optional chute blocks, baffle blocks and end sill. A configuration is
//! owned by its chute and always replaced as a whole.
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "type": "type-iii",
//!   "length": 18.26,
//!   "depth": 2.58,
//!   "floor_thickness": 0.3,
//!   "chute_blocks": { "count": 7, "width": 0.18, "height": 0.18, "thickness": 0.18, "spacing": 0.09 },
//!   "baffle_blocks": {
//!     "rows": 1, "blocks_per_row": 7, "width": 0.18, "height": 0.18, "thickness": 0.18,
//!     "distance_from_inlet": 14.61, "row_spacing": 0.0
//!   },
//!   "end_sill": { "type": "solid", "height": 0.11 },
//!   "wingwall_angle": 45.0
//! }
//! ```

use serde::{Deserialize, Serialize};

/// Default basin floor slab thickness (m)
pub const DEFAULT_FLOOR_THICKNESS: f64 = 0.30;

/// Default wingwall flare angle (degrees)
pub const DEFAULT_WINGWALL_ANGLE: f64 = 45.0;

/// USBR basin types (EM-25) plus the Saint Anthony Falls basin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StillingBasinType {
    #[serde(rename = "type-i")]
    TypeI,
    #[serde(rename = "type-ii")]
    TypeII,
    #[serde(rename = "type-iii")]
    TypeIII,
    #[serde(rename = "type-iv")]
    TypeIV,
    #[serde(rename = "saf")]
    Saf,
    #[default]
    #[serde(rename = "none")]
    None,
}

impl StillingBasinType {
    /// Identifier as written in project files
    pub fn code(&self) -> &'static str {
        match self {
            StillingBasinType::TypeI => "type-i",
            StillingBasinType::TypeII => "type-ii",
            StillingBasinType::TypeIII => "type-iii",
            StillingBasinType::TypeIV => "type-iv",
            StillingBasinType::Saf => "saf",
            StillingBasinType::None => "none",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            StillingBasinType::TypeI => "Undular jump, no appurtenances",
            StillingBasinType::TypeII => "High-velocity basin: chute blocks and dentated end sill",
            StillingBasinType::TypeIII => "Short basin: chute blocks, baffle piers and solid end sill",
            StillingBasinType::TypeIV => "Oscillating jump basin with wave suppression",
            StillingBasinType::Saf => "Saint Anthony Falls basin for small structures",
            StillingBasinType::None => "No basin",
        }
    }

    /// Published Froude-number range `[min, max)` for the type.
    pub fn froude_range(&self) -> Option<(f64, f64)> {
        match self {
            StillingBasinType::TypeI => Some((0.0, 1.7)),
            StillingBasinType::Saf => Some((1.7, 17.0)),
            StillingBasinType::TypeIV => Some((2.5, 4.5)),
            StillingBasinType::TypeIII => Some((4.5, 17.0)),
            StillingBasinType::TypeII => Some((4.5, f64::INFINITY)),
            StillingBasinType::None => None,
        }
    }

    /// Entry velocity the type is limited to (m/s), if any
    pub fn max_velocity(&self) -> Option<f64> {
        match self {
            StillingBasinType::TypeIII => Some(15.0),
            _ => None,
        }
    }

    pub fn uses_chute_blocks(&self) -> bool {
        matches!(
            self,
            StillingBasinType::TypeII | StillingBasinType::TypeIII | StillingBasinType::Saf
        )
    }

    pub fn uses_baffle_blocks(&self) -> bool {
        matches!(self, StillingBasinType::TypeIII | StillingBasinType::Saf)
    }

    pub fn uses_end_sill(&self) -> bool {
        !matches!(self, StillingBasinType::None)
    }

    /// Sill style used by the type
    pub fn end_sill_type(&self) -> EndSillType {
        match self {
            StillingBasinType::TypeII => EndSillType::Dentated,
            _ => EndSillType::Solid,
        }
    }
}

/// Row of chute blocks at the basin entrance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChuteBlocks {
    pub count: u32,
    pub width: f64,
    pub height: f64,
    pub thickness: f64,
    pub spacing: f64,
}

/// Baffle piers on the basin floor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaffleBlocks {
    pub rows: u32,
    pub blocks_per_row: u32,
    pub width: f64,
    pub height: f64,
    pub thickness: f64,
    /// Distance from the basin entrance to the first row (m)
    pub distance_from_inlet: f64,
    /// Distance between consecutive rows (m)
    pub row_spacing: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndSillType {
    Solid,
    Dentated,
}

/// Sill at the basin exit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EndSill {
    #[serde(rename = "type")]
    pub sill_type: EndSillType,
    pub height: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooth_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tooth_spacing: Option<f64>,
}

impl EndSill {
    pub fn solid(height: f64) -> Self {
        EndSill {
            sill_type: EndSillType::Solid,
            height,
            tooth_width: None,
            tooth_spacing: None,
        }
    }

    pub fn dentated(height: f64, tooth_width: f64, tooth_spacing: f64) -> Self {
        EndSill {
            sill_type: EndSillType::Dentated,
            height,
            tooth_width: Some(tooth_width),
            tooth_spacing: Some(tooth_spacing),
        }
    }
}

/// Complete stilling basin configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StillingBasinConfig {
    #[serde(rename = "type")]
    pub basin_type: StillingBasinType,

    /// Basin length along the flow (m)
    pub length: f64,

    /// Floor depression below the downstream invert (m)
    pub depth: f64,

    /// Floor slab thickness (m)
    pub floor_thickness: f64,

    #[serde(default)]
    pub chute_blocks: Option<ChuteBlocks>,

    #[serde(default)]
    pub baffle_blocks: Option<BaffleBlocks>,

    #[serde(default)]
    pub end_sill: Option<EndSill>,

    /// Wingwall flare angle (degrees)
    #[serde(default)]
    pub wingwall_angle: f64,
}

impl StillingBasinConfig {
    /// Estimated concrete volume (m³) for a basin `width` wide with side
    /// walls `wall_height` tall and `wall_thickness` thick.
    pub fn concrete_volume(&self, width: f64, wall_height: f64, wall_thickness: f64) -> f64 {
        let floor = self.length * width * self.floor_thickness;
        let walls = 2.0 * self.length * wall_height * wall_thickness;

        let chute_blocks = self
            .chute_blocks
            .map(|b| b.count as f64 * b.width * b.height * b.thickness)
            .unwrap_or(0.0);

        let baffles = self
            .baffle_blocks
            .map(|b| (b.rows * b.blocks_per_row) as f64 * b.width * b.height * b.thickness)
            .unwrap_or(0.0);

        let sill = match self.end_sill {
            Some(EndSill {
                sill_type: EndSillType::Solid,
                height,
                ..
            }) => height * width * wall_thickness,
            // Roughly half the crest is cut away between teeth
            Some(EndSill {
                sill_type: EndSillType::Dentated,
                height,
                ..
            }) => 0.5 * height * width * wall_thickness,
            None => 0.0,
        };

        floor + walls + chute_blocks + baffles + sill
    }
}

/// Build a basin from user-supplied dimensions, without auto-design.
///
/// No blocks are generated. An end sill is added when `end_sill_height > 0`
/// (dentated for type-ii, solid otherwise). Negative dimensions are clamped
/// to zero.
///
/// # Example
///
/// ```rust
/// use hydro_core::basin::{build_manual_basin, StillingBasinType, EndSillType};
///
/// let basin = build_manual_basin(StillingBasinType::TypeII, 12.0, 1.5, 0.3);
/// assert_eq!(basin.end_sill.unwrap().sill_type, EndSillType::Dentated);
/// assert!(basin.chute_blocks.is_none());
/// ```
pub fn build_manual_basin(
    basin_type: StillingBasinType,
    length: f64,
    depth: f64,
    end_sill_height: f64,
) -> StillingBasinConfig {
    let end_sill_height = end_sill_height.max(0.0);
    let end_sill = (end_sill_height > 0.0 && basin_type.uses_end_sill()).then(|| match basin_type.end_sill_type() {
        EndSillType::Dentated => EndSill::dentated(end_sill_height, end_sill_height, end_sill_height),
        EndSillType::Solid => EndSill::solid(end_sill_height),
    });

    StillingBasinConfig {
        basin_type,
        length: length.max(0.0),
        depth: depth.max(0.0),
        floor_thickness: DEFAULT_FLOOR_THICKNESS,
        chute_blocks: None,
        baffle_blocks: None,
        end_sill,
        wingwall_angle: DEFAULT_WINGWALL_ANGLE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_codes_match_serialization() {
        for t in [
            StillingBasinType::TypeI,
            StillingBasinType::TypeII,
            StillingBasinType::TypeIII,
            StillingBasinType::TypeIV,
            StillingBasinType::Saf,
            StillingBasinType::None,
        ] {
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.code()));
            let roundtrip: StillingBasinType = serde_json::from_str(&json).unwrap();
            assert_eq!(roundtrip, t);
        }
    }

    #[test]
    fn test_component_usage() {
        assert!(!StillingBasinType::TypeI.uses_chute_blocks());
        assert!(StillingBasinType::TypeII.uses_chute_blocks());
        assert!(!StillingBasinType::TypeII.uses_baffle_blocks());
        assert!(StillingBasinType::TypeIII.uses_baffle_blocks());
        assert!(StillingBasinType::Saf.uses_baffle_blocks());
        assert!(!StillingBasinType::TypeIV.uses_chute_blocks());
    }

    #[test]
    fn test_manual_basin_solid_sill() {
        let b = build_manual_basin(StillingBasinType::TypeIII, 15.0, 2.0, 0.4);
        assert_eq!(b.length, 15.0);
        assert_eq!(b.depth, 2.0);
        let sill = b.end_sill.unwrap();
        assert_eq!(sill.sill_type, EndSillType::Solid);
        assert!(sill.tooth_width.is_none());
        assert_eq!(b.floor_thickness, DEFAULT_FLOOR_THICKNESS);
        assert_eq!(b.wingwall_angle, DEFAULT_WINGWALL_ANGLE);
    }

    #[test]
    fn test_manual_basin_without_sill_and_clamping() {
        let b = build_manual_basin(StillingBasinType::TypeI, -3.0, -1.0, 0.0);
        assert_eq!(b.length, 0.0);
        assert_eq!(b.depth, 0.0);
        assert!(b.end_sill.is_none());

        let none = build_manual_basin(StillingBasinType::None, 5.0, 1.0, 0.5);
        assert!(none.end_sill.is_none());
    }

    #[test]
    fn test_concrete_volume() {
        let mut b = build_manual_basin(StillingBasinType::TypeIII, 10.0, 1.0, 0.5);
        b.chute_blocks = Some(ChuteBlocks {
            count: 4,
            width: 0.5,
            height: 0.5,
            thickness: 0.5,
            spacing: 0.25,
        });
        // floor 10*2*0.3 = 6, walls 2*10*2*0.3 = 12, blocks 4*0.125 = 0.5, sill 0.5*2*0.3 = 0.3
        let v = b.concrete_volume(2.0, 2.0, 0.3);
        assert!((v - 18.8).abs() < 1e-9);
    }

    #[test]
    fn test_config_json_shape() {
        let b = build_manual_basin(StillingBasinType::TypeII, 12.0, 1.5, 0.3);
        let value = serde_json::to_value(&b).unwrap();
        assert_eq!(value["type"], "type-ii");
        assert_eq!(value["end_sill"]["type"], "dentated");
        let roundtrip: StillingBasinConfig = serde_json::from_value(value).unwrap();
        assert_eq!(roundtrip, b);
    }
}
