//! # Stilling Basin Auto-Design
//!
//! Classifies and dimensions a stilling basin at the toe of a chute from the
//! design discharge and the total drop, following USBR EM-25 conventions.
//!
//! ## Method
//!
//! 1. Entry velocity from the energy drop, `V = sqrt(2 g H)`. This is a
//!    free-fall estimate; no water-surface profile is integrated along the
//!    chute, so friction losses are ignored and `V` is an upper bound.
//! 2. Entry depth from continuity, `d1 = Q / (b V)`.
//! 3. `Fr = V / sqrt(g d1)`, then the basin type by Froude regime.
//! 4. Conjugate depth and free-jump length (see [`super::jump`]); the basin
//!    is the jump length plus 10%.
//! 5. Blocks and sill proportioned on `d1`.
//!
//! Anything outside published validity ranges is reported as a warning,
//! never an error.
//!
//! ## Example
//!
//! ```rust
//! use hydro_core::basin::{design_basin, BasinDesignInput, StillingBasinType};
//!
//! let input = BasinDesignInput::new(5.0, 2.0, 10.0);
//! let result = design_basin(&input).unwrap();
//!
//! assert_eq!(result.recommended_type, StillingBasinType::TypeIII);
//! assert!((result.outlet_velocity - 14.0).abs() < 0.05);
//! ```

use serde::{Deserialize, Serialize};

use super::config::{
    BaffleBlocks, ChuteBlocks, EndSill, EndSillType, StillingBasinConfig, StillingBasinType,
    DEFAULT_FLOOR_THICKNESS, DEFAULT_WINGWALL_ANGLE,
};
use super::jump::{conjugate_depth, energy_loss, jump_length, HydraulicJumpType};
use crate::elements::CrossSection;
use crate::errors::{DesignError, DesignResult};
use crate::hydraulics::{normal_depth, GRAVITY};

/// Safety margin applied to the free-jump length
pub const LENGTH_SAFETY_FACTOR: f64 = 1.1;

/// Upper Froude number of the classical basin designs
pub const MAX_VALIDATED_FROUDE: f64 = 17.0;

/// Entry velocity above which baffle piers risk cavitation damage (m/s)
pub const BAFFLE_VELOCITY_LIMIT: f64 = 15.0;

/// Entry velocity above which special protection is advisable (m/s)
pub const HIGH_VELOCITY: f64 = 20.0;

/// End sill height as a multiple of d1
const END_SILL_RATIO: f64 = 0.6;

/// Block spacing as a multiple of d1
const BLOCK_SPACING_RATIO: f64 = 0.5;

/// Tooth width/spacing of a dentated sill as a multiple of d2
const DENTATED_TOOTH_RATIO: f64 = 0.15;

/// Apron length downstream of the basin as a multiple of d2
const APRON_RATIO: f64 = 3.0;

/// Tailwater/d2 below which the jump may sweep out of the basin
const MIN_SUBMERGENCE: f64 = 0.85;

/// Tailwater/d2 above which the drowned jump loses efficiency
const MAX_SUBMERGENCE: f64 = 1.1;

/// How the basin type is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", content = "basin_type", rename_all = "snake_case")]
pub enum BasinSelection {
    /// Classify by Froude number and entry velocity
    #[default]
    Auto,
    /// Use the given type and report where it falls outside its range
    Fixed(StillingBasinType),
}

/// Hydraulic and geometric state at the chute toe.
///
/// ## JSON Example
///
/// ```json
/// {
///   "discharge": 5.0,
///   "width": 2.0,
///   "drop": 10.0,
///   "slope": 0.5,
///   "manning_n": 0.014,
///   "tailwater_depth": 0.0,
///   "selection": { "mode": "auto" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasinDesignInput {
    /// Design discharge Q (m³/s)
    pub discharge: f64,

    /// Chute width b at the toe (m)
    pub width: f64,

    /// Total drop H from the chute crest to the toe (m)
    pub drop: f64,

    /// Chute bed slope (m/m), used for the normal-depth cross-check
    #[serde(default)]
    pub slope: f64,

    /// Manning's n of the chute lining
    #[serde(default = "default_manning_n")]
    pub manning_n: f64,

    /// Available downstream water depth (m)
    #[serde(default)]
    pub tailwater_depth: f64,

    #[serde(default)]
    pub selection: BasinSelection,

    #[serde(default = "default_floor_thickness")]
    pub floor_thickness: f64,

    #[serde(default = "default_wingwall_angle")]
    pub wingwall_angle: f64,
}

fn default_manning_n() -> f64 {
    0.014
}

fn default_floor_thickness() -> f64 {
    DEFAULT_FLOOR_THICKNESS
}

fn default_wingwall_angle() -> f64 {
    DEFAULT_WINGWALL_ANGLE
}

impl BasinDesignInput {
    /// Input with default slope, roughness, tailwater and auto selection.
    pub fn new(discharge: f64, width: f64, drop: f64) -> Self {
        BasinDesignInput {
            discharge,
            width,
            drop,
            slope: 0.0,
            manning_n: default_manning_n(),
            tailwater_depth: 0.0,
            selection: BasinSelection::Auto,
            floor_thickness: DEFAULT_FLOOR_THICKNESS,
            wingwall_angle: DEFAULT_WINGWALL_ANGLE,
        }
    }

    pub fn with_tailwater(mut self, tailwater_depth: f64) -> Self {
        self.tailwater_depth = tailwater_depth;
        self
    }

    pub fn with_selection(mut self, selection: BasinSelection) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_chute(mut self, slope: f64, manning_n: f64) -> Self {
        self.slope = slope;
        self.manning_n = manning_n;
        self
    }

    /// Validate input parameters.
    pub fn validate(&self) -> DesignResult<()> {
        positive("discharge", self.discharge, "Discharge must be positive")?;
        positive("width", self.width, "Chute width must be positive")?;
        positive("drop", self.drop, "Drop must be positive for flow to enter the basin")?;
        positive("manning_n", self.manning_n, "Manning's n must be positive")?;
        non_negative("slope", self.slope)?;
        non_negative("tailwater_depth", self.tailwater_depth)?;
        non_negative("floor_thickness", self.floor_thickness)?;
        if !self.wingwall_angle.is_finite() {
            return Err(DesignError::invalid_input(
                "wingwall_angle",
                self.wingwall_angle.to_string(),
                "Wingwall angle must be a finite number",
            ));
        }
        Ok(())
    }
}

fn positive(field: &str, value: f64, reason: &str) -> DesignResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(DesignError::invalid_input(field, value.to_string(), reason))
    }
}

fn non_negative(field: &str, value: f64) -> DesignResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(DesignError::invalid_input(field, value.to_string(), "Value cannot be negative"))
    }
}

/// Complete basin design.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasinDesignResult {
    /// Froude number entering the basin
    pub froude_number: f64,

    /// Velocity entering the basin (m/s)
    pub outlet_velocity: f64,

    /// Type indicated by the Froude regime
    pub recommended_type: StillingBasinType,

    /// Basin as designed (type follows the selection)
    pub config: StillingBasinConfig,

    /// Advisory notes; the design is usable regardless
    pub warnings: Vec<String>,

    /// Supercritical depth d1 (m)
    pub supercritical_depth: f64,

    /// Sequent depth d2 (m)
    pub conjugate_depth: f64,

    /// Free-jump length (m)
    pub jump_length: f64,

    pub jump_type: HydraulicJumpType,

    /// Head dissipated in the jump (m)
    pub energy_loss: f64,

    /// Fraction of entry specific energy dissipated
    pub efficiency: f64,

    /// Tailwater / d2
    pub submergence_ratio: f64,

    /// Riprap apron length downstream of the sill (m)
    pub apron_length: f64,

    /// Manning normal depth on the chute, when a slope was given (m)
    pub chute_normal_depth: Option<f64>,
}

impl BasinDesignResult {
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Basin type for a Froude number and entry velocity.
///
/// Beyond Fr = 17 the nearest type is returned: type-iii at moderate
/// velocity, type-ii otherwise.
pub fn classify(froude: f64, velocity: f64) -> StillingBasinType {
    if froude < 1.7 {
        StillingBasinType::TypeI
    } else if froude < 2.5 {
        StillingBasinType::Saf
    } else if froude < 4.5 {
        StillingBasinType::TypeIV
    } else if velocity < BAFFLE_VELOCITY_LIMIT {
        StillingBasinType::TypeIII
    } else {
        StillingBasinType::TypeII
    }
}

/// Design a stilling basin.
///
/// # Returns
///
/// * `Ok(BasinDesignResult)` - Design with advisory warnings
/// * `Err(DesignError::InvalidInput)` - Non-positive or non-finite input
pub fn design_basin(input: &BasinDesignInput) -> DesignResult<BasinDesignResult> {
    input.validate()?;

    let velocity = (2.0 * GRAVITY * input.drop).sqrt();
    let d1 = input.discharge / (input.width * velocity);
    let froude = velocity / (GRAVITY * d1).sqrt();

    if !(d1.is_finite() && d1 > 0.0 && froude.is_finite()) {
        return Err(DesignError::invalid_input(
            "discharge",
            input.discharge.to_string(),
            "Entry depth is too small to evaluate",
        ));
    }

    let mut warnings = Vec::new();
    let recommended_type = classify(froude, velocity);

    if froude <= 1.0 {
        warnings.push(format!(
            "Entry flow is not supercritical (Fr = {:.2}); no hydraulic jump will form",
            froude
        ));
    }
    if froude >= MAX_VALIDATED_FROUDE {
        warnings.push(format!(
            "Fr = {:.2} exceeds {:.0}; classical basin types are not validated for this regime, using nearest type {}",
            froude,
            MAX_VALIDATED_FROUDE,
            recommended_type.code()
        ));
    }

    let basin_type = match input.selection {
        BasinSelection::Auto => recommended_type,
        BasinSelection::Fixed(chosen) => {
            if chosen != recommended_type {
                warnings.push(format!(
                    "Selected basin {} differs from recommended {} for Fr = {:.2}, V = {:.1} m/s",
                    chosen.code(),
                    recommended_type.code(),
                    froude,
                    velocity
                ));
            }
            chosen
        }
    };

    // The out-of-regime warning above already covers the nearest-type fallback
    if !(matches!(input.selection, BasinSelection::Auto) && froude >= MAX_VALIDATED_FROUDE) {
        warnings.extend(range_warnings(basin_type, froude, velocity));
    }

    if (2.5..4.5).contains(&froude) {
        warnings.push("Oscillating jump (Fr 2.5-4.5) may produce waves and erosion downstream".to_string());
    }
    if velocity > HIGH_VELOCITY {
        warnings.push(format!(
            "High entry velocity ({:.1} m/s); consider special protection against cavitation and abrasion",
            velocity
        ));
    }

    let d2 = conjugate_depth(d1, froude);
    // Sub-critical entry: no jump, d2 < d1
    let jump = jump_length(d1, d2).max(0.0);
    let length = LENGTH_SAFETY_FACTOR * jump;

    if !(d2.is_finite() && length.is_finite()) {
        return Err(DesignError::invalid_input(
            "discharge",
            input.discharge.to_string(),
            "Conjugate depth overflows for this discharge, width and drop",
        ));
    }

    let unclamped_depth = d2 - input.tailwater_depth;
    if unclamped_depth < 0.0 {
        warnings.push(format!(
            "Tailwater ({:.2} m) exceeds the conjugate depth ({:.2} m); basin floor depth clamped to 0 and the jump will be drowned",
            input.tailwater_depth, d2
        ));
    }
    let depth = unclamped_depth.max(0.0);

    let submergence_ratio = input.tailwater_depth / d2;
    if input.tailwater_depth > 0.0 && submergence_ratio < MIN_SUBMERGENCE {
        warnings.push(format!(
            "Low submergence ratio ({:.2}); the jump may sweep out without the floor depression",
            submergence_ratio
        ));
    } else if submergence_ratio > MAX_SUBMERGENCE {
        warnings.push(format!(
            "High submergence ratio ({:.2}); the drowned jump dissipates less energy",
            submergence_ratio
        ));
    }

    let (chute_blocks, baffle_blocks, end_sill) = size_components(basin_type, d1, d2, input.width, length);
    if let Some(blocks) = chute_blocks {
        if blocks.count < 2 {
            warnings.push(format!(
                "Only {} chute block fits across {:.2} m; chute is narrow relative to d1 = {:.3} m",
                blocks.count, input.width, d1
            ));
        }
    }

    let config = if basin_type == StillingBasinType::None {
        StillingBasinConfig {
            basin_type,
            length: 0.0,
            depth: 0.0,
            floor_thickness: input.floor_thickness,
            chute_blocks: None,
            baffle_blocks: None,
            end_sill: None,
            wingwall_angle: input.wingwall_angle,
        }
    } else {
        StillingBasinConfig {
            basin_type,
            length,
            depth,
            floor_thickness: input.floor_thickness,
            chute_blocks,
            baffle_blocks,
            end_sill,
            wingwall_angle: input.wingwall_angle,
        }
    };

    let loss = energy_loss(d1, d2).max(0.0);
    let entry_energy = d1 + velocity.powi(2) / (2.0 * GRAVITY);

    let chute_normal_depth = if input.slope > 0.0 {
        normal_depth(
            &CrossSection::rectangular(input.width, d1.max(1.0)),
            input.discharge,
            input.slope,
            input.manning_n,
        )
        .ok()
    } else {
        None
    };

    tracing::info!(
        froude,
        velocity,
        d1,
        d2,
        basin = basin_type.code(),
        warnings = warnings.len(),
        "stilling basin designed"
    );

    Ok(BasinDesignResult {
        froude_number: froude,
        outlet_velocity: velocity,
        recommended_type,
        config,
        warnings,
        supercritical_depth: d1,
        conjugate_depth: d2,
        jump_length: jump,
        jump_type: HydraulicJumpType::from_froude(froude),
        energy_loss: loss,
        efficiency: loss / entry_energy,
        submergence_ratio,
        apron_length: APRON_RATIO * d2,
        chute_normal_depth,
    })
}

fn range_warnings(basin_type: StillingBasinType, froude: f64, velocity: f64) -> Vec<String> {
    let mut warnings = Vec::new();
    if let Some((min, max)) = basin_type.froude_range() {
        if froude < min || froude >= max {
            let upper = if max.is_finite() {
                format!("{:.1}", max)
            } else {
                "∞".to_string()
            };
            warnings.push(format!(
                "Fr = {:.2} is outside the published range [{:.1}, {}) for {}",
                froude,
                min,
                upper,
                basin_type.code()
            ));
        }
    }
    if let Some(limit) = basin_type.max_velocity() {
        if velocity >= limit {
            warnings.push(format!(
                "Entry velocity {:.1} m/s exceeds the {:.0} m/s limit for {}; baffle piers risk cavitation damage",
                velocity,
                limit,
                basin_type.code()
            ));
        }
    }
    warnings
}

fn size_components(
    basin_type: StillingBasinType,
    d1: f64,
    d2: f64,
    width: f64,
    length: f64,
) -> (Option<ChuteBlocks>, Option<BaffleBlocks>, Option<EndSill>) {
    let spacing = BLOCK_SPACING_RATIO * d1;
    let count = ((width / (d1 + spacing)).floor() as u32).max(1);

    let chute_blocks = basin_type.uses_chute_blocks().then_some(ChuteBlocks {
        count,
        width: d1,
        height: d1,
        thickness: d1,
        spacing,
    });

    let baffle_blocks = match basin_type {
        StillingBasinType::TypeIII => Some(BaffleBlocks {
            rows: 1,
            blocks_per_row: count,
            width: d1,
            height: d1,
            thickness: d1,
            distance_from_inlet: 0.8 * length,
            row_spacing: 0.0,
        }),
        StillingBasinType::Saf => Some(BaffleBlocks {
            rows: 2,
            blocks_per_row: count,
            width: d1,
            height: d1,
            thickness: d1,
            distance_from_inlet: 0.4 * length,
            row_spacing: 0.2 * length,
        }),
        _ => None,
    };

    let sill_height = END_SILL_RATIO * d1;
    let end_sill = basin_type.uses_end_sill().then(|| match basin_type.end_sill_type() {
        EndSillType::Dentated => EndSill::dentated(
            sill_height,
            DENTATED_TOOTH_RATIO * d2,
            DENTATED_TOOTH_RATIO * d2,
        ),
        EndSillType::Solid => EndSill::solid(sill_height),
    });

    (chute_blocks, baffle_blocks, end_sill)
}

/// Check a manually chosen basin against the hydraulics of `input`.
///
/// Returns advisory warnings; an empty list means the basin meets the
/// auto-designed dimensions for its type.
pub fn check_basin(config: &StillingBasinConfig, input: &BasinDesignInput) -> DesignResult<Vec<String>> {
    let reference = design_basin(&input.clone().with_selection(BasinSelection::Fixed(config.basin_type)))?;
    let required = &reference.config;
    let mut warnings = range_warnings(config.basin_type, reference.froude_number, reference.outlet_velocity);

    if config.basin_type == StillingBasinType::None {
        if reference.recommended_type != StillingBasinType::None {
            warnings.push(format!(
                "No basin provided; Fr = {:.2} calls for {}",
                reference.froude_number,
                reference.recommended_type.code()
            ));
        }
        return Ok(warnings);
    }

    if config.length < required.length {
        warnings.push(format!(
            "Basin length {:.2} m is shorter than the required {:.2} m",
            config.length, required.length
        ));
    }
    if config.depth < required.depth {
        warnings.push(format!(
            "Basin depth {:.2} m is shallower than the required {:.2} m",
            config.depth, required.depth
        ));
    }
    if config.end_sill.is_none() {
        warnings.push(format!("{} basin has no end sill", config.basin_type.code()));
    }
    if config.basin_type.uses_chute_blocks() && config.chute_blocks.is_none() {
        warnings.push(format!("{} basin has no chute blocks", config.basin_type.code()));
    }
    if config.basin_type.uses_baffle_blocks() && config.baffle_blocks.is_none() {
        warnings.push(format!("{} basin has no baffle blocks", config.basin_type.code()));
    }

    Ok(warnings)
}
