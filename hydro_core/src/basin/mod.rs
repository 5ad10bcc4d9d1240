//! # Stilling Basins
//!
//! Energy dissipators at the toe of a chute.
//!
//! - [`config`] - Basin types, components and the persisted configuration
//! - [`jump`] - Hydraulic jump relations
//! - [`design`] - Auto-design and checking of manual basins

pub mod config;
pub mod design;
pub mod jump;

pub use config::{
    build_manual_basin, BaffleBlocks, ChuteBlocks, EndSill, EndSillType, StillingBasinConfig,
    StillingBasinType,
};
pub use design::{check_basin, classify, design_basin, BasinDesignInput, BasinDesignResult, BasinSelection};
pub use jump::HydraulicJumpType;
