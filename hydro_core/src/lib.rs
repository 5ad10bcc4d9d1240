//! # hydro_core - Hydraulic Conveyance Design Engine
//!
//! `hydro_core` is the computational heart of Cascade. It lays out linear
//! conveyance networks (channels, transitions, chutes) along a station axis
//! and designs the stilling basins that dissipate energy at chute outlets.
//! All inputs and outputs are JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Synchronous**: Every engine runs to completion on the caller's thread
//! - **JSON-First**: All types implement Serialize/Deserialize
//! - **Rich Errors**: Structured error types, not just strings
//! - **Arena Links**: Elements refer to each other by id, never by reference
//!
//! ## Quick Start
//!
//! ```rust
//! use hydro_core::basin::{design_basin, BasinDesignInput};
//!
//! // Q = 5 m³/s through a 2 m chute dropping 10 m
//! let result = design_basin(&BasinDesignInput::new(5.0, 2.0, 10.0)).unwrap();
//! println!("{} basin, {:.1} m long", result.config.basin_type.code(), result.config.length);
//! ```
//!
//! ## Modules
//!
//! - [`elements`] - Channels, transitions, chutes and cross sections
//! - [`network`] - Element store, connection manager and propagation engine
//! - [`basin`] - Stilling basin types and auto-design
//! - [`hydraulics`] - Manning, normal and critical depth
//! - [`project`] - Project container, metadata and design settings
//! - [`errors`] - Structured error types
//! - [`file_io`] - File operations with atomic saves and locking

pub mod basin;
pub mod elements;
pub mod errors;
#[cfg(not(target_arch = "wasm32"))]
pub mod file_io;
pub mod hydraulics;
pub mod id;
pub mod network;
pub mod project;

// Re-export commonly used types at crate root for convenience
pub use basin::{design_basin, BasinDesignInput, BasinDesignResult, StillingBasinConfig, StillingBasinType};
pub use elements::{Conveyance, HydraulicElement};
pub use errors::{DesignError, HydroError, HydroResult, NetworkError};
#[cfg(not(target_arch = "wasm32"))]
pub use file_io::{load_project, save_project, FileLock};
pub use id::ElementId;
pub use network::ElementStore;
pub use project::{DesignSettings, Project, ProjectMetadata};
