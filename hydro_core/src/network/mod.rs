//! # Conveyance Network
//!
//! A network is a set of linear chains of elements held in an
//! [`ElementStore`]. Links are edited only through the connection functions
//! in this module, which keep them symmetric and acyclic and re-run
//! [`propagate`] so every element starts where its predecessor ends.
//!
//! ## Example
//!
//! ```rust
//! use hydro_core::elements::{Channel, Chute, CrossSection, HydraulicElement};
//! use hydro_core::network::{connect, ElementStore};
//!
//! let mut store = ElementStore::new();
//! let channel = store.insert(HydraulicElement::channel(
//!     "CH-1",
//!     Channel::new(50.0, CrossSection::rectangular(2.0, 1.0)),
//!     0.015,
//!     0.01,
//! ));
//! let chute = store.insert(HydraulicElement::chute(
//!     "R-1",
//!     Chute::new(20.0, 10.0, 2.0, 1.0).with_inlet(1.0, 0.0),
//!     0.014,
//! ));
//!
//! connect(&mut store, channel, chute).unwrap();
//!
//! let placed = store.get(chute).unwrap().placement;
//! assert_eq!(placed.start_station, 50.0);
//! assert_eq!(placed.end_station, 71.0);
//! ```

pub mod connection;
pub mod propagation;
pub mod store;

pub use connection::{
    auto_design_basin, connect, disconnect, edit_element, remove_element, BasinRequest, LinkSide,
};
pub use propagation::{propagate, relocate};
pub use store::ElementStore;
