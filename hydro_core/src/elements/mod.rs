//! # Hydraulic Elements
//!
//! The building blocks of a conveyance network. Every element carries the
//! same envelope (id, label, roughness, bed slope, placement, links) plus a
//! kind-specific geometry:
//!
//! - [`channel`] - Prismatic open channel
//! - [`transition`] - Section change between two channels
//! - [`chute`] - Steep drop structure with an optional stilling basin
//! - [`section`] - Cross-section descriptors shared by all kinds
//!
//! Each geometry implements [`Conveyance`], which is all the propagation
//! engine needs to place an element.
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "id": "6f1c2b7e-2a4e-4b8e-9a53-2f1d1f4c0a11",
//!   "label": "CH-1",
//!   "type": "Channel",
//!   "length": 50.0,
//!   "section": { "shape": "rectangular", "width": 2.0, "depth": 1.0 },
//!   "thickness": 0.2,
//!   "free_board": 0.3,
//!   "manning_n": 0.015,
//!   "slope": 0.01,
//!   "start_station": 0.0,
//!   "start_elevation": 0.0,
//!   "end_station": 50.0,
//!   "end_elevation": -0.5,
//!   "upstream_id": null,
//!   "downstream_id": null
//! }
//! ```

pub mod channel;
pub mod chute;
pub mod section;
pub mod transition;

use serde::{Deserialize, Serialize};

use crate::errors::{DesignError, DesignResult};
use crate::id::ElementId;

pub use channel::Channel;
pub use chute::{Chute, ChuteType};
pub use section::{CrossSection, SectionProperties};
pub use transition::{Transition, TransitionType};

/// Geometry that can be laid out along the network axis.
pub trait Conveyance {
    /// Horizontal distance covered by the element (m)
    fn horizontal_length(&self) -> f64;

    /// Invert drop from start to end (m). `bed_slope` is the element's
    /// common slope; geometries with their own drop definition ignore it.
    fn total_drop(&self, bed_slope: f64) -> f64;

    /// Drop accumulated `distance` metres downstream of the start (m).
    fn drop_at(&self, distance: f64, bed_slope: f64) -> f64 {
        let length = self.horizontal_length();
        if length <= 0.0 {
            return 0.0;
        }
        self.total_drop(bed_slope) * (distance / length).clamp(0.0, 1.0)
    }

    /// Representative cross section (the inlet section for transitions)
    fn section(&self) -> CrossSection;

    /// Check dimensions
    fn validate(&self) -> DesignResult<()>;
}

/// Kind-specific geometry. Serialized inline with a `type` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ElementKind {
    Channel(Channel),
    Transition(Transition),
    Chute(Chute),
}

impl ElementKind {
    pub fn as_conveyance(&self) -> &dyn Conveyance {
        match self {
            ElementKind::Channel(c) => c,
            ElementKind::Transition(t) => t,
            ElementKind::Chute(c) => c,
        }
    }

    /// Kind name as used in the `type` tag
    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::Channel(_) => "Channel",
            ElementKind::Transition(_) => "Transition",
            ElementKind::Chute(_) => "Chute",
        }
    }
}

/// Station and invert elevation at both ends of an element (m).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Placement {
    pub start_station: f64,
    pub start_elevation: f64,
    pub end_station: f64,
    pub end_elevation: f64,
}

/// A hydraulic element in the network.
///
/// `id` and the two links are owned by the Connection Manager and are
/// read-only here; everything else may be edited, after which the network
/// must be re-propagated (see [`crate::network::edit_element`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HydraulicElement {
    pub(crate) id: ElementId,

    /// User label (e.g., "CH-1", "Main chute")
    #[serde(default)]
    pub label: String,

    #[serde(flatten)]
    pub kind: ElementKind,

    /// Manning roughness coefficient
    pub manning_n: f64,

    /// Bed slope (m/m); for chutes this mirrors the main-section slope
    pub slope: f64,

    #[serde(flatten)]
    pub placement: Placement,

    #[serde(default)]
    pub(crate) upstream_id: Option<ElementId>,

    #[serde(default)]
    pub(crate) downstream_id: Option<ElementId>,
}

impl HydraulicElement {
    /// Create an unplaced, unlinked element at station 0 / elevation 0.
    pub fn new(label: impl Into<String>, kind: ElementKind, manning_n: f64, slope: f64) -> Self {
        let mut element = HydraulicElement {
            id: ElementId::new(),
            label: label.into(),
            kind,
            manning_n,
            slope,
            placement: Placement::default(),
            upstream_id: None,
            downstream_id: None,
        };
        element.sync_slope();
        element.recompute_end();
        element
    }

    pub fn channel(label: impl Into<String>, channel: Channel, manning_n: f64, slope: f64) -> Self {
        HydraulicElement::new(label, ElementKind::Channel(channel), manning_n, slope)
    }

    pub fn transition(label: impl Into<String>, transition: Transition, manning_n: f64, slope: f64) -> Self {
        HydraulicElement::new(label, ElementKind::Transition(transition), manning_n, slope)
    }

    /// Chutes carry their own slope (`drop / length`).
    pub fn chute(label: impl Into<String>, chute: Chute, manning_n: f64) -> Self {
        HydraulicElement::new(label, ElementKind::Chute(chute), manning_n, 0.0)
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn upstream_id(&self) -> Option<ElementId> {
        self.upstream_id
    }

    pub fn downstream_id(&self) -> Option<ElementId> {
        self.downstream_id
    }

    pub fn horizontal_length(&self) -> f64 {
        self.kind.as_conveyance().horizontal_length()
    }

    pub fn total_drop(&self) -> f64 {
        self.kind.as_conveyance().total_drop(self.slope)
    }

    pub fn section(&self) -> CrossSection {
        self.kind.as_conveyance().section()
    }

    pub fn as_chute(&self) -> Option<&Chute> {
        match &self.kind {
            ElementKind::Chute(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_chute_mut(&mut self) -> Option<&mut Chute> {
        match &mut self.kind {
            ElementKind::Chute(c) => Some(c),
            _ => None,
        }
    }

    /// Derive the end placement from the start placement and geometry.
    pub(crate) fn recompute_end(&mut self) {
        self.placement.end_station = self.placement.start_station + self.horizontal_length();
        self.placement.end_elevation = self.placement.start_elevation - self.total_drop();
    }

    /// Keep a chute's common slope equal to its main-section slope.
    pub(crate) fn sync_slope(&mut self) {
        if let ElementKind::Chute(c) = &self.kind {
            self.slope = c.main_slope();
        }
    }

    pub fn contains_station(&self, station: f64) -> bool {
        station >= self.placement.start_station && station <= self.placement.end_station
    }

    /// Invert elevation at `station`, or `None` if the station lies outside
    /// the element.
    pub fn elevation_at(&self, station: f64) -> Option<f64> {
        if !self.contains_station(station) {
            return None;
        }
        let distance = station - self.placement.start_station;
        Some(self.placement.start_elevation - self.kind.as_conveyance().drop_at(distance, self.slope))
    }

    /// Validate the envelope and the kind-specific geometry.
    pub fn validate(&self) -> DesignResult<()> {
        require_positive("manning_n", self.manning_n)?;
        if !matches!(self.kind, ElementKind::Chute(_)) {
            require_non_negative("slope", self.slope)?;
        }
        self.kind.as_conveyance().validate()
    }
}

pub(crate) fn require_positive(field: &str, value: f64) -> DesignResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(DesignError::invalid_input(field, value.to_string(), "Value must be positive"))
    }
}

pub(crate) fn require_non_negative(field: &str, value: f64) -> DesignResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(DesignError::invalid_input(field, value.to_string(), "Value cannot be negative"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel() -> HydraulicElement {
        HydraulicElement::channel(
            "CH-1",
            Channel::new(50.0, CrossSection::rectangular(2.0, 1.0)),
            0.015,
            0.01,
        )
    }

    #[test]
    fn test_new_element_is_unplaced_and_unlinked() {
        let el = channel();
        assert_eq!(el.placement.start_station, 0.0);
        assert_eq!(el.placement.start_elevation, 0.0);
        assert!(el.upstream_id().is_none());
        assert!(el.downstream_id().is_none());
        // End already follows from geometry
        assert_eq!(el.placement.end_station, 50.0);
        assert!((el.placement.end_elevation + 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_chute_slope_is_synced() {
        let el = HydraulicElement::chute("R-1", Chute::new(20.0, 10.0, 2.0, 1.0), 0.014);
        assert!((el.slope - 0.5).abs() < 1e-12);
        assert_eq!(el.total_drop(), 10.0);
    }

    #[test]
    fn test_elevation_at() {
        let el = channel();
        assert!((el.elevation_at(25.0).unwrap() + 0.25).abs() < 1e-12);
        assert!(el.elevation_at(60.0).is_none());
    }

    #[test]
    fn test_validation() {
        let mut el = channel();
        assert!(el.validate().is_ok());
        el.manning_n = 0.0;
        assert!(el.validate().is_err());
    }

    #[test]
    fn test_persisted_shape() {
        let el = channel();
        let value = serde_json::to_value(&el).unwrap();
        for key in [
            "id",
            "type",
            "length",
            "section",
            "manning_n",
            "slope",
            "start_station",
            "start_elevation",
            "end_station",
            "end_elevation",
            "upstream_id",
            "downstream_id",
        ] {
            assert!(value.get(key).is_some(), "missing key {}", key);
        }
        assert_eq!(value["type"], "Channel");

        let roundtrip: HydraulicElement = serde_json::from_value(value).unwrap();
        assert_eq!(roundtrip, el);
    }

    #[test]
    fn test_chute_roundtrip_keeps_basin() {
        let mut chute = Chute::new(20.0, 10.0, 2.0, 1.0);
        chute.stilling_basin = Some(crate::basin::build_manual_basin(
            crate::basin::StillingBasinType::TypeIII,
            16.5,
            2.0,
            0.1,
        ));
        let el = HydraulicElement::chute("R-1", chute, 0.014);
        let json = serde_json::to_string(&el).unwrap();
        let roundtrip: HydraulicElement = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip, el);
        assert!(roundtrip.as_chute().unwrap().stilling_basin.is_some());
    }
}
