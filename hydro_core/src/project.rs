//! # Project Data Structures
//!
//! The `Project` struct is the root container for a conveyance design.
//! Projects serialize to `.csd` files as human-readable JSON.
//!
//! ## Structure
//!
//! ```text
//! Project
//! ├── meta: ProjectMetadata (version, engineer, job info, timestamps)
//! ├── settings: DesignSettings (defaults for new elements and basins)
//! └── network: ElementStore (all elements, keyed by ElementId)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use hydro_core::elements::CrossSection;
//! use hydro_core::project::Project;
//!
//! let mut project = Project::new("Jane Engineer", "25-042", "Irrigation District");
//! let canal = project.settings.channel("CH-1", 50.0, CrossSection::rectangular(2.0, 1.0), 0.01);
//! let id = project.add_element(canal).unwrap();
//!
//! assert_eq!(project.element_count(), 1);
//! assert_eq!(project.network.get(id).unwrap().manning_n, 0.015);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::basin::config::{DEFAULT_FLOOR_THICKNESS, DEFAULT_WINGWALL_ANGLE};
use crate::basin::BasinDesignResult;
use crate::elements::{Channel, Chute, CrossSection, HydraulicElement};
use crate::errors::HydroResult;
use crate::id::ElementId;
use crate::network::{self, BasinRequest, ElementStore, LinkSide};

/// Current schema version for .csd files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Root project container.
///
/// This is the top-level struct that gets serialized to `.csd` files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Project metadata (version, engineer, job info)
    pub meta: ProjectMetadata,

    /// Design defaults
    pub settings: DesignSettings,

    /// All hydraulic elements and their links
    pub network: ElementStore,
}

impl Project {
    /// Create a new empty project.
    ///
    /// # Arguments
    ///
    /// * `engineer` - Name of the responsible engineer
    /// * `job_id` - Job/project number (e.g., "25-001")
    /// * `client` - Client name
    pub fn new(engineer: impl Into<String>, job_id: impl Into<String>, client: impl Into<String>) -> Self {
        let now = Utc::now();
        Project {
            meta: ProjectMetadata {
                version: SCHEMA_VERSION.to_string(),
                engineer: engineer.into(),
                job_id: job_id.into(),
                client: client.into(),
                created: now,
                modified: now,
            },
            settings: DesignSettings::default(),
            network: ElementStore::new(),
        }
    }

    /// Validate and add an element. It enters unplaced and unlinked.
    pub fn add_element(&mut self, element: HydraulicElement) -> HydroResult<ElementId> {
        element.validate()?;
        let id = self.network.insert(element);
        self.touch();
        Ok(id)
    }

    /// Link two elements and propagate placements.
    pub fn connect(&mut self, upstream: ElementId, downstream: ElementId) -> HydroResult<()> {
        network::connect(&mut self.network, upstream, downstream)?;
        self.touch();
        Ok(())
    }

    pub fn disconnect(&mut self, id: ElementId, side: LinkSide) -> HydroResult<()> {
        network::disconnect(&mut self.network, id, side)?;
        self.touch();
        Ok(())
    }

    pub fn remove_element(&mut self, id: ElementId) -> HydroResult<HydraulicElement> {
        let element = network::remove_element(&mut self.network, id)?;
        self.touch();
        Ok(element)
    }

    /// Edit an element and propagate. With auto-design enabled and a design
    /// discharge set, an edited chute also gets a fresh basin.
    ///
    /// If the basin cannot be designed for the edited chute, the whole edit
    /// is undone and the design error returned.
    pub fn edit_element<F>(&mut self, id: ElementId, edit: F) -> HydroResult<usize>
    where
        F: FnOnce(&mut HydraulicElement),
    {
        let snapshot = self.network.clone();
        let rewritten = network::edit_element(&mut self.network, id, edit)?;

        if let Some(discharge) = self.settings.design_discharge {
            let is_chute = self.network.get(id).is_some_and(|e| e.as_chute().is_some());
            if self.settings.auto_design_basin && is_chute {
                let request = self.settings.basin_request(discharge);
                if let Err(e) = network::auto_design_basin(&mut self.network, id, &request) {
                    tracing::warn!(%id, "edit rolled back, basin design failed: {}", e);
                    self.network = snapshot;
                    return Err(e);
                }
            }
        }

        self.touch();
        Ok(rewritten)
    }

    /// Design the basin of a chute with the project's basin defaults.
    pub fn design_basin(&mut self, chute_id: ElementId, discharge: f64) -> HydroResult<BasinDesignResult> {
        let request = self.settings.basin_request(discharge);
        let result = network::auto_design_basin(&mut self.network, chute_id, &request)?;
        self.touch();
        Ok(result)
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    pub fn element_count(&self) -> usize {
        self.network.len()
    }
}

impl Default for Project {
    fn default() -> Self {
        Project::new("", "", "")
    }
}

/// Project metadata stored in the file header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,

    /// Name of the responsible engineer
    pub engineer: String,

    /// Job/project number
    pub job_id: String,

    /// Client name
    pub client: String,

    /// When the project was created
    pub created: DateTime<Utc>,

    /// When the project was last modified
    pub modified: DateTime<Utc>,
}

/// Defaults applied to new elements and basin designs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignSettings {
    /// Manning's n for new elements
    pub manning_n: f64,

    /// Free board of new channels (m)
    pub free_board: f64,

    /// Wall thickness of new channels and chutes (m)
    pub wall_thickness: f64,

    /// Stilling basin floor thickness (m)
    pub floor_thickness: f64,

    /// Stilling basin wingwall flare (degrees)
    pub wingwall_angle: f64,

    /// Re-design chute basins after every chute edit
    pub auto_design_basin: bool,

    /// Discharge used for automatic basin design (m³/s)
    pub design_discharge: Option<f64>,

    /// Tailwater depth assumed when none is given (m)
    pub default_tailwater: f64,
}

impl Default for DesignSettings {
    fn default() -> Self {
        DesignSettings {
            manning_n: 0.015,
            free_board: 0.30,
            wall_thickness: 0.20,
            floor_thickness: DEFAULT_FLOOR_THICKNESS,
            wingwall_angle: DEFAULT_WINGWALL_ANGLE,
            auto_design_basin: false,
            design_discharge: None,
            default_tailwater: 0.0,
        }
    }
}

impl DesignSettings {
    /// New channel with the project's roughness, free board and wall thickness.
    pub fn channel(&self, label: impl Into<String>, length: f64, section: CrossSection, slope: f64) -> HydraulicElement {
        let mut channel = Channel::new(length, section);
        channel.free_board = self.free_board;
        channel.thickness = self.wall_thickness;
        HydraulicElement::channel(label, channel, self.manning_n, slope)
    }

    /// New chute with the project's roughness and wall thickness.
    pub fn chute(&self, label: impl Into<String>, mut chute: Chute) -> HydraulicElement {
        chute.thickness = self.wall_thickness;
        HydraulicElement::chute(label, chute, self.manning_n)
    }

    /// Basin request for `discharge` with the project's basin defaults.
    pub fn basin_request(&self, discharge: f64) -> BasinRequest {
        BasinRequest {
            discharge,
            tailwater_depth: self.default_tailwater,
            floor_thickness: self.floor_thickness,
            wingwall_angle: self.wingwall_angle,
            ..BasinRequest::new(discharge)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::ElementKind;

    #[test]
    fn test_project_creation() {
        let project = Project::new("John Doe", "25-001", "Acme Water");
        assert_eq!(project.meta.engineer, "John Doe");
        assert_eq!(project.meta.job_id, "25-001");
        assert_eq!(project.meta.client, "Acme Water");
        assert_eq!(project.meta.version, SCHEMA_VERSION);
        assert_eq!(project.element_count(), 0);
    }

    #[test]
    fn test_project_serialization() {
        let mut project = Project::new("Jane Engineer", "25-042", "Test Client");
        let ch = project.settings.channel("CH-1", 50.0, CrossSection::rectangular(2.0, 1.0), 0.01);
        project.add_element(ch).unwrap();

        let json = serde_json::to_string_pretty(&project).unwrap();
        assert!(json.contains("Jane Engineer"));
        assert!(json.contains("\"network\""));
        assert!(json.contains("CH-1"));

        let roundtrip: Project = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip.meta.engineer, "Jane Engineer");
        assert_eq!(roundtrip.network, project.network);
    }

    #[test]
    fn test_settings_fill_missing_fields() {
        let settings: DesignSettings = serde_json::from_str(r#"{"manning_n": 0.013}"#).unwrap();
        assert_eq!(settings.manning_n, 0.013);
        assert_eq!(settings.free_board, 0.30);
        assert_eq!(settings.wingwall_angle, 45.0);
        assert!(!settings.auto_design_basin);
    }

    #[test]
    fn test_add_rejects_invalid_element() {
        let mut project = Project::default();
        let bad = project.settings.channel("CH-1", -5.0, CrossSection::rectangular(2.0, 1.0), 0.01);
        let err = project.add_element(bad).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert_eq!(project.element_count(), 0);
    }

    #[test]
    fn test_connect_and_remove() {
        let mut project = Project::default();
        let a = project
            .add_element(project.settings.channel("A", 10.0, CrossSection::rectangular(2.0, 1.0), 0.0))
            .unwrap();
        let b = project
            .add_element(project.settings.channel("B", 10.0, CrossSection::rectangular(2.0, 1.0), 0.0))
            .unwrap();

        project.connect(a, b).unwrap();
        assert_eq!(project.network.get(b).unwrap().placement.start_station, 10.0);

        project.remove_element(a).unwrap();
        assert!(project.network.get(b).unwrap().upstream_id().is_none());
        assert!(project.network.check_links().is_ok());
    }

    #[test]
    fn test_auto_design_on_chute_edit() {
        let mut project = Project::default();
        project.settings.auto_design_basin = true;
        project.settings.design_discharge = Some(5.0);

        let chute = project
            .add_element(project.settings.chute("R-1", Chute::new(20.0, 10.0, 2.0, 1.0)))
            .unwrap();
        assert!(project.network.get(chute).unwrap().as_chute().unwrap().stilling_basin.is_none());

        project
            .edit_element(chute, |el| {
                if let ElementKind::Chute(c) = &mut el.kind {
                    c.drop = 12.0;
                }
            })
            .unwrap();

        let basin = project.network.get(chute).unwrap().as_chute().unwrap().stilling_basin.clone();
        assert!(basin.is_some_and(|b| b.length > 0.0));
    }

    #[test]
    fn test_failed_auto_design_undoes_edit() {
        let mut project = Project::default();
        project.settings.auto_design_basin = true;
        project.settings.design_discharge = Some(5.0);

        let channel = project
            .add_element(project.settings.channel("CH-1", 50.0, CrossSection::rectangular(2.0, 1.0), 0.01))
            .unwrap();
        let chute = project
            .add_element(project.settings.chute("R-1", Chute::new(20.0, 10.0, 2.0, 1.0)))
            .unwrap();
        let tail = project
            .add_element(project.settings.channel("CH-2", 30.0, CrossSection::rectangular(2.0, 1.0), 0.001))
            .unwrap();
        project.connect(channel, chute).unwrap();
        project.connect(chute, tail).unwrap();
        project.design_basin(chute, 5.0).unwrap();

        let before = project.network.clone();
        let modified = project.meta.modified;

        // Total drop 0: the chute is valid but no basin can be designed
        let err = project
            .edit_element(chute, |el| {
                if let ElementKind::Chute(c) = &mut el.kind {
                    c.drop = 0.0;
                }
            })
            .unwrap_err();

        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert_eq!(project.network, before);
        assert_eq!(project.meta.modified, modified);

        let r = project.network.get(chute).unwrap();
        assert_eq!(r.as_chute().unwrap().drop, 10.0);
        assert!((r.placement.end_elevation + 10.5).abs() < 1e-9);
        assert!(project.network.check_links().is_ok());
    }
}
