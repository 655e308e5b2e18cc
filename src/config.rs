//! Build configuration
//!
//! `SceneConfig` carries the per-layer attribute names and the numeric
//! tolerances used while building a scene. Every field has a default, so a
//! JSON document only needs to name what it changes.

use crate::error::SceneError;
use serde::Deserialize;
use std::path::Path;

/// Margin (in map units) a polygon coordinate may lie outside the bbox
pub const DEFAULT_CLIP_TOLERANCE: f64 = 5.0;

/// Sub-mesh vertex ceiling, kept below the 16-bit index limit
pub const DEFAULT_MAX_VERTICES_PER_MESH: usize = 63_000;

/// Northing tolerance used to bucket grid points into rows
pub const DEFAULT_GRID_ROW_TOLERANCE: f64 = 0.01;

/// Class label carried by the outer group node
pub const DEFAULT_GROUP_CLASS: &str = "layer";

pub const DEFAULT_HTML_TITLE: &str = "3D scene";

/// Feature attribute naming an external mesh asset
pub const MESH_REF_ATTRIBUTE: &str = "mesh_ref";

/// Which triangulator the mesh accumulator uses for polygon rings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriangulatorKind {
    #[default]
    Fan,
    Earcut,
}

/// Settings for one scene build
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub id_attribute: Option<String>,
    pub class_attributes: Vec<String>,
    pub clip_tolerance: f64,
    pub max_vertices_per_mesh: usize,
    pub grid_row_tolerance: f64,
    pub group_class: String,
    pub html_title: String,
    pub pretty: bool,
    pub triangulator: TriangulatorKind,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            id_attribute: None,
            class_attributes: Vec::new(),
            clip_tolerance: DEFAULT_CLIP_TOLERANCE,
            max_vertices_per_mesh: DEFAULT_MAX_VERTICES_PER_MESH,
            grid_row_tolerance: DEFAULT_GRID_ROW_TOLERANCE,
            group_class: DEFAULT_GROUP_CLASS.to_string(),
            html_title: DEFAULT_HTML_TITLE.to_string(),
            pretty: false,
            triangulator: TriangulatorKind::Fan,
        }
    }
}

impl SceneConfig {
    /// Decode a configuration from a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, SceneError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and decode a JSON configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SceneError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SceneConfig::default();
        assert_eq!(config.clip_tolerance, 5.0);
        assert_eq!(config.max_vertices_per_mesh, 63_000);
        assert_eq!(config.group_class, "layer");
        assert_eq!(config.triangulator, TriangulatorKind::Fan);
        assert!(config.id_attribute.is_none());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SceneConfig::from_json_str(
            r#"{"id_attribute": "fid", "class_attributes": ["kind", "zone"], "triangulator": "earcut"}"#,
        )
        .unwrap();
        assert_eq!(config.id_attribute.as_deref(), Some("fid"));
        assert_eq!(config.class_attributes, vec!["kind", "zone"]);
        assert_eq!(config.triangulator, TriangulatorKind::Earcut);
        assert_eq!(config.max_vertices_per_mesh, DEFAULT_MAX_VERTICES_PER_MESH);
    }

    #[test]
    fn test_bad_json_is_config_error() {
        let err = SceneConfig::from_json_str("{\"clip_tolerance\": \"wide\"}").unwrap_err();
        assert!(matches!(err, SceneError::Config(_)));
    }
}
