//! Scene generation module
//!
//! Converts feature geometries into scene nodes.
//!
//! # Submodules
//! - `accumulator` - Polygon and line meshes with sub-mesh splitting
//! - `grid` - Elevation grids rebuilt from point layers
//! - `points` - Placeholder groups for points with external meshes

mod accumulator;
mod grid;
mod points;

use crate::config::SceneConfig;
use crate::feature::Feature;
use crate::SceneNode;

pub use accumulator::{mesh_node, texcoords, to_render_space, MeshAccumulator, MeshKind};
pub use grid::{bucket_rows, sort_grid, GridCell, PointGrid};
pub use points::{point_group, point_translation};

/// Optional `id` and `class` carried from a feature onto its nodes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureLabels {
    pub id: Option<String>,
    pub class: Option<String>,
}

impl FeatureLabels {
    /// Read the configured id and class attributes of a feature
    ///
    /// Class values are joined with spaces; missing ones are left out.
    pub fn from_feature(feature: &Feature, config: &SceneConfig) -> Self {
        let id = config
            .id_attribute
            .as_deref()
            .and_then(|name| feature.text(name));
        let classes: Vec<String> = config
            .class_attributes
            .iter()
            .filter_map(|name| feature.text(name))
            .filter(|value| !value.is_empty())
            .collect();
        Self {
            id,
            class: (!classes.is_empty()).then(|| classes.join(" ")),
        }
    }

    pub fn apply(&self, node: &mut SceneNode) {
        if let Some(id) = &self.id {
            node.add_attribute("id", id.as_str());
        }
        if let Some(class) = &self.class {
            node.add_attribute("class", class.as_str());
        }
    }
}
