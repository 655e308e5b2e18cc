//! Scene building for one layer
//!
//! A `SceneBuilder` is created per request and consumed when the scene is
//! written. It pulls features from a cursor, routes polygons and lines to
//! the mesh accumulator and points to placeholder groups (and to the
//! elevation grid), then writes one of the three output formats.

use crate::config::SceneConfig;
use crate::error::SceneError;
use crate::feature::{CursorGuard, Feature, FeatureCursor};
use crate::mesh::generation::{point_group, FeatureLabels, MeshAccumulator, PointGrid};
use crate::mesh::geometry::{BoundingBox, Geometry, GeometryKind, Vec3};
use crate::serialize_scene::{write_html, write_scene};
use crate::SceneNode;
use log::{debug, info, warn};
use std::io::Write;
use std::str::FromStr;

/// Group id used when a layer produced no geometry at all
pub const EMPTY_LAYER_ID: &str = "Empty";

/// Output a finished scene is written as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Tagged text scene graph
    SceneText,
    /// Placeholder HTML page
    Html,
    /// Binary elevation grid of the layer's points
    BinaryGrid,
}

impl OutputFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::SceneText => "model/xml3d+xml",
            OutputFormat::Html => "text/html",
            OutputFormat::BinaryGrid => "application/octet-stream",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = SceneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "xml3d" | "scene" | "model/xml3d+xml" => Ok(OutputFormat::SceneText),
            "html" | "text/html" => Ok(OutputFormat::Html),
            "binary" | "octet-stream" | "application/octet-stream" => Ok(OutputFormat::BinaryGrid),
            _ => Err(SceneError::UnsupportedFormat { name: s.to_string() }),
        }
    }
}

/// Counters for one build
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildStats {
    pub features: usize,
    pub meshes: usize,
    pub vertices: usize,
    pub points_placed: usize,
    pub points_skipped: usize,
}

pub struct SceneBuilder {
    bbox: BoundingBox,
    config: SceneConfig,
    accumulator: MeshAccumulator,
    kind: Option<GeometryKind>,
    point_nodes: Vec<SceneNode>,
    grid_points: Vec<Vec3>,
    stats: BuildStats,
}

impl SceneBuilder {
    pub fn new(bbox: BoundingBox, config: SceneConfig) -> Self {
        Self {
            accumulator: MeshAccumulator::new(bbox, &config),
            bbox,
            config,
            kind: None,
            point_nodes: Vec::new(),
            grid_points: Vec::new(),
            stats: BuildStats::default(),
        }
    }

    /// Pull every feature from `cursor` into the scene
    ///
    /// The cursor is closed before returning, also when a feature fails.
    pub fn add_layer<C: FeatureCursor + ?Sized>(&mut self, cursor: &mut C) -> Result<(), SceneError> {
        let features = CursorGuard::new(cursor);
        for feature in features {
            self.add_feature(&feature?)?;
        }
        Ok(())
    }

    pub fn add_feature(&mut self, feature: &Feature) -> Result<(), SceneError> {
        self.stats.features += 1;
        let Some(geometry) = feature.geometry() else {
            warn!("feature {} has no geometry", self.stats.features);
            return Ok(());
        };

        let kind = geometry.kind()?;
        self.kind.get_or_insert(kind);
        let labels = FeatureLabels::from_feature(feature, &self.config);

        match (kind, geometry) {
            (GeometryKind::Point, Geometry::Point(point)) => {
                self.grid_points.push(Vec3::from_coordinate(point));
                match feature.mesh_ref() {
                    Some(mesh_ref) => {
                        self.point_nodes.push(point_group(point, &mesh_ref, &self.bbox, &labels));
                        self.stats.points_placed += 1;
                    }
                    None => {
                        debug!("point feature {} skipped: no mesh reference", self.stats.features);
                        self.stats.points_skipped += 1;
                    }
                }
                Ok(())
            }
            _ => self.accumulator.add_geometry(geometry, &labels),
        }
    }

    pub fn stats(&self) -> BuildStats {
        self.stats
    }

    /// Kind of the first geometry seen, which names the layer group
    pub fn kind(&self) -> Option<GeometryKind> {
        self.kind
    }

    /// Finish the scene tree: an untagged root holding one `group`
    pub fn into_scene(mut self) -> (SceneNode, BuildStats) {
        let root = self.take_scene();
        (root, self.stats)
    }

    fn take_scene(&mut self) -> SceneNode {
        let accumulator = std::mem::replace(
            &mut self.accumulator,
            MeshAccumulator::new(self.bbox, &self.config),
        );
        let (meshes, vertices) = accumulator.finalize();
        self.stats.meshes = meshes.children.len();
        self.stats.vertices = vertices;

        let id = self.kind.map_or(EMPTY_LAYER_ID, |k| k.name());
        let mut group = SceneNode::new("group")
            .with_attribute("id", id)
            .with_attribute("class", self.config.group_class.as_str());
        group.children = meshes.children;
        group.children.append(&mut self.point_nodes);

        let mut root = SceneNode::container();
        root.add_child(group);
        root
    }

    /// Elevation grid rebuilt from every point seen so far
    pub fn point_grid(&self) -> PointGrid {
        PointGrid::from_points(&self.grid_points, self.config.grid_row_tolerance)
    }

    /// Finish the build and write it to `writer` in the requested format
    pub fn finalize_and_write<W: Write>(mut self, format: OutputFormat, writer: &mut W) -> Result<BuildStats, SceneError> {
        match format {
            OutputFormat::SceneText => {
                let root = self.take_scene();
                write_scene(&root, writer, self.config.pretty)?;
            }
            OutputFormat::Html => write_html(writer, &self.config.html_title)?,
            OutputFormat::BinaryGrid => {
                let grid = self.point_grid();
                debug!("grid {}x{} from {} points", grid.width(), grid.height(), self.grid_points.len());
                grid.write_to(writer, &self.bbox)?;
            }
        }
        writer.flush()?;

        info!(
            "scene written as {}: {} features, {} meshes, {} vertices, {} points placed, {} skipped",
            format.mime_type(),
            self.stats.features,
            self.stats.meshes,
            self.stats.vertices,
            self.stats.points_placed,
            self.stats.points_skipped
        );
        Ok(self.stats)
    }
}
