//! Mesh accumulation for polygon and line geometries
//!
//! Polygon rings are clipped to the request bbox (with a margin), welded
//! into a shared vertex list and triangulated. Once a sub-mesh would grow
//! past the vertex ceiling it is flushed into a finished `mesh` node and
//! accumulation restarts with an empty vertex list and welder. Each line
//! becomes its own `mesh` node.
//!
//! A ring left with fewer than 3 distinct vertices after in-ring dedup is
//! dropped even when 3 or more coordinates survived clipping, so no
//! degenerate closing triangle is emitted for it.

use super::FeatureLabels;
use crate::config::{SceneConfig, TriangulatorKind};
use crate::error::SceneError;
use crate::mesh::geometry::{format_decimal, BoundingBox, Coordinate, Geometry, Vec3};
use crate::mesh::tessellation::{
    EarcutTriangulator, FanTriangulator, NormalAccumulator, Triangulator, VertexWelder,
};
use crate::SceneNode;
use log::debug;
use std::collections::HashSet;

/// Kind of primitive a sub-mesh draws
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshKind {
    Triangles,
    Line,
}

impl MeshKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            MeshKind::Triangles => "triangles",
            MeshKind::Line => "line",
        }
    }
}

/// Builds the `mesh` nodes of one layer
pub struct MeshAccumulator {
    bbox: BoundingBox,
    clip_tolerance: f64,
    max_vertices: usize,
    triangulator: Box<dyn Triangulator>,
    vertices: Vec<Vec3>,
    indices: Vec<u32>,
    welder: VertexWelder,
    completed: Vec<SceneNode>,
    total_vertices: usize,
}

impl MeshAccumulator {
    pub fn new(bbox: BoundingBox, config: &SceneConfig) -> Self {
        let triangulator: Box<dyn Triangulator> = match config.triangulator {
            TriangulatorKind::Fan => Box::new(FanTriangulator),
            TriangulatorKind::Earcut => Box::new(EarcutTriangulator),
        };
        Self {
            bbox,
            clip_tolerance: config.clip_tolerance,
            // A triangle must always fit into an empty sub-mesh
            max_vertices: config.max_vertices_per_mesh.max(3),
            triangulator,
            vertices: Vec::new(),
            indices: Vec::new(),
            welder: VertexWelder::new(),
            completed: Vec::new(),
            total_vertices: 0,
        }
    }

    pub fn set_triangulator(&mut self, triangulator: Box<dyn Triangulator>) {
        self.triangulator = triangulator;
    }

    /// Add a polygon or line geometry
    ///
    /// Points are not meshes and are rejected along with every other kind
    /// the accumulator cannot draw.
    pub fn add_geometry(&mut self, geometry: &Geometry, labels: &FeatureLabels) -> Result<(), SceneError> {
        match geometry {
            Geometry::Polygon(rings) => {
                for ring in rings {
                    self.add_ring(ring);
                }
            }
            Geometry::MultiPolygon(polygons) => {
                for ring in polygons.iter().flatten() {
                    self.add_ring(ring);
                }
            }
            Geometry::LineString(line) => self.add_line(line, labels),
            Geometry::MultiLineString(lines) => {
                for line in lines {
                    self.add_line(line, labels);
                }
            }
            other => return Err(SceneError::unsupported_kind(other.type_name())),
        }
        Ok(())
    }

    /// Clip, weld and triangulate one polygon ring
    pub fn add_ring(&mut self, ring: &[Coordinate]) {
        let clipped: Vec<&Coordinate> = ring
            .iter()
            .filter(|c| self.bbox.contains_with_margin(c.x, c.y, self.clip_tolerance))
            .collect();
        if clipped.len() < 3 {
            debug!("ring dropped: {} of {} coordinates inside bbox", clipped.len(), ring.len());
            return;
        }

        let mut seen = HashSet::with_capacity(clipped.len());
        let unique: Vec<Vec3> = clipped
            .into_iter()
            .map(Vec3::from_coordinate)
            .filter(|v| seen.insert(v.render_key()))
            .collect();
        if unique.len() < 3 {
            debug!("ring dropped: {} distinct vertices", unique.len());
            return;
        }

        let local = self.triangulator.triangulate(&unique);
        for tri in local.chunks_exact(3) {
            let fresh = self.unwelded_count(&unique, tri);
            if self.vertices.len() + fresh > self.max_vertices && !self.vertices.is_empty() {
                self.flush();
            }
            for &i in tri {
                let index = self.welder.get_or_insert(unique[i], &mut self.vertices);
                self.indices.push(index);
            }
        }
    }

    /// Number of distinct triangle corners not yet in the current sub-mesh
    fn unwelded_count(&self, ring: &[Vec3], tri: &[usize]) -> usize {
        let mut fresh = 0;
        for (n, &i) in tri.iter().enumerate() {
            let repeated = tri[..n].iter().any(|&j| ring[j].render_key() == ring[i].render_key());
            if !repeated && self.welder.lookup(&ring[i]).is_none() {
                fresh += 1;
            }
        }
        fresh
    }

    /// Emit one line as its own sub-mesh (split if longer than the ceiling)
    pub fn add_line(&mut self, line: &[Coordinate], labels: &FeatureLabels) {
        if line.len() < 2 {
            debug!("line dropped: {} coordinates", line.len());
            return;
        }

        let vertices: Vec<Vec3> = line.iter().map(Vec3::from_coordinate).collect();
        let mut start = 0;
        loop {
            let end = (start + self.max_vertices).min(vertices.len());
            let chunk = vertices[start..end].to_vec();
            let indices: Vec<u32> = (0..chunk.len() as u32).collect();
            let mut node = mesh_node(MeshKind::Line, chunk, &indices, &self.bbox);
            labels.apply(&mut node);
            self.total_vertices += end - start;
            self.completed.push(node);

            if end == vertices.len() {
                break;
            }
            // Consecutive pieces share their joint vertex
            start = end - 1;
        }
    }

    /// Turn the open triangle sub-mesh into a finished node
    fn flush(&mut self) {
        if self.vertices.is_empty() {
            return;
        }
        debug!(
            "flushing sub-mesh: {} vertices, {} triangles",
            self.vertices.len(),
            self.indices.len() / 3
        );
        let vertices = std::mem::take(&mut self.vertices);
        let indices = std::mem::take(&mut self.indices);
        self.welder.clear();
        self.total_vertices += vertices.len();
        self.completed.push(mesh_node(MeshKind::Triangles, vertices, &indices, &self.bbox));
    }

    /// Vertices in the open sub-mesh
    pub fn open_vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Close the open sub-mesh and return every `mesh` node in creation order
    pub fn finalize(mut self) -> (SceneNode, usize) {
        self.flush();
        let mut container = SceneNode::container();
        container.children = self.completed;
        (container, self.total_vertices)
    }
}

/// Build a `mesh` node from one finished sub-mesh
///
/// Normals and texture coordinates are computed from absolute map
/// coordinates; positions are then moved into renderer space.
pub fn mesh_node(kind: MeshKind, mut vertices: Vec<Vec3>, indices: &[u32], bbox: &BoundingBox) -> SceneNode {
    let mut node = SceneNode::new("mesh").with_attribute("type", kind.type_name());

    let extras = match kind {
        MeshKind::Triangles => {
            let mut normals = NormalAccumulator::new();
            normals.accumulate_faces(&vertices, indices);
            Some((normals.normals(vertices.len()), texcoords(&vertices, bbox)))
        }
        MeshKind::Line => None,
    };

    for v in vertices.iter_mut() {
        to_render_space(v, bbox);
    }

    node.add_child(array_node("int", "index", join_indices(indices)));
    node.add_child(array_node("float3", "position", join_vec3(&vertices)));
    if let Some((normals, texcoords)) = extras {
        node.add_child(array_node("float3", "normal", join_vec3(&normals)));
        node.add_child(array_node("float2", "texcoord", join_pairs(&texcoords)));
    }
    node
}

/// Texture coordinates spanning the bbox; z holds the source northing
pub fn texcoords(vertices: &[Vec3], bbox: &BoundingBox) -> Vec<(f64, f64)> {
    vertices
        .iter()
        .map(|v| {
            (
                ratio(v.x - bbox.min_x, bbox.width()),
                ratio(v.z - bbox.min_y, bbox.height()),
            )
        })
        .collect()
}

fn ratio(offset: f64, extent: f64) -> f64 {
    if extent == 0.0 {
        0.0
    } else {
        offset / extent
    }
}

/// Move a vertex into renderer space, applied exactly once per vertex
///
/// NOTE: min_y is subtracted twice on z. Client output depends on this, so
/// it stays until it is confirmed against real client rendering.
pub fn to_render_space(v: &mut Vec3, bbox: &BoundingBox) {
    v.x -= bbox.min_x;
    v.z = bbox.max_y - (v.z - bbox.min_y);
    v.z -= bbox.min_y;
}

fn array_node(tag: &str, name: &str, text: String) -> SceneNode {
    let mut node = SceneNode::new(tag).with_attribute("name", name);
    node.set_text(&text);
    node
}

fn join_indices(indices: &[u32]) -> String {
    indices.iter().map(u32::to_string).collect::<Vec<_>>().join(" ")
}

fn join_vec3(values: &[Vec3]) -> String {
    values
        .iter()
        .map(|v| format!("{} {} {}", format_decimal(v.x), format_decimal(v.y), format_decimal(v.z)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn join_pairs(values: &[(f64, f64)]) -> String {
    values
        .iter()
        .map(|(s, t)| format!("{} {}", format_decimal(*s), format_decimal(*t)))
        .collect::<Vec<_>>()
        .join(" ")
}
