//! Scene mesh builder
//!
//! Turns a stream of map features (polygons, lines, points) into a compact
//! 3D scene: a tagged text scene graph, an HTML placeholder, or a binary
//! elevation grid.
//!
//! The pieces, leaf to root:
//! - `mesh::geometry` - vectors, bounding boxes, feature geometries
//! - `mesh::tessellation` - welding, normals, triangulation
//! - `mesh::generation` - mesh accumulation, point grids, point groups
//! - `SceneNode` (here) and `serialize_scene` - the output tree and its writers
//! - `builder` - drives one build from a feature cursor

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use indexmap::IndexMap;
use std::fs::File;
use std::io::{BufRead, BufReader};

pub mod builder;
pub mod config;
pub mod error;
pub mod feature;
pub mod mesh;
pub mod serialize_scene;

pub use builder::{BuildStats, OutputFormat, SceneBuilder};
pub use config::{SceneConfig, TriangulatorKind};
pub use error::SceneError;
pub use feature::{
    features_from_geojson_str, AttributeValue, CursorGuard, Feature, FeatureCursor, VecCursor,
};
pub use mesh::geometry::{BoundingBox, Coordinate, Geometry, GeometryKind, Vec3};
pub use serialize_scene::{scene_to_string, write_html, write_scene};

/// A node of the output scene tree
///
/// A node without a tag is a transparent container: it serializes as the
/// concatenation of its children.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneNode {
    pub tag: Option<String>,
    /// Attributes in insertion order
    pub attributes: IndexMap<String, String>,
    pub children: Vec<SceneNode>,
    pub text: Option<String>,
}

impl SceneNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: Some(tag.into()),
            ..Self::default()
        }
    }

    /// A tagless grouping wrapper
    pub fn container() -> Self {
        Self::default()
    }

    pub fn add_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_attribute(name, value);
        self
    }

    pub fn add_child(&mut self, child: SceneNode) {
        self.children.push(child);
    }

    /// Append to the node's text content
    pub fn set_text(&mut self, value: &str) {
        self.text.get_or_insert_with(String::new).push_str(value);
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn is_container(&self) -> bool {
        self.tag.is_none()
    }

    /// All descendants (and self) with the given tag, depth first
    pub fn find_all<'a>(&'a self, tag: &str) -> Vec<&'a SceneNode> {
        let mut found = Vec::new();
        self.collect_tagged(tag, &mut found);
        found
    }

    fn collect_tagged<'a>(&'a self, tag: &str, found: &mut Vec<&'a SceneNode>) {
        if self.tag.as_deref() == Some(tag) {
            found.push(self);
        }
        for child in &self.children {
            child.collect_tagged(tag, found);
        }
    }
}

/// Reads a text scene document back into a tree
///
/// The document may hold several top-level elements (the serialized form
/// of a tagless root), so the result is always a tagless container.
pub fn parse_scene_str(document: &str) -> Result<SceneNode, SceneError> {
    let mut reader = Reader::from_str(document);
    parse_document(&mut reader)
}

/// Reads a text scene file back into a tree
pub fn parse_scene_file<P: AsRef<std::path::Path>>(path: P) -> Result<SceneNode, SceneError> {
    let file = File::open(&path)?;
    let mut reader = Reader::from_reader(BufReader::new(file));
    parse_document(&mut reader)
}

fn parse_document<R: BufRead>(reader: &mut Reader<R>) -> Result<SceneNode, SceneError> {
    reader.trim_text(true);
    let mut root = SceneNode::container();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf)? {
            Event::Start(start) => {
                let child = parse_node(reader, start.into_owned(), false)?;
                root.add_child(child);
            }
            Event::Empty(start) => {
                let child = parse_node(reader, start.into_owned(), true)?;
                root.add_child(child);
            }
            Event::End(end) => {
                return Err(SceneError::scene_parse(format!(
                    "unexpected closing tag '</{}>' at top level",
                    String::from_utf8_lossy(end.name().as_ref())
                )));
            }
            Event::Eof => return Ok(root),
            _ => {}
        }
    }
}

fn parse_node<R: BufRead>(
    reader: &mut Reader<R>,
    start: BytesStart<'static>,
    self_closing: bool,
) -> Result<SceneNode, SceneError> {
    let tag_bytes = start.name().as_ref().to_vec();
    let mut node = SceneNode::new(String::from_utf8_lossy(&tag_bytes).to_string());
    for attr in start.attributes() {
        let attr = attr.map_err(|e| SceneError::scene_parse(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr.unescape_value()?.to_string();
        node.add_attribute(key, value);
    }

    if self_closing {
        return Ok(node);
    }

    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_event_into(&mut buf)? {
            Event::Start(child_start) => {
                let child = parse_node(reader, child_start.into_owned(), false)?;
                node.add_child(child);
            }
            Event::Empty(child_start) => {
                let child = parse_node(reader, child_start.into_owned(), true)?;
                node.add_child(child);
            }
            Event::Text(text) => {
                let value = text.unescape()?;
                if !value.trim().is_empty() {
                    node.set_text(&value);
                }
            }
            Event::End(end) => {
                if end.name().as_ref() != tag_bytes.as_slice() {
                    return Err(SceneError::scene_parse(format!(
                        "unexpected closing tag '</{}>' while parsing '<{}>'",
                        String::from_utf8_lossy(end.name().as_ref()),
                        node.tag.as_deref().unwrap_or_default()
                    )));
                }
                return Ok(node);
            }
            Event::Eof => {
                return Err(SceneError::scene_parse(format!(
                    "unexpected end of document while parsing '<{}>'",
                    node.tag.as_deref().unwrap_or_default()
                )));
            }
            _ => {}
        }
    }
}

/// Pretty-prints the tree structure without array contents
///
/// # Arguments
/// * `node` - The node to print
/// * `indent` - Current indentation level
pub fn print_scene_tree(node: &SceneNode, indent: usize) {
    let Some(tag) = node.tag.as_deref() else {
        for child in &node.children {
            print_scene_tree(child, indent);
        }
        return;
    };

    let prefix = " ".repeat(indent);
    print!("{}<{}", prefix, tag);
    for (key, value) in &node.attributes {
        print!(" {}=\"{}\"", key, value);
    }
    match &node.text {
        Some(text) => println!("> ({} values)", text.split_whitespace().count()),
        None => println!(">"),
    }

    for child in &node.children {
        print_scene_tree(child, indent + 2);
    }
}
