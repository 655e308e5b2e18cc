//! Feature input
//!
//! Features come from an externally owned cursor. A build pulls them one at
//! a time and must close the cursor on every exit path, which
//! `CursorGuard` does on drop.

use crate::config::MESH_REF_ATTRIBUTE;
use crate::error::SceneError;
use crate::mesh::geometry::Geometry;
use indexmap::IndexMap;
use serde_json::Value;

/// A single feature attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Geometry(Geometry),
    Text(String),
    Number(f64),
    Bool(bool),
    Null,
}

impl AttributeValue {
    /// Textual form for use in node attributes; `None` for geometries and nulls
    pub fn as_text(&self) -> Option<String> {
        match self {
            AttributeValue::Text(s) => Some(s.clone()),
            AttributeValue::Number(n) => Some(n.to_string()),
            AttributeValue::Bool(b) => Some(b.to_string()),
            AttributeValue::Geometry(_) | AttributeValue::Null => None,
        }
    }
}

/// A map feature: named attributes in source order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Feature {
    pub attributes: IndexMap<String, AttributeValue>,
}

impl Feature {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: AttributeValue) {
        self.attributes.insert(name.into(), value);
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
        self.set(name, value);
        self
    }

    pub fn with_geometry(self, name: impl Into<String>, geometry: Geometry) -> Self {
        self.with_attribute(name, AttributeValue::Geometry(geometry))
    }

    pub fn with_text(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_attribute(name, AttributeValue::Text(value.into()))
    }

    /// The feature's geometry
    ///
    /// When several attributes hold geometries the last one wins.
    pub fn geometry(&self) -> Option<&Geometry> {
        self.attributes
            .values()
            .filter_map(|value| match value {
                AttributeValue::Geometry(g) => Some(g),
                _ => None,
            })
            .last()
    }

    pub fn text(&self, name: &str) -> Option<String> {
        self.attributes.get(name).and_then(AttributeValue::as_text)
    }

    /// URL or path of an external mesh asset, if the feature names a usable one
    pub fn mesh_ref(&self) -> Option<String> {
        match self.attributes.get(MESH_REF_ATTRIBUTE) {
            Some(AttributeValue::Text(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        }
    }
}

/// A pull-based source of features owned by the caller
pub trait FeatureCursor {
    fn next_feature(&mut self) -> Option<Result<Feature, SceneError>>;

    /// Release the underlying resources; called exactly once per build
    fn close(&mut self);
}

/// Closes the wrapped cursor when dropped
pub struct CursorGuard<'a, C: FeatureCursor + ?Sized> {
    cursor: &'a mut C,
}

impl<'a, C: FeatureCursor + ?Sized> CursorGuard<'a, C> {
    pub fn new(cursor: &'a mut C) -> Self {
        Self { cursor }
    }
}

impl<C: FeatureCursor + ?Sized> Iterator for CursorGuard<'_, C> {
    type Item = Result<Feature, SceneError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.next_feature()
    }
}

impl<C: FeatureCursor + ?Sized> Drop for CursorGuard<'_, C> {
    fn drop(&mut self) {
        self.cursor.close();
    }
}

/// In-memory cursor over already loaded features
#[derive(Debug)]
pub struct VecCursor {
    features: std::vec::IntoIter<Feature>,
    closed: bool,
}

impl VecCursor {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            features: features.into_iter(),
            closed: false,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl FeatureCursor for VecCursor {
    fn next_feature(&mut self) -> Option<Result<Feature, SceneError>> {
        if self.closed {
            return None;
        }
        self.features.next().map(Ok)
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

const GEOMETRY_TYPES: [&str; 6] = [
    "Point",
    "MultiPoint",
    "LineString",
    "MultiLineString",
    "Polygon",
    "MultiPolygon",
];

/// Reads a GeoJSON FeatureCollection (or a single Feature)
///
/// The `geometry` member becomes an attribute named `geometry`, followed by
/// `id` and the properties in document order. Property values shaped like
/// geometries become geometry attributes too.
pub fn features_from_geojson_str(json: &str) -> Result<Vec<Feature>, SceneError> {
    let document: Value =
        serde_json::from_str(json).map_err(|e| SceneError::invalid_geometry(e.to_string()))?;

    match document.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => document
            .get("features")
            .and_then(Value::as_array)
            .ok_or_else(|| SceneError::invalid_geometry("FeatureCollection without features"))?
            .iter()
            .map(feature_from_value)
            .collect(),
        Some("Feature") => Ok(vec![feature_from_value(&document)?]),
        other => Err(SceneError::invalid_geometry(format!(
            "expected a Feature or FeatureCollection, got {:?}",
            other
        ))),
    }
}

fn feature_from_value(value: &Value) -> Result<Feature, SceneError> {
    let mut feature = Feature::new();

    match value.get("geometry") {
        None | Some(Value::Null) => {}
        Some(geometry) => {
            let geometry = geometry_from_value(geometry)?.ok_or_else(|| {
                SceneError::invalid_geometry("feature geometry is not a geometry object")
            })?;
            feature.set("geometry", AttributeValue::Geometry(geometry));
        }
    }

    if let Some(id) = value.get("id") {
        feature.set("id", attribute_from_value(id)?);
    }

    if let Some(properties) = value.get("properties").and_then(Value::as_object) {
        for (name, property) in properties {
            feature.set(name.clone(), attribute_from_value(property)?);
        }
    }

    Ok(feature)
}

fn attribute_from_value(value: &Value) -> Result<AttributeValue, SceneError> {
    if let Some(geometry) = geometry_from_value(value)? {
        return Ok(AttributeValue::Geometry(geometry));
    }
    Ok(match value {
        Value::Null => AttributeValue::Null,
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::Number(n.as_f64().unwrap_or(f64::NAN)),
        Value::String(s) => AttributeValue::Text(s.clone()),
        other => AttributeValue::Text(other.to_string()),
    })
}

/// `Ok(None)` when the value is not shaped like a geometry at all
fn geometry_from_value(value: &Value) -> Result<Option<Geometry>, SceneError> {
    let Some(object) = value.as_object() else {
        return Ok(None);
    };
    let Some(kind) = object.get("type").and_then(Value::as_str) else {
        return Ok(None);
    };
    if !object.contains_key("coordinates") && !object.contains_key("geometries") {
        return Ok(None);
    }

    if GEOMETRY_TYPES.contains(&kind) {
        let geometry = serde_json::from_value(value.clone())
            .map_err(|e| SceneError::invalid_geometry(format!("{}: {}", kind, e)))?;
        Ok(Some(geometry))
    } else {
        Ok(Some(Geometry::Unsupported(kind.to_string())))
    }
}
