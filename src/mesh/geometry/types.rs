//! Core geometry types for scene building
//!
//! Input geometries arrive in map axes (x east, y north, z elevation).
//! Mesh vertices live in scene axes where y is up, so a source coordinate
//! `(x, y, z)` becomes the vertex `(x, z, y)`.

use crate::error::SceneError;
use serde::Deserialize;
use std::ops::{AddAssign, Sub};
use std::str::FromStr;

/// Render a value with at least one and at most six fractional digits
///
/// This is the precision vertices are compared at: two values that render
/// the same are the same for welding purposes.
pub fn format_decimal(value: f64) -> String {
    let mut text = format!("{:.6}", value);
    if let Some(dot) = text.find('.') {
        let keep = text.trim_end_matches('0').len().max(dot + 2);
        text.truncate(keep);
    }
    if text == "-0.0" {
        text.remove(0);
    }
    text
}

/// A 3D position or direction in scene axes
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Map a source coordinate into scene axes (y becomes up)
    pub fn from_coordinate(c: &Coordinate) -> Self {
        Self::new(c.x, c.z, c.y)
    }

    pub fn cross(&self, other: &Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Unit-length copy, or the zero vector when the length is zero
    pub fn normalized(&self) -> Vec3 {
        let len = self.length();
        if len == 0.0 || !len.is_finite() {
            return Vec3::ZERO;
        }
        Vec3::new(self.x / len, self.y / len, self.z / len)
    }

    /// Fixed-precision key used for vertex equality
    pub fn render_key(&self) -> String {
        format!(
            "{} {} {}",
            format_decimal(self.x),
            format_decimal(self.y),
            format_decimal(self.z)
        )
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Vec3) {
        self.x += rhs.x;
        self.y += rhs.y;
        self.z += rhs.z;
    }
}

/// A source coordinate in map axes; 2D input gets `z = 0`
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(try_from = "Vec<f64>")]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Coordinate {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn xy(x: f64, y: f64) -> Self {
        Self { x, y, z: 0.0 }
    }
}

impl TryFrom<Vec<f64>> for Coordinate {
    type Error = SceneError;

    fn try_from(ordinates: Vec<f64>) -> Result<Self, Self::Error> {
        match ordinates.as_slice() {
            [x, y] => Ok(Coordinate::xy(*x, *y)),
            [x, y, z, ..] => Ok(Coordinate::new(*x, *y, *z)),
            _ => Err(SceneError::invalid_geometry(format!(
                "position needs at least 2 ordinates, got {}",
                ordinates.len()
            ))),
        }
    }
}

/// Request bounding box in map axes, read-only for a whole build
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self { min_x, min_y, max_x, max_y }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// True when `(x, y)` lies inside the box grown by `margin` on every side
    pub fn contains_with_margin(&self, x: f64, y: f64, margin: f64) -> bool {
        x >= self.min_x - margin
            && x <= self.max_x + margin
            && y >= self.min_y - margin
            && y <= self.max_y + margin
    }
}

impl FromStr for BoundingBox {
    type Err = SceneError;

    /// Parse `minx,miny,maxx,maxy`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<f64> = s
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|e| SceneError::invalid_geometry(format!("bad bbox '{}': {}", s, e)))?;
        match parts.as_slice() {
            [min_x, min_y, max_x, max_y] => Ok(BoundingBox::new(*min_x, *min_y, *max_x, *max_y)),
            _ => Err(SceneError::invalid_geometry(format!(
                "bbox needs 4 values, got {}",
                parts.len()
            ))),
        }
    }
}

/// The geometry kinds a scene layer can be built from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryKind {
    Polygon,
    Line,
    Point,
}

impl GeometryKind {
    /// Name used as the id of a layer's outer group node
    pub fn name(&self) -> &'static str {
        match self {
            GeometryKind::Polygon => "Polygon",
            GeometryKind::Line => "LineString",
            GeometryKind::Point => "Point",
        }
    }
}

/// A feature geometry (GeoJSON-shaped)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Point(Coordinate),
    MultiPoint(Vec<Coordinate>),
    LineString(Vec<Coordinate>),
    MultiLineString(Vec<Vec<Coordinate>>),
    /// Rings: exterior first, then holes
    Polygon(Vec<Vec<Coordinate>>),
    MultiPolygon(Vec<Vec<Vec<Coordinate>>>),
    /// Any geometry type this crate cannot build, kept by name
    #[serde(skip_deserializing)]
    Unsupported(String),
}

impl Geometry {
    pub fn type_name(&self) -> &str {
        match self {
            Geometry::Point(_) => "Point",
            Geometry::MultiPoint(_) => "MultiPoint",
            Geometry::LineString(_) => "LineString",
            Geometry::MultiLineString(_) => "MultiLineString",
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPolygon(_) => "MultiPolygon",
            Geometry::Unsupported(name) => name,
        }
    }

    /// Classify this geometry, failing for kinds a scene cannot hold
    pub fn kind(&self) -> Result<GeometryKind, SceneError> {
        match self {
            Geometry::Polygon(_) | Geometry::MultiPolygon(_) => Ok(GeometryKind::Polygon),
            Geometry::LineString(_) | Geometry::MultiLineString(_) => Ok(GeometryKind::Line),
            Geometry::Point(_) => Ok(GeometryKind::Point),
            other => Err(SceneError::unsupported_kind(other.type_name())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_decimal() {
        assert_eq!(format_decimal(0.0), "0.0");
        assert_eq!(format_decimal(10.0), "10.0");
        assert_eq!(format_decimal(1.5), "1.5");
        assert_eq!(format_decimal(0.1234567), "0.123457");
        assert_eq!(format_decimal(-2.25), "-2.25");
        assert_eq!(format_decimal(-0.0000001), "0.0");
    }

    #[test]
    fn test_render_key_snaps_close_values() {
        let a = Vec3::new(1.0, 2.0, 3.0);
        let b = Vec3::new(1.0000001, 2.0, 3.0);
        let c = Vec3::new(1.00001, 2.0, 3.0);
        assert_eq!(a.render_key(), "1.0 2.0 3.0");
        assert_eq!(a.render_key(), b.render_key());
        assert_ne!(a.render_key(), c.render_key());
    }

    #[test]
    fn test_axis_remap() {
        let v = Vec3::from_coordinate(&Coordinate::new(1.0, 2.0, 3.0));
        assert_eq!(v, Vec3::new(1.0, 3.0, 2.0));
    }

    #[test]
    fn test_cross_and_normalize() {
        let x = Vec3::new(1.0, 0.0, 0.0);
        let z = Vec3::new(0.0, 0.0, 1.0);
        assert_eq!(z.cross(&x), Vec3::new(0.0, 1.0, 0.0));
        assert_eq!(Vec3::ZERO.normalized(), Vec3::ZERO);
        assert_eq!(Vec3::new(0.0, 4.0, 0.0).normalized(), Vec3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_bbox_margin_is_inclusive() {
        let bbox = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        assert!(bbox.contains_with_margin(15.0, 5.0, 5.0));
        assert!(!bbox.contains_with_margin(15.1, 5.0, 5.0));
        assert!(!bbox.contains_with_margin(5.0, -5.5, 5.0));
    }

    #[test]
    fn test_bbox_from_str() {
        let bbox: BoundingBox = "0, 1,10,11".parse().unwrap();
        assert_eq!(bbox, BoundingBox::new(0.0, 1.0, 10.0, 11.0));
        assert!("0,1,2".parse::<BoundingBox>().is_err());
        assert!("a,b,c,d".parse::<BoundingBox>().is_err());
    }

    #[test]
    fn test_geometry_kind() {
        let poly = Geometry::Polygon(vec![]);
        assert_eq!(poly.kind().unwrap(), GeometryKind::Polygon);
        let lines = Geometry::MultiLineString(vec![]);
        assert_eq!(lines.kind().unwrap().name(), "LineString");
        let err = Geometry::MultiPoint(vec![]).kind().unwrap_err();
        assert!(matches!(err, SceneError::UnsupportedGeometryKind { ref kind } if kind == "MultiPoint"));
    }

    #[test]
    fn test_deserialize_geometry() {
        let geom: Geometry =
            serde_json::from_str(r#"{"type":"LineString","coordinates":[[0,0],[1,2,3]]}"#).unwrap();
        assert_eq!(
            geom,
            Geometry::LineString(vec![Coordinate::xy(0.0, 0.0), Coordinate::new(1.0, 2.0, 3.0)])
        );
        assert!(serde_json::from_str::<Geometry>(r#"{"type":"Point","coordinates":[1]}"#).is_err());
    }
}
