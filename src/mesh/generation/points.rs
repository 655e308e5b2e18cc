//! Point placeholders
//!
//! A point feature that names an external mesh becomes a `group` node
//! translated to the point, holding a `mesh` node that references the
//! asset. Points without a reference cannot be drawn and are skipped by the
//! caller.

use super::FeatureLabels;
use crate::mesh::geometry::{format_decimal, BoundingBox, Coordinate};
use crate::SceneNode;

/// Translation of a point relative to the bbox origin: `x - min_x`, the
/// elevation, then `y - min_y`
pub fn point_translation(point: &Coordinate, bbox: &BoundingBox) -> String {
    format!(
        "{} {} {}",
        format_decimal(point.x - bbox.min_x),
        format_decimal(point.z),
        format_decimal(point.y - bbox.min_y)
    )
}

pub fn point_group(point: &Coordinate, mesh_ref: &str, bbox: &BoundingBox, labels: &FeatureLabels) -> SceneNode {
    let mut group = SceneNode::new("group");
    labels.apply(&mut group);
    group.add_attribute("translation", point_translation(point, bbox));
    group.add_child(SceneNode::new("mesh").with_attribute("src", mesh_ref));
    group
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_group() {
        let bbox = BoundingBox::new(100.0, 200.0, 110.0, 210.0);
        let labels = FeatureLabels {
            id: Some("tree-4".to_string()),
            class: None,
        };
        let group = point_group(&Coordinate::new(103.5, 207.0, 12.0), "models/oak.xml#mesh", &bbox, &labels);

        assert_eq!(group.tag.as_deref(), Some("group"));
        assert_eq!(group.attribute("id"), Some("tree-4"));
        assert_eq!(group.attribute("class"), None);
        assert_eq!(group.attribute("translation"), Some("3.5 12.0 7.0"));
        assert_eq!(group.children.len(), 1);
        assert_eq!(group.children[0].attribute("src"), Some("models/oak.xml#mesh"));
    }
}
