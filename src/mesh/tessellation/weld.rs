//! Vertex welding
//!
//! Vertices are merged when their fixed-precision render keys match, so
//! coordinates that differ only past the sixth decimal share one index.

use crate::mesh::geometry::Vec3;
use std::collections::HashMap;

/// Maps render keys to indices in a caller-owned vertex list
#[derive(Debug, Default)]
pub struct VertexWelder {
    index: HashMap<String, u32>,
}

impl VertexWelder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the index of an equal vertex, appending `v` to `vertices` if none exists
    pub fn get_or_insert(&mut self, v: Vec3, vertices: &mut Vec<Vec3>) -> u32 {
        let next = vertices.len() as u32;
        let index = *self.index.entry(v.render_key()).or_insert(next);
        if index == next {
            vertices.push(v);
        }
        index
    }

    /// Index of an already-welded vertex equal to `v`
    pub fn lookup(&self, v: &Vec3) -> Option<u32> {
        self.index.get(&v.render_key()).copied()
    }

    /// Forget every key; the next sub-mesh starts again at index 0
    pub fn clear(&mut self) {
        self.index.clear();
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
