//! Per-vertex normal estimation
//!
//! Face normals are summed unnormalized into every vertex of the face, so
//! larger triangles weigh more. Accumulators are kept beside the vertex
//! list and addressed by vertex index.

use crate::mesh::geometry::Vec3;

/// Normal accumulators parallel to a vertex list
#[derive(Debug, Default)]
pub struct NormalAccumulator {
    sums: Vec<Option<Vec3>>,
}

impl NormalAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `n` into the accumulator of `vertex`, starting from zero if empty
    pub fn add_normal(&mut self, vertex: usize, n: Vec3) {
        if vertex >= self.sums.len() {
            self.sums.resize(vertex + 1, None);
        }
        *self.sums[vertex].get_or_insert(Vec3::ZERO) += n;
    }

    /// Unit normal of `vertex`; zero if nothing was accumulated
    pub fn normalized_normal(&self, vertex: usize) -> Vec3 {
        match self.sums.get(vertex) {
            Some(Some(sum)) => sum.normalized(),
            _ => Vec3::ZERO,
        }
    }

    /// Accumulate the face normal of every index triple
    pub fn accumulate_faces(&mut self, vertices: &[Vec3], indices: &[u32]) {
        for tri in indices.chunks_exact(3) {
            let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let v0 = vertices[i0];
            let face = (vertices[i2] - v0).cross(&(vertices[i1] - v0));
            self.add_normal(i0, face);
            self.add_normal(i1, face);
            self.add_normal(i2, face);
        }
    }

    /// Unit normals for the first `count` vertices
    pub fn normals(&self, count: usize) -> Vec<Vec3> {
        (0..count).map(|i| self.normalized_normal(i)).collect()
    }
}
