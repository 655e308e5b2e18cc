//! Ring triangulation
//!
//! A `Triangulator` turns one ring of distinct vertices into a flat list of
//! ring-local indices, read three at a time as triangles.
//!
//! `FanTriangulator` is the default. It chains triangles through the last
//! vertex of the previous triangle and closes back to the first vertex.
//! This is only correct for small convex rings such as grid quads; concave
//! rings tessellate wrongly. `EarcutTriangulator` handles arbitrary simple
//! rings in the ground plane.

use crate::mesh::geometry::Vec3;

pub trait Triangulator {
    /// Ring-local indices, a multiple of three long
    fn triangulate(&self, ring: &[Vec3]) -> Vec<usize>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FanTriangulator;

impl Triangulator for FanTriangulator {
    fn triangulate(&self, ring: &[Vec3]) -> Vec<usize> {
        if ring.len() < 3 {
            return Vec::new();
        }

        let mut indices = Vec::with_capacity(ring.len() * 2);
        let mut placed = 0;
        let mut previous = 0;
        for i in 0..ring.len() {
            if placed > 2 {
                indices.push(previous);
                placed = 1;
            }
            indices.push(i);
            previous = i;
            placed += 1;
        }
        if placed < 3 {
            indices.push(0);
        }
        indices
    }
}

/// Ear clipping over the ring's ground-plane (x, z) projection
#[derive(Debug, Default, Clone, Copy)]
pub struct EarcutTriangulator;

impl Triangulator for EarcutTriangulator {
    fn triangulate(&self, ring: &[Vec3]) -> Vec<usize> {
        if ring.len() < 3 {
            return Vec::new();
        }

        let mut flat_coords: Vec<f64> = Vec::with_capacity(ring.len() * 2);
        for v in ring {
            flat_coords.push(v.x);
            flat_coords.push(v.z);
        }
        earcutr::earcut(&flat_coords, &[], 2).unwrap_or_default()
    }
}
