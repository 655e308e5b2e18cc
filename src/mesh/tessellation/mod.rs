//! Tessellation module for scene meshes
//!
//! # Submodules
//! - `weld` - Vertex deduplication by render key
//! - `normals` - Area-weighted per-vertex normals
//! - `triangulate` - Ring triangulation (fan and earcut)

mod weld;
mod normals;
mod triangulate;

pub use weld::VertexWelder;

pub use normals::NormalAccumulator;

pub use triangulate::{
    Triangulator,
    FanTriangulator,
    EarcutTriangulator,
};
