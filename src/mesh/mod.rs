//! Mesh building
//!
//! # Submodules
//! - `geometry` - Core types and the binary grid layout
//! - `tessellation` - Welding, normals and triangulation
//! - `generation` - Scene nodes from feature geometries

pub mod geometry;
pub mod tessellation;
pub mod generation;
