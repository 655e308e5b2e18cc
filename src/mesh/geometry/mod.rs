//! Geometry module for scene building
//!
//! # Submodules
//! - `types` - Vectors, coordinates, bounding boxes and feature geometries
//! - `binary` - Binary elevation-grid layout

mod types;
mod binary;

pub use types::{
    format_decimal,
    Vec3,
    Coordinate,
    BoundingBox,
    GeometryKind,
    Geometry,
};

pub use binary::{
    GRID_HEADER_LEN,
    GridHeader,
    write_grid_binary,
    read_grid_binary,
};
